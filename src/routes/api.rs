// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only recommendation API.

use crate::error::{AppError, Result};
use crate::models::Recommendation;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Upper bound for IDs accepted in paths.
const MAX_ID_LENGTH: usize = 128;

/// Recommendation query routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/recommendations/user/{user_id}",
            get(get_user_recommendations),
        )
        .route(
            "/api/recommendations/activity/{activity_id}",
            get(get_activity_recommendation),
        )
}

fn validate_id(kind: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() || id.len() > MAX_ID_LENGTH {
        return Err(AppError::BadRequest(format!("Invalid {} ID", kind)));
    }
    Ok(())
}

/// All recommendations for a user, newest first.
async fn get_user_recommendations(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Recommendation>>> {
    validate_id("user", &user_id)?;

    let recommendations = state.db.get_recommendations_for_user(&user_id).await?;
    if recommendations.is_empty() {
        return Err(AppError::NotFound(format!(
            "No recommendations for user {}",
            user_id
        )));
    }

    Ok(Json(recommendations))
}

/// Most recent recommendation for an activity.
async fn get_activity_recommendation(
    State(state): State<Arc<AppState>>,
    Path(activity_id): Path<String>,
) -> Result<Json<Recommendation>> {
    validate_id("activity", &activity_id)?;

    state
        .db
        .get_latest_recommendation_for_activity(&activity_id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!("No recommendation for activity {}", activity_id))
        })
}
