// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ingress route publishing activity events onto the bus.

use crate::services::envelope::partition_key;
use crate::AppState;
use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use std::sync::Arc;

/// Event ingress routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/activities/events", post(publish_event))
}

/// Where a published event landed.
#[derive(Serialize)]
struct PublishResponse {
    partition: usize,
    offset: u64,
}

/// Publish a raw activity payload, keyed by its `userId`.
///
/// The payload is not validated here: invalid events are dropped by the
/// pipeline, the same as any other producer's.
async fn publish_event(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<PublishResponse>) {
    let key = partition_key(&body);
    let (partition, offset) = state.bus.publish(&key, Some(body.to_vec()));

    tracing::info!(
        topic = %state.bus.topic(),
        partition,
        offset,
        user_id = %key,
        "Activity event published"
    );

    (StatusCode::ACCEPTED, Json(PublishResponse { partition, offset }))
}
