// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recommendation store with Firestore and in-memory backends.
//!
//! Writes are append-only inserts: the store never upserts by activity, so a
//! redelivered event yields an additional record.

use crate::db::collections;
use crate::error::AppError;
use crate::models::Recommendation;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(Arc<DashMap<String, Recommendation>>),
    /// Every operation fails (persistence-failure tests)
    Offline,
}

/// Recommendation store handle, cheap to clone.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: Backend,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Create a process-local store.
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(DashMap::new())),
        }
    }

    /// Create a mock store for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    fn offline() -> AppError {
        AppError::Database("Database not connected (offline mode)".to_string())
    }

    // ─── Recommendation Operations ───────────────────────────────

    /// Insert a recommendation as a new document.
    pub async fn insert_recommendation(&self, recommendation: &Recommendation) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let _: Recommendation = client
                    .fluent()
                    .insert()
                    .into(collections::RECOMMENDATIONS)
                    .document_id(&recommendation.id)
                    .object(recommendation)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            }
            Backend::Memory(map) => {
                match map.entry(recommendation.id.clone()) {
                    Entry::Occupied(_) => Err(AppError::Database(format!(
                        "Document {} already exists",
                        recommendation.id
                    ))),
                    Entry::Vacant(slot) => {
                        slot.insert(recommendation.clone());
                        Ok(())
                    }
                }
            }
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Get all recommendations for a user, newest first.
    pub async fn get_recommendations_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Recommendation>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let user_id = user_id.to_string();
                client
                    .fluent()
                    .select()
                    .from(collections::RECOMMENDATIONS)
                    .filter(move |q| q.for_all([q.field("userId").eq(user_id.clone())]))
                    .order_by([("createdAt", firestore::FirestoreQueryDirection::Descending)])
                    .obj()
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            }
            Backend::Memory(map) => Ok(newest_first(
                map.iter()
                    .filter(|entry| entry.user_id == user_id)
                    .map(|entry| entry.value().clone())
                    .collect(),
            )),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Get all recommendations for an activity, newest first.
    ///
    /// More than one exists when the activity event was delivered more than once.
    pub async fn get_recommendations_for_activity(
        &self,
        activity_id: &str,
    ) -> Result<Vec<Recommendation>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => {
                let activity_id = activity_id.to_string();
                client
                    .fluent()
                    .select()
                    .from(collections::RECOMMENDATIONS)
                    .filter(move |q| q.for_all([q.field("activityId").eq(activity_id.clone())]))
                    .order_by([("createdAt", firestore::FirestoreQueryDirection::Descending)])
                    .obj()
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            }
            Backend::Memory(map) => Ok(newest_first(
                map.iter()
                    .filter(|entry| entry.activity_id == activity_id)
                    .map(|entry| entry.value().clone())
                    .collect(),
            )),
            Backend::Offline => Err(Self::offline()),
        }
    }

    /// Get the most recent recommendation for an activity.
    pub async fn get_latest_recommendation_for_activity(
        &self,
        activity_id: &str,
    ) -> Result<Option<Recommendation>, AppError> {
        Ok(self
            .get_recommendations_for_activity(activity_id)
            .await?
            .into_iter()
            .next())
    }
}

/// Sort by creation time descending; ids (UUIDv7) break ties.
fn newest_first(mut records: Vec<Recommendation>) -> Vec<Recommendation> {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    records
}
