// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Recommendation processing service.
//!
//! Handles the per-event workflow:
//! 1. Decode the bus payload into an activity event
//! 2. Build the advisor prompt
//! 3. Call the advisor
//! 4. Extract structured fields (or fall back to the default recommendation)
//! 5. Store the recommendation

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::{ActivityEvent, Recommendation};
use crate::services::advisor::AdvisorClient;
use crate::services::envelope::decode_event;
use crate::services::extraction::{extract, RecommendationFields};
use crate::services::prompt::build_prompt;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};

/// What happened to one delivered event.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Advisor output was extracted successfully
    Parsed(Recommendation),
    /// Advisor call or extraction failed; the default recommendation was used
    Defaulted {
        recommendation: Recommendation,
        reason: String,
    },
    /// Payload was null, empty or undecodable; nothing was produced
    Dropped { reason: String },
}

impl Outcome {
    /// The produced recommendation, if any.
    pub fn recommendation(&self) -> Option<&Recommendation> {
        match self {
            Outcome::Parsed(recommendation) => Some(recommendation),
            Outcome::Defaulted { recommendation, .. } => Some(recommendation),
            Outcome::Dropped { .. } => None,
        }
    }

    /// Short label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Parsed(_) => "parsed",
            Outcome::Defaulted { .. } => "defaulted",
            Outcome::Dropped { .. } => "dropped",
        }
    }
}

/// Combine extracted fields with the event identity into a new record.
pub fn assemble(
    event: &ActivityEvent,
    fields: RecommendationFields,
    created_at: DateTime<Utc>,
) -> Recommendation {
    Recommendation {
        id: uuid::Uuid::now_v7().to_string(),
        activity_id: event.id.clone(),
        user_id: event.user_id.clone(),
        activity_type: event.activity_type.to_string(),
        recommendation_text: fields.recommendation_text,
        improvements: fields.improvements,
        suggestions: fields.suggestions,
        safety: fields.safety,
        created_at: format_utc_rfc3339(created_at),
    }
}

/// Turns activity events into stored recommendations.
#[derive(Clone)]
pub struct RecommendationProcessor {
    advisor: AdvisorClient,
    db: FirestoreDb,
}

impl RecommendationProcessor {
    pub fn new(advisor: AdvisorClient, db: FirestoreDb) -> Self {
        Self { advisor, db }
    }

    /// Process one raw bus payload end to end.
    ///
    /// Only a store failure is returned as an error; undecodable payloads
    /// and advisor problems are reported through the [`Outcome`].
    pub async fn process_payload(&self, payload: Option<&[u8]>) -> Result<Outcome> {
        let event = match decode_event(payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping activity payload");
                return Ok(Outcome::Dropped {
                    reason: e.to_string(),
                });
            }
        };

        tracing::info!(
            activity_id = %event.id,
            user_id = %event.user_id,
            activity_type = %event.activity_type,
            "Processing activity event"
        );

        let outcome = self.generate(&event).await;

        if let Some(recommendation) = outcome.recommendation() {
            self.db.insert_recommendation(recommendation).await?;
            tracing::info!(
                activity_id = %event.id,
                recommendation_id = %recommendation.id,
                outcome = outcome.as_str(),
                "Recommendation stored"
            );
        }

        Ok(outcome)
    }

    /// Ask the advisor about an event and build the recommendation.
    ///
    /// Never fails: any advisor or extraction problem yields the default
    /// recommendation tagged as [`Outcome::Defaulted`].
    pub async fn generate(&self, event: &ActivityEvent) -> Outcome {
        let prompt = build_prompt(event);

        let envelope = match self.advisor.generate(&prompt).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    activity_id = %event.id,
                    error = %e,
                    "Advisor call failed, using default recommendation"
                );
                return Outcome::Defaulted {
                    recommendation: assemble(event, RecommendationFields::fallback(), Utc::now()),
                    reason: e.to_string(),
                };
            }
        };

        match extract(&envelope) {
            Ok(fields) => Outcome::Parsed(assemble(event, fields, Utc::now())),
            Err(e) => {
                tracing::warn!(
                    activity_id = %event.id,
                    error = %e,
                    "Could not extract advisor response, using default recommendation"
                );
                Outcome::Defaulted {
                    recommendation: assemble(event, RecommendationFields::fallback(), Utc::now()),
                    reason: e.to_string(),
                }
            }
        }
    }
}
