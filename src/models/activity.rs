// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Inbound fitness activity event.

use crate::time_utils::deserialize_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use validator::Validate;

/// Kind of activity, as sent by the ingestion edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    Running,
    Walking,
    Cycling,
    Swimming,
    WeightTraining,
    StrengthTraining,
    Yoga,
    Hiit,
    Cardio,
    Stretching,
    Dance,
    Pilates,
    Rowing,
    Other,
}

impl ActivityType {
    /// Wire name of the activity type (e.g. `RUNNING`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Running => "RUNNING",
            ActivityType::Walking => "WALKING",
            ActivityType::Cycling => "CYCLING",
            ActivityType::Swimming => "SWIMMING",
            ActivityType::WeightTraining => "WEIGHT_TRAINING",
            ActivityType::StrengthTraining => "STRENGTH_TRAINING",
            ActivityType::Yoga => "YOGA",
            ActivityType::Hiit => "HIIT",
            ActivityType::Cardio => "CARDIO",
            ActivityType::Stretching => "STRETCHING",
            ActivityType::Dance => "DANCE",
            ActivityType::Pilates => "PILATES",
            ActivityType::Rowing => "ROWING",
            ActivityType::Other => "OTHER",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed activity, produced upstream and consumed read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    /// Activity ID assigned by the ingestion edge
    #[validate(length(min = 1))]
    pub id: String,
    /// Owner of the activity (also the partition key)
    #[validate(length(min = 1))]
    pub user_id: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// Duration in minutes
    pub duration: u32,
    pub calories_burned: u32,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start_time: DateTime<Utc>,
    /// Free-form metrics (distance, heart rate, ...)
    #[serde(
        default,
        alias = "additionalMatrics",
        deserialize_with = "deserialize_metrics"
    )]
    pub additional_metrics: serde_json::Map<String, serde_json::Value>,
}

/// Metrics may be sent as an explicit `null`, which means no metrics.
fn deserialize_metrics<'de, D>(
    deserializer: D,
) -> Result<serde_json::Map<String, serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?
        .unwrap_or_default())
}
