// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Stored recommendation record.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Recommendation generated for one activity event.
///
/// Records are append-only: a redelivered event produces a second record
/// with the same `activity_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Recommendation {
    /// Generated record ID (also used as document ID)
    pub id: String,
    pub activity_id: String,
    pub user_id: String,
    /// Activity type of the source event (e.g. "RUNNING")
    #[serde(rename = "type")]
    pub activity_type: String,
    pub recommendation_text: String,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
    pub safety: Vec<String>,
    /// When the event was processed (RFC3339)
    pub created_at: String,
}
