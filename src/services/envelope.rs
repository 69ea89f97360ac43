// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Decoding of inbound activity event payloads.

use crate::models::ActivityEvent;
use validator::Validate;

/// Reasons an inbound payload is dropped instead of processed.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("payload is null")]
    Null,

    #[error("payload is empty")]
    Empty,

    #[error("payload is not a valid activity event: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("activity event failed validation: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Decode a raw bus payload into an [`ActivityEvent`].
///
/// A missing payload, a blank payload and the JSON literal `null` are all
/// treated as null deliveries.
pub fn decode_event(payload: Option<&[u8]>) -> Result<ActivityEvent, EnvelopeError> {
    let bytes = payload.ok_or(EnvelopeError::Null)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(EnvelopeError::Empty);
    }

    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    if value.is_null() {
        return Err(EnvelopeError::Null);
    }

    let event: ActivityEvent = serde_json::from_value(value)?;
    event.validate()?;
    Ok(event)
}

/// Best-effort extraction of the partition key (`userId`) from a raw payload.
pub fn partition_key(payload: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(payload)
        .ok()
        .and_then(|v| v.get("userId").and_then(|id| id.as_str()).map(str::to_string))
        .unwrap_or_default()
}
