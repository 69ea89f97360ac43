// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fitness_advisor::config::Config;
use fitness_advisor::db::FirestoreDb;
use fitness_advisor::routes::create_router;
use fitness_advisor::services::{
    AdvisorClient, MemoryBus, MockReply, RecommendationProcessor,
};
use fitness_advisor::AppState;
use serde_json::{json, Value};
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Well-formed advisor text, optionally without the pace subsection.
#[allow(dead_code)]
pub fn advisor_text(with_pace: bool) -> String {
    let mut analysis = json!({
        "overall": "Strong steady run",
        "heartRate": "Mostly zone 3",
        "caloriesBurned": "300 kcal is on target"
    });
    if with_pace {
        analysis["pace"] = json!("Even splits");
    }
    json!({
        "analysis": analysis,
        "improvements": [{"area": "Pace", "recommendation": "Slow down"}],
        "suggestions": [{"workout": "Tempo run", "description": "20 minutes at threshold"}],
        "safety": ["Hydrate before and after"]
    })
    .to_string()
}

/// Wrap generated text in a Gemini response envelope.
#[allow(dead_code)]
pub fn gemini_envelope(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }],
        "modelVersion": "gemini-test"
    })
}

/// Raw activity payload as produced upstream.
#[allow(dead_code)]
pub fn activity_payload(id: &str, user_id: &str) -> Vec<u8> {
    json!({
        "id": id,
        "userId": user_id,
        "type": "RUNNING",
        "duration": 45,
        "caloriesBurned": 300,
        "startTime": "2024-05-01T07:30:00",
        "additionalMetrics": {"distance": 5}
    })
    .to_string()
    .into_bytes()
}

/// Processor with an in-memory store and a canned advisor.
#[allow(dead_code)]
pub fn test_processor(reply: MockReply) -> (RecommendationProcessor, AdvisorClient, FirestoreDb) {
    let advisor = AdvisorClient::new_mock(reply);
    let db = FirestoreDb::new_in_memory();
    (
        RecommendationProcessor::new(advisor.clone(), db.clone()),
        advisor,
        db,
    )
}

/// Create a test app with in-memory dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let bus = MemoryBus::new(&config.topic_name, config.bus_partitions);

    let state = Arc::new(AppState {
        config,
        db: FirestoreDb::new_in_memory(),
        bus,
    });

    (create_router(state.clone()), state)
}
