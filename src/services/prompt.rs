// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prompt construction for the advisor.

use crate::models::ActivityEvent;

/// Response schema the advisor is asked to follow.
const RESPONSE_SCHEMA: &str = r#"{
  "analysis": {
    "overall": "Overall analysis here",
    "pace": "Pace analysis here",
    "heartRate": "Heart rate analysis here",
    "caloriesBurned": "Calories analysis here"
  },
  "improvements": [
    {
      "area": "Area name",
      "recommendation": "Detailed recommendation"
    }
  ],
  "suggestions": [
    {
      "workout": "Workout name",
      "description": "Detailed workout description"
    }
  ],
  "safety": [
    "Safety point 1",
    "Safety point 2"
  ]
}"#;

/// Build the analysis prompt for an activity.
///
/// Deterministic: the same event always yields the same prompt.
pub fn build_prompt(event: &ActivityEvent) -> String {
    let metrics = serde_json::Value::Object(event.additional_metrics.clone());

    format!(
        "Analyze this fitness activity and provide detailed recommendations in the following EXACT JSON format:\n\
         {schema}\n\
         \n\
         Analyze this activity:\n\
         Activity Type: {activity_type}\n\
         Duration: {duration} minutes\n\
         Calories Burned: {calories}\n\
         Additional Metrics: {metrics}\n\
         \n\
         Provide detailed analysis focusing on performance, improvements, next workout suggestions, and safety guidelines.\n\
         Ensure the response follows the EXACT JSON format shown above.\n",
        schema = RESPONSE_SCHEMA,
        activity_type = event.activity_type,
        duration = event.duration,
        calories = event.calories_burned,
        metrics = metrics,
    )
}
