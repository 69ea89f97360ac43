// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Extraction of structured recommendation fields from advisor output.
//!
//! The advisor is asked for a fixed JSON schema, but what comes back is
//! wrapped in the provider envelope, often fenced as markdown, and sometimes
//! not JSON at all. Extraction is all-or-nothing: any failure discards
//! partial results and the caller substitutes [`RecommendationFields::fallback`].

use serde_json::Value;

/// Text used when no analysis could be extracted.
pub const DEFAULT_RECOMMENDATION_TEXT: &str = "Unable to generate detailed recommendation";
/// Single entry used for every list of the fallback recommendation.
pub const DEFAULT_LIST_ENTRY: &str = "Continue with your current routine";

pub const NO_IMPROVEMENTS: &str = "No specific improvements provided";
pub const NO_SUGGESTIONS: &str = "No specific suggestions provided";
pub const NO_SAFETY: &str = "Follow general safety guidelines";

/// Analysis subsections, visited in this order: (JSON key, label).
const ANALYSIS_SECTIONS: [(&str, &str); 4] = [
    ("overall", "Overall"),
    ("pace", "Pace"),
    ("heartRate", "HeartRate"),
    ("caloriesBurned", "CaloriesBurned"),
];

/// Why extraction gave up.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("advisor envelope has no {0}")]
    MissingText(&'static str),

    #[error("advisor text is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("advisor JSON is not an object")]
    NotAnObject,

    #[error("advisor JSON has no analysis subsections")]
    EmptyAnalysis,
}

/// Structured fields pulled out of an advisor response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationFields {
    pub recommendation_text: String,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
    pub safety: Vec<String>,
}

impl RecommendationFields {
    /// Fixed content used whenever extraction fails.
    pub fn fallback() -> Self {
        Self {
            recommendation_text: DEFAULT_RECOMMENDATION_TEXT.to_string(),
            improvements: vec![DEFAULT_LIST_ENTRY.to_string()],
            suggestions: vec![DEFAULT_LIST_ENTRY.to_string()],
            safety: vec![DEFAULT_LIST_ENTRY.to_string()],
        }
    }
}

/// Extract recommendation fields from a full advisor envelope.
pub fn extract(envelope: &Value) -> Result<RecommendationFields, ExtractionError> {
    let text = generated_text(envelope)?;
    parse_generated_text(text)
}

/// Locate `candidates[0].content.parts[0].text` in the envelope.
pub fn generated_text(envelope: &Value) -> Result<&str, ExtractionError> {
    envelope
        .get("candidates")
        .and_then(|c| c.get(0))
        .ok_or(ExtractionError::MissingText("candidates[0]"))?
        .get("content")
        .ok_or(ExtractionError::MissingText("content"))?
        .get("parts")
        .and_then(|p| p.get(0))
        .ok_or(ExtractionError::MissingText("parts[0]"))?
        .get("text")
        .and_then(Value::as_str)
        .ok_or(ExtractionError::MissingText("text"))
}

/// Remove a surrounding markdown code fence, if any, and trim whitespace.
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Parse the (possibly fenced) generated text into recommendation fields.
pub fn parse_generated_text(text: &str) -> Result<RecommendationFields, ExtractionError> {
    let parsed: Value = serde_json::from_str(strip_code_fence(text))?;
    if !parsed.is_object() {
        return Err(ExtractionError::NotAnObject);
    }

    let recommendation_text = analysis_block(parsed.get("analysis"))?;

    let improvements = formatted_items(
        parsed.get("improvements"),
        ("Area", "area"),
        ("Recommendation", "recommendation"),
        NO_IMPROVEMENTS,
    );
    let suggestions = formatted_items(
        parsed.get("suggestions"),
        ("Workout", "workout"),
        ("Description", "description"),
        NO_SUGGESTIONS,
    );
    let safety = match parsed.get("safety").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items.iter().map(render).collect(),
        _ => vec![NO_SAFETY.to_string()],
    };

    Ok(RecommendationFields {
        recommendation_text,
        improvements,
        suggestions,
        safety,
    })
}

/// Build the "<Label>: <text>" block from the analysis object.
fn analysis_block(analysis: Option<&Value>) -> Result<String, ExtractionError> {
    let mut block = String::new();
    if let Some(analysis) = analysis {
        for (key, label) in ANALYSIS_SECTIONS {
            if let Some(section) = analysis.get(key) {
                block.push_str(label);
                block.push_str(": ");
                block.push_str(&render(section));
                block.push_str("\n\n");
            }
        }
    }

    if block.is_empty() {
        return Err(ExtractionError::EmptyAnalysis);
    }
    Ok(block.trim_end().to_string())
}

/// Format each object in an array as "<A>: <a>, <B>: <b>".
fn formatted_items(
    items: Option<&Value>,
    (first_label, first_key): (&str, &str),
    (second_label, second_key): (&str, &str),
    sentinel: &str,
) -> Vec<String> {
    match items.and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items
            .iter()
            .map(|item| {
                format!(
                    "{}: {}, {}: {}",
                    first_label,
                    field_text(item, first_key),
                    second_label,
                    field_text(item, second_key)
                )
            })
            .collect(),
        _ => vec![sentinel.to_string()],
    }
}

fn field_text(item: &Value, key: &str) -> String {
    item.get(key).map(render).unwrap_or_default()
}

/// Strings verbatim, anything else as compact JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(text: &str) -> Value {
        json!({
            "candidates": [
                {"content": {"parts": [{"text": text}], "role": "model"}}
            ]
        })
    }

    const FULL: &str = r#"{
        "analysis": {
            "overall": "Solid effort",
            "pace": "Steady",
            "heartRate": "Zone 3",
            "caloriesBurned": "On target"
        },
        "improvements": [{"area": "Pace", "recommendation": "Slow down"}],
        "suggestions": [{"workout": "Intervals", "description": "6x400m"}],
        "safety": ["Hydrate", "Warm up"]
    }"#;

    #[test]
    fn test_extract_full_response() {
        let fields = extract(&envelope(FULL)).unwrap();
        assert_eq!(
            fields.recommendation_text,
            "Overall: Solid effort\n\nPace: Steady\n\nHeartRate: Zone 3\n\nCaloriesBurned: On target"
        );
        assert_eq!(
            fields.improvements,
            vec!["Area: Pace, Recommendation: Slow down"]
        );
        assert_eq!(
            fields.suggestions,
            vec!["Workout: Intervals, Description: 6x400m"]
        );
        assert_eq!(fields.safety, vec!["Hydrate", "Warm up"]);
    }

    #[test]
    fn test_extract_fenced_response() {
        let fenced = format!("```json\n{}\n```", FULL);
        let fields = extract(&envelope(&fenced)).unwrap();
        assert!(fields.recommendation_text.starts_with("Overall: Solid effort"));
    }

    #[test]
    fn test_missing_pace_is_skipped() {
        let text = r#"{"analysis": {"overall": "Good", "heartRate": "High", "caloriesBurned": "350"}}"#;
        let fields = parse_generated_text(text).unwrap();

        let overall = fields.recommendation_text.find("Overall:").unwrap();
        let heart = fields.recommendation_text.find("HeartRate:").unwrap();
        let calories = fields.recommendation_text.find("CaloriesBurned:").unwrap();
        assert!(overall < heart && heart < calories);
        assert!(!fields.recommendation_text.contains("Pace:"));
    }

    #[test]
    fn test_sentinels_for_missing_lists() {
        let fields = parse_generated_text(r#"{"analysis": {"overall": "Fine"}}"#).unwrap();
        assert_eq!(fields.improvements, vec![NO_IMPROVEMENTS]);
        assert_eq!(fields.suggestions, vec![NO_SUGGESTIONS]);
        assert_eq!(fields.safety, vec![NO_SAFETY]);
    }

    #[test]
    fn test_sentinels_for_empty_and_non_array_lists() {
        let text = r#"{
            "analysis": {"overall": "Fine"},
            "improvements": [],
            "suggestions": "rest more",
            "safety": []
        }"#;
        let fields = parse_generated_text(text).unwrap();
        assert_eq!(fields.improvements, vec![NO_IMPROVEMENTS]);
        assert_eq!(fields.suggestions, vec![NO_SUGGESTIONS]);
        assert_eq!(fields.safety, vec!["Follow general safety guidelines"]);
    }

    #[test]
    fn test_missing_item_fields_become_empty() {
        let text = r#"{
            "analysis": {"overall": "Fine"},
            "improvements": [{"area": "Form"}],
            "suggestions": [{"description": "Easy jog"}]
        }"#;
        let fields = parse_generated_text(text).unwrap();
        assert_eq!(fields.improvements, vec!["Area: Form, Recommendation: "]);
        assert_eq!(fields.suggestions, vec!["Workout: , Description: Easy jog"]);
    }

    #[test]
    fn test_non_string_values_rendered_as_json() {
        let text = r#"{"analysis": {"caloriesBurned": 320}, "safety": ["Stretch", 3]}"#;
        let fields = parse_generated_text(text).unwrap();
        assert_eq!(fields.recommendation_text, "CaloriesBurned: 320");
        assert_eq!(fields.safety, vec!["Stretch", "3"]);
    }

    #[test]
    fn test_non_json_text_fails() {
        let result = extract(&envelope("Great run! Keep it up."));
        assert!(matches!(result, Err(ExtractionError::InvalidJson(_))));
    }

    #[test]
    fn test_missing_path_fails() {
        assert!(matches!(
            extract(&json!({})),
            Err(ExtractionError::MissingText("candidates[0]"))
        ));
        assert!(matches!(
            extract(&json!({"candidates": []})),
            Err(ExtractionError::MissingText("candidates[0]"))
        ));
        assert!(matches!(
            extract(&json!({"candidates": [{"finishReason": "SAFETY"}]})),
            Err(ExtractionError::MissingText("content"))
        ));
        assert!(matches!(
            extract(&json!({"candidates": [{"content": {"parts": []}}]})),
            Err(ExtractionError::MissingText("parts[0]"))
        ));
        assert!(matches!(
            extract(&json!({"candidates": [{"content": {"parts": [{"text": 7}]}}]})),
            Err(ExtractionError::MissingText("text"))
        ));
    }

    #[test]
    fn test_empty_analysis_fails() {
        assert!(matches!(
            parse_generated_text(r#"{"analysis": {}, "safety": ["Hydrate"]}"#),
            Err(ExtractionError::EmptyAnalysis)
        ));
        assert!(matches!(
            parse_generated_text(r#"{"safety": ["Hydrate"]}"#),
            Err(ExtractionError::EmptyAnalysis)
        ));
    }

    #[test]
    fn test_non_object_fails() {
        assert!(matches!(
            parse_generated_text("[1, 2, 3]"),
            Err(ExtractionError::NotAnObject)
        ));
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("{\"a\": 1}\n```\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_fallback_values() {
        let fallback = RecommendationFields::fallback();
        assert_eq!(
            fallback.recommendation_text,
            "Unable to generate detailed recommendation"
        );
        for list in [&fallback.improvements, &fallback.suggestions, &fallback.safety] {
            assert_eq!(list, &vec!["Continue with your current routine".to_string()]);
        }
    }
}
