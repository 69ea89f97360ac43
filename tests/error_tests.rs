// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use fitness_advisor::error::AppError;

#[test]
fn test_is_advisor_timeout_matches() {
    let err = AppError::Advisor(AppError::ADVISOR_TIMEOUT.to_string());
    assert!(err.is_advisor_timeout());
}

#[test]
fn test_is_advisor_timeout_no_match() {
    let err = AppError::Advisor("HTTP 429 Too Many Requests".to_string());
    assert!(!err.is_advisor_timeout());

    let err = AppError::Database(AppError::ADVISOR_TIMEOUT.to_string());
    assert!(!err.is_advisor_timeout());
}

#[test]
fn test_status_codes() {
    let cases = [
        (AppError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
        (AppError::Advisor("x".to_string()), StatusCode::BAD_GATEWAY),
        (
            AppError::Database("x".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            AppError::Internal(anyhow::anyhow!("x")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, status) in cases {
        assert_eq!(err.into_response().status(), status);
    }
}
