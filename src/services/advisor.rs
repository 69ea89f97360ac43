// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gemini API client used as the recommendation advisor.
//!
//! The client only transports: it returns the raw response envelope and
//! leaves interpretation to the extraction engine.

use crate::config::Config;
use crate::error::AppError;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Canned behavior for the offline client.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this envelope as if the API had answered 200
    Envelope(Value),
    /// Fail every call with this advisor error
    Failure(String),
}

/// Gemini generateContent client.
#[derive(Clone)]
pub struct AdvisorClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    /// Offline mode: canned reply instead of HTTP
    mock: Option<Arc<MockReply>>,
    calls: Arc<AtomicUsize>,
}

impl AdvisorClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.advisor_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.gemini_api_url.clone(),
            api_key: config.gemini_api_key.clone(),
            mock: None,
            calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Create an offline client that answers every call with `reply`.
    pub fn new_mock(reply: MockReply) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: "http://mock.invalid".to_string(),
            api_key: String::new(),
            mock: Some(Arc::new(reply)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of advisor calls made so far (shared across clones).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Send a prompt and return the raw response envelope.
    pub async fn generate(&self, prompt: &str) -> Result<Value, AppError> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(mock) = &self.mock {
            return match mock.as_ref() {
                MockReply::Envelope(envelope) => Ok(envelope.clone()),
                MockReply::Failure(msg) => Err(AppError::Advisor(msg.clone())),
            };
        }

        let body = json!({
            "contents": [
                {"parts": [{"text": prompt}]}
            ]
        });

        let response = self
            .http
            .post(&self.api_url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Advisor(AppError::ADVISOR_TIMEOUT.to_string())
                } else {
                    AppError::Advisor(e.without_url().to_string())
                }
            })?;

        self.check_response_json(response).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json(&self, response: reqwest::Response) -> Result<Value, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 429 {
                tracing::warn!("Advisor rate limit hit (429)");
            }
            return Err(AppError::Advisor(format!("HTTP {}: {}", status, body)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AppError::Advisor(format!("Invalid advisor response body: {}", e)))
    }
}
