//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup; a `.env` file is honored for local
//! development.

use std::env;

/// Topic carrying activity events, when `KAFKA_TOPIC_NAME` is unset.
pub const DEFAULT_TOPIC_NAME: &str = "activity-events";

/// Consumer group used by the recommendation pipeline.
pub const DEFAULT_CONSUMER_GROUP: &str = "activity-processor-group";

/// Where recommendations are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Cloud Firestore (or the emulator when FIRESTORE_EMULATOR_HOST is set)
    Firestore,
    /// Process-local map, lost on restart
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    pub store_backend: StoreBackend,

    // --- Advisor ---
    /// Gemini generateContent endpoint
    pub gemini_api_url: String,
    pub gemini_api_key: String,
    pub advisor_timeout_secs: u64,

    // --- Message bus ---
    pub topic_name: String,
    pub consumer_group: String,
    pub bus_partitions: usize,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            store_backend: StoreBackend::Memory,
            gemini_api_url: "http://localhost:9999/v1beta/models/gemini:generateContent"
                .to_string(),
            gemini_api_key: "test_api_key".to_string(),
            advisor_timeout_secs: 5,
            topic_name: DEFAULT_TOPIC_NAME.to_string(),
            consumer_group: DEFAULT_CONSUMER_GROUP.to_string(),
            bus_partitions: 2,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let gcp_project_id = env::var("GCP_PROJECT_ID").ok();
        let store_backend = match env::var("STORE_BACKEND").ok().as_deref() {
            Some("firestore") => StoreBackend::Firestore,
            Some("memory") => StoreBackend::Memory,
            Some(_) => return Err(ConfigError::Invalid("STORE_BACKEND")),
            None if gcp_project_id.is_some() => StoreBackend::Firestore,
            None => StoreBackend::Memory,
        };

        let bus_partitions = env::var("BUS_PARTITIONS")
            .unwrap_or_else(|_| "4".to_string())
            .parse::<usize>()
            .map_err(|_| ConfigError::Invalid("BUS_PARTITIONS"))?;
        if bus_partitions == 0 {
            return Err(ConfigError::Invalid("BUS_PARTITIONS"));
        }

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: gcp_project_id.unwrap_or_else(|| "local-dev".to_string()),
            store_backend,

            gemini_api_url: env::var("GEMINI_API_URL")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GEMINI_API_URL"))?,
            gemini_api_key: env::var("GEMINI_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GEMINI_API_KEY"))?,
            advisor_timeout_secs: env::var("ADVISOR_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),

            topic_name: env::var("KAFKA_TOPIC_NAME")
                .unwrap_or_else(|_| DEFAULT_TOPIC_NAME.to_string()),
            consumer_group: env::var("CONSUMER_GROUP")
                .unwrap_or_else(|_| DEFAULT_CONSUMER_GROUP.to_string()),
            bus_partitions,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
