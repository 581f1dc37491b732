use std::time::Duration;

use anyhow::{Context, Result};

/// Service configuration loaded from environment variables.
/// Only the numeric settings can fail; every backing service is optional and
/// falls back to an in-process implementation when absent.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL. `None` selects the in-memory analysis store.
    pub database_url: Option<String>,
    /// Anthropic key for the remote insight provider. `None` selects the null provider.
    pub insight_api_key: Option<String>,
    pub insight_timeout: Duration,
    pub analysis_ttl_days: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            insight_api_key: optional_env("INSIGHT_API_KEY"),
            insight_timeout: Duration::from_secs(
                std::env::var("INSIGHT_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse::<u64>()
                    .context("INSIGHT_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            analysis_ttl_days: std::env::var("ANALYSIS_TTL_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse::<i64>()
                .context("ANALYSIS_TTL_DAYS must be a whole number of days")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Treats unset and blank variables the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: None,
            insight_api_key: None,
            insight_timeout: Duration::from_millis(200),
            analysis_ttl_days: 7,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
