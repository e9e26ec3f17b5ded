//! Application configuration
//!
//! All environment reads happen here, once, at process start. Components
//! receive the resulting structs by reference; nothing looks up ambient
//! globals at request time.

use std::time::Duration;

/// Extraction-oracle connection settings
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Base URL of the oracle server (e.g. http://localhost:11434)
    pub host: String,
    /// Model used for text extraction (SMS/email parsing, insights)
    pub model: String,
    /// Model used for receipt images; falls back to `model` when unset
    pub vision_model: Option<String>,
    /// Upper bound on a single oracle call
    pub timeout: Duration,
}

impl OracleConfig {
    /// Default per-call timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    /// Read oracle settings from the environment
    ///
    /// Returns None when `ORACLE_HOST` is not set; the server then runs with
    /// parsing and insights endpoints disabled.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("ORACLE_HOST").ok()?;
        let model = std::env::var("ORACLE_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        let vision_model = std::env::var("ORACLE_VISION_MODEL").ok();
        let timeout_secs = std::env::var("ORACLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(Self::DEFAULT_TIMEOUT_SECS);

        Some(Self {
            host,
            model,
            vision_model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path to the SQLite database file
    pub db_path: String,
    /// Oracle settings; None disables oracle-backed endpoints
    pub oracle: Option<OracleConfig>,
}

impl AppConfig {
    /// Build configuration from the environment
    pub fn from_env() -> Self {
        let db_path = std::env::var("PAISA_DB").unwrap_or_else(|_| "paisa.db".to_string());
        Self {
            db_path,
            oracle: OracleConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        let config = OracleConfig {
            host: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            vision_model: None,
            timeout: Duration::from_secs(OracleConfig::DEFAULT_TIMEOUT_SECS),
        };
        assert_eq!(config.timeout.as_secs(), 60);
    }
}
