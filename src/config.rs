// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default backend location for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
/// Production backend.
pub const PRODUCTION_API_URL: &str = "https://driverxp-backend-production.up.railway.app/api";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST API, without a trailing slash
    pub api_url: String,
    /// Prefix for the durable storage slots (`<namespace>_token`, `<namespace>_user`)
    pub app_namespace: String,
    /// Directory backing the file store
    pub storage_dir: PathBuf,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            app_namespace: "driverxp".to_string(),
            storage_dir: PathBuf::from(".driverxp"),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        let api_url = match env::var("DRIVERXP_API_URL") {
            Ok(url) => url,
            Err(_) if env::var("DRIVERXP_ENV").as_deref() == Ok("production") => {
                PRODUCTION_API_URL.to_string()
            }
            Err(_) => defaults.api_url,
        };
        let api_url = normalize_api_url(&api_url)?;

        let app_namespace =
            env::var("DRIVERXP_APP_NAMESPACE").unwrap_or(defaults.app_namespace);
        if app_namespace.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "DRIVERXP_APP_NAMESPACE",
                "must not be empty".to_string(),
            ));
        }

        let storage_dir = env::var("DRIVERXP_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_dir);

        let request_timeout = match env::var("DRIVERXP_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    ConfigError::Invalid("DRIVERXP_REQUEST_TIMEOUT_SECS", raw.clone())
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => defaults.request_timeout,
        };

        Ok(Self {
            api_url,
            app_namespace,
            storage_dir,
            request_timeout,
        })
    }

    /// Storage slot holding the bearer token.
    pub fn token_key(&self) -> String {
        format!("{}_token", self.app_namespace)
    }

    /// Storage slot holding the serialized identity record.
    pub fn user_key(&self) -> String {
        format!("{}_user", self.app_namespace)
    }
}

/// Validate the scheme and strip any trailing slash.
fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Invalid("DRIVERXP_API_URL", raw.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    Invalid(&'static str, String),
}
