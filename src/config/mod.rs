use std::env;
use std::path::PathBuf;

use crate::services::field_inventory::CookieMode;

/// Error raised when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {var}: {value}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub catalog_path: Option<PathBuf>,
    pub catalog_latency_ms: u64,
    pub cookie_mode: CookieMode,
    pub sensitive_keywords: Option<Vec<String>>,
    pub max_sessions: usize,
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            frontend_url: "http://localhost:5173".to_string(),
            catalog_path: None,
            catalog_latency_ms: 0,
            cookie_mode: CookieMode::Placeholder,
            sensitive_keywords: None,
            max_sessions: 100,
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cookie_mode = match lookup("COOKIE_MODE") {
            Some(raw) => raw.parse().map_err(|_| ConfigError {
                var: "COOKIE_MODE",
                value: raw,
            })?,
            None => defaults.cookie_mode,
        };

        let sensitive_keywords = lookup("SENSITIVE_KEYWORDS").map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });

        Ok(Self {
            host: lookup("BACKEND_HOST").unwrap_or(defaults.host),
            port: lookup("BACKEND_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            frontend_url: lookup("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            catalog_path: lookup("CATALOG_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            catalog_latency_ms: lookup("CATALOG_LATENCY_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.catalog_latency_ms),
            cookie_mode,
            sensitive_keywords,
            max_sessions: lookup("MAX_SESSIONS")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_sessions),
            max_body_bytes: lookup("MAX_BODY_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
        })
    }
}
