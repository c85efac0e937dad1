use std::str::FromStr;

use axum::http::HeaderValue;
use keyward_core::error::CoreError;
use keyward_core::token::TokenConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the token key have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Signing key and token lifetimes.
    pub token: TokenConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    ///
    /// Token settings are read by [`TokenConfig::from_env`].
    pub fn from_env() -> Result<Self, CoreError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000)?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            HeaderValue::from_str(origin).map_err(|e| {
                CoreError::Configuration(format!("Invalid CORS origin '{origin}': {e}"))
            })?;
        }

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30)?;

        let token = TokenConfig::from_env()?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            token,
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, CoreError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CoreError::Configuration(format!("{key} has an invalid value '{raw}'"))),
        Err(_) => Ok(default),
    }
}
