//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `KADE_API_URL` - Base URL of the remote product/user service
//!
//! ## Optional
//! - `KADE_CACHE_TTL_SECS` - Product cache time-to-live in seconds (default: 300)

use thiserror::Error;
use url::Url;

/// Default product cache time-to-live.
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the remote product/user service.
    pub api_url: Url,
    /// Product cache time-to-live in seconds.
    pub cache_ttl_secs: u64,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if present (ignored when absent).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if a required variable is unset,
    /// or `ConfigError::InvalidEnvVar` if a value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_url = required_env("KADE_API_URL")?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("KADE_API_URL".into(), e.to_string()))?;

        let cache_ttl_secs = match std::env::var("KADE_CACHE_TTL_SECS") {
            Ok(raw) => raw.parse().map_err(|e| {
                ConfigError::InvalidEnvVar("KADE_CACHE_TTL_SECS".into(), format!("{e}"))
            })?,
            Err(_) => DEFAULT_CACHE_TTL_SECS,
        };

        Ok(Self {
            api_url,
            cache_ttl_secs,
        })
    }

    /// Build a configuration directly from a base URL.
    ///
    /// Used by tests and embedders that already know the endpoint.
    #[must_use]
    pub const fn new(api_url: Url) -> Self {
        Self {
            api_url,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

/// Read a required environment variable.
fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_ttl() {
        let url = Url::parse("http://localhost:3500").expect("valid url");
        let config = StorefrontConfig::new(url);
        assert_eq!(config.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
    }
}
