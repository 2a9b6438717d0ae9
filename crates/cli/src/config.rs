//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PASTE_SHOP_DATA_FILE` - Store file (default: paste-shop.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! Sync tunables (`PASTE_SHOP_MAX_CUSTOM_CATEGORIES`,
//! `PASTE_SHOP_NOTICE_TTL_SECS`) are read by [`SyncConfig::from_env`].

use std::path::PathBuf;

use paste_shop_sync::{ConfigError, SyncConfig};

const DEFAULT_DATA_FILE: &str = "paste-shop.json";

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// JSON file holding the document store between runs
    pub data_file: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production", "development")
    pub sentry_environment: Option<String>,
    /// Sync layer tunables
    pub sync: SyncConfig,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let sync = SyncConfig::from_env()?;

        Ok(Self {
            data_file: get_optional_env("PASTE_SHOP_DATA_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_FILE), PathBuf::from),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sync,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
