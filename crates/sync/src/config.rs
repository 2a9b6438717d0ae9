//! Sync layer configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PASTE_SHOP_MAX_CUSTOM_CATEGORIES` - Custom category limit per user (default: 15)
//! - `PASTE_SHOP_NOTICE_TTL_SECS` - Seconds before a transient error notice clears (default: 3)

use std::time::Duration;

use paste_shop_core::MAX_CUSTOM_CATEGORIES;
use thiserror::Error;

const DEFAULT_NOTICE_TTL_SECS: u64 = 3;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Tunables for the sync layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Maximum number of non-standard categories per palette
    pub max_custom_categories: usize,
    /// How long a transient error notice stays visible
    pub notice_ttl: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_custom_categories: MAX_CUSTOM_CATEGORIES,
            notice_ttl: Duration::from_secs(DEFAULT_NOTICE_TTL_SECS),
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_custom_categories = parse_or(
            &lookup,
            "PASTE_SHOP_MAX_CUSTOM_CATEGORIES",
            defaults.max_custom_categories,
        )?;
        let notice_ttl = Duration::from_secs(parse_or(
            &lookup,
            "PASTE_SHOP_NOTICE_TTL_SECS",
            DEFAULT_NOTICE_TTL_SECS,
        )?);

        Ok(Self {
            max_custom_categories,
            notice_ttl,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = SyncConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.max_custom_categories, 15);
        assert_eq!(config.notice_ttl, Duration::from_secs(3));
    }

    #[test]
    fn test_overrides() {
        let config = SyncConfig::from_lookup(lookup(&[
            ("PASTE_SHOP_MAX_CUSTOM_CATEGORIES", "4"),
            ("PASTE_SHOP_NOTICE_TTL_SECS", " 10 "),
        ]))
        .unwrap();
        assert_eq!(config.max_custom_categories, 4);
        assert_eq!(config.notice_ttl, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_number() {
        let result =
            SyncConfig::from_lookup(lookup(&[("PASTE_SHOP_MAX_CUSTOM_CATEGORIES", "lots")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar(ref key, _)) if key == "PASTE_SHOP_MAX_CUSTOM_CATEGORIES"
        ));
    }
}
