//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `TEEREX_CATALOGUE_URL` - Catalogue JSON endpoint (default: the public
//!   shopping-cart catalogue)
//! - `TEEREX_NOTICE_SECS` - Seconds a transient notice stays visible (default: 3)
//! - `TEEREX_MIN_ADDRESS_LEN` - Minimum delivery address length (default: 20)
//! - `TEEREX_STORE_PATH` - JSON file to persist session state in. When unset,
//!   state is kept in memory only.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::cart::checkout::DEFAULT_MIN_ADDRESS_LEN;

/// Catalogue endpoint used when `TEEREX_CATALOGUE_URL` is unset.
pub const DEFAULT_CATALOGUE_URL: &str =
    "https://geektrust.s3.ap-southeast-1.amazonaws.com/coding-problems/shopping-cart/catalogue.json";

const DEFAULT_NOTICE_SECS: u64 = 3;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalogue supplier configuration
    pub catalogue: CatalogueConfig,
    /// How long transient notices stay visible
    pub notice_duration: Duration,
    /// Minimum delivery address length, in characters
    pub min_address_len: usize,
    /// File to persist session state in, if any
    pub store_path: Option<PathBuf>,
}

/// Catalogue supplier configuration.
#[derive(Debug, Clone)]
pub struct CatalogueConfig {
    /// Endpoint returning the product array
    pub url: Url,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            catalogue: CatalogueConfig::default(),
            notice_duration: Duration::from_secs(DEFAULT_NOTICE_SECS),
            min_address_len: DEFAULT_MIN_ADDRESS_LEN,
            store_path: None,
        }
    }
}

impl Default for CatalogueConfig {
    // The constant is a literal known to parse
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_CATALOGUE_URL).expect("default catalogue URL is valid"),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = match lookup("TEEREX_CATALOGUE_URL") {
            Some(raw) => parse_url("TEEREX_CATALOGUE_URL", &raw)?,
            None => CatalogueConfig::default().url,
        };

        let notice_secs = parse_or_default(&lookup, "TEEREX_NOTICE_SECS", DEFAULT_NOTICE_SECS)?;
        let min_address_len =
            parse_or_default(&lookup, "TEEREX_MIN_ADDRESS_LEN", DEFAULT_MIN_ADDRESS_LEN)?;
        let store_path = lookup("TEEREX_STORE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            catalogue: CatalogueConfig { url },
            notice_duration: Duration::from_secs(notice_secs),
            min_address_len,
            store_path,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an HTTP(S) URL.
fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse a variable, falling back to `default` when unset.
fn parse_or_default<T>(
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
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.catalogue.url.as_str(), DEFAULT_CATALOGUE_URL);
        assert_eq!(config.notice_duration, Duration::from_secs(3));
        assert_eq!(config.min_address_len, 20);
        assert!(config.store_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("TEEREX_CATALOGUE_URL", "http://localhost:8080/catalogue.json"),
            ("TEEREX_NOTICE_SECS", "5"),
            ("TEEREX_MIN_ADDRESS_LEN", " 10 "),
            ("TEEREX_STORE_PATH", "/tmp/teerex.json"),
        ]))
        .unwrap();

        assert_eq!(config.catalogue.url.port(), Some(8080));
        assert_eq!(config.notice_duration, Duration::from_secs(5));
        assert_eq!(config.min_address_len, 10);
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/teerex.json")));
    }

    #[test]
    fn test_invalid_number() {
        let err = StorefrontConfig::from_lookup(lookup(&[("TEEREX_NOTICE_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "TEEREX_NOTICE_SECS"));
    }

    #[test]
    fn test_invalid_url() {
        assert!(
            StorefrontConfig::from_lookup(lookup(&[("TEEREX_CATALOGUE_URL", "not a url")]))
                .is_err()
        );
        let err = StorefrontConfig::from_lookup(lookup(&[(
            "TEEREX_CATALOGUE_URL",
            "ftp://example.com/catalogue.json",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_blank_store_path_is_unset() {
        let config =
            StorefrontConfig::from_lookup(lookup(&[("TEEREX_STORE_PATH", "  ")])).unwrap();
        assert!(config.store_path.is_none());
    }
}
