//! # Stock Configuration
//!
//! Configuration management for the stock loader.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PHARMSTOCK_PRICE_TYPE=pill                                         │
//! │     PHARMSTOCK_LOG=debug                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pharmstock/stock.toml (Linux)                            │
//! │     ~/Library/Application Support/com.pharmstock.pharmstock/stock.toml │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     package pricing, stale results discarded, no fetch timeout         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # stock.toml
//! [catalog]
//! default_price_type = "package"  # package | pill
//!
//! [loader]
//! discard_stale = true
//! fetch_timeout_secs = 0          # 0 = wait as long as the backend takes
//!
//! [logging]
//! filter = "info,pharmstock=debug"
//! ```

use pharmstock_core::PriceType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::{SyncError, SyncResult};

/// Upper bound for `fetch_timeout_secs`.
pub const MAX_FETCH_TIMEOUT_SECS: u64 = 3600;

// =============================================================================
// Catalog Settings
// =============================================================================

/// How raw catalog entries are interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Price type assumed when an entry does not carry `price_type`.
    /// The products endpoint stores package prices, hence the default.
    #[serde(default)]
    pub default_price_type: PriceType,
}

// =============================================================================
// Loader Settings
// =============================================================================

/// Stock loader behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// Drop results of loads that were superseded by a newer selection.
    #[serde(default = "default_true")]
    pub discard_stale: bool,

    /// Limit for the combined catalog + receipts fetch (seconds).
    /// 0 disables the limit.
    #[serde(default)]
    pub fetch_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

impl Default for LoaderSettings {
    fn default() -> Self {
        LoaderSettings {
            discard_stale: true,
            fetch_timeout_secs: 0,
        }
    }
}

impl LoaderSettings {
    /// Returns the fetch limit, if any.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_secs > 0).then(|| Duration::from_secs(self.fetch_timeout_secs))
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

/// Tracing subscriber settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,pharmstock=debug".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete stock configuration.
///
/// ## Example Config File
/// ```toml
/// [catalog]
/// default_price_type = "pill"
///
/// [loader]
/// discard_stale = true
/// fetch_timeout_secs = 30
///
/// [logging]
/// filter = "warn"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Catalog interpretation.
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Loader behavior.
    #[serde(default)]
    pub loader: LoaderSettings,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl SyncConfig {
    /// Creates a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (stock.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading stock config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load stock config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Stock config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.loader.fetch_timeout_secs > MAX_FETCH_TIMEOUT_SECS {
            return Err(SyncError::InvalidConfig(format!(
                "fetch_timeout_secs must be at most {}, got {}",
                MAX_FETCH_TIMEOUT_SECS, self.loader.fetch_timeout_secs
            )));
        }

        EnvFilter::try_new(&self.logging.filter).map_err(|e| {
            SyncError::InvalidConfig(format!(
                "Invalid log filter '{}': {}",
                self.logging.filter, e
            ))
        })?;

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(price_type) = std::env::var("PHARMSTOCK_PRICE_TYPE") {
            match price_type.parse::<PriceType>() {
                Ok(parsed) => {
                    debug!(price_type = %parsed, "Overriding default price type from environment");
                    self.catalog.default_price_type = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring PHARMSTOCK_PRICE_TYPE"),
            }
        }

        if let Ok(discard) = std::env::var("PHARMSTOCK_DISCARD_STALE") {
            match discard.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.loader.discard_stale = true,
                "0" | "false" | "no" => self.loader.discard_stale = false,
                _ => warn!(value = %discard, "Unknown PHARMSTOCK_DISCARD_STALE value"),
            }
        }

        if let Ok(timeout) = std::env::var("PHARMSTOCK_FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                debug!(secs, "Overriding fetch timeout from environment");
                self.loader.fetch_timeout_secs = secs;
            }
        }

        if let Ok(filter) = std::env::var("PHARMSTOCK_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "pharmstock", "pharmstock")
            .map(|dirs| dirs.config_dir().join("stock.toml"))
    }

    /// Returns the default price type.
    pub fn default_price_type(&self) -> PriceType {
        self.catalog.default_price_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.default_price_type(), PriceType::Package);
        assert!(config.loader.discard_stale);
        assert_eq!(config.loader.fetch_timeout(), None);
        assert_eq!(config.logging.filter, "info,pharmstock=debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SyncConfig::default();

        config.loader.fetch_timeout_secs = MAX_FETCH_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());

        config.loader.fetch_timeout_secs = 30;
        assert!(config.validate().is_ok());
        assert_eq!(config.loader.fetch_timeout(), Some(Duration::from_secs(30)));

        config.logging.filter = "pharmstock=loud".to_string();
        assert!(config.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SyncConfig = toml::from_str(
            r#"
            [catalog]
            default_price_type = "pill"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_price_type(), PriceType::Pill);
        assert!(config.loader.discard_stale);
        assert_eq!(config.logging.filter, "info,pharmstock=debug");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stock.toml");

        let mut config = SyncConfig::default();
        config.loader.discard_stale = false;
        config.loader.fetch_timeout_secs = 15;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[loader]"));

        let loaded: SyncConfig = toml::from_str(&contents).unwrap();
        assert!(!loaded.loader.discard_stale);
        assert_eq!(loaded.loader.fetch_timeout_secs, 15);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.toml");
        std::fs::write(&path, "[loader\ndiscard_stale = ").unwrap();

        let err = SyncConfig::load(Some(path.clone())).unwrap_err();
        assert!(matches!(err, SyncError::ConfigLoadFailed(_)));

        let fallback = SyncConfig::load_or_default(Some(path));
        assert!(fallback.loader.discard_stale);
    }
}
