//! Application configuration
//!
//! Read from a TOML file, by default `<config dir>/usage-billing/config.toml`:
//!
//! ```toml
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [pricing]
//! path = "/etc/usage-billing/pricing.toml"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::PricingConfig;
use crate::support::AppError;

/// Environment variable overriding the configuration file path.
pub const CONFIG_ENV: &str = "BILLING_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub pricing: PricingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Pricing table file; the built-in table is used when unset
    pub path: Option<PathBuf>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(raw)?)
    }

    /// Pricing table selected by this configuration.
    pub fn pricing_config(&self) -> Result<PricingConfig, AppError> {
        match &self.pricing.path {
            Some(path) => {
                let pricing = PricingConfig::load(path)?;
                info!(
                    path = %path.display(),
                    currencies = pricing.currencies.len(),
                    tiers = pricing.hit_tiers.len(),
                    "Pricing table loaded"
                );
                Ok(pricing)
            }
            None => Ok(PricingConfig::default()),
        }
    }
}

/// `<config dir>/usage-billing/config.toml`, or `./config.toml` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("usage-billing"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

// ── Tests ──────────────────────────────────────────────────────
