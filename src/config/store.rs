//! Store configuration loading from config.toml
//!
//! This module loads the storefront settings (shipping fee, PromptPay merchant id,
//! cache lifetime, low-stock threshold) and the categories used to seed the catalog
//! on first run. `PROMPTPAY_ID` in the environment overrides the file.

use crate::core::money::Money;
use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Flat shipping fee added to every order, in baht
    #[serde(default = "default_shipping_fee")]
    pub shipping_fee: Decimal,
    /// PromptPay merchant identifier (phone number or tax id)
    #[serde(default)]
    pub promptpay_id: Option<String>,
    /// How long cached reads stay fresh
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,
    /// Stock at or below this level is flagged as low
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
    /// Categories to seed
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

/// Configuration for a single seeded category
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    /// Name of the category
    pub name: String,
    /// Whether products in this category can be listed
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_shipping_fee() -> Decimal {
    Decimal::from(50)
}

const fn default_cache_ttl_hours() -> u64 {
    1
}

const fn default_low_stock_threshold() -> i32 {
    5
}

const fn default_active() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            shipping_fee: default_shipping_fee(),
            promptpay_id: None,
            cache_ttl_hours: default_cache_ttl_hours(),
            low_stock_threshold: default_low_stock_threshold(),
            categories: Vec::new(),
        }
    }
}

impl StoreConfig {
    /// Shipping fee as a money amount.
    pub fn shipping_fee(&self) -> Result<Money> {
        Money::from_decimal(self.shipping_fee)
    }

    /// Freshness window for cached reads.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours * 60 * 60)
    }

    /// Applies environment overrides on top of the file values.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(id) = std::env::var("PROMPTPAY_ID") {
            self.promptpay_id = Some(id);
        }
        self
    }
}

/// Loads store configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StoreConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses store configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<StoreConfig> {
    let config: StoreConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if config.shipping_fee.is_sign_negative() {
        return Err(Error::Config {
            message: "shipping_fee cannot be negative".to_string(),
        });
    }

    Ok(config)
}

/// Loads store configuration from the default location (./config.toml), falling back
/// to defaults when the file does not exist, then applies environment overrides.
pub fn load_default_config() -> Result<StoreConfig> {
    let path = Path::new("config.toml");
    let config = if path.exists() {
        load_config(path)?
    } else {
        tracing::warn!("config.toml not found, using default store settings");
        StoreConfig::default()
    };
    Ok(config.with_env_overrides())
}
