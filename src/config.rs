//! Store configuration for the direct-debit payment method.
//!
//! Settings are loaded once from a TOML file and handed to the components as
//! explicit values. A `[default]` table applies to every store. A table under
//! `[stores."<id>"]` overrides only the fields it sets; the rest come from
//! `[default]`.

use crate::error::{DebitError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Environment variable that overrides `encryption_key` from the file.
pub const ENCRYPTION_KEY_ENV: &str = "SEPA_DEBIT_ENCRYPTION_KEY";

/// Longest prefix that still leaves room for an 11 digit customer id and the digest
/// inside the 35 character SEPA mandate reference.
pub const MAX_REFERENCE_PREFIX_LEN: usize = 8;

/// Per-store settings of the payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebitConfig {
    /// Whether the method is enabled at all.
    pub active: bool,
    /// Title shown in the payment method list.
    pub title: String,
    /// Free text displayed with the payment form.
    pub custom_text: Option<String>,
    /// Mirror captured account data onto the customer profile.
    pub save_account_data: bool,
    /// Require mandate acceptance at checkout and record a mandate per order.
    pub generate_mandate: bool,
    /// Leading characters of every mandate reference.
    pub mandate_reference_prefix: String,
    /// Offer the method to every customer group.
    pub allow_all_groups: bool,
    /// Groups allowed when `allow_all_groups` is off.
    pub allowed_customer_groups: Vec<u32>,
    /// Completed orders a registered customer needs before debit is offered.
    pub minimum_orders: u32,
}

impl Default for DebitConfig {
    fn default() -> Self {
        Self {
            active: false,
            title: "Direct Debit".to_string(),
            custom_text: None,
            save_account_data: false,
            generate_mandate: false,
            mandate_reference_prefix: "SEPA".to_string(),
            allow_all_groups: true,
            allowed_customer_groups: Vec::new(),
            minimum_orders: 0,
        }
    }
}

impl DebitConfig {
    /// Checks the settings for combinations that cannot be evaluated.
    pub fn validate(&self) -> Result<()> {
        if !self.allow_all_groups && self.allowed_customer_groups.is_empty() {
            return Err(DebitError::ConfigError(
                "allowed_customer_groups is empty while allow_all_groups is off".to_string(),
            ));
        }
        let prefix = &self.mandate_reference_prefix;
        if prefix.len() > MAX_REFERENCE_PREFIX_LEN
            || !prefix.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(DebitError::ConfigError(format!(
                "mandate_reference_prefix must be at most {} alphanumeric characters",
                MAX_REFERENCE_PREFIX_LEN
            )));
        }
        Ok(())
    }
}

/// Fields a `[stores."<id>"]` table may set.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoreOverride {
    active: Option<bool>,
    title: Option<String>,
    custom_text: Option<String>,
    save_account_data: Option<bool>,
    generate_mandate: Option<bool>,
    mandate_reference_prefix: Option<String>,
    allow_all_groups: Option<bool>,
    allowed_customer_groups: Option<Vec<u32>>,
    minimum_orders: Option<u32>,
}

impl StoreOverride {
    fn apply(self, default: &DebitConfig) -> DebitConfig {
        let mut config = default.clone();
        if let Some(active) = self.active {
            config.active = active;
        }
        if let Some(title) = self.title {
            config.title = title;
        }
        if self.custom_text.is_some() {
            config.custom_text = self.custom_text;
        }
        if let Some(save) = self.save_account_data {
            config.save_account_data = save;
        }
        if let Some(generate) = self.generate_mandate {
            config.generate_mandate = generate;
        }
        if let Some(prefix) = self.mandate_reference_prefix {
            config.mandate_reference_prefix = prefix;
        }
        if let Some(all) = self.allow_all_groups {
            config.allow_all_groups = all;
        }
        if let Some(groups) = self.allowed_customer_groups {
            config.allowed_customer_groups = groups;
        }
        if let Some(minimum) = self.minimum_orders {
            config.minimum_orders = minimum;
        }
        config
    }
}

/// Settings file layout before store overrides are resolved.
#[derive(Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    encryption_key: Option<String>,
    default: DebitConfig,
    stores: HashMap<String, StoreOverride>,
}

/// Application settings: the encryption key plus store configurations.
///
/// Not `Debug`, so the key cannot end up in log output.
#[derive(Clone, Default)]
pub struct Settings {
    /// Hex-encoded 32 byte AES key.
    encryption_key: Option<String>,
    pub default: DebitConfig,
    /// Store configurations with `[default]` already merged in.
    pub stores: HashMap<String, DebitConfig>,
}

impl Settings {
    /// Loads settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let raw: RawSettings = toml::from_str(raw)?;
        let stores = raw
            .stores
            .into_iter()
            .map(|(store_id, store)| (store_id, store.apply(&raw.default)))
            .collect();
        Ok(Self {
            encryption_key: raw.encryption_key,
            default: raw.default,
            stores,
        })
    }

    /// Settings with a single default store configuration and no key.
    pub fn with_default(default: DebitConfig) -> Self {
        Self {
            default,
            ..Self::default()
        }
    }

    /// Returns the configuration that applies to `store_id`.
    pub fn for_store(&self, store_id: u32) -> &DebitConfig {
        self.stores
            .get(&store_id.to_string())
            .unwrap_or(&self.default)
    }

    /// Resolves the 32 byte encryption key, preferring the environment.
    pub fn encryption_key(&self) -> Result<[u8; 32]> {
        let encoded = std::env::var(ENCRYPTION_KEY_ENV)
            .ok()
            .or_else(|| self.encryption_key.clone())
            .ok_or_else(|| {
                DebitError::ConfigError(format!(
                    "no encryption key configured (set encryption_key or {})",
                    ENCRYPTION_KEY_ENV
                ))
            })?;
        decode_key(&encoded)
    }
}

fn decode_key(encoded: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(encoded.trim())
        .map_err(|e| DebitError::ConfigError(format!("encryption key is not hex: {}", e)))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        DebitError::ConfigError(format!(
            "encryption key must be 32 bytes, got {}",
            bytes.len()
        ))
    })
}
