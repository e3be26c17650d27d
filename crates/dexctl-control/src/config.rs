//! Deployment configuration.
//!
//! Describes the administrator, default fees, and the tiers and markets to
//! seed at startup. All rates are raw integers with an implicit 4-decimal
//! scale (`30` = `0.0030` = 0.30%).

use crate::error::{ControlError, ControlResult};
use crate::global::GlobalConfig;
use dexctl_core::{address, Address, AssetType, Holdings};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Environment variable holding the config file path.
pub const CONFIG_ENV_VAR: &str = "DEXCTL_CONFIG";

/// Config file used when `DEXCTL_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default rates applied when no tier matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultFeeConfig {
    /// Default: 30 (0.30%).
    #[serde(default = "default_taker")]
    pub taker: u64,
    /// Default: 10 (0.10%).
    #[serde(default = "default_maker")]
    pub maker: u64,
    /// Default: 5 (0.05%).
    #[serde(default = "default_protocol")]
    pub protocol: u64,
    /// Default: 25 (0.25%).
    #[serde(default = "default_lp")]
    pub lp: u64,
}

fn default_taker() -> u64 {
    30
}

fn default_maker() -> u64 {
    10
}

fn default_protocol() -> u64 {
    5
}

fn default_lp() -> u64 {
    25
}

impl Default for DefaultFeeConfig {
    fn default() -> Self {
        Self {
            taker: default_taker(),
            maker: default_maker(),
            protocol: default_protocol(),
            lp: default_lp(),
        }
    }
}

/// Protocol or LP tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTierConfig {
    pub min_holdings: Holdings,
    pub rate: u64,
}

/// User tier with separate taker and maker rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTierConfig {
    pub min_holdings: Holdings,
    pub taker: u64,
    pub maker: u64,
}

/// Market to register at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub base: AssetType,
    pub quote: AssetType,
    #[serde(with = "address::hex_str")]
    pub address: Address,
}

/// Deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Administrator identity.
    #[serde(with = "address::hex_str")]
    pub admin: Address,
    #[serde(default)]
    pub defaults: DefaultFeeConfig,
    #[serde(default)]
    pub protocol_tiers: Vec<RateTierConfig>,
    #[serde(default)]
    pub lp_tiers: Vec<RateTierConfig>,
    #[serde(default)]
    pub user_tiers: Vec<UserTierConfig>,
    #[serde(default)]
    pub markets: Vec<MarketConfig>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            admin: Address::ZERO,
            defaults: DefaultFeeConfig::default(),
            protocol_tiers: Vec::new(),
            lp_tiers: Vec::new(),
            user_tiers: Vec::new(),
            markets: Vec::new(),
        }
    }
}

impl DeploymentConfig {
    /// Load from `DEXCTL_CONFIG` or the default path.
    ///
    /// Falls back to defaults when the file does not exist.
    pub fn load() -> ControlResult<Self> {
        let config_path =
            std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> ControlResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ControlError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ControlResult<Self> {
        toml::from_str(content)
            .map_err(|e| ControlError::Config(format!("Failed to parse config: {e}")))
    }

    /// Reject configs that cannot describe a real deployment.
    ///
    /// A threshold listed twice in one table would silently overwrite the
    /// first entry, so it is treated as an error here.
    pub fn validate(&self) -> ControlResult<()> {
        if self.admin == Address::ZERO {
            return Err(ControlError::Config("admin address is not set".to_string()));
        }

        check_unique("protocol_tiers", self.protocol_tiers.iter().map(|t| t.min_holdings))?;
        check_unique("lp_tiers", self.lp_tiers.iter().map(|t| t.min_holdings))?;
        check_unique("user_tiers", self.user_tiers.iter().map(|t| t.min_holdings))?;
        Ok(())
    }
}

fn check_unique(table: &str, thresholds: impl Iterator<Item = Holdings>) -> ControlResult<()> {
    let mut seen = HashSet::new();
    for min_holdings in thresholds {
        if !seen.insert(min_holdings) {
            return Err(ControlError::Config(format!(
                "{table}: duplicate min_holdings {min_holdings}"
            )));
        }
    }
    Ok(())
}

impl GlobalConfig {
    /// Create, initialize and seed a configuration from `config`.
    ///
    /// Every tier and market goes through the public operations as the
    /// admin, so the same checks apply as at runtime.
    pub fn bootstrap(config: &DeploymentConfig) -> ControlResult<Self> {
        config.validate()?;

        let admin = config.admin;
        let global = Self::new(admin);
        let d = &config.defaults;
        global.init(admin, d.taker, d.maker, d.protocol, d.lp)?;

        for tier in &config.protocol_tiers {
            global.set_protocol_fee_tier(admin, tier.min_holdings, tier.rate)?;
        }
        for tier in &config.lp_tiers {
            global.set_lp_fee_tier(admin, tier.min_holdings, tier.rate)?;
        }
        for tier in &config.user_tiers {
            global.set_user_fee_tier(admin, tier.min_holdings, tier.taker, tier.maker)?;
        }
        for market in &config.markets {
            global.register_market(&market.base, &market.quote, market.address)?;
        }

        info!(
            %admin,
            protocol_tiers = config.protocol_tiers.len(),
            lp_tiers = config.lp_tiers.len(),
            user_tiers = config.user_tiers.len(),
            markets = config.markets.len(),
            "Global configuration bootstrapped"
        );
        Ok(global)
    }
}
