//! Point-in-time view of the global configuration.

use chrono::{DateTime, Utc};
use dexctl_core::{address, Address, FixedPointRate};
use dexctl_fees::{DefaultFees, FeeTier, UserFeeRates};
use dexctl_registry::MarketEntry;
use serde::{Deserialize, Serialize};

use crate::error::ControlResult;
use crate::global::ConfigState;

/// Serializable copy of the configuration, tiers and markets sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(with = "address::hex_str")]
    pub admin: Address,
    pub initialized_at: DateTime<Utc>,
    pub defaults: DefaultFees,
    pub protocol_tiers: Vec<FeeTier<FixedPointRate>>,
    pub lp_tiers: Vec<FeeTier<FixedPointRate>>,
    pub user_tiers: Vec<FeeTier<UserFeeRates>>,
    pub markets: Vec<MarketEntry>,
}

impl ConfigSnapshot {
    pub(crate) fn capture(admin: Address, state: &ConfigState) -> Self {
        let fees = state.fees();
        Self {
            admin,
            initialized_at: state.initialized_at(),
            defaults: *fees.defaults(),
            protocol_tiers: fees.protocol_tier_list(),
            lp_tiers: fees.lp_tier_list(),
            user_tiers: fees.user_tier_list(),
            markets: state.markets().entries(),
        }
    }

    pub fn to_json_pretty(&self) -> ControlResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
