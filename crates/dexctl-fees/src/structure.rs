//! Fee structure: default rates plus three holdings-tiered tables.
//!
//! Resolution is a floor lookup: the tier with the largest
//! `min_holdings <= holdings` wins, otherwise the kind's default applies.
//! It depends on nothing but `(holdings, table, default)`.

use crate::error::{FeeError, FeeResult};
use crate::tier::{FeeTier, FeeTierTable, TierKind, UserFeeRates};
use dexctl_core::{FixedPointRate, Holdings};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Fee a caller can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeKind {
    Taker,
    Maker,
    Protocol,
    Lp,
}

impl FeeKind {
    pub const ALL: [FeeKind; 4] = [Self::Taker, Self::Maker, Self::Protocol, Self::Lp];

    /// Table consulted when resolving this fee.
    pub fn tier_kind(&self) -> TierKind {
        match self {
            Self::Taker | Self::Maker => TierKind::User,
            Self::Protocol => TierKind::Protocol,
            Self::Lp => TierKind::Lp,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Taker => "taker",
            Self::Maker => "maker",
            Self::Protocol => "protocol",
            Self::Lp => "lp",
        }
    }
}

impl fmt::Display for FeeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a resolved rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "source")]
pub enum FeeSource {
    /// Matched the tier at this threshold.
    Tier { min_holdings: Holdings },
    /// No tier at or below the holdings.
    Default,
}

impl FeeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tier { .. } => "tier",
            Self::Default => "default",
        }
    }
}

/// A resolved rate with its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeResolution {
    pub rate: FixedPointRate,
    pub source: FeeSource,
}

/// All four fees for one holdings amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFees {
    pub holdings: Holdings,
    pub taker: FixedPointRate,
    pub maker: FixedPointRate,
    pub protocol: FixedPointRate,
    pub lp: FixedPointRate,
}

/// Default rates used when no tier applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultFees {
    pub taker: FixedPointRate,
    pub maker: FixedPointRate,
    pub protocol: FixedPointRate,
    pub lp: FixedPointRate,
}

impl DefaultFees {
    /// Build from raw integers at the 4-decimal scale.
    pub fn from_raw(taker: u64, maker: u64, protocol: u64, lp: u64) -> Self {
        Self {
            taker: FixedPointRate::from_scaled(taker),
            maker: FixedPointRate::from_scaled(maker),
            protocol: FixedPointRate::from_scaled(protocol),
            lp: FixedPointRate::from_scaled(lp),
        }
    }
}

/// Default fees and the protocol, LP and user tier tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeStructure {
    defaults: DefaultFees,
    protocol_tiers: FeeTierTable<FixedPointRate>,
    lp_tiers: FeeTierTable<FixedPointRate>,
    user_tiers: FeeTierTable<UserFeeRates>,
}

impl FeeStructure {
    /// Empty tier tables and zero defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: DefaultFees) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    // ---- defaults (raw integers, implicit 4-decimal scale) ----

    pub fn set_default_taker_fee(&mut self, raw: u64) {
        self.defaults.taker = FixedPointRate::from_scaled(raw);
    }

    pub fn set_default_maker_fee(&mut self, raw: u64) {
        self.defaults.maker = FixedPointRate::from_scaled(raw);
    }

    pub fn set_default_protocol_fee(&mut self, raw: u64) {
        self.defaults.protocol = FixedPointRate::from_scaled(raw);
    }

    pub fn set_default_lp_fee(&mut self, raw: u64) {
        self.defaults.lp = FixedPointRate::from_scaled(raw);
    }

    pub fn defaults(&self) -> &DefaultFees {
        &self.defaults
    }

    pub fn default_rate(&self, kind: FeeKind) -> FixedPointRate {
        match kind {
            FeeKind::Taker => self.defaults.taker,
            FeeKind::Maker => self.defaults.maker,
            FeeKind::Protocol => self.defaults.protocol,
            FeeKind::Lp => self.defaults.lp,
        }
    }

    // ---- tier mutation ----

    pub fn set_protocol_fee_tier(&mut self, min_holdings: Holdings, rate: FixedPointRate) {
        let previous = self.protocol_tiers.upsert(min_holdings, rate);
        info!(kind = "protocol", min_holdings, %rate, replaced = previous.is_some(), "Fee tier set");
    }

    pub fn set_lp_fee_tier(&mut self, min_holdings: Holdings, rate: FixedPointRate) {
        let previous = self.lp_tiers.upsert(min_holdings, rate);
        info!(kind = "lp", min_holdings, %rate, replaced = previous.is_some(), "Fee tier set");
    }

    pub fn set_user_fee_tier(
        &mut self,
        min_holdings: Holdings,
        taker: FixedPointRate,
        maker: FixedPointRate,
    ) {
        let previous = self
            .user_tiers
            .upsert(min_holdings, UserFeeRates::new(taker, maker));
        info!(
            kind = "user",
            min_holdings,
            %taker,
            %maker,
            replaced = previous.is_some(),
            "Fee tier set"
        );
    }

    pub fn remove_protocol_fee_tier(&mut self, min_holdings: Holdings) -> FeeResult<()> {
        self.protocol_tiers
            .remove(min_holdings)
            .map(|_| ())
            .ok_or(FeeError::TierNotFound {
                kind: TierKind::Protocol,
                min_holdings,
            })?;
        info!(kind = "protocol", min_holdings, "Fee tier removed");
        Ok(())
    }

    pub fn remove_lp_fee_tier(&mut self, min_holdings: Holdings) -> FeeResult<()> {
        self.lp_tiers
            .remove(min_holdings)
            .map(|_| ())
            .ok_or(FeeError::TierNotFound {
                kind: TierKind::Lp,
                min_holdings,
            })?;
        info!(kind = "lp", min_holdings, "Fee tier removed");
        Ok(())
    }

    pub fn remove_user_fee_tier(&mut self, min_holdings: Holdings) -> FeeResult<()> {
        self.user_tiers
            .remove(min_holdings)
            .map(|_| ())
            .ok_or(FeeError::TierNotFound {
                kind: TierKind::User,
                min_holdings,
            })?;
        info!(kind = "user", min_holdings, "Fee tier removed");
        Ok(())
    }

    // ---- resolution ----

    /// Resolve one fee for `holdings`, reporting which tier matched.
    pub fn resolve_with_source(&self, kind: FeeKind, holdings: Holdings) -> FeeResolution {
        let matched = match kind {
            FeeKind::Protocol => self.protocol_tiers.floor(holdings).map(|(m, r)| (m, *r)),
            FeeKind::Lp => self.lp_tiers.floor(holdings).map(|(m, r)| (m, *r)),
            FeeKind::Taker => self.user_tiers.floor(holdings).map(|(m, r)| (m, r.taker)),
            FeeKind::Maker => self.user_tiers.floor(holdings).map(|(m, r)| (m, r.maker)),
        };

        let resolution = match matched {
            Some((min_holdings, rate)) => FeeResolution {
                rate,
                source: FeeSource::Tier { min_holdings },
            },
            None => FeeResolution {
                rate: self.default_rate(kind),
                source: FeeSource::Default,
            },
        };

        debug!(
            %kind,
            holdings,
            rate = %resolution.rate,
            source = resolution.source.as_str(),
            "Fee resolved"
        );
        resolution
    }

    /// Resolve one fee for `holdings`.
    pub fn resolve(&self, kind: FeeKind, holdings: Holdings) -> FixedPointRate {
        self.resolve_with_source(kind, holdings).rate
    }

    /// Taker and maker rates from the same user tier.
    pub fn resolve_user_fees(&self, holdings: Holdings) -> UserFeeRates {
        self.user_tiers
            .floor(holdings)
            .map(|(_, rates)| *rates)
            .unwrap_or(UserFeeRates::new(self.defaults.taker, self.defaults.maker))
    }

    /// All four fees for `holdings`.
    pub fn resolve_all(&self, holdings: Holdings) -> ResolvedFees {
        let user = self.resolve_user_fees(holdings);
        ResolvedFees {
            holdings,
            taker: user.taker,
            maker: user.maker,
            protocol: self.resolve(FeeKind::Protocol, holdings),
            lp: self.resolve(FeeKind::Lp, holdings),
        }
    }

    // ---- inspection ----

    pub fn protocol_tiers(&self) -> &FeeTierTable<FixedPointRate> {
        &self.protocol_tiers
    }

    pub fn lp_tiers(&self) -> &FeeTierTable<FixedPointRate> {
        &self.lp_tiers
    }

    pub fn user_tiers(&self) -> &FeeTierTable<UserFeeRates> {
        &self.user_tiers
    }

    pub fn tier_count(&self, kind: TierKind) -> usize {
        match kind {
            TierKind::Protocol => self.protocol_tiers.len(),
            TierKind::Lp => self.lp_tiers.len(),
            TierKind::User => self.user_tiers.len(),
        }
    }

    pub fn protocol_tier_list(&self) -> Vec<FeeTier<FixedPointRate>> {
        self.protocol_tiers.to_vec()
    }

    pub fn lp_tier_list(&self) -> Vec<FeeTier<FixedPointRate>> {
        self.lp_tiers.to_vec()
    }

    pub fn user_tier_list(&self) -> Vec<FeeTier<UserFeeRates>> {
        self.user_tiers.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate(raw: u64) -> FixedPointRate {
        FixedPointRate::from_scaled(raw)
    }

    fn sample() -> FeeStructure {
        let mut fees = FeeStructure::new();
        fees.set_default_protocol_fee(100); // 0.0100
        fees.set_protocol_fee_tier(500, rate(30));
        fees.set_protocol_fee_tier(100, rate(50));
        fees
    }

    #[test]
    fn test_new_is_empty() {
        let fees = FeeStructure::new();
        for kind in [TierKind::Protocol, TierKind::Lp, TierKind::User] {
            assert_eq!(fees.tier_count(kind), 0);
        }
        assert_eq!(fees.defaults(), &DefaultFees::default());
    }

    #[test]
    fn test_default_setters() {
        let mut fees = FeeStructure::new();
        fees.set_default_taker_fee(40);
        fees.set_default_maker_fee(20);
        fees.set_default_protocol_fee(100);
        fees.set_default_lp_fee(25);

        assert_eq!(fees.defaults(), &DefaultFees::from_raw(40, 20, 100, 25));
        for (kind, raw) in FeeKind::ALL.into_iter().zip([40, 20, 100, 25]) {
            assert_eq!(fees.default_rate(kind), rate(raw), "{kind}");
            // No tiers, so resolution lands on the default
            assert_eq!(fees.resolve(kind, u64::MAX), rate(raw), "{kind}");
        }
    }

    #[test]
    fn test_floor_resolution() {
        let fees = sample();

        assert_eq!(fees.resolve(FeeKind::Protocol, 0).as_decimal(), dec!(0.0100));
        assert_eq!(fees.resolve(FeeKind::Protocol, 100).as_decimal(), dec!(0.0050));
        assert_eq!(fees.resolve(FeeKind::Protocol, 499).as_decimal(), dec!(0.0050));
        assert_eq!(fees.resolve(FeeKind::Protocol, 500).as_decimal(), dec!(0.0030));
        assert_eq!(fees.resolve(FeeKind::Protocol, 10_000).as_decimal(), dec!(0.0030));
    }

    #[test]
    fn test_resolution_reports_source() {
        let fees = sample();

        assert_eq!(
            fees.resolve_with_source(FeeKind::Protocol, 99).source,
            FeeSource::Default
        );
        assert_eq!(
            fees.resolve_with_source(FeeKind::Protocol, 750).source,
            FeeSource::Tier { min_holdings: 500 }
        );
    }

    #[test]
    fn test_tables_are_independent() {
        let fees = sample();

        // Protocol tiers do not leak into LP or user resolution
        assert_eq!(fees.resolve(FeeKind::Lp, 10_000), FixedPointRate::ZERO);
        assert_eq!(fees.resolve(FeeKind::Taker, 10_000), FixedPointRate::ZERO);
    }

    #[test]
    fn test_upsert_keeps_latest_rate() {
        let mut fees = FeeStructure::new();
        fees.set_lp_fee_tier(1_000, rate(25));
        fees.set_lp_fee_tier(1_000, rate(15));

        assert_eq!(fees.tier_count(TierKind::Lp), 1);
        assert_eq!(fees.resolve(FeeKind::Lp, 1_000), rate(15));
    }

    #[test]
    fn test_remove_missing_tier() {
        let mut fees = sample();
        assert_eq!(
            fees.remove_protocol_fee_tier(250),
            Err(FeeError::TierNotFound {
                kind: TierKind::Protocol,
                min_holdings: 250
            })
        );
        assert!(fees.remove_lp_fee_tier(0).is_err());
        assert!(fees.remove_user_fee_tier(0).is_err());
        // Failed removal leaves the table untouched
        assert_eq!(fees.tier_count(TierKind::Protocol), 2);
    }

    #[test]
    fn test_remove_falls_through() {
        let mut fees = sample();

        fees.remove_protocol_fee_tier(500).unwrap();
        assert_eq!(fees.resolve(FeeKind::Protocol, 10_000), rate(50));

        fees.remove_protocol_fee_tier(100).unwrap();
        assert_eq!(fees.resolve(FeeKind::Protocol, 10_000), rate(100));
    }

    #[test]
    fn test_user_tiers_resolve_taker_and_maker_together() {
        let mut fees = FeeStructure::with_defaults(DefaultFees::from_raw(40, 20, 0, 0));
        fees.set_user_fee_tier(1_000, rate(30), rate(10));
        fees.set_user_fee_tier(50_000, rate(20), rate(0));

        assert_eq!(
            fees.resolve_user_fees(999),
            UserFeeRates::new(rate(40), rate(20))
        );
        assert_eq!(
            fees.resolve_user_fees(1_000),
            UserFeeRates::new(rate(30), rate(10))
        );
        assert_eq!(fees.resolve(FeeKind::Taker, 60_000), rate(20));
        assert_eq!(fees.resolve(FeeKind::Maker, 60_000), rate(0));
    }

    #[test]
    fn test_resolve_all() {
        let mut fees = FeeStructure::with_defaults(DefaultFees::from_raw(40, 20, 100, 25));
        fees.set_protocol_fee_tier(100, rate(50));
        fees.set_lp_fee_tier(1_000, rate(15));
        fees.set_user_fee_tier(100, rate(35), rate(15));

        let resolved = fees.resolve_all(500);
        assert_eq!(resolved.holdings, 500);
        assert_eq!(resolved.taker, rate(35));
        assert_eq!(resolved.maker, rate(15));
        assert_eq!(resolved.protocol, rate(50));
        assert_eq!(resolved.lp, rate(25));
    }

    #[test]
    fn test_tier_lists_are_sorted() {
        let fees = sample();
        let list = fees.protocol_tier_list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].min_holdings, 100);
        assert_eq!(list[1].min_holdings, 500);
    }
}
