//! The global configuration singleton.
//!
//! One `GlobalConfig` exists per deployment. It starts `Uninitialized`,
//! moves to `Initialized` exactly once through [`GlobalConfig::init`], and
//! never goes back.
//!
//! Thread-safe: all state sits behind one `RwLock`. Resolutions share the
//! read lock; every mutation holds the write lock for its whole duration
//! and checks all preconditions before touching state, so no caller can
//! observe a partially applied change.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{info, warn};

use dexctl_core::{Address, AssetType, FixedPointRate, Holdings, MarketKey};
use dexctl_fees::{DefaultFees, FeeKind, FeeStructure, ResolvedFees, TierKind, UserFeeRates};
use dexctl_registry::MarketRegistry;
use dexctl_telemetry::Metrics;

use crate::error::{ControlError, ControlResult};
use crate::snapshot::ConfigSnapshot;

// ============================================================================
// Lifecycle
// ============================================================================

/// Configuration state created by `init`.
#[derive(Debug, Clone)]
pub struct ConfigState {
    pub(crate) fees: FeeStructure,
    pub(crate) markets: MarketRegistry,
    pub(crate) initialized_at: DateTime<Utc>,
}

impl ConfigState {
    pub fn fees(&self) -> &FeeStructure {
        &self.fees
    }

    pub fn markets(&self) -> &MarketRegistry {
        &self.markets
    }

    pub fn initialized_at(&self) -> DateTime<Utc> {
        self.initialized_at
    }
}

/// `Uninitialized -> Initialized`, with no way back.
#[derive(Debug, Clone, Default)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Initialized(Box<ConfigState>),
}

impl Lifecycle {
    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Initialized(_))
    }

    fn state(&self) -> ControlResult<&ConfigState> {
        match self {
            Self::Initialized(state) => Ok(state.as_ref()),
            Self::Uninitialized => Err(ControlError::NotInitialized),
        }
    }

    fn state_mut(&mut self) -> ControlResult<&mut ConfigState> {
        match self {
            Self::Initialized(state) => Ok(state.as_mut()),
            Self::Uninitialized => Err(ControlError::NotInitialized),
        }
    }
}

// ============================================================================
// GlobalConfig
// ============================================================================

/// Fee structure and market registry owned by one administrator.
#[derive(Debug)]
pub struct GlobalConfig {
    /// The only identity allowed to initialize and change fees.
    admin: Address,
    lifecycle: RwLock<Lifecycle>,
}

impl GlobalConfig {
    /// Create an uninitialized configuration for the designated `admin`.
    #[must_use]
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            lifecycle: RwLock::new(Lifecycle::Uninitialized),
        }
    }

    #[must_use]
    pub fn admin(&self) -> Address {
        self.admin
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.lifecycle.read().is_initialized()
    }

    /// Initialize with the four default rates (raw, 4 decimals).
    ///
    /// Fails with `NotAuthorized` for any caller but the admin, and with
    /// `AlreadyInitialized` on every call after the first success.
    pub fn init(
        &self,
        caller: Address,
        default_taker: u64,
        default_maker: u64,
        default_protocol: u64,
        default_lp: u64,
    ) -> ControlResult<()> {
        let result = (|| -> ControlResult<()> {
            self.authorize(caller)?;

            let defaults = DefaultFees {
                taker: to_rate(default_taker),
                maker: to_rate(default_maker),
                protocol: to_rate(default_protocol),
                lp: to_rate(default_lp),
            };

            let mut lifecycle = self.lifecycle.write();
            if lifecycle.is_initialized() {
                return Err(ControlError::AlreadyInitialized);
            }

            *lifecycle = Lifecycle::Initialized(Box::new(ConfigState {
                fees: FeeStructure::with_defaults(defaults),
                markets: MarketRegistry::new(),
                initialized_at: Utc::now(),
            }));

            info!(
                admin = %self.admin,
                taker = %defaults.taker,
                maker = %defaults.maker,
                protocol = %defaults.protocol,
                lp = %defaults.lp,
                "Global configuration initialized"
            );
            Ok(())
        })();

        record("init", &result);
        result
    }

    // ---- fee tiers (admin only) ----

    pub fn set_protocol_fee_tier(
        &self,
        caller: Address,
        min_holdings: Holdings,
        rate: u64,
    ) -> ControlResult<()> {
        self.admin_write("set_protocol_fee_tier", caller, |state| {
            state.fees.set_protocol_fee_tier(min_holdings, to_rate(rate));
            publish_tier_count(state, TierKind::Protocol);
            Ok(())
        })
    }

    pub fn set_lp_fee_tier(
        &self,
        caller: Address,
        min_holdings: Holdings,
        rate: u64,
    ) -> ControlResult<()> {
        self.admin_write("set_lp_fee_tier", caller, |state| {
            state.fees.set_lp_fee_tier(min_holdings, to_rate(rate));
            publish_tier_count(state, TierKind::Lp);
            Ok(())
        })
    }

    pub fn set_user_fee_tier(
        &self,
        caller: Address,
        min_holdings: Holdings,
        taker_rate: u64,
        maker_rate: u64,
    ) -> ControlResult<()> {
        self.admin_write("set_user_fee_tier", caller, |state| {
            state
                .fees
                .set_user_fee_tier(min_holdings, to_rate(taker_rate), to_rate(maker_rate));
            publish_tier_count(state, TierKind::User);
            Ok(())
        })
    }

    pub fn remove_protocol_fee_tier(
        &self,
        caller: Address,
        min_holdings: Holdings,
    ) -> ControlResult<()> {
        self.admin_write("remove_protocol_fee_tier", caller, |state| {
            state.fees.remove_protocol_fee_tier(min_holdings)?;
            publish_tier_count(state, TierKind::Protocol);
            Ok(())
        })
    }

    pub fn remove_lp_fee_tier(&self, caller: Address, min_holdings: Holdings) -> ControlResult<()> {
        self.admin_write("remove_lp_fee_tier", caller, |state| {
            state.fees.remove_lp_fee_tier(min_holdings)?;
            publish_tier_count(state, TierKind::Lp);
            Ok(())
        })
    }

    pub fn remove_user_fee_tier(
        &self,
        caller: Address,
        min_holdings: Holdings,
    ) -> ControlResult<()> {
        self.admin_write("remove_user_fee_tier", caller, |state| {
            state.fees.remove_user_fee_tier(min_holdings)?;
            publish_tier_count(state, TierKind::User);
            Ok(())
        })
    }

    // ---- fee resolution ----

    /// Resolve the `kind` fee for a party holding `holdings`.
    pub fn resolve_fee(&self, kind: FeeKind, holdings: Holdings) -> ControlResult<FixedPointRate> {
        let lifecycle = self.lifecycle.read();
        Ok(resolve_recorded(&lifecycle.state()?.fees, kind, holdings))
    }

    /// Taker and maker rates from the same user tier.
    pub fn resolve_user_fees(&self, holdings: Holdings) -> ControlResult<UserFeeRates> {
        let lifecycle = self.lifecycle.read();
        let fees = &lifecycle.state()?.fees;
        Ok(UserFeeRates::new(
            resolve_recorded(fees, FeeKind::Taker, holdings),
            resolve_recorded(fees, FeeKind::Maker, holdings),
        ))
    }

    /// All four fees for `holdings`, from one consistent view.
    pub fn resolve_fees(&self, holdings: Holdings) -> ControlResult<ResolvedFees> {
        let lifecycle = self.lifecycle.read();
        let fees = &lifecycle.state()?.fees;
        Ok(ResolvedFees {
            holdings,
            taker: resolve_recorded(fees, FeeKind::Taker, holdings),
            maker: resolve_recorded(fees, FeeKind::Maker, holdings),
            protocol: resolve_recorded(fees, FeeKind::Protocol, holdings),
            lp: resolve_recorded(fees, FeeKind::Lp, holdings),
        })
    }

    // ---- market registry ----

    /// Register the market for the ordered pair `(base, quote)`.
    ///
    /// Open to any trusted deployer; only requires initialization.
    pub fn register_market(
        &self,
        base: &AssetType,
        quote: &AssetType,
        address: Address,
    ) -> ControlResult<MarketKey> {
        let result = (|| -> ControlResult<MarketKey> {
            let mut lifecycle = self.lifecycle.write();
            let state = lifecycle.state_mut()?;
            let key = state.markets.register(base, quote, address)?;
            Metrics::markets_registered(state.markets.len());
            Ok(key)
        })();

        if let Err(e) = &result {
            warn!(base = %base, quote = %quote, error = %e, "Market registration rejected");
        }
        record("register_market", &result);
        result
    }

    /// Address of the market for `(base, quote)`, in that exact order.
    pub fn resolve_market(&self, base: &AssetType, quote: &AssetType) -> ControlResult<Address> {
        let lifecycle = self.lifecycle.read();
        Ok(lifecycle.state()?.markets.resolve(base, quote)?)
    }

    pub fn contains_market(&self, base: &AssetType, quote: &AssetType) -> ControlResult<bool> {
        let lifecycle = self.lifecycle.read();
        Ok(lifecycle.state()?.markets.contains(base, quote))
    }

    pub fn market_count(&self) -> ControlResult<usize> {
        let lifecycle = self.lifecycle.read();
        Ok(lifecycle.state()?.markets.len())
    }

    // ---- inspection ----

    /// Consistent copy of the whole configuration.
    pub fn snapshot(&self) -> ControlResult<ConfigSnapshot> {
        let lifecycle = self.lifecycle.read();
        Ok(ConfigSnapshot::capture(self.admin, lifecycle.state()?))
    }

    // ---- internals ----

    fn authorize(&self, caller: Address) -> ControlResult<()> {
        if caller != self.admin {
            warn!(%caller, admin = %self.admin, "Rejected non-admin caller");
            return Err(ControlError::NotAuthorized { caller });
        }
        Ok(())
    }

    /// Run an admin mutation under the write lock.
    ///
    /// Order of checks: initialized, then caller, then the operation itself.
    fn admin_write<T>(
        &self,
        op: &'static str,
        caller: Address,
        f: impl FnOnce(&mut ConfigState) -> ControlResult<T>,
    ) -> ControlResult<T> {
        let result = (|| -> ControlResult<T> {
            let mut lifecycle = self.lifecycle.write();
            let state = lifecycle.state_mut()?;
            self.authorize(caller)?;
            f(state)
        })();

        record(op, &result);
        result
    }
}

/// Admin entry points take raw integers at the fixed 4-decimal scale.
/// Callers holding a value with a declared scale go through
/// `FixedPointRate::from_raw`, which rejects anything but 4.
fn to_rate(raw: u64) -> FixedPointRate {
    FixedPointRate::from_scaled(raw)
}

fn resolve_recorded(fees: &FeeStructure, kind: FeeKind, holdings: Holdings) -> FixedPointRate {
    let resolution = fees.resolve_with_source(kind, holdings);
    Metrics::fee_resolved(kind.as_str(), resolution.source.as_str());
    resolution.rate
}

fn publish_tier_count(state: &ConfigState, kind: TierKind) {
    Metrics::fee_tiers(kind.as_str(), state.fees.tier_count(kind));
}

fn record<T>(op: &str, result: &ControlResult<T>) {
    match result {
        Ok(_) => Metrics::admin_op(op, "ok"),
        Err(e) => Metrics::admin_op(op, e.kind().as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use dexctl_telemetry::metrics::FEE_RESOLUTIONS_TOTAL;

    fn resolutions(kind: FeeKind, source: &str) -> u64 {
        FEE_RESOLUTIONS_TOTAL
            .with_label_values(&[kind.as_str(), source])
            .get()
    }

    fn admin() -> Address {
        Address::with_last_byte(0xAD)
    }

    fn stranger() -> Address {
        Address::with_last_byte(0x01)
    }

    fn initialized() -> GlobalConfig {
        let config = GlobalConfig::new(admin());
        config.init(admin(), 40, 20, 100, 25).unwrap();
        config
    }

    #[test]
    fn test_init_only_once() {
        let config = GlobalConfig::new(admin());
        assert!(!config.is_initialized());

        config.init(admin(), 40, 20, 100, 25).unwrap();
        assert!(config.is_initialized());

        let err = config.init(admin(), 1, 1, 1, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyInitialized);

        // Defaults from the first init survive
        assert_eq!(
            config.resolve_fee(FeeKind::Taker, 0).unwrap(),
            FixedPointRate::from_scaled(40)
        );
    }

    #[test]
    fn test_init_rejects_non_admin() {
        let config = GlobalConfig::new(admin());
        let err = config.init(stranger(), 40, 20, 100, 25).unwrap_err();

        assert!(matches!(err, ControlError::NotAuthorized { caller } if caller == stranger()));
        assert!(!config.is_initialized());
    }

    #[test]
    fn test_non_admin_init_after_init_is_not_authorized() {
        let config = initialized();
        let err = config.init(stranger(), 1, 1, 1, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);
    }

    #[test]
    fn test_operations_require_init() {
        let config = GlobalConfig::new(admin());
        let eth = AssetType::new("ETH").unwrap();
        let usdc = AssetType::new("USDC").unwrap();

        let kinds = [
            config.set_protocol_fee_tier(admin(), 100, 50).unwrap_err().kind(),
            config.set_lp_fee_tier(admin(), 100, 50).unwrap_err().kind(),
            config.set_user_fee_tier(admin(), 100, 50, 10).unwrap_err().kind(),
            config.remove_protocol_fee_tier(admin(), 100).unwrap_err().kind(),
            config.remove_lp_fee_tier(admin(), 100).unwrap_err().kind(),
            config.remove_user_fee_tier(admin(), 100).unwrap_err().kind(),
            config
                .register_market(&eth, &usdc, Address::with_last_byte(7))
                .unwrap_err()
                .kind(),
            config.resolve_market(&eth, &usdc).unwrap_err().kind(),
            config.resolve_fee(FeeKind::Taker, 0).unwrap_err().kind(),
            config.resolve_fees(0).unwrap_err().kind(),
            config.snapshot().unwrap_err().kind(),
        ];

        assert!(kinds.iter().all(|k| *k == ErrorKind::NotInitialized));
    }

    #[test]
    fn test_uninitialized_is_reported_before_caller() {
        let config = GlobalConfig::new(admin());
        let err = config.set_lp_fee_tier(stranger(), 0, 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotInitialized);
    }

    #[test]
    fn test_tier_mutation_is_admin_only() {
        let config = initialized();

        let err = config.set_protocol_fee_tier(stranger(), 100, 50).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);
        assert_eq!(
            config.resolve_fee(FeeKind::Protocol, 100).unwrap(),
            FixedPointRate::from_scaled(100)
        );

        config.set_protocol_fee_tier(admin(), 100, 50).unwrap();
        let err = config.remove_protocol_fee_tier(stranger(), 100).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized);
        assert_eq!(
            config.resolve_fee(FeeKind::Protocol, 100).unwrap(),
            FixedPointRate::from_scaled(50)
        );
    }

    #[test]
    fn test_remove_missing_tier() {
        let config = initialized();
        let err = config.remove_user_fee_tier(admin(), 1_000).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TierNotFound);
    }

    #[test]
    fn test_register_market_is_not_admin_gated() {
        let config = initialized();
        let eth = AssetType::new("ETH").unwrap();
        let usdc = AssetType::new("USDC").unwrap();
        let market = Address::with_last_byte(7);

        config.register_market(&eth, &usdc, market).unwrap();
        assert_eq!(config.resolve_market(&eth, &usdc).unwrap(), market);
        assert!(config.contains_market(&eth, &usdc).unwrap());
        assert!(!config.contains_market(&usdc, &eth).unwrap());
        assert_eq!(config.market_count().unwrap(), 1);
    }

    #[test]
    fn test_every_resolution_path_is_counted() {
        let config = initialized();
        config.set_protocol_fee_tier(admin(), 0, 50).unwrap();

        // Protocol matches the tier, everything else falls to its default.
        fn counts() -> Vec<u64> {
            FeeKind::ALL
                .iter()
                .map(|k| {
                    let source = if *k == FeeKind::Protocol { "tier" } else { "default" };
                    resolutions(*k, source)
                })
                .collect()
        }
        // Tests share the registry, so a delta is a lower bound.
        fn grew(before: &[u64], after: &[u64], kinds: &[FeeKind]) {
            for kind in kinds {
                let i = FeeKind::ALL.iter().position(|k| k == kind).unwrap();
                assert!(after[i] > before[i], "{kind} not recorded");
            }
        }

        for kind in FeeKind::ALL {
            let before = counts();
            config.resolve_fee(kind, 10).unwrap();
            grew(&before, &counts(), &[kind]);
        }

        let before = counts();
        config.resolve_user_fees(10).unwrap();
        grew(&before, &counts(), &[FeeKind::Taker, FeeKind::Maker]);

        let before = counts();
        config.resolve_fees(10).unwrap();
        grew(&before, &counts(), &FeeKind::ALL);
    }
}
