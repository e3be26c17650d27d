//! Administrative control plane of the exchange.
//!
//! Owns the single [`GlobalConfig`]: a holdings-tiered fee structure and a
//! directional asset-pair market registry, both mutated only by the
//! designated administrator (market registration excepted) and read by the
//! trading engine at trade time.

pub mod config;
pub mod error;
pub mod global;
pub mod snapshot;

pub use config::{DeploymentConfig, MarketConfig, RateTierConfig, UserTierConfig};
pub use error::{ControlError, ControlResult, ErrorKind};
pub use global::{ConfigState, GlobalConfig, Lifecycle};
pub use snapshot::ConfigSnapshot;

// Re-exported so callers need only this crate.
pub use dexctl_core::{Address, AssetType, FixedPointRate, Holdings, MarketKey};
pub use dexctl_fees::{FeeKind, ResolvedFees, UserFeeRates};
