//! Core value types for the dexctl exchange control plane.
//!
//! - `FixedPointRate`: fee rate with exactly four fractional digits
//! - `AssetType`, `MarketKey`: ordered asset pairs addressing markets
//! - `Address`: administrator and market identities

pub mod address;
pub mod error;
pub mod market;
pub mod rate;

pub use address::{parse_address, Address};
pub use error::{CoreError, CoreResult};
pub use market::{AssetType, MarketKey};
pub use rate::{FixedPointRate, RATE_DECIMALS, RATE_SCALE};

/// Qualifying token holdings of a party, in the token's base units.
pub type Holdings = u64;
