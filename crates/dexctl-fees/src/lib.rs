//! Holdings-tiered fee resolution.
//!
//! Three independent tier tables (protocol, LP, user taker/maker) keyed by
//! minimum holdings. A fee resolves to the tier with the largest threshold
//! not exceeding the party's holdings, or to the kind's default.

pub mod error;
pub mod structure;
pub mod tier;

pub use error::{FeeError, FeeResult};
pub use structure::{
    DefaultFees, FeeKind, FeeResolution, FeeSource, FeeStructure, ResolvedFees,
};
pub use tier::{FeeTier, FeeTierTable, TierKind, UserFeeRates};
