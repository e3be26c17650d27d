//! Market registry for the dexctl control plane.
//!
//! Maps an ordered `(base, quote)` asset pair to the address of the market
//! trading it. Each ordered pair owns one slot; `(A, B)` and `(B, A)` are
//! unrelated.

pub mod error;
pub mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::{MarketEntry, MarketRegistry};
