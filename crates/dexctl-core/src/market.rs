//! Asset identification and market keys.
//!
//! A market trades an ordered pair of asset types: `(base, quote)`.
//! The pair is never normalized, so `ETH/USDC` and `USDC/ETH` are two
//! distinct markets.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a tradable asset type.
///
/// Any non-empty string without whitespace, e.g. `"ETH"` or a fully
/// qualified on-chain type such as `"0x2::sui::SUI"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetType(String);

impl AssetType {
    pub fn new(id: impl Into<String>) -> CoreResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::InvalidAssetType("empty identifier".to_string()));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidAssetType(format!(
                "{id:?} contains whitespace"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AssetType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AssetType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssetType> for String {
    fn from(asset: AssetType) -> Self {
        asset.0
    }
}

/// Registry key for the market trading `base` against `quote`.
///
/// Equality and hashing follow the ordered `(base, quote)` pair, so the
/// key is injective over ordered pairs. [`MarketKey::canonical`] gives
/// the length-prefixed byte encoding `"<len>:<base><len>:<quote>"`,
/// which is uniquely decodable and therefore collision free as well.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarketKey {
    base: AssetType,
    quote: AssetType,
}

impl MarketKey {
    pub fn new(base: AssetType, quote: AssetType) -> Self {
        Self { base, quote }
    }

    /// Derive a key from borrowed asset types.
    pub fn derive(base: &AssetType, quote: &AssetType) -> Self {
        Self::new(base.clone(), quote.clone())
    }

    pub fn base(&self) -> &AssetType {
        &self.base
    }

    pub fn quote(&self) -> &AssetType {
        &self.quote
    }

    /// Canonical encoding of the ordered pair.
    pub fn canonical(&self) -> String {
        format!(
            "{}:{}{}:{}",
            self.base.0.len(),
            self.base.0,
            self.quote.0.len(),
            self.quote.0
        )
    }

    /// Key for the opposite direction.
    pub fn reversed(&self) -> Self {
        Self::new(self.quote.clone(), self.base.clone())
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
