//! Fixed-point fee rates.
//!
//! A rate is an unsigned integer mantissa scaled by 10^4, so raw `150`
//! is `0.0150` (1.5%). Floating point never enters the fee pipeline;
//! `rust_decimal` is only used at the edges for display and parsing.

use crate::error::{CoreError, CoreResult};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of fractional decimal digits carried by every rate.
pub const RATE_DECIMALS: u32 = 4;

/// 10^RATE_DECIMALS.
pub const RATE_SCALE: u64 = 10_000;

/// Fee rate with exactly four fractional digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedPointRate(u64);

impl FixedPointRate {
    pub const ZERO: Self = Self(0);
    /// 100%.
    pub const ONE: Self = Self(RATE_SCALE);

    /// Build a rate from a raw integer and its declared decimal count.
    ///
    /// Only `RATE_DECIMALS` is accepted; any other declared scale is
    /// rejected rather than rescaled.
    pub fn from_raw(raw: u64, decimals: u32) -> CoreResult<Self> {
        if decimals != RATE_DECIMALS {
            return Err(CoreError::InvalidScale {
                expected: RATE_DECIMALS,
                actual: decimals,
            });
        }
        Ok(Self(raw))
    }

    /// Build a rate from a raw integer already at the 4-decimal scale.
    #[inline]
    pub const fn from_scaled(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw scaled integer (`0.0150` -> `150`).
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn decimals(&self) -> u32 {
        RATE_DECIMALS
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Exact decimal view, always carrying scale 4.
    #[inline]
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.0 as i128, RATE_DECIMALS)
    }

    /// Exact conversion from a decimal with at most four fractional digits.
    pub fn from_decimal(value: Decimal) -> CoreResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(CoreError::InvalidRate(format!("negative rate {value}")));
        }
        // Trailing zeros are not precision: 0.01500 is 0.0150.
        let mut scaled = value.normalize();
        if scaled.scale() > RATE_DECIMALS {
            return Err(CoreError::InvalidRate(format!(
                "{value} has more than {RATE_DECIMALS} fractional digits"
            )));
        }
        scaled.rescale(RATE_DECIMALS);
        let raw = u64::try_from(scaled.mantissa())
            .map_err(|_| CoreError::InvalidRate(format!("{value} out of range")))?;
        Ok(Self(raw))
    }

    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    #[inline]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl fmt::Display for FixedPointRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_decimal())
    }
}

impl FromStr for FixedPointRate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| CoreError::InvalidRate(format!("{s}: {e}")))?;
        Self::from_decimal(value)
    }
}

impl Serialize for FixedPointRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FixedPointRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
