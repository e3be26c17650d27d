//! On-chain addresses for administrators and markets.

use crate::error::{CoreError, CoreResult};

pub use alloy::primitives::Address;

/// Parse a `0x`-prefixed hex address.
pub fn parse_address(s: &str) -> CoreResult<Address> {
    s.trim()
        .parse::<Address>()
        .map_err(|e| CoreError::InvalidAddress(format!("{s}: {e}")))
}

/// Serde adapter storing an [`Address`] as its checksummed hex string.
///
/// Use with `#[serde(with = "dexctl_core::address::hex_str")]`.
pub mod hex_str {
    use super::{parse_address, Address};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(address: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(address)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Address, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_address(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let addr = parse_address("0x0000000000000000000000000000000000000001").unwrap();
        assert_eq!(addr, Address::with_last_byte(1));

        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("not an address").is_err());
    }
}
