//! Asset-pair market registry.
//!
//! Entries are write-once: registering an existing ordered pair fails and
//! leaves the stored address untouched.

use crate::error::{RegistryError, RegistryResult};
use chrono::{DateTime, Utc};
use dexctl_core::{address, Address, AssetType, MarketKey};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::info;

/// Registered market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEntry {
    pub key: MarketKey,
    #[serde(with = "address::hex_str")]
    pub address: Address,
    pub registered_at: DateTime<Utc>,
}

/// Registry of markets by ordered asset pair.
#[derive(Debug, Clone, Default)]
pub struct MarketRegistry {
    markets: HashMap<MarketKey, MarketEntry>,
}

impl MarketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the market for `(base, quote)`.
    ///
    /// Returns `Err(MarketAlreadyExists)` if the ordered pair is taken.
    /// The reverse pair is not checked.
    pub fn register(
        &mut self,
        base: &AssetType,
        quote: &AssetType,
        address: Address,
    ) -> RegistryResult<MarketKey> {
        let key = MarketKey::derive(base, quote);

        match self.markets.entry(key.clone()) {
            Entry::Occupied(_) => Err(RegistryError::MarketAlreadyExists(key)),
            Entry::Vacant(slot) => {
                slot.insert(MarketEntry {
                    key: key.clone(),
                    address,
                    registered_at: Utc::now(),
                });
                info!(market = %key, %address, "Market registered");
                Ok(key)
            }
        }
    }

    /// Address of the market for `(base, quote)`, in that order.
    pub fn resolve(&self, base: &AssetType, quote: &AssetType) -> RegistryResult<Address> {
        self.resolve_key(&MarketKey::derive(base, quote))
    }

    pub fn resolve_key(&self, key: &MarketKey) -> RegistryResult<Address> {
        self.markets
            .get(key)
            .map(|entry| entry.address)
            .ok_or_else(|| RegistryError::MarketNotFound(key.clone()))
    }

    pub fn get(&self, key: &MarketKey) -> Option<&MarketEntry> {
        self.markets.get(key)
    }

    pub fn contains(&self, base: &AssetType, quote: &AssetType) -> bool {
        self.markets.contains_key(&MarketKey::derive(base, quote))
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// All entries sorted by key.
    pub fn entries(&self) -> Vec<MarketEntry> {
        let mut entries: Vec<_> = self.markets.values().cloned().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }
}
