//! Sparse tier tables keyed by minimum holdings.

use dexctl_core::{FixedPointRate, Holdings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which tier table a tier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    Protocol,
    Lp,
    User,
}

impl TierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Protocol => "protocol",
            Self::Lp => "lp",
            Self::User => "user",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Taker/maker rate pair of a user tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFeeRates {
    pub taker: FixedPointRate,
    pub maker: FixedPointRate,
}

impl UserFeeRates {
    pub fn new(taker: FixedPointRate, maker: FixedPointRate) -> Self {
        Self { taker, maker }
    }
}

/// One entry of a tier table, used for listings and snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTier<R> {
    pub min_holdings: Holdings,
    pub rates: R,
}

/// Mapping `min_holdings -> R`.
///
/// Tiers may be inserted in any order. The backing `BTreeMap` keeps
/// thresholds sorted ascending, which makes the floor lookup a single
/// range query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeTierTable<R> {
    tiers: BTreeMap<Holdings, R>,
}

impl<R> Default for FeeTierTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FeeTierTable<R> {
    pub fn new() -> Self {
        Self {
            tiers: BTreeMap::new(),
        }
    }

    /// Insert or overwrite the tier at `min_holdings`.
    ///
    /// Returns the rates previously stored at that threshold.
    pub fn upsert(&mut self, min_holdings: Holdings, rates: R) -> Option<R> {
        self.tiers.insert(min_holdings, rates)
    }

    /// Remove the tier at `min_holdings`, returning its rates if present.
    pub fn remove(&mut self, min_holdings: Holdings) -> Option<R> {
        self.tiers.remove(&min_holdings)
    }

    pub fn get(&self, min_holdings: Holdings) -> Option<&R> {
        self.tiers.get(&min_holdings)
    }

    pub fn contains(&self, min_holdings: Holdings) -> bool {
        self.tiers.contains_key(&min_holdings)
    }

    /// Tier with the largest threshold not exceeding `holdings`.
    pub fn floor(&self, holdings: Holdings) -> Option<(Holdings, &R)> {
        self.tiers
            .range(..=holdings)
            .next_back()
            .map(|(min, rates)| (*min, rates))
    }

    /// Iterate tiers in ascending threshold order.
    pub fn iter(&self) -> impl Iterator<Item = (Holdings, &R)> {
        self.tiers.iter().map(|(min, rates)| (*min, rates))
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

impl<R: Clone> FeeTierTable<R> {
    /// Sorted copy of all tiers.
    pub fn to_vec(&self) -> Vec<FeeTier<R>> {
        self.iter()
            .map(|(min_holdings, rates)| FeeTier {
                min_holdings,
                rates: rates.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(raw: u64) -> FixedPointRate {
        FixedPointRate::from_scaled(raw)
    }

    #[test]
    fn test_floor_lookup() {
        let mut table = FeeTierTable::new();
        table.upsert(500, rate(30));
        table.upsert(100, rate(50));

        assert_eq!(table.floor(0), None);
        assert_eq!(table.floor(99), None);
        assert_eq!(table.floor(100), Some((100, &rate(50))));
        assert_eq!(table.floor(499), Some((100, &rate(50))));
        assert_eq!(table.floor(500), Some((500, &rate(30))));
        assert_eq!(table.floor(u64::MAX), Some((500, &rate(30))));
    }

    #[test]
    fn test_floor_on_empty_table() {
        let table: FeeTierTable<FixedPointRate> = FeeTierTable::new();
        assert_eq!(table.floor(0), None);
        assert_eq!(table.floor(u64::MAX), None);
    }

    #[test]
    fn test_zero_threshold_matches_everything() {
        let mut table = FeeTierTable::new();
        table.upsert(0, rate(10));
        assert_eq!(table.floor(0), Some((0, &rate(10))));
    }

    #[test]
    fn test_upsert_overwrites() {
        let mut table = FeeTierTable::new();
        assert_eq!(table.upsert(100, rate(50)), None);
        assert_eq!(table.upsert(100, rate(40)), Some(rate(50)));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(100), Some(&rate(40)));
    }

    #[test]
    fn test_iter_is_sorted_regardless_of_insertion_order() {
        let mut table = FeeTierTable::new();
        for min in [1_000, 10, 500, 0, 100] {
            table.upsert(min, rate(min));
        }

        let mins: Vec<_> = table.iter().map(|(min, _)| min).collect();
        assert_eq!(mins, vec![0, 10, 100, 500, 1_000]);
    }

    #[test]
    fn test_remove() {
        let mut table = FeeTierTable::new();
        table.upsert(100, rate(50));

        assert_eq!(table.remove(200), None);
        assert_eq!(table.remove(100), Some(rate(50)));
        assert!(table.is_empty());
    }
}
