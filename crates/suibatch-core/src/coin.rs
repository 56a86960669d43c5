use serde::Serialize;

use crate::error::CoreError;
use crate::types::Coin;

// ==============================================================================
// Coin Set
// ==============================================================================

/// Coins as returned by the node, in node order. Order is not sorted by
/// balance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CoinSet(Vec<Coin>);

impl CoinSet {
    pub fn new(coins: Vec<Coin>) -> Self {
        Self(coins)
    }

    pub fn coins(&self) -> &[Coin] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_coins(self) -> Vec<Coin> {
        self.0
    }

    /// Sum of all balances, saturating at `u64::MAX`.
    pub fn total_balance(&self) -> u64 {
        self.0
            .iter()
            .fold(0u64, |acc, coin| acc.saturating_add(coin.balance))
    }

    /// First coin, in node order, whose balance covers `amount`.
    ///
    /// This is a single-coin greedy pick: it neither looks for the smallest
    /// qualifying coin nor combines coins. Callers that need to merge several
    /// coins must do so themselves.
    pub fn pick_coin_no_less(&self, amount: u64) -> Result<&Coin, CoreError> {
        self.0
            .iter()
            .find(|coin| coin.balance >= amount)
            .ok_or(CoreError::InsufficientBalance { requested: amount })
    }
}

impl From<Vec<Coin>> for CoinSet {
    fn from(coins: Vec<Coin>) -> Self {
        Self(coins)
    }
}

impl FromIterator<Coin> for CoinSet {
    fn from_iter<I: IntoIterator<Item = Coin>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for CoinSet {
    type Item = Coin;
    type IntoIter = std::vec::IntoIter<Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
