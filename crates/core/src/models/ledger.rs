use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

/// Cash the ledger starts with when no saved state exists.
pub const DEFAULT_STARTING_CASH: f64 = 10_000.0;

/// Maximum retained transaction history length. Oldest entries are
/// evicted once the cap is exceeded.
pub const MAX_TRANSACTIONS: usize = 50;

/// The main state container: cash balance, BTC balance, last purchase
/// price, and the capped transaction history. Everything in here gets
/// serialized into the saved state envelope.
///
/// Both balances are always >= 0 — ledger operations validate before
/// they mutate. Cash carries 2-decimal precision, BTC 8-decimal;
/// `round_cash` / `round_asset` are re-applied after every mutation so
/// repeated trades don't accumulate display drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// Cash balance in currency units
    pub cash: f64,

    /// BTC balance
    pub asset: f64,

    /// Price recorded at the most recent buy; 0 until the first buy.
    /// Tracks only the latest buy price, not a weighted average, and is
    /// never reset on sell — even when the position returns to zero.
    pub purchase_price: f64,

    /// Transaction history, newest first, capped at `MAX_TRANSACTIONS`.
    pub transactions: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            cash: DEFAULT_STARTING_CASH,
            asset: 0.0,
            purchase_price: 0.0,
            transactions: Vec::new(),
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a transaction and evict beyond the history cap.
    pub fn record(&mut self, transaction: Transaction) {
        self.transactions.insert(0, transaction);
        self.transactions.truncate(MAX_TRANSACTIONS);
    }

    /// Total number of retained transactions.
    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

/// Round a cash amount to 2 decimal places.
#[must_use]
pub fn round_cash(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round a BTC amount to 8 decimal places (satoshi granularity).
#[must_use]
pub fn round_asset(value: f64) -> f64 {
    (value * 1e8).round() / 1e8
}
