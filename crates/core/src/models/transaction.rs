use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Cash added to the wallet
    Deposit,
    /// Cash taken out of the wallet
    Withdraw,
    /// Cash exchanged for BTC
    Buy,
    /// BTC exchanged for cash
    Sell,
}

impl TransactionKind {
    /// Wallet-type transactions move cash in and out (deposit/withdraw).
    #[must_use]
    pub fn is_wallet(&self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::Withdraw)
    }

    /// Trade-type transactions exchange cash for BTC (buy/sell).
    #[must_use]
    pub fn is_trade(&self) -> bool {
        matches!(self, TransactionKind::Buy | TransactionKind::Sell)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "Deposit"),
            TransactionKind::Withdraw => write!(f, "Withdraw"),
            TransactionKind::Buy => write!(f, "Buy"),
            TransactionKind::Sell => write!(f, "Sell"),
        }
    }
}

/// Filter applied to transaction history before pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionFilter {
    /// No filtering
    All,
    /// Deposits and withdrawals only
    Wallet,
    /// Buys and sells only
    Trade,
    /// A single transaction kind
    Kind(TransactionKind),
}

impl TransactionFilter {
    /// Whether a transaction of the given kind passes this filter.
    #[must_use]
    pub fn matches(&self, kind: TransactionKind) -> bool {
        match self {
            TransactionFilter::All => true,
            TransactionFilter::Wallet => kind.is_wallet(),
            TransactionFilter::Trade => kind.is_trade(),
            TransactionFilter::Kind(k) => *k == kind,
        }
    }
}

/// A single immutable ledger entry.
///
/// Created only by ledger operations and never mutated afterwards.
/// `asset_amount` and `price` are present for buy/sell, `None` for
/// deposit/withdraw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: Uuid,

    /// Deposit, Withdraw, Buy or Sell
    pub kind: TransactionKind,

    /// Cash amount moved (always positive)
    pub cash_amount: f64,

    /// BTC amount exchanged (buy/sell only)
    #[serde(default)]
    pub asset_amount: Option<f64>,

    /// Execution price at the time of the trade (buy/sell only)
    #[serde(default)]
    pub price: Option<f64>,

    /// When the transaction was executed
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn deposit(cash_amount: f64) -> Self {
        Self::wallet(TransactionKind::Deposit, cash_amount)
    }

    pub fn withdraw(cash_amount: f64) -> Self {
        Self::wallet(TransactionKind::Withdraw, cash_amount)
    }

    pub fn buy(cash_amount: f64, asset_amount: f64, price: f64) -> Self {
        Self::trade(TransactionKind::Buy, cash_amount, asset_amount, price)
    }

    pub fn sell(cash_amount: f64, asset_amount: f64, price: f64) -> Self {
        Self::trade(TransactionKind::Sell, cash_amount, asset_amount, price)
    }

    fn wallet(kind: TransactionKind, cash_amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            cash_amount,
            asset_amount: None,
            price: None,
            timestamp: Utc::now(),
        }
    }

    fn trade(kind: TransactionKind, cash_amount: f64, asset_amount: f64, price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            cash_amount,
            asset_amount: Some(asset_amount),
            price: Some(price),
            timestamp: Utc::now(),
        }
    }
}
