use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::ledger::{round_asset, round_cash, Ledger};
use crate::models::transaction::Transaction;

/// Applies deposit/withdraw/buy/sell operations to a ledger.
///
/// Pure business logic — no I/O, no API calls. Every operation follows
/// validate-then-commit: all checks run against the current state, and
/// only a fully valid operation mutates anything. A rejected operation
/// leaves cash, asset, purchase price, and history untouched.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Add cash to the wallet. Requires a finite, positive amount.
    pub fn deposit(&self, ledger: &mut Ledger, amount: f64) -> Result<Uuid, CoreError> {
        validate_amount(amount, "deposit amount")?;

        ledger.cash = round_cash(ledger.cash + amount);
        let tx = Transaction::deposit(amount);
        let id = tx.id;
        ledger.record(tx);
        Ok(id)
    }

    /// Take cash out of the wallet. Fails with `InsufficientFunds` when
    /// the amount exceeds the cash balance — no clamping.
    pub fn withdraw(&self, ledger: &mut Ledger, amount: f64) -> Result<Uuid, CoreError> {
        validate_amount(amount, "withdrawal amount")?;
        if amount > ledger.cash {
            return Err(CoreError::InsufficientFunds {
                requested: amount,
                available: ledger.cash,
            });
        }

        ledger.cash = round_cash(ledger.cash - amount);
        let tx = Transaction::withdraw(amount);
        let id = tx.id;
        ledger.record(tx);
        Ok(id)
    }

    /// Exchange `cash_amount` of cash for BTC at `price`.
    ///
    /// The recorded purchase price is overwritten with `price` on every
    /// buy — the ledger tracks the latest buy price only, not a
    /// weighted average cost.
    pub fn buy(&self, ledger: &mut Ledger, cash_amount: f64, price: f64) -> Result<Uuid, CoreError> {
        validate_amount(cash_amount, "buy amount")?;
        validate_amount(price, "price")?;
        if cash_amount > ledger.cash {
            return Err(CoreError::InsufficientFunds {
                requested: cash_amount,
                available: ledger.cash,
            });
        }

        let asset_amount = round_asset(cash_amount / price);
        if asset_amount <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "buy of {cash_amount} at price {price} is below the smallest tradable BTC unit"
            )));
        }

        ledger.cash = round_cash(ledger.cash - cash_amount);
        ledger.asset = round_asset(ledger.asset + asset_amount);
        ledger.purchase_price = price;

        let tx = Transaction::buy(cash_amount, asset_amount, price);
        let id = tx.id;
        ledger.record(tx);
        Ok(id)
    }

    /// Exchange BTC worth `cash_amount` back to cash at `price`.
    ///
    /// The BTC quantity is derived from the cash amount
    /// (`cash_amount / price`); selling more than the held balance
    /// fails with `InsufficientAsset`. The sufficiency check uses the
    /// exact derived quantity, before satoshi rounding, so a quantity
    /// that would round to zero can never credit cash without deducting
    /// any BTC. The purchase price is left unchanged on sell.
    pub fn sell(&self, ledger: &mut Ledger, cash_amount: f64, price: f64) -> Result<Uuid, CoreError> {
        validate_amount(cash_amount, "sell amount")?;
        validate_amount(price, "price")?;

        let raw_amount = cash_amount / price;
        if raw_amount > ledger.asset {
            return Err(CoreError::InsufficientAsset {
                requested: raw_amount,
                available: ledger.asset,
            });
        }

        let asset_amount = round_asset(raw_amount);
        if asset_amount <= 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "sale of {cash_amount} at price {price} is below the smallest tradable BTC unit"
            )));
        }

        ledger.asset = round_asset(ledger.asset - asset_amount);
        ledger.cash = round_cash(ledger.cash + cash_amount);

        let tx = Transaction::sell(cash_amount, asset_amount, price);
        let id = tx.id;
        ledger.record(tx);
        Ok(id)
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject non-finite and non-positive amounts before any mutation.
fn validate_amount(value: f64, what: &str) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::InvalidInput(format!(
            "{what} must be a finite number, got {value}"
        )));
    }
    if value <= 0.0 {
        return Err(CoreError::InvalidInput(format!(
            "{what} must be positive, got {value}"
        )));
    }
    Ok(())
}
