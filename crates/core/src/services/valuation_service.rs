use serde::{Deserialize, Serialize};

use crate::models::ledger::Ledger;
use crate::models::price::PriceSample;

/// Snapshot of the portfolio's worth at a given price.
///
/// Derived on demand from (ledger, price sample) — nothing here is
/// stored, and the same inputs always produce the same output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// cash + asset × current price (just cash when no price is known)
    pub portfolio_value: f64,

    /// cash + asset × recorded purchase price
    pub cost_basis: f64,

    /// asset × (current price − purchase price)
    pub unrealized_pl: f64,

    /// Percentage move of the current price versus the purchase price;
    /// 0 when no purchase price is recorded
    pub unrealized_pl_pct: f64,
}

/// Computes portfolio value and unrealized P/L for display.
///
/// **Note on precision**: all values are `f64`. The ledger re-rounds
/// balances on every mutation, but derived values here are raw
/// arithmetic — callers format for display.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Value the ledger at the latest price sample.
    ///
    /// Before the first successful fetch there is no price to value
    /// against: the portfolio value degrades to the cash balance and
    /// P/L reads 0 rather than pricing the position at zero.
    #[must_use]
    pub fn valuate(&self, ledger: &Ledger, sample: &PriceSample) -> Valuation {
        match sample.price {
            Some(price) => self.valuate_at(ledger, price),
            None => Valuation {
                portfolio_value: ledger.cash,
                cost_basis: ledger.cash + ledger.asset * ledger.purchase_price,
                unrealized_pl: 0.0,
                unrealized_pl_pct: 0.0,
            },
        }
    }

    /// Value the ledger at an explicit price.
    #[must_use]
    pub fn valuate_at(&self, ledger: &Ledger, price: f64) -> Valuation {
        let unrealized_pl = ledger.asset * (price - ledger.purchase_price);
        let unrealized_pl_pct = if ledger.purchase_price > 0.0 {
            (price - ledger.purchase_price) / ledger.purchase_price * 100.0
        } else {
            0.0
        };

        Valuation {
            portfolio_value: ledger.cash + ledger.asset * price,
            cost_basis: ledger.cash + ledger.asset * ledger.purchase_price,
            unrealized_pl,
            unrealized_pl_pct,
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
