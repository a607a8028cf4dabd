use crate::enums::{Outcome, TradeSide};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the portfolio ledger.
///
/// `quantity` is signed: positive for a buy, negative for a sell. `cost` and
/// `fee` are always non-negative and `cash` is the running balance right after
/// this row was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub time: NaiveDate,
    pub ticker: String,
    pub price: Decimal,
    pub quantity: Decimal,
    /// `|price * quantity|`, excluding the fee.
    pub cost: Decimal,
    pub fee: Decimal,
    /// `-(cost + fee)` for a buy, `cost - fee` for a sell.
    pub cash_delta: Decimal,
    /// Realized gain against the average cost basis. Zero for buys.
    pub gain: Decimal,
    /// Consecutive same-outcome sells for this ticker, ending here. Zero for buys.
    pub streak: u32,
    pub cash: Decimal,
}

impl Transaction {
    pub fn is_buy(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    pub fn is_sell(&self) -> bool {
        self.quantity < Decimal::ZERO
    }

    pub fn side(&self) -> TradeSide {
        if self.is_sell() {
            TradeSide::Sell
        } else {
            TradeSide::Buy
        }
    }

    /// The win/loss bucket of a sell. `None` for buys.
    pub fn outcome(&self) -> Option<Outcome> {
        self.is_sell().then(|| Outcome::of(self.gain))
    }
}

/// A single day's prices for one ticker, as handed to a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}
