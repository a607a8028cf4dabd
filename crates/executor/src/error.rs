use rust_decimal::Decimal;
use thiserror::Error;

/// Every variant is a rejected operation: the ledger is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutorError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(
        "Cannot purchase {quantity} of {ticker} @ {price}: cost {cost} (+ fee {fee}) > available cash {cash}"
    )]
    InsufficientFunds {
        ticker: String,
        price: Decimal,
        quantity: Decimal,
        cost: Decimal,
        fee: Decimal,
        cash: Decimal,
    },

    #[error("Cannot sell {quantity} of {ticker} @ {price} (- fee {fee}): only {owned} owned")]
    InsufficientShares {
        ticker: String,
        price: Decimal,
        quantity: Decimal,
        fee: Decimal,
        owned: Decimal,
    },

    #[error("Initial cash must be greater than zero, got {0}")]
    InvalidInitialCash(Decimal),
}
