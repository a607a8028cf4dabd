use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    #[error("Execution simulation error: {0}")]
    Executor(#[from] executor::ExecutorError),

    #[error("Historical data for the requested range is incomplete or missing.")]
    DataUnavailable,

    #[error("Invalid backtest range: start {start} must be before end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}
