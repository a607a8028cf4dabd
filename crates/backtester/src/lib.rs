use analytics::{AnalyticsEngine, PerformanceReport};
use chrono::NaiveDate;
use executor::{ExecutorError, Portfolio};

pub mod error;
pub mod price_book;

pub use error::BacktestError;
pub use price_book::{DayPrices, PriceBook};

/// What to do when a strategy's trade is rejected by the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RejectionPolicy {
    /// Log the rejection and move on to the next day.
    #[default]
    Skip,
    /// Stop the run and surface the error.
    Abort,
}

/// The main backtesting engine.
///
/// Walks a `PriceBook` day by day, handing each day's prices and the portfolio to a
/// strategy callback, and judges the resulting ledger with the `AnalyticsEngine`.
pub struct Backtester {
    // --- Context ---
    prices: PriceBook,
    policy: RejectionPolicy,
    // --- Components ---
    analytics_engine: AnalyticsEngine,
}

impl Backtester {
    pub fn new(prices: PriceBook, policy: RejectionPolicy) -> Self {
        Self { prices, policy, analytics_engine: AnalyticsEngine::new() }
    }

    pub fn prices(&self) -> &PriceBook {
        &self.prices
    }

    /// Runs the simulation over every day in `start <= d < end` that has prices.
    ///
    /// The callback may trade through the portfolio. A rejected trade is handled
    /// according to the configured `RejectionPolicy`.
    pub fn run<F>(
        &self,
        portfolio: &mut Portfolio,
        start: NaiveDate,
        end: NaiveDate,
        mut on_tick: F,
    ) -> Result<PerformanceReport, BacktestError>
    where
        F: FnMut(NaiveDate, &mut Portfolio, &DayPrices) -> Result<(), ExecutorError>,
    {
        if start >= end {
            return Err(BacktestError::InvalidRange { start, end });
        }

        let mut days = self.prices.days_between(start, end).peekable();
        if days.peek().is_none() {
            return Err(BacktestError::DataUnavailable);
        }

        tracing::info!(%start, %end, exchange = portfolio.exchange().name(), "Starting backtest");

        let mut ticks = 0usize;
        let mut rejected = 0usize;
        for (date, prices) in days {
            ticks += 1;
            if let Err(e) = on_tick(date, portfolio, prices) {
                match self.policy {
                    RejectionPolicy::Skip => {
                        rejected += 1;
                        tracing::warn!(%date, error = %e, "Trade rejected, continuing");
                    }
                    RejectionPolicy::Abort => return Err(e.into()),
                }
            }
        }

        let report = self.analytics_engine.calculate(portfolio);
        tracing::info!(
            ticks,
            rejected,
            transactions = portfolio.len(),
            net_performance = %report.net_performance_pct,
            "Backtest complete"
        );
        Ok(report)
    }
}
