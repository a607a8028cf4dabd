use crate::report::PerformanceReport;
use core_types::{ROUND_TO, Transaction, round_to};
use executor::Portfolio;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Average calendar month length in days (365.25 / 12).
const DAYS_PER_MONTH: Decimal = dec!(30.4375);

/// A stateless calculator for deriving performance metrics from a portfolio's ledger.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `portfolio` - The portfolio at the end of a trading session.
    pub fn calculate(&self, portfolio: &Portfolio) -> PerformanceReport {
        let mut report = PerformanceReport::new(portfolio.exchange().name(), portfolio.initial_cash());

        if portfolio.is_empty() {
            // If there are no trades, most metrics are zero or undefined.
            return report;
        }

        self.calculate_profitability(portfolio, &mut report);
        self.calculate_trade_statistics(portfolio, &mut report);
        self.calculate_time_metrics(portfolio.transactions(), &mut report);

        tracing::debug!(?report, "Performance report calculated");
        report
    }

    fn calculate_profitability(&self, portfolio: &Portfolio, report: &mut PerformanceReport) {
        report.final_cash = portfolio.cash();
        report.net_performance_pct = portfolio.net_performance();
        report.tickers = portfolio.tickers().into_iter().map(str::to_string).collect();
        report.total_transactions = portfolio.len();
        report.buys = portfolio.buys(None).len();
        report.sells = portfolio.sells(None).len();
        report.total_fees = portfolio.transactions().iter().map(|t| t.fee).sum();
    }

    fn calculate_trade_statistics(&self, portfolio: &Portfolio, report: &mut PerformanceReport) {
        report.wins = portfolio.wins().len();
        report.losses = portfolio.losses().len();

        if report.sells > 0 {
            let sells = Decimal::from(report.sells);
            report.win_rate_pct = Some(round_to(Decimal::from(report.wins) / sells * dec!(100), ROUND_TO));
            report.loss_rate_pct = Some(round_to(Decimal::from(report.losses) / sells * dec!(100), ROUND_TO));
        }

        let rounded = |value: Option<Decimal>| value.map(|v| round_to(v, ROUND_TO));
        report.avg_win_streak = rounded(portfolio.avg_win_streak());
        report.max_win_streak = portfolio.max_win_streak();
        report.avg_loss_streak = rounded(portfolio.avg_loss_streak());
        report.max_loss_streak = portfolio.max_loss_streak();
        report.avg_win = rounded(portfolio.avg_win());
        report.avg_loss = rounded(portfolio.avg_loss());
        report.avg_return = rounded(portfolio.avg_return());
        report.reward_to_risk_ratio = rounded(portfolio.reward_to_risk_ratio());
    }

    /// Trade frequency over the inclusive span between the first and last trading dates.
    fn calculate_time_metrics(&self, transactions: &[Transaction], report: &mut PerformanceReport) {
        let first = transactions.iter().map(|t| t.time).min();
        let last = transactions.iter().map(|t| t.time).max();
        let (Some(first), Some(last)) = (first, last) else {
            return;
        };

        let span_days = Decimal::from((last - first).num_days() + 1);
        let per_day = Decimal::from(transactions.len()) / span_days;

        report.trades_per_day = Some(round_to(per_day, ROUND_TO));
        report.trades_per_month = Some(round_to(per_day * DAYS_PER_MONTH, ROUND_TO));
    }
}
