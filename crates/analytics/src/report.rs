use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A standardized summary of a portfolio's trading performance.
///
/// This struct is the final output of the `AnalyticsEngine`. Averages and ratios
/// are rounded to four decimals and are `None` when there is nothing to average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    // I. Core Profitability Metrics
    pub exchange: String,
    pub initial_cash: Decimal,
    pub final_cash: Decimal,
    pub net_performance_pct: Decimal,

    // II. Activity
    pub tickers: Vec<String>, // In order of first appearance in the ledger
    pub total_transactions: usize,
    pub buys: usize,
    pub sells: usize,
    pub total_fees: Decimal,

    // III. Trade-Level Statistics
    pub wins: usize,
    pub losses: usize,
    pub win_rate_pct: Option<Decimal>, // Option<> for cases with 0 sells
    pub loss_rate_pct: Option<Decimal>,
    pub avg_win_streak: Option<Decimal>,
    pub max_win_streak: u32,
    pub avg_loss_streak: Option<Decimal>,
    pub max_loss_streak: u32,
    pub avg_win: Option<Decimal>,
    pub avg_loss: Option<Decimal>,
    pub avg_return: Option<Decimal>,
    pub reward_to_risk_ratio: Option<Decimal>, // Option<> because there may be no wins or no losses

    // IV. Time-Based Metrics
    pub trades_per_day: Option<Decimal>,
    pub trades_per_month: Option<Decimal>,
}

impl PerformanceReport {
    /// Creates a report for an untouched portfolio holding `initial_cash`.
    pub fn new(exchange: impl Into<String>, initial_cash: Decimal) -> Self {
        Self {
            exchange: exchange.into(),
            initial_cash,
            final_cash: initial_cash,
            net_performance_pct: Decimal::ZERO,
            tickers: Vec::new(),
            total_transactions: 0,
            buys: 0,
            sells: 0,
            total_fees: Decimal::ZERO,
            wins: 0,
            losses: 0,
            win_rate_pct: None,
            loss_rate_pct: None,
            avg_win_streak: None,
            max_win_streak: 0,
            avg_loss_streak: None,
            max_loss_streak: 0,
            avg_win: None,
            avg_loss: None,
            avg_return: None,
            reward_to_risk_ratio: None,
            trades_per_day: None,
            trades_per_month: None,
        }
    }
}
