//! Price-file loading and the built-in threshold strategy for `tally backtest`.

use crate::replay::parse_decimal;
use anyhow::{Context, Result};
use backtester::{DayPrices, PriceBook};
use chrono::NaiveDate;
use core_types::PriceBar;
use executor::{BuySize, ExecutorError, Portfolio, SellSize};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// A CSV bar before any field is interpreted. Missing open/high/low fall back to close.
#[derive(Debug, Deserialize)]
struct RawBar {
    date: String,
    ticker: String,
    #[serde(default)]
    open: String,
    #[serde(default)]
    high: String,
    #[serde(default)]
    low: String,
    close: String,
}

impl TryFrom<RawBar> for PriceBar {
    type Error = anyhow::Error;

    fn try_from(raw: RawBar) -> Result<Self> {
        let close = parse_decimal("close", &raw.close)?.context("close is required")?;
        Ok(Self {
            ticker: raw.ticker.trim().to_string(),
            date: raw.date.trim().parse().with_context(|| format!("parse date {:?}", raw.date))?,
            open: parse_decimal("open", &raw.open)?.unwrap_or(close),
            high: parse_decimal("high", &raw.high)?.unwrap_or(close),
            low: parse_decimal("low", &raw.low)?.unwrap_or(close),
            close,
        })
    }
}

/// Reads `date,ticker,open,high,low,close` rows with a header line into a `PriceBook`.
pub fn load_prices<R: Read>(reader: R) -> Result<PriceBook> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut book = PriceBook::new();

    for (i, rec) in rdr.deserialize::<RawBar>().enumerate() {
        let line = i + 2;
        let raw = rec.with_context(|| format!("read bar on line {line}"))?;
        book.insert(PriceBar::try_from(raw).with_context(|| format!("invalid bar on line {line}"))?);
    }

    Ok(book)
}

/// Goes all-in (up to `buy_percentage` of cash) when the close drops below
/// `buy_below` and nothing is held, and sells the whole position once the close
/// rises above `sell_above`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdStrategy {
    pub ticker: String,
    pub buy_below: Decimal,
    pub sell_above: Decimal,
    pub buy_percentage: Decimal,
}

impl ThresholdStrategy {
    pub fn on_tick(&self, date: NaiveDate, portfolio: &mut Portfolio, prices: &DayPrices) -> Result<(), ExecutorError> {
        let Some(bar) = prices.get(self.ticker.as_str()) else {
            return Ok(());
        };
        let owned = portfolio.quantity_owned(&self.ticker);

        if bar.close < self.buy_below && owned.is_zero() {
            portfolio.buy(&self.ticker, date, bar.close, BuySize::PercentageOfCash(self.buy_percentage))?;
        } else if bar.close > self.sell_above && owned > Decimal::ZERO {
            portfolio.sell(&self.ticker, date, bar.close, SellSize::PercentageOfShares(Decimal::ONE_HUNDRED))?;
        }
        Ok(())
    }
}
