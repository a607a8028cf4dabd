//! Replays a file of trades through a portfolio.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use core_types::TradeSide;
use executor::{BuySize, Portfolio, SellSize};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::str::FromStr;

/// One trade instruction. Exactly one of `quantity` and `percentage` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRow {
    pub date: NaiveDate,
    pub ticker: String,
    pub side: TradeSide,
    pub price: Decimal,
    pub quantity: Option<Decimal>,
    pub percentage: Option<Decimal>,
}

/// A CSV record before any field is interpreted.
#[derive(Debug, Deserialize)]
struct RawRow {
    date: String,
    ticker: String,
    side: String,
    price: String,
    #[serde(default)]
    quantity: String,
    #[serde(default)]
    percentage: String,
}

impl TryFrom<RawRow> for TradeRow {
    type Error = anyhow::Error;

    fn try_from(raw: RawRow) -> Result<Self> {
        Ok(Self {
            date: raw.date.trim().parse().with_context(|| format!("parse date {:?}", raw.date))?,
            ticker: raw.ticker.trim().to_string(),
            side: raw.side.parse()?,
            price: parse_decimal("price", &raw.price)?.context("price is required")?,
            quantity: parse_decimal("quantity", &raw.quantity)?,
            percentage: parse_decimal("percentage", &raw.percentage)?,
        })
    }
}

pub(crate) fn parse_decimal(field: &str, value: &str) -> Result<Option<Decimal>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let parsed = Decimal::from_str(value).with_context(|| format!("parse {field} {value:?}"))?;
    Ok(Some(parsed))
}

/// Reads `date,ticker,side,price,quantity,percentage` rows with a header line.
pub fn load_trades<R: Read>(reader: R) -> Result<Vec<TradeRow>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut out = Vec::new();

    for (i, rec) in rdr.deserialize::<RawRow>().enumerate() {
        // Line 1 is the header.
        let line = i + 2;
        let raw = rec.with_context(|| format!("read trade on line {line}"))?;
        out.push(TradeRow::try_from(raw).with_context(|| format!("invalid trade on line {line}"))?);
    }

    Ok(out)
}

/// Counts of booked and rejected rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    pub applied: usize,
    pub rejected: usize,
}

/// Books every row into `portfolio` in file order.
///
/// A row the portfolio rejects is logged and skipped, unless `strict` is set, in
/// which case the replay stops with that error.
pub fn replay(portfolio: &mut Portfolio, rows: &[TradeRow], strict: bool) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (i, row) in rows.iter().enumerate() {
        let result = match row.side {
            TradeSide::Buy => BuySize::from_options(row.quantity, row.percentage)
                .and_then(|size| portfolio.buy(&row.ticker, row.date, row.price, size).map(|_| ())),
            TradeSide::Sell => SellSize::from_options(row.quantity, row.percentage)
                .and_then(|size| portfolio.sell(&row.ticker, row.date, row.price, size).map(|_| ())),
        };

        match result {
            Ok(()) => summary.applied += 1,
            Err(e) if strict => bail!("trade {} ({} {} on {}) rejected: {e}", i + 1, row.side, row.ticker, row.date),
            Err(e) => {
                summary.rejected += 1;
                tracing::warn!(trade = i + 1, side = %row.side, ticker = %row.ticker, date = %row.date, error = %e, "Trade rejected, skipping");
            }
        }
    }

    Ok(summary)
}
