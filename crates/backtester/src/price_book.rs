use chrono::NaiveDate;
use core_types::PriceBar;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// All bars for one trading day, keyed by ticker.
pub type DayPrices = BTreeMap<String, PriceBar>;

/// Historical prices indexed by date, then by ticker.
///
/// A later bar for the same date and ticker replaces the earlier one.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    days: BTreeMap<NaiveDate, DayPrices>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, bar: PriceBar) {
        self.days.entry(bar.date).or_default().insert(bar.ticker.clone(), bar);
    }

    pub fn prices_for(&self, date: NaiveDate) -> Option<&DayPrices> {
        self.days.get(&date)
    }

    /// Closing price of `ticker` on `date`, if a bar exists.
    pub fn close(&self, date: NaiveDate, ticker: &str) -> Option<Decimal> {
        self.prices_for(date)?.get(ticker).map(|bar| bar.close)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.keys().next_back().copied()
    }

    /// Days in `start <= d < end` that carry at least one bar, in date order.
    pub fn days_between(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = (NaiveDate, &DayPrices)> {
        self.days.range(start..end).map(|(date, prices)| (*date, prices))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl FromIterator<PriceBar> for PriceBook {
    fn from_iter<I: IntoIterator<Item = PriceBar>>(iter: I) -> Self {
        let mut book = Self::new();
        for bar in iter {
            book.insert(bar);
        }
        book
    }
}
