use backtester::{Backtester, PriceBook, RejectionPolicy};
use chrono::NaiveDate;
use core_types::PriceBar;
use executor::{BuySize, FreeExchange, Portfolio, SellSize};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
}

fn bar(day: u32, close: Decimal) -> PriceBar {
    PriceBar { ticker: "BTC".to_string(), date: d(day), open: close, high: close, low: close, close }
}

/// Buys with all cash below 100 and sells everything above 120.
#[test]
fn scenario_threshold_strategy_over_a_price_book() {
    let closes = [dec!(110), dec!(95), dec!(90), dec!(125), dec!(130), dec!(80), dec!(121)];
    let book: PriceBook = closes.iter().enumerate().map(|(i, c)| bar(i as u32 + 1, *c)).collect();
    let backtester = Backtester::new(book, RejectionPolicy::Skip);
    let mut pf = Portfolio::new(Arc::new(FreeExchange::new()), dec!(1000)).unwrap();

    let start = backtester.prices().first_date().unwrap();
    let end = backtester.prices().last_date().unwrap().succ_opt().unwrap();
    let report = backtester
        .run(&mut pf, start, end, |date, pf, prices| {
            let close = prices["BTC"].close;
            if close < dec!(100) {
                pf.buy("BTC", date, close, BuySize::PercentageOfCash(dec!(100)))?;
            } else if close > dec!(120) {
                pf.sell("BTC", date, close, SellSize::PercentageOfShares(dec!(100)))?;
            }
            Ok(())
        })
        .unwrap();

    // Day 3 and day 5 have nothing left to trade and are skipped.
    let sides: Vec<bool> = pf.transactions().iter().map(|t| t.is_buy()).collect();
    assert_eq!(sides, vec![true, false, true, false]);
    assert_eq!(pf.quantity_owned("BTC"), Decimal::ZERO);
    assert_eq!(report.wins, 2);
    assert_eq!(report.final_cash, pf.cash());
    assert!(pf.cash() > dec!(1000));
}
