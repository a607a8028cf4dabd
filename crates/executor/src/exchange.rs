use chrono::NaiveDate;
use configuration::ExchangeSettings;
use core_types::{ROUND_TO, round_to, truncate_to};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;
use std::sync::Arc;

/// A venue's fee policy.
///
/// Implementations are stateless calculators: they price a trade but never touch
/// a portfolio. The `Portfolio` receives one as a constructor dependency and asks
/// it for fees and affordable quantities while it books trades.
pub trait Exchange: fmt::Debug + Send + Sync {
    /// A short, human-readable venue name used in logs and reports.
    fn name(&self) -> &str;

    /// The largest quantity of `ticker` that `cash` buys at `price`, including the
    /// buy fee this venue would charge on that same purchase.
    ///
    /// The result is truncated toward zero to four decimals so a subsequent `buy`
    /// of this quantity can never exceed `cash`.
    fn max_quantity(&self, ticker: &str, price: Decimal, cash: Decimal) -> Decimal;

    /// The non-negative fee for buying `quantity` units at `price`.
    fn fee_for_buy(&self, ticker: &str, date: NaiveDate, price: Decimal, quantity: Decimal) -> Decimal;

    /// The non-negative fee for selling `quantity` units at `price`.
    fn fee_for_sell(&self, ticker: &str, date: NaiveDate, price: Decimal, quantity: Decimal) -> Decimal;
}

/// A venue that never charges a fee.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeExchange;

impl FreeExchange {
    pub fn new() -> Self {
        Self
    }
}

impl Exchange for FreeExchange {
    fn name(&self) -> &str {
        "free"
    }

    fn max_quantity(&self, _ticker: &str, price: Decimal, cash: Decimal) -> Decimal {
        if price <= Decimal::ZERO || cash <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        truncate_to(cash / price, ROUND_TO)
    }

    fn fee_for_buy(&self, _ticker: &str, _date: NaiveDate, _price: Decimal, _quantity: Decimal) -> Decimal {
        Decimal::ZERO
    }

    fn fee_for_sell(&self, _ticker: &str, _date: NaiveDate, _price: Decimal, _quantity: Decimal) -> Decimal {
        Decimal::ZERO
    }
}

/// A venue charging a flat percentage of notional on every fill, assuming taker execution.
///
/// Buy fees are rounded to four decimals; sell fees are truncated so a reported
/// sell fee never exceeds what the proceeds can cover.
#[derive(Debug, Clone, PartialEq)]
pub struct TakerFeeExchange {
    name: String,
    taker_fee_pct: Decimal,
}

impl TakerFeeExchange {
    /// Coinbase Exchange taker rate at the lowest volume tier.
    pub const COINBASE_TAKER_FEE_PCT: Decimal = dec!(0.006);

    pub fn new(name: impl Into<String>, taker_fee_pct: Decimal) -> Self {
        Self { name: name.into(), taker_fee_pct }
    }

    pub fn coinbase() -> Self {
        Self::new("coinbase", Self::COINBASE_TAKER_FEE_PCT)
    }

    fn notional_fee(&self, price: Decimal, quantity: Decimal) -> Decimal {
        (price * quantity * self.taker_fee_pct).abs()
    }
}

impl Exchange for TakerFeeExchange {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_quantity(&self, ticker: &str, price: Decimal, cash: Decimal) -> Decimal {
        if price <= Decimal::ZERO || cash <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        // cash = price * (1 + fee) * quantity
        let quantity = truncate_to(cash / (price * (Decimal::ONE + self.taker_fee_pct)), ROUND_TO);
        tracing::debug!(venue = %self.name, ticker, %price, %cash, %quantity, "max affordable quantity");
        quantity
    }

    fn fee_for_buy(&self, _ticker: &str, _date: NaiveDate, price: Decimal, quantity: Decimal) -> Decimal {
        round_to(self.notional_fee(price, quantity), ROUND_TO)
    }

    fn fee_for_sell(&self, _ticker: &str, _date: NaiveDate, price: Decimal, quantity: Decimal) -> Decimal {
        truncate_to(self.notional_fee(price, quantity), ROUND_TO)
    }
}

/// Builds the venue described by the run configuration.
pub fn exchange_from_settings(settings: &ExchangeSettings) -> Arc<dyn Exchange> {
    match settings {
        ExchangeSettings::Free => Arc::new(FreeExchange::new()),
        ExchangeSettings::Coinbase => Arc::new(TakerFeeExchange::coinbase()),
        ExchangeSettings::TakerFee { name, taker_fee_pct } => {
            Arc::new(TakerFeeExchange::new(name.clone(), *taker_fee_pct))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 12, 23).unwrap()
    }

    #[test]
    fn coinbase_max_quantity_truncates_to_four_places() {
        let exchange = TakerFeeExchange::coinbase();
        assert_eq!(exchange.max_quantity("BTC", dec!(10000), dec!(10000)), dec!(0.9940));
        assert_eq!(exchange.max_quantity("BTC", dec!(42341.01), dec!(250)), dec!(0.0058));
    }

    #[test]
    fn max_quantity_is_always_affordable() {
        let exchange = TakerFeeExchange::coinbase();
        let cash = dec!(13581.8288);
        let price = dec!(10933.09);

        let quantity = exchange.max_quantity("BTC", price, cash);
        let cost = round_to(price * quantity, ROUND_TO);
        let fee = exchange.fee_for_buy("BTC", date(), price, quantity);

        assert_eq!(quantity, dec!(1.2348));
        assert!(cost + fee <= cash);
    }

    #[test]
    fn free_exchange_charges_nothing() {
        let exchange = FreeExchange::new();
        assert_eq!(exchange.fee_for_buy("BTC", date(), dec!(40000), dec!(0.125)), Decimal::ZERO);
        assert_eq!(exchange.fee_for_sell("BTC", date(), dec!(40000), dec!(0.125)), Decimal::ZERO);
        assert_eq!(exchange.max_quantity("BTC", dec!(40000), dec!(5000)), dec!(0.125));
    }

    #[test]
    fn buys_round_and_sells_truncate() {
        let exchange = TakerFeeExchange::new("test", dec!(0.006));
        // 0.1 * 12.3456789 * 0.006 = 0.00740740734
        assert_eq!(exchange.fee_for_buy("X", date(), dec!(12.3456789), dec!(0.1)), dec!(0.0074));
        // 1 * 1.2345 * 0.006 = 0.007407
        assert_eq!(exchange.fee_for_buy("X", date(), dec!(1.2345), dec!(1)), dec!(0.0074));
        // 1 * 1.24 * 0.006 = 0.00744 -> sells drop the remainder
        assert_eq!(exchange.fee_for_sell("X", date(), dec!(1.24), dec!(1)), dec!(0.0074));
        // 1 * 1.2425 * 0.006 = 0.007455 -> buy rounds up, sell truncates
        assert_eq!(exchange.fee_for_buy("X", date(), dec!(1.2425), dec!(1)), dec!(0.0075));
        assert_eq!(exchange.fee_for_sell("X", date(), dec!(1.2425), dec!(1)), dec!(0.0074));
    }

    #[test]
    fn degenerate_inputs_afford_nothing() {
        let exchange = TakerFeeExchange::coinbase();
        assert_eq!(exchange.max_quantity("BTC", Decimal::ZERO, dec!(100)), Decimal::ZERO);
        assert_eq!(exchange.max_quantity("BTC", dec!(100), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn settings_select_the_venue() {
        let custom = ExchangeSettings::TakerFee { name: "kraken".to_string(), taker_fee_pct: dec!(0.0026) };
        assert_eq!(exchange_from_settings(&custom).name(), "kraken");
        assert_eq!(exchange_from_settings(&ExchangeSettings::Coinbase).name(), "coinbase");
        assert_eq!(exchange_from_settings(&ExchangeSettings::Free).name(), "free");
    }
}
