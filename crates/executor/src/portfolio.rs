use crate::error::ExecutorError;
use crate::exchange::Exchange;
use crate::inventory;
use chrono::NaiveDate;
use core_types::{Outcome, ROUND_TO, Transaction, round_to, truncate_to};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

/// How much to buy: an explicit unit count or a share of the current cash balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuySize {
    Quantity(Decimal),
    /// 0–100.
    PercentageOfCash(Decimal),
}

impl BuySize {
    /// Builds a size from two optionals, exactly one of which must be set.
    pub fn from_options(
        quantity: Option<Decimal>,
        percentage_of_cash: Option<Decimal>,
    ) -> Result<Self, ExecutorError> {
        match (quantity, percentage_of_cash) {
            (Some(quantity), None) => Ok(BuySize::Quantity(quantity)),
            (None, Some(percentage)) => Ok(BuySize::PercentageOfCash(percentage)),
            _ => Err(ExecutorError::InvalidArguments(
                "must specify either quantity or percentage_of_cash".to_string(),
            )),
        }
    }
}

/// How much to sell: an explicit unit count or a share of the units owned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SellSize {
    Quantity(Decimal),
    /// 0–100.
    PercentageOfShares(Decimal),
}

impl SellSize {
    /// Builds a size from two optionals, exactly one of which must be set.
    pub fn from_options(
        quantity: Option<Decimal>,
        percentage_of_shares: Option<Decimal>,
    ) -> Result<Self, ExecutorError> {
        match (quantity, percentage_of_shares) {
            (Some(quantity), None) => Ok(SellSize::Quantity(quantity)),
            (None, Some(percentage)) => Ok(SellSize::PercentageOfShares(percentage)),
            _ => Err(ExecutorError::InvalidArguments(
                "must specify either quantity or percentage_of_shares".to_string(),
            )),
        }
    }
}

/// The trading account of a single run: a starting balance, a fee model and an
/// append-only log of transactions.
///
/// Cash and holdings are never stored on their own. They are always derived from
/// the log, so clearing it with [`Portfolio::reset`] fully restores the starting state.
/// `buy` and `sell` validate first and append last; a rejected trade leaves the
/// log untouched.
#[derive(Debug, Clone)]
pub struct Portfolio {
    initial_cash: Decimal,
    exchange: Arc<dyn Exchange>,
    transactions: Vec<Transaction>,
}

impl Portfolio {
    /// Creates a new `Portfolio` trading on `exchange` with a given amount of starting cash.
    pub fn new(exchange: Arc<dyn Exchange>, initial_cash: Decimal) -> Result<Self, ExecutorError> {
        if initial_cash <= Decimal::ZERO {
            return Err(ExecutorError::InvalidInitialCash(initial_cash));
        }
        Ok(Self { initial_cash, exchange, transactions: Vec::new() })
    }

    pub fn initial_cash(&self) -> Decimal {
        self.initial_cash
    }

    pub fn exchange(&self) -> &dyn Exchange {
        self.exchange.as_ref()
    }

    /// The full ledger in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The balance after the last transaction, or the initial cash for an empty ledger.
    pub fn cash(&self) -> Decimal {
        self.transactions.last().map_or(self.initial_cash, |t| t.cash)
    }

    pub fn quantity_owned(&self, ticker: &str) -> Decimal {
        inventory::quantity_owned(&self.transactions, ticker)
    }

    /// Weighted average price of the units of `ticker` currently held; zero when flat.
    pub fn avg_purchase_price(&self, ticker: &str, include_fees: bool) -> Decimal {
        inventory::average_cost(&self.transactions, ticker, include_fees)
    }

    /// Distinct tickers in the order they first appear in the ledger.
    pub fn tickers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for t in &self.transactions {
            if !seen.contains(&t.ticker.as_str()) {
                seen.push(&t.ticker);
            }
        }
        seen
    }

    /// Buy rows, optionally restricted to one ticker.
    pub fn buys(&self, ticker: Option<&str>) -> Vec<&Transaction> {
        self.filter_rows(ticker, Transaction::is_buy)
    }

    /// Sell rows, optionally restricted to one ticker.
    pub fn sells(&self, ticker: Option<&str>) -> Vec<&Transaction> {
        self.filter_rows(ticker, Transaction::is_sell)
    }

    fn filter_rows(&self, ticker: Option<&str>, side: fn(&Transaction) -> bool) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| side(t))
            .filter(|t| ticker.is_none_or(|ticker| t.ticker == ticker))
            .collect()
    }

    /// Clears the ledger; cash reverts to the initial cash.
    pub fn reset(&mut self) {
        self.transactions.clear();
    }

    /// Buys `ticker` at `price` and appends the resulting row.
    ///
    /// Fails with `InsufficientFunds` when cost plus fee exceeds the available cash
    /// or the trade would not move any cash at all.
    pub fn buy(
        &mut self,
        ticker: &str,
        date: NaiveDate,
        price: Decimal,
        size: BuySize,
    ) -> Result<&Transaction, ExecutorError> {
        validate_price(price)?;
        let cash = self.cash();

        let quantity = match size {
            BuySize::Quantity(quantity) => {
                validate_quantity(quantity)?;
                quantity
            }
            BuySize::PercentageOfCash(percentage) => {
                validate_percentage(percentage, "percentage_of_cash")?;
                let available = truncate_to(cash * percentage / dec!(100), ROUND_TO);
                self.exchange.max_quantity(ticker, price, available)
            }
        };

        let cost = round_to(price * quantity, ROUND_TO);
        let fee = self.exchange.fee_for_buy(ticker, date, price, quantity);
        let total = cost + fee;

        if total > cash || total <= Decimal::ZERO {
            return Err(ExecutorError::InsufficientFunds {
                ticker: ticker.to_string(),
                price,
                quantity,
                cost,
                fee,
                cash,
            });
        }

        let cash_delta = -total;
        let transaction = Transaction {
            time: date,
            ticker: ticker.to_string(),
            price,
            quantity,
            cost,
            fee,
            cash_delta,
            gain: Decimal::ZERO,
            streak: 0,
            cash: round_to(cash + cash_delta, ROUND_TO),
        };

        tracing::debug!(
            ticker,
            %date,
            %price,
            %quantity,
            %cost,
            %fee,
            cash = %transaction.cash,
            venue = self.exchange.name(),
            "Buy booked"
        );
        Ok(self.append(transaction))
    }

    /// Sells `ticker` at `price` and appends the resulting row with its realized
    /// gain and win/loss streak.
    ///
    /// Fails with `InsufficientShares` when more than the owned quantity is
    /// requested or the request resolves to nothing to sell.
    pub fn sell(
        &mut self,
        ticker: &str,
        date: NaiveDate,
        price: Decimal,
        size: SellSize,
    ) -> Result<&Transaction, ExecutorError> {
        validate_price(price)?;
        let cash = self.cash();
        let owned = self.quantity_owned(ticker);

        let quantity = match size {
            SellSize::Quantity(quantity) => {
                validate_quantity(quantity)?;
                quantity
            }
            SellSize::PercentageOfShares(percentage) => {
                validate_percentage(percentage, "percentage_of_shares")?;
                truncate_to(owned * percentage / dec!(100), ROUND_TO)
            }
        };

        let fee = self.exchange.fee_for_sell(ticker, date, price, quantity);

        if owned < quantity || quantity.is_zero() {
            return Err(ExecutorError::InsufficientShares {
                ticker: ticker.to_string(),
                price,
                quantity,
                fee,
                owned,
            });
        }

        let cost = round_to(price * quantity, ROUND_TO);
        let cash_delta = cost - fee;

        // The basis must be taken before this sell joins the log.
        let avg_cost = self.avg_purchase_price(ticker, true);
        let gain = round_to(cash_delta - avg_cost * quantity, ROUND_TO);
        let streak = self.next_streak(ticker, gain);

        let transaction = Transaction {
            time: date,
            ticker: ticker.to_string(),
            price,
            quantity: -quantity,
            cost,
            fee,
            cash_delta,
            gain,
            streak,
            cash: round_to(cash + cash_delta, ROUND_TO),
        };

        tracing::debug!(
            ticker,
            %date,
            %price,
            %quantity,
            %cost,
            %fee,
            %gain,
            streak,
            cash = %transaction.cash,
            venue = self.exchange.name(),
            "Sell booked"
        );
        Ok(self.append(transaction))
    }

    /// Streak of a new sell of `ticker`: one more than the previous sell's when
    /// both land in the same win/loss bucket, otherwise a fresh run of one.
    fn next_streak(&self, ticker: &str, gain: Decimal) -> u32 {
        let previous = self
            .transactions
            .iter()
            .rev()
            .find(|t| t.ticker == ticker && t.is_sell());

        match previous {
            Some(previous) if Outcome::of(previous.gain) == Outcome::of(gain) => previous.streak + 1,
            _ => 1,
        }
    }

    fn append(&mut self, transaction: Transaction) -> &Transaction {
        self.transactions.push(transaction);
        &self.transactions[self.transactions.len() - 1]
    }
}

fn validate_price(price: Decimal) -> Result<(), ExecutorError> {
    if price <= Decimal::ZERO {
        return Err(ExecutorError::InvalidArguments(format!("price must be greater than 0, got {}", price)));
    }
    Ok(())
}

fn validate_quantity(quantity: Decimal) -> Result<(), ExecutorError> {
    if quantity < Decimal::ZERO {
        return Err(ExecutorError::InvalidArguments(format!("quantity must not be negative, got {}", quantity)));
    }
    Ok(())
}

fn validate_percentage(percentage: Decimal, name: &str) -> Result<(), ExecutorError> {
    if percentage < Decimal::ZERO || percentage > dec!(100) {
        return Err(ExecutorError::InvalidArguments(format!(
            "{} must be between 0 and 100, got {}",
            name, percentage
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{FreeExchange, TakerFeeExchange};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 12, day).unwrap()
    }

    fn free(cash: Decimal) -> Portfolio {
        Portfolio::new(Arc::new(FreeExchange::new()), cash).unwrap()
    }

    fn coinbase(cash: Decimal) -> Portfolio {
        Portfolio::new(Arc::new(TakerFeeExchange::coinbase()), cash).unwrap()
    }

    #[test]
    fn buy_books_cost_and_cash() {
        let mut portfolio = free(dec!(10000));

        let row = portfolio.buy("BTC", d(23), dec!(40000), BuySize::Quantity(dec!(0.125))).unwrap();
        assert_eq!(
            (row.time, row.ticker.as_str(), row.price, row.quantity, row.cost, row.fee, row.cash),
            (d(23), "BTC", dec!(40000), dec!(0.125), dec!(5000), dec!(0), dec!(5000))
        );
        assert_eq!(portfolio.cash(), dec!(5000));

        let err = portfolio.buy("BTC", d(24), dec!(40000), BuySize::Quantity(dec!(1))).unwrap_err();
        assert!(matches!(err, ExecutorError::InsufficientFunds { .. }));

        let row = portfolio.buy("ETH", d(24), dec!(5000), BuySize::Quantity(dec!(0.75))).unwrap();
        assert_eq!((row.cost, row.fee, row.cash), (dec!(3750), dec!(0), dec!(1250)));
        assert_eq!(portfolio.cash(), dec!(1250));
        assert_eq!(portfolio.len(), 2);
    }

    #[test]
    fn buy_with_percentage_of_cash() {
        let mut portfolio = free(dec!(10000));

        let row = portfolio.buy("BTC", d(23), dec!(40000), BuySize::PercentageOfCash(dec!(50))).unwrap();
        assert_eq!((row.quantity, row.cost, row.cash), (dec!(0.125), dec!(5000), dec!(5000)));

        let row = portfolio.buy("BTC", d(24), dec!(40000), BuySize::PercentageOfCash(dec!(50))).unwrap();
        assert_eq!((row.quantity, row.cost, row.cash), (dec!(0.0625), dec!(2500), dec!(2500)));

        let row = portfolio.buy("BTC", d(25), dec!(40000), BuySize::PercentageOfCash(dec!(100))).unwrap();
        assert_eq!((row.quantity, row.cost, row.cash), (dec!(0.0625), dec!(2500), dec!(0)));

        let err = portfolio.buy("BTC", d(26), dec!(40000), BuySize::PercentageOfCash(dec!(100))).unwrap_err();
        assert!(matches!(err, ExecutorError::InsufficientFunds { .. }));
        assert_eq!(portfolio.len(), 3);
    }

    #[test]
    fn all_in_buy_with_unrounded_cash_does_not_overspend() {
        let mut portfolio = free(dec!(13581.828871282001));
        let row = portfolio
            .buy("BTC", NaiveDate::from_ymd_opt(2020, 9, 1).unwrap(), dec!(10933.09), BuySize::PercentageOfCash(dec!(100)))
            .unwrap();
        assert_eq!((row.quantity, row.cost, row.cash), (dec!(1.2422), dec!(13581.0844), dec!(0.7445)));

        let mut portfolio = coinbase(dec!(13581.828871282001));
        let row = portfolio
            .buy("BTC", NaiveDate::from_ymd_opt(2020, 9, 1).unwrap(), dec!(10933.09), BuySize::PercentageOfCash(dec!(100)))
            .unwrap();
        assert_eq!((row.quantity, row.cost, row.fee, row.cash), (dec!(1.2348), dec!(13500.1795), dec!(81.0011), dec!(0.6483)));
    }

    #[test]
    fn coinbase_buy_charges_taker_fee() {
        let mut portfolio = coinbase(dec!(10000));

        let row = portfolio.buy("BTC", d(23), dec!(40000), BuySize::Quantity(dec!(0.125))).unwrap();
        assert_eq!((row.cost, row.fee, row.cash_delta, row.cash), (dec!(5000), dec!(30), dec!(-5030), dec!(4970)));

        assert!(portfolio.buy("BTC", d(24), dec!(40000), BuySize::Quantity(dec!(1))).is_err());

        let row = portfolio.buy("ETH", d(24), dec!(5000), BuySize::Quantity(dec!(0.75))).unwrap();
        assert_eq!((row.cost, row.fee, row.cash), (dec!(3750), dec!(22.5), dec!(1197.5)));
    }

    #[test]
    fn size_requires_exactly_one_of_quantity_or_percentage() {
        assert!(matches!(
            BuySize::from_options(Some(dec!(0.125)), Some(dec!(50))),
            Err(ExecutorError::InvalidArguments(_))
        ));
        assert!(BuySize::from_options(None, None).is_err());
        assert_eq!(BuySize::from_options(None, Some(dec!(50))), Ok(BuySize::PercentageOfCash(dec!(50))));

        assert!(SellSize::from_options(Some(dec!(1)), Some(dec!(1))).is_err());
        assert!(SellSize::from_options(None, None).is_err());
        assert_eq!(SellSize::from_options(Some(dec!(1)), None), Ok(SellSize::Quantity(dec!(1))));
    }

    #[test]
    fn out_of_range_arguments_are_rejected() {
        let mut portfolio = free(dec!(10000));
        let sizes = [
            (dec!(0), BuySize::Quantity(dec!(1))),
            (dec!(100), BuySize::Quantity(dec!(-1))),
            (dec!(100), BuySize::PercentageOfCash(dec!(101))),
            (dec!(100), BuySize::PercentageOfCash(dec!(-5))),
        ];
        for (price, size) in sizes {
            let result = portfolio.buy("BTC", d(23), price, size).map(|_| ());
            assert!(matches!(result, Err(ExecutorError::InvalidArguments(_))));
        }
        let result = portfolio.sell("BTC", d(23), dec!(100), SellSize::Quantity(dec!(-1))).map(|_| ());
        assert!(matches!(result, Err(ExecutorError::InvalidArguments(_))));
        assert!(portfolio.is_empty());
    }

    #[test]
    fn zero_cash_portfolio_cannot_be_created() {
        assert_eq!(
            Portfolio::new(Arc::new(FreeExchange::new()), dec!(0)).unwrap_err(),
            ExecutorError::InvalidInitialCash(dec!(0))
        );
    }

    #[test]
    fn quantity_owned_sums_signed_quantities() {
        let mut portfolio = free(dec!(20000));
        portfolio.buy("BTC", d(23), dec!(40000), BuySize::Quantity(dec!(0.125))).unwrap();
        portfolio.buy("BTC", d(23), dec!(40000), BuySize::Quantity(dec!(0.125))).unwrap();
        assert_eq!(portfolio.quantity_owned("BTC"), dec!(0.25));

        portfolio.sell("BTC", d(24), dec!(40000), SellSize::Quantity(dec!(0.1))).unwrap();
        assert_eq!(portfolio.quantity_owned("BTC"), dec!(0.15));
        assert_eq!(portfolio.quantity_owned("ETH"), dec!(0));
    }

    #[test]
    fn sell_requires_owned_shares() {
        let mut portfolio = free(dec!(10000));
        assert!(matches!(
            portfolio.sell("BTC", d(23), dec!(40000), SellSize::Quantity(dec!(1))),
            Err(ExecutorError::InsufficientShares { .. })
        ));

        portfolio.buy("BTC", d(23), dec!(40000), BuySize::Quantity(dec!(0.25))).unwrap();
        assert!(portfolio.sell("BTC", d(23), dec!(40000), SellSize::Quantity(dec!(1))).is_err());
        assert_eq!(portfolio.len(), 1);

        portfolio.sell("BTC", d(24), dec!(45000), SellSize::Quantity(dec!(0.125))).unwrap();
        assert_eq!(portfolio.cash(), dec!(5625));
    }

    #[test]
    fn sell_with_percentage_of_shares() {
        let mut portfolio = free(dec!(10000));
        portfolio.buy("BTC", d(23), dec!(40000), BuySize::PercentageOfCash(dec!(50))).unwrap();

        let row = portfolio.sell("BTC", d(24), dec!(40000), SellSize::PercentageOfShares(dec!(50))).unwrap();
        assert_eq!((row.quantity, row.cost, row.fee, row.cash), (dec!(-0.0625), dec!(2500), dec!(0), dec!(7500)));

        let row = portfolio.sell("BTC", d(25), dec!(40000), SellSize::PercentageOfShares(dec!(100))).unwrap();
        assert_eq!((row.quantity, row.cost, row.cash), (dec!(-0.0625), dec!(2500), dec!(10000)));
        assert_eq!(portfolio.cash(), dec!(10000));

        // Nothing left to sell.
        assert!(matches!(
            portfolio.sell("BTC", d(26), dec!(40000), SellSize::PercentageOfShares(dec!(100))),
            Err(ExecutorError::InsufficientShares { .. })
        ));
    }

    #[test]
    fn coinbase_sell_truncates_fee_and_books_gain() {
        let mut portfolio = coinbase(dec!(10000));
        portfolio.buy("BTC", d(23), dec!(40000), BuySize::Quantity(dec!(0.20))).unwrap();

        let row = portfolio.sell("BTC", d(24), dec!(45000), SellSize::Quantity(dec!(0.125))).unwrap();
        assert_eq!((row.cost, row.fee, row.cash_delta), (dec!(5625), dec!(33.75), dec!(5591.25)));
        // basis is (40000 + 48) per unit with fees
        assert_eq!((row.gain, row.streak), (dec!(585.25), 1));
        assert_eq!(portfolio.cash(), dec!(7543.25));
    }

    #[test]
    fn gain_uses_fee_inclusive_weighted_basis() {
        let mut portfolio = coinbase(dec!(10000));
        portfolio.buy("BTC", d(1), dec!(35000), BuySize::Quantity(dec!(0.1125))).unwrap();
        portfolio.buy("BTC", d(2), dec!(40000), BuySize::Quantity(dec!(0.1125))).unwrap();
        assert_eq!(portfolio.avg_purchase_price("BTC", false), dec!(37500));
        assert_eq!(portfolio.avg_purchase_price("BTC", true), dec!(37525.3125));

        let row = portfolio.sell("BTC", d(3), dec!(41000), SellSize::Quantity(dec!(0.1125))).unwrap();
        assert_eq!((row.fee, row.cash_delta), (dec!(27.675), dec!(4584.825)));
        assert_eq!((row.gain, row.streak), (dec!(363.2273), 1));
        assert_eq!(portfolio.cash(), dec!(6096.7));
    }

    #[test]
    fn reset_restores_initial_cash() {
        let mut portfolio = coinbase(dec!(10000));
        portfolio.buy("BTC", d(23), dec!(40000), BuySize::Quantity(dec!(0.125))).unwrap();
        portfolio.sell("BTC", d(24), dec!(41000), SellSize::PercentageOfShares(dec!(100))).unwrap();

        portfolio.reset();
        assert!(portfolio.is_empty());
        assert_eq!(portfolio.cash(), dec!(10000));

        portfolio.reset();
        assert_eq!(portfolio.len(), 0);
        assert_eq!(portfolio.cash(), portfolio.initial_cash());
    }

    #[test]
    fn filtered_views_split_by_side_and_ticker() {
        let mut portfolio = free(dec!(10000));
        portfolio.buy("BTC", d(1), dec!(100), BuySize::Quantity(dec!(2))).unwrap();
        portfolio.buy("ETH", d(1), dec!(10), BuySize::Quantity(dec!(5))).unwrap();
        portfolio.sell("BTC", d(2), dec!(110), SellSize::Quantity(dec!(1))).unwrap();

        assert_eq!(portfolio.buys(None).len(), 2);
        assert_eq!(portfolio.buys(Some("ETH")).len(), 1);
        assert_eq!(portfolio.sells(None).len(), 1);
        assert!(portfolio.sells(Some("ETH")).is_empty());
        assert_eq!(portfolio.tickers(), vec!["BTC", "ETH"]);
    }
}
