//! Performance statistics derived from a portfolio's sell rows.
//!
//! A sell with a non-negative gain is a win, a negative gain a loss. Averages over
//! an empty set are `None`; maxima over an empty set are zero.

use crate::portfolio::Portfolio;
use core_types::{Outcome, ROUND_TO, Transaction, round_to};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

impl Portfolio {
    /// Net change of cash against the initial cash, as a percentage rounded to four places.
    pub fn net_performance(&self) -> Decimal {
        let initial = self.initial_cash();
        round_to((self.cash() - initial) / initial * dec!(100), ROUND_TO)
    }

    /// Sells with a gain of zero or more.
    pub fn wins(&self) -> Vec<&Transaction> {
        self.sells_with(Outcome::Win)
    }

    /// Sells with a negative gain.
    pub fn losses(&self) -> Vec<&Transaction> {
        self.sells_with(Outcome::Loss)
    }

    pub fn avg_win_streak(&self) -> Option<Decimal> {
        mean(self.wins().iter().map(|t| Decimal::from(t.streak)))
    }

    pub fn max_win_streak(&self) -> u32 {
        self.wins().iter().map(|t| t.streak).max().unwrap_or(0)
    }

    pub fn avg_loss_streak(&self) -> Option<Decimal> {
        mean(self.losses().iter().map(|t| Decimal::from(t.streak)))
    }

    pub fn max_loss_streak(&self) -> u32 {
        self.losses().iter().map(|t| t.streak).max().unwrap_or(0)
    }

    pub fn avg_win(&self) -> Option<Decimal> {
        mean(self.wins().iter().map(|t| t.gain))
    }

    pub fn avg_loss(&self) -> Option<Decimal> {
        mean(self.losses().iter().map(|t| t.gain))
    }

    /// Mean gain over every sell.
    pub fn avg_return(&self) -> Option<Decimal> {
        mean(self.sells(None).iter().map(|t| t.gain))
    }

    /// `avg_win / avg_loss`. Losses are negative, so the ratio usually is too.
    pub fn reward_to_risk_ratio(&self) -> Option<Decimal> {
        let avg_win = self.avg_win()?;
        let avg_loss = self.avg_loss()?;
        avg_win.checked_div(avg_loss)
    }

    fn sells_with(&self, outcome: Outcome) -> Vec<&Transaction> {
        self.sells(None)
            .into_iter()
            .filter(|t| Outcome::of(t.gain) == outcome)
            .collect()
    }
}

fn mean(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    let (sum, count) = values.fold((Decimal::ZERO, 0u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / Decimal::from(count))
}
