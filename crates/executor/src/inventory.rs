//! Cost-basis reconstruction from the transaction log.
//!
//! There is no separate position table. The units still held of a ticker are
//! recovered by laying its sells out in front of its buys and running a
//! cumulative sum of signed quantity over that sequence: sells push the sum
//! below zero, and the buys that first bring it back above zero are exactly the
//! lots already sold off. Whatever volume sits in `(0, owned]` is the inventory
//! still held, oldest lots consumed first.

use core_types::Transaction;
use rust_decimal::Decimal;

/// The part of one buy row that is still held.
#[derive(Debug, Clone, PartialEq)]
pub struct HeldLot {
    pub price: Decimal,
    pub fee: Decimal,
    /// Units of this buy not yet matched against a sell.
    pub quantity: Decimal,
}

/// Sum of all signed quantities logged for `ticker`.
pub fn quantity_owned(transactions: &[Transaction], ticker: &str) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.ticker == ticker)
        .map(|t| t.quantity)
        .sum()
}

/// The buy lots of `ticker` that are still held, in purchase order.
pub fn held_lots(transactions: &[Transaction], ticker: &str) -> Vec<HeldLot> {
    let owned = quantity_owned(transactions, ticker);
    if owned <= Decimal::ZERO {
        return Vec::new();
    }

    let rows = transactions.iter().filter(|t| t.ticker == ticker);
    let sells_then_buys = rows.clone().filter(|t| t.is_sell()).chain(rows.filter(|t| t.is_buy()));

    let mut lots = Vec::new();
    let mut cumulative = Decimal::ZERO;
    for row in sells_then_buys {
        let before = cumulative;
        cumulative += row.quantity;

        // Clip the row to the part of it lying inside (0, owned].
        let held = cumulative.min(owned) - before.max(Decimal::ZERO);
        if row.is_buy() && held > Decimal::ZERO {
            lots.push(HeldLot { price: row.price, fee: row.fee, quantity: held });
        }
    }
    lots
}

/// Volume-weighted average price of the units of `ticker` currently held.
///
/// With `include_fees` each lot's price is raised by the fee booked on that buy
/// row. Returns zero when nothing is held.
pub fn average_cost(transactions: &[Transaction], ticker: &str, include_fees: bool) -> Decimal {
    let lots = held_lots(transactions, ticker);

    let volume: Decimal = lots.iter().map(|lot| lot.quantity).sum();
    if volume.is_zero() {
        return Decimal::ZERO;
    }

    let value: Decimal = lots
        .iter()
        .map(|lot| {
            let price = if include_fees { lot.price + lot.fee } else { lot.price };
            price * lot.quantity
        })
        .sum();

    value / volume
}
