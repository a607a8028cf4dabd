//! # Tally Executor Crate
//!
//! This crate provides the core components for trade accounting. It defines an
//! `Exchange` fee-model trait with a free and a taker-fee venue, and a `Portfolio`
//! that books buys and sells into an append-only ledger.
//!
//! ## Architectural Principles
//!
//! - **State vs. Logic Decoupling:** An `Exchange` is a pure calculator that prices a
//!   trade (fees, affordable quantity) without mutating state. The `Portfolio` is the
//!   state machine that validates a trade and appends it to the ledger.
//! - **The ledger is the only state:** cash, holdings, cost basis and every statistic
//!   are derived from the transaction log. There is no separate position table to keep
//!   in sync, so resetting or replaying the log is always consistent.
//!
//! ## Public API
//!
//! - `Exchange`: The fee-model trait, with `FreeExchange` and `TakerFeeExchange`.
//! - `Portfolio`: The ledger owner, with `buy`, `sell`, queries and statistics.
//! - `inventory`: Cost-basis reconstruction over a slice of transactions.
//! - `ExecutorError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod exchange;
pub mod inventory;
pub mod portfolio;
pub mod statistics;

// Re-export the key components to provide a clean, public-facing API.
pub use error::ExecutorError;
pub use exchange::{Exchange, FreeExchange, TakerFeeExchange, exchange_from_settings};
pub use inventory::HeldLot;
pub use portfolio::{BuySize, Portfolio, SellSize};
