//! # Tally Analytics Engine
//!
//! This crate turns a finished portfolio into a performance summary. It acts as the
//! "unbiased judge" of a run.
//!
//! ## Architectural Principles
//!
//! - **Read-only:** The `AnalyticsEngine` never mutates a portfolio. Every figure is
//!   taken from the ledger or from the statistics the `Portfolio` already derives.
//! - **Stateless Calculation:** The engine holds no state between calls, which makes it
//!   easy to test and safe to reuse across runs.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `PerformanceReport`: The serializable struct that holds all performance metrics.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use report::PerformanceReport;
