pub mod enums;
pub mod error;
pub mod precision;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Outcome, TradeSide};
pub use error::CoreError;
pub use precision::{ROUND_TO, round_to, truncate_to};
pub use structs::{PriceBar, Transaction};
