use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: Simulation,
}

impl Config {
    /// Rejects values the ledger would refuse at construction or that make no sense as a fee.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cash = self.simulation.initial_cash;
        if cash <= Decimal::ZERO {
            return Err(ConfigError::ValidationError {
                key: "simulation.initial_cash",
                reason: format!("must be greater than 0, got {cash}"),
            });
        }
        if let ExchangeSettings::TakerFee { name, taker_fee_pct } = &self.simulation.exchange {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    key: "simulation.exchange.name",
                    reason: "a taker-fee venue needs a name".to_string(),
                });
            }
            if *taker_fee_pct < Decimal::ZERO || *taker_fee_pct >= Decimal::ONE {
                return Err(ConfigError::ValidationError {
                    key: "simulation.exchange.taker_fee_pct",
                    reason: format!("must be in [0, 1), got {taker_fee_pct}"),
                });
            }
        }
        Ok(())
    }
}

/// Contains parameters for a simulated trading run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// The starting cash balance of the portfolio.
    pub initial_cash: Decimal,
    /// The fee model applied to every buy and sell.
    pub exchange: ExchangeSettings,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            initial_cash: dec!(10000),
            exchange: ExchangeSettings::default(),
        }
    }
}

/// Selects and parameterizes the exchange fee model.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExchangeSettings {
    /// No fees on either side.
    Free,
    /// The Coinbase taker schedule (0.60%).
    #[default]
    Coinbase,
    /// A custom venue charging a flat taker percentage.
    TakerFee {
        name: String,
        /// The trading fee charged on every fill.
        /// 0.006 corresponds to 0.60%.
        taker_fee_pct: Decimal,
    },
}

/// Built-in venues that can be picked from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum VenuePreset {
    Free,
    Coinbase,
}

impl From<VenuePreset> for ExchangeSettings {
    fn from(preset: VenuePreset) -> Self {
        match preset {
            VenuePreset::Free => ExchangeSettings::Free,
            VenuePreset::Coinbase => ExchangeSettings::Coinbase,
        }
    }
}
