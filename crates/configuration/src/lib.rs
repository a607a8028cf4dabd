use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{Config, ExchangeSettings, Simulation, VenuePreset};

/// Prefix for environment overrides, e.g. `TALLY__SIMULATION__INITIAL_CASH=5000`.
pub const ENV_PREFIX: &str = "TALLY";

/// Loads the application configuration.
///
/// Reads `path` when given (it must exist), otherwise an optional `config.toml` in the
/// working directory, then layers `TALLY__*` environment variables on top. Missing
/// sections fall back to their defaults. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config.toml").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}
