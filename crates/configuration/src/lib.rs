// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{AnalysisConfig, BacktestParams, GradingParams, SignalParams};

/// Loads the analysis configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file, deserializes it into our strongly-typed
/// `AnalysisConfig` struct, and returns it. Every parameter struct also
/// implements `Default` with the engine's stock constants, so library users
/// can run without a file at all.
pub fn load_config() -> Result<AnalysisConfig, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml"))
        .build()?;

    let config = builder.try_deserialize::<AnalysisConfig>()?;
    config.validate()?;

    Ok(config)
}
