// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{AnalysisDefaults, Config, ProviderConfig, ServerConfig};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file if one exists, layers `MERIDIAN__*` environment
/// variables on top (e.g. `MERIDIAN__SERVER__PORT=8080`), deserializes the
/// result into our strongly-typed `Config` struct, and validates it. A
/// missing file is fine; every setting has a default.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml").required(false))
        .add_source(config::Environment::with_prefix("MERIDIAN").separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_file_falls_back_to_defaults() {
        let config = parse("");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.provider.base_url, "https://query1.finance.yahoo.com");
        assert_eq!(config.analysis.lookback_days, 365);
        assert_eq!(config.analysis.risk_free_rate, 0.0);
        assert!(config.analysis.export_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_unnamed_defaults() {
        let config = parse(
            r#"
            [server]
            port = 8080

            [analysis]
            risk_free_rate = 0.04
            "#,
        );
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.analysis.risk_free_rate, 0.04);
        assert_eq!(config.analysis.lookback_days, 365);
    }

    #[test]
    fn validation_rejects_nonsense_settings() {
        let config = parse("[analysis]\nlookback_days = 0\n");
        assert!(config.validate().is_err());

        let config = parse("[provider]\nbase_url = \"\"\n");
        assert!(config.validate().is_err());
    }
}
