//! Application configuration module
//!
//! This module provides type-safe configuration loading from an optional
//! config file and environment variables using the `config` and `dotenvy`
//! crates. Environment variables use the `SESP_MCDM` prefix and nested
//! values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use sesp_mcdm::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("AHP sensitivity: ±{}", config.analysis.ahp_variation);
//! ```

mod analysis;
mod error;
mod logging;

pub use analysis::AnalysisConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;

use serde::Deserialize;
use std::path::Path;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration. Load using [`AppConfig::load()`] or [`AppConfig::load_from()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Logging configuration (filter, output format)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Analysis defaults (sensitivity variations, DEA orientation)
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `SESP_MCDM__LOGGING__LEVEL=debug` -> `logging.level = "debug"`
    /// - `SESP_MCDM__ANALYSIS__AHP_VARIATION=0.2` -> `analysis.ahp_variation = 0.2`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from an optional file, then environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present
    /// 2. Reads the config file, if given (format chosen by extension)
    /// 3. Overlays environment variables with `SESP_MCDM` prefix
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or malformed, or values
    /// cannot be parsed into expected types.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(
                config::Environment::default()
                    .prefix("SESP_MCDM")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an empty log filter or a sensitivity
    /// variation outside (0, 1).
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.analysis.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Orientation;
    use std::env;
    use std::io::Write;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to clear environment variables after testing
    fn clear_env() {
        env::remove_var("SESP_MCDM__LOGGING__LEVEL");
        env::remove_var("SESP_MCDM__LOGGING__JSON");
        env::remove_var("SESP_MCDM__ANALYSIS__AHP_VARIATION");
        env::remove_var("SESP_MCDM__ANALYSIS__DEA_ORIENTATION");
    }

    #[test]
    fn test_load_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.logging.level, "info,sesp_mcdm=debug");
        assert_eq!(config.analysis.ahp_variation, 0.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SESP_MCDM__LOGGING__LEVEL", "warn");
        env::set_var("SESP_MCDM__ANALYSIS__AHP_VARIATION", "0.3");
        env::set_var("SESP_MCDM__ANALYSIS__DEA_ORIENTATION", "input");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.analysis.ahp_variation, 0.3);
        assert_eq!(config.analysis.dea_orientation, Orientation::Input);
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "logging:\n  level: debug\n  json: true\nanalysis:\n  topsis_variation: 0.05"
        )
        .unwrap();
        env::set_var("SESP_MCDM__LOGGING__LEVEL", "error");
        let result = AppConfig::load_from(Some(file.path()));
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.logging.level, "error");
        assert!(config.logging.json);
        assert_eq!(config.analysis.topsis_variation, 0.05);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let result = AppConfig::load_from(Some(Path::new("/nonexistent/sesp-mcdm.yaml")));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_validate_rejects_bad_variation() {
        let mut config = AppConfig::default();
        config.analysis.topsis_variation = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidVariation {
                field: "topsis_variation",
                ..
            })
        ));
    }
}
