//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `AHP_ENGINE` prefix and nested values use double underscores as separators.
//! An optional file named by `AHP_ENGINE_CONFIG_FILE` sits beneath the
//! environment, so variables always win.
//!
//! # Example
//!
//! ```no_run
//! use ahp_engine::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Consistency threshold: {}", config.engine.consistency_threshold);
//! ```

mod engine;
mod error;
mod server;

pub use engine::EngineConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{LogFormat, ServerConfig};

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable naming an optional configuration file.
pub const CONFIG_FILE_VAR: &str = "AHP_ENGINE_CONFIG_FILE";

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, logging, timeouts)
    #[serde(default)]
    pub server: ServerConfig,

    /// Engine configuration (solver, consistency, simulation limits)
    #[serde(default)]
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Load configuration from the environment
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads the file named by `AHP_ENGINE_CONFIG_FILE`, if set
    /// 3. Reads environment variables with `AHP_ENGINE` prefix
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `AHP_ENGINE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `AHP_ENGINE__ENGINE__CONSISTENCY_THRESHOLD=0.1` -> `engine.consistency_threshold = 0.1`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or a value cannot be
    /// parsed into the expected type.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let file = std::env::var_os(CONFIG_FILE_VAR).map(PathBuf::from);
        Self::load_with_file(file.as_deref())
    }

    /// Load configuration from an explicit file layered beneath the environment
    pub fn load_with_file(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::default()
                    .prefix("AHP_ENGINE")
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
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ahp::PriorityMethod;
    use std::env;
    use std::io::Write;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to clear environment variables after testing
    fn clear_env() {
        env::remove_var("AHP_ENGINE__SERVER__PORT");
        env::remove_var("AHP_ENGINE__SERVER__CORS_ORIGINS");
        env::remove_var("AHP_ENGINE__SERVER__LOG_FORMAT");
        env::remove_var("AHP_ENGINE__ENGINE__CONSISTENCY_THRESHOLD");
        env::remove_var("AHP_ENGINE__ENGINE__DEFAULT_METHOD");
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load_with_file(None).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.engine.consistency_threshold, 0.10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("AHP_ENGINE__SERVER__PORT", "3000");
        env::set_var("AHP_ENGINE__SERVER__LOG_FORMAT", "json");
        env::set_var("AHP_ENGINE__ENGINE__DEFAULT_METHOD", "eigenvector");
        let result = AppConfig::load_with_file(None);
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.engine.default_method, PriorityMethod::Eigenvector);
    }

    #[test]
    fn test_invalid_cors_origin_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("AHP_ENGINE__SERVER__CORS_ORIGINS", "http://ok.example,bad\u{7f}origin");
        let result = AppConfig::load_with_file(None);
        clear_env();

        assert!(matches!(
            result.unwrap().validate(),
            Err(ValidationError::InvalidCorsOrigin(_))
        ));
    }

    #[test]
    fn test_file_is_layered_beneath_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9000\n\n[engine]\nconsistency_threshold = 0.15\nsensitivity_steps = 50"
        )
        .unwrap();

        env::set_var("AHP_ENGINE__ENGINE__CONSISTENCY_THRESHOLD", "0.2");
        let result = AppConfig::load_with_file(Some(file.path()));
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.engine.sensitivity_steps, 50);
        assert_eq!(config.engine.consistency_threshold, 0.2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let result = AppConfig::load_with_file(Some(Path::new("/nonexistent/ahp-engine.toml")));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }

    #[test]
    fn test_invalid_threshold_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("AHP_ENGINE__ENGINE__CONSISTENCY_THRESHOLD", "1.5");
        let result = AppConfig::load_with_file(None);
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidConsistencyThreshold)
        );
    }
}
