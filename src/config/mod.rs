//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading
//! - Configuration validation
//! - Default value handling
//!
//! # Example
//!
//! ```
//! use shop_diagnostics::config::Config;
//!
//! // Create a config directly (use Config::from_env() in production)
//! let config = Config {
//!     database_path: "./data/shop.db".to_string(),
//!     log_level: "info".to_string(),
//!     debug: true,
//!     slow_query_threshold_ms: 100,
//!     statement_preview_width: 100,
//!     seed: 42,
//! };
//!
//! let diagnostics = config.diagnostics();
//! assert!(diagnostics.enabled);
//! assert_eq!(diagnostics.slow_threshold.as_millis(), 100);
//! ```

mod validation;

pub use validation::{
    validate_config, MAX_PREVIEW_WIDTH, MAX_SLOW_THRESHOLD_MS, MIN_PREVIEW_WIDTH,
    MIN_SLOW_THRESHOLD_MS,
};

use std::time::Duration;

use crate::diagnostics::DiagnosticsConfig;
use crate::error::ConfigError;

/// Default database path.
pub const DEFAULT_DATABASE_PATH: &str = "./data/shop.db";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default slow statement threshold in milliseconds.
pub const DEFAULT_SLOW_QUERY_THRESHOLD_MS: u64 = 100;

/// Default width statements are truncated to in reports.
pub const DEFAULT_STATEMENT_PREVIEW_WIDTH: usize = 100;

/// Default seed for the data generator.
pub const DEFAULT_SEED: u64 = 42;

/// Application configuration.
///
/// Use [`Config::from_env`] to load configuration from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Database path.
    pub database_path: String,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
    /// Debug mode; gates the per-request SQL report.
    pub debug: bool,
    /// Statements slower than this are reported as slow.
    pub slow_query_threshold_ms: u64,
    /// Statement text is truncated to this many characters in reports.
    pub statement_preview_width: usize,
    /// Seed for the synthetic data generator.
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            debug: false,
            slow_query_threshold_ms: DEFAULT_SLOW_QUERY_THRESHOLD_MS,
            statement_preview_width: DEFAULT_STATEMENT_PREVIEW_WIDTH,
            seed: DEFAULT_SEED,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables (with defaults):
    /// - `DATABASE_PATH`: Path to `SQLite` database (default: `./data/shop.db`)
    /// - `LOG_LEVEL`: Logging level (default: `info`)
    /// - `SHOP_DEBUG`: Enable per-request SQL reports (default: `false`)
    /// - `SLOW_QUERY_THRESHOLD_MS`: Slow statement threshold (default: `100`)
    /// - `STATEMENT_PREVIEW_WIDTH`: Report truncation width (default: `100`)
    /// - `SEED`: Data generator seed (default: `42`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value cannot be parsed or fails
    /// validation (see [`validate_config`]).
    #[must_use = "configuration should be used"]
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.into());

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into());

        let debug = parse_env_bool("SHOP_DEBUG", false)?;
        let slow_query_threshold_ms =
            parse_env_u64("SLOW_QUERY_THRESHOLD_MS", DEFAULT_SLOW_QUERY_THRESHOLD_MS)?;
        let statement_preview_width = usize::try_from(parse_env_u64(
            "STATEMENT_PREVIEW_WIDTH",
            DEFAULT_STATEMENT_PREVIEW_WIDTH as u64,
        )?)
        .map_err(|_| ConfigError::InvalidValue {
            var: "STATEMENT_PREVIEW_WIDTH".into(),
            reason: "out of range".into(),
        })?;
        let seed = parse_env_u64("SEED", DEFAULT_SEED)?;

        let config = Self {
            database_path,
            log_level,
            debug,
            slow_query_threshold_ms,
            statement_preview_width,
            seed,
        };

        validate_config(&config)?;
        Ok(config)
    }

    /// Diagnostics settings derived from this configuration.
    #[must_use]
    pub fn diagnostics(&self) -> DiagnosticsConfig {
        DiagnosticsConfig {
            enabled: self.debug,
            slow_threshold: Duration::from_millis(self.slow_query_threshold_ms),
            statement_width: self.statement_preview_width,
            ..DiagnosticsConfig::default()
        }
    }

    /// Diagnostics settings for one request, reporting when either
    /// `SHOP_DEBUG` or `force_debug` asks for it.
    #[must_use]
    pub fn request_diagnostics(&self, force_debug: bool) -> DiagnosticsConfig {
        self.diagnostics().with_enabled(self.debug || force_debug)
    }
}

/// Parse an environment variable as u64, using a default if not set.
fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a non-negative integer".into(),
        })
    })
}

/// Parse an environment variable as a boolean flag, using a default if not set.
fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        match val.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                var: name.into(),
                reason: "must be a boolean (true/false/1/0/yes/no)".into(),
            }),
        }
    })
}
