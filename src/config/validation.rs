//! Configuration validation.
//!
//! This module provides validation logic for configuration values,
//! ensuring they are within acceptable ranges.

use super::Config;
use crate::error::ConfigError;

/// Minimum slow statement threshold in milliseconds.
pub const MIN_SLOW_THRESHOLD_MS: u64 = 1;

/// Maximum slow statement threshold in milliseconds (1 minute).
pub const MAX_SLOW_THRESHOLD_MS: u64 = 60_000;

/// Narrowest allowed statement preview.
pub const MIN_PREVIEW_WIDTH: usize = 20;

/// Widest allowed statement preview.
pub const MAX_PREVIEW_WIDTH: usize = 1000;

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if any value is out of range:
/// - `DATABASE_PATH` must not be empty
/// - `SLOW_QUERY_THRESHOLD_MS` must be between 1 and 60000
/// - `STATEMENT_PREVIEW_WIDTH` must be between 20 and 1000
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.database_path.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "DATABASE_PATH".into(),
            reason: "must not be empty".into(),
        });
    }

    if !(MIN_SLOW_THRESHOLD_MS..=MAX_SLOW_THRESHOLD_MS).contains(&config.slow_query_threshold_ms) {
        return Err(ConfigError::InvalidValue {
            var: "SLOW_QUERY_THRESHOLD_MS".into(),
            reason: format!(
                "must be between {MIN_SLOW_THRESHOLD_MS} and {MAX_SLOW_THRESHOLD_MS} ms"
            ),
        });
    }

    if !(MIN_PREVIEW_WIDTH..=MAX_PREVIEW_WIDTH).contains(&config.statement_preview_width) {
        return Err(ConfigError::InvalidValue {
            var: "STATEMENT_PREVIEW_WIDTH".into(),
            reason: format!("must be between {MIN_PREVIEW_WIDTH} and {MAX_PREVIEW_WIDTH}"),
        });
    }

    Ok(())
}
