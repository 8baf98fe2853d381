//! Configuration validation
//!
//! Ensures configuration values are within valid ranges before any mapper is built.

use crate::{ConfigError, ConfigResult, CortimapConfig};
use cortimap_projection::PROJECTION_NAMES;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    UnknownProjection { name: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownProjection { name } => {
                write!(
                    f,
                    "Unknown projection '{}' (expected one of: {})",
                    name,
                    PROJECTION_NAMES.join(", ")
                )
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - A known default projection kind
/// - Positive kernel parameters
/// - A recognized log level
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &CortimapConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_projection(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_projection(config: &CortimapConfig, errors: &mut Vec<ConfigValidationError>) {
    let projection = &config.projection;

    if !PROJECTION_NAMES.contains(&projection.default_kind.as_str()) {
        errors.push(ConfigValidationError::UnknownProjection {
            name: projection.default_kind.clone(),
        });
    }
    if !(projection.gaussian_std.is_finite() && projection.gaussian_std > 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "projection.gaussian_std".to_string(),
            reason: format!("must be positive, got {}", projection.gaussian_std),
        });
    }
    if projection.lanczos_window == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "projection.lanczos_window".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if projection.patch_samples == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "projection.patch_samples".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_logging(config: &CortimapConfig, errors: &mut Vec<ConfigValidationError>) {
    const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("'{}' is not one of {}", config.logging.level, LEVELS.join(", ")),
        });
    }
}
