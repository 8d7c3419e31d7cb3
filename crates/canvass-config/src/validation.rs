// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL schemes and non-zero limits.

use crate::diagnostic::ConfigError;
use crate::model::CanvassConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CanvassConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let url = config.store.url.trim();
    if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(ConfigError::Validation {
            message: format!("store.url `{url}` must start with http:// or https://"),
        });
    }

    if config.store.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "store.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.console.max_cycle_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "console.max_cycle_attempts must be at least 1".to_string(),
        });
    }

    if config.export.csv_file_name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "export.csv_file_name must not be empty".to_string(),
        });
    }

    if config.export.recent_history_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "export.recent_history_limit must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = CanvassConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn non_http_url_fails_validation() {
        let mut config = CanvassConfig::default();
        config.store.url = "ftp://example.com/data".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("store.url"))));
    }

    #[test]
    fn zero_limits_fail_validation_together() {
        let mut config = CanvassConfig::default();
        config.store.timeout_secs = 0;
        config.console.max_cycle_attempts = 0;
        config.export.recent_history_limit = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = CanvassConfig::default();
        config.store.url = "https://bot.example.com/api/data".to_string();
        config.console.max_cycle_attempts = 3;
        assert!(validate_config(&config).is_ok());
    }
}
