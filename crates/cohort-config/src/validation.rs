// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as threshold ordering and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::CohortConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CohortConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    for (name, value) in [
        ("red_decline_ratio", config.engagement.red_decline_ratio),
        (
            "yellow_decline_ratio",
            config.engagement.yellow_decline_ratio,
        ),
        (
            "green_improvement_ratio",
            config.engagement.green_improvement_ratio,
        ),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::Validation {
                message: format!("engagement.{name} must be within [0.0, 1.0], got {value}"),
            });
        }
    }

    if config.engagement.yellow_decline_ratio >= config.engagement.red_decline_ratio {
        errors.push(ConfigError::Validation {
            message: format!(
                "engagement.yellow_decline_ratio ({}) must be below red_decline_ratio ({})",
                config.engagement.yellow_decline_ratio, config.engagement.red_decline_ratio
            ),
        });
    }

    if config.generation.feed_size == 0 {
        errors.push(ConfigError::Validation {
            message: "generation.feed_size must be at least 1".to_string(),
        });
    }

    if config.generation.recent_discussions == 0 {
        errors.push(ConfigError::Validation {
            message: "generation.recent_discussions must be at least 1".to_string(),
        });
    }

    if config.anthropic.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "anthropic.max_tokens must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = CohortConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = CohortConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))
        ));
    }

    #[test]
    fn out_of_range_threshold_fails_validation() {
        let mut config = CohortConfig::default();
        config.engagement.red_decline_ratio = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("red_decline_ratio"))
        ));
    }

    #[test]
    fn yellow_at_or_above_red_fails_validation() {
        let mut config = CohortConfig::default();
        config.engagement.yellow_decline_ratio = 0.60;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("yellow_decline_ratio"))
        ));
    }

    #[test]
    fn zero_feed_size_fails_validation() {
        let mut config = CohortConfig::default();
        config.generation.feed_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("feed_size"))
        ));
    }

    #[test]
    fn valid_custom_config_passes() {
        let mut config = CohortConfig::default();
        config.gateway.host = "0.0.0.0".to_string();
        config.storage.database_path = "/tmp/cohort.db".to_string();
        config.engagement.red_decline_ratio = 0.75;
        assert!(validate_config(&config).is_ok());
    }
}
