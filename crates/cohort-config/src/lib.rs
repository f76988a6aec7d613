// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Cohort platform.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, environment variable
//! overrides, and diagnostic error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use cohort_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Platform: {}", config.platform.name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::CohortConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to miette diagnostics with typo suggestions
pub fn load_and_validate() -> Result<CohortConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<CohortConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_toml_loads_and_validates() {
        let config = load_and_validate_str(
            r#"
[platform]
name = "leadership-spring"

[gateway]
admin_token = "admin"
cron_secret = "cron"
"#,
        )
        .unwrap();
        assert_eq!(config.platform.name, "leadership-spring");
        assert_eq!(config.gateway.cron_secret.as_deref(), Some("cron"));
    }

    #[test]
    fn validation_errors_are_collected() {
        let errors = load_and_validate_str(
            r#"
[storage]
database_path = ""

[generation]
feed_size = 0
"#,
        )
        .unwrap_err();
        assert!(errors.len() >= 2, "expected both errors, got {errors:?}");
    }
}
