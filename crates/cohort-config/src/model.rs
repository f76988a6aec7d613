// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Cohort platform.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Cohort configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CohortConfig {
    /// Platform identity and logging settings.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Anthropic API settings for the text-generation collaborator.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Admin/trigger HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Engagement classification thresholds (tunable policy).
    #[serde(default)]
    pub engagement: EngagementConfig,

    /// Content generation tuning.
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Platform identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    /// Display name of the community program.
    #[serde(default = "default_platform_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            name: default_platform_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_platform_name() -> String {
    "cohort".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Whether to enable WAL journaling mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "cohort.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires the environment variable override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default model to use for generation requests.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// Admin/trigger HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token for admin endpoints. `None` rejects all admin calls.
    #[serde(default)]
    pub admin_token: Option<String>,

    /// Shared secret expected from the scheduled trigger.
    /// `None` rejects all cron calls.
    #[serde(default)]
    pub cron_secret: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_token: None,
            cron_secret: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8710
}

/// Engagement classification thresholds.
///
/// These bands are policy, not invariants: staff tune them per program.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngagementConfig {
    /// Fractional week-over-week decline in logins or posts that escalates to red.
    #[serde(default = "default_red_decline_ratio")]
    pub red_decline_ratio: f64,

    /// Fractional decline that yields a yellow flag.
    #[serde(default = "default_yellow_decline_ratio")]
    pub yellow_decline_ratio: f64,

    /// Fractional week-over-week improvement that yields a green flag.
    #[serde(default = "default_green_improvement_ratio")]
    pub green_improvement_ratio: f64,

    /// Active days in the first week that mark a new member as a high performer.
    #[serde(default = "default_new_member_active_days")]
    pub new_member_active_days: u32,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            red_decline_ratio: default_red_decline_ratio(),
            yellow_decline_ratio: default_yellow_decline_ratio(),
            green_improvement_ratio: default_green_improvement_ratio(),
            new_member_active_days: default_new_member_active_days(),
        }
    }
}

fn default_red_decline_ratio() -> f64 {
    0.60
}

fn default_yellow_decline_ratio() -> f64 {
    0.25
}

fn default_green_improvement_ratio() -> f64 {
    0.50
}

fn default_new_member_active_days() -> u32 {
    3
}

/// Content generation tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// How many recent discussions to feed into theme extraction.
    #[serde(default = "default_recent_discussions")]
    pub recent_discussions: u32,

    /// How many discussions the curated activity feed should contain.
    #[serde(default = "default_feed_size")]
    pub feed_size: u32,

    /// How many upcoming events to include in the context.
    #[serde(default = "default_upcoming_events")]
    pub upcoming_events: u32,

    /// Minimum view count for a discussion to be considered stuck.
    #[serde(default = "default_stuck_min_views")]
    pub stuck_min_views: u32,

    /// Maximum reply count for a discussion to be considered stuck.
    #[serde(default = "default_stuck_max_replies")]
    pub stuck_max_replies: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            recent_discussions: default_recent_discussions(),
            feed_size: default_feed_size(),
            upcoming_events: default_upcoming_events(),
            stuck_min_views: default_stuck_min_views(),
            stuck_max_replies: default_stuck_max_replies(),
        }
    }
}

fn default_recent_discussions() -> u32 {
    10
}

fn default_feed_size() -> u32 {
    5
}

fn default_upcoming_events() -> u32 {
    5
}

fn default_stuck_min_views() -> u32 {
    25
}

fn default_stuck_max_replies() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_documented_thresholds() {
        let config = CohortConfig::default();
        assert_eq!(config.engagement.red_decline_ratio, 0.60);
        assert_eq!(config.engagement.yellow_decline_ratio, 0.25);
        assert_eq!(config.engagement.green_improvement_ratio, 0.50);
        assert_eq!(config.engagement.new_member_active_days, 3);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = r#"
[platform]
name = "leaders"
naem = "typo"
"#;
        let result = toml::from_str::<CohortConfig>(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn gateway_secrets_default_to_none() {
        let config = CohortConfig::default();
        assert!(config.gateway.admin_token.is_none());
        assert!(config.gateway.cron_secret.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[storage]
database_path = "/var/lib/cohort/cohort.db"

[gateway]
admin_token = "secret"
"#;
        let config: CohortConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.storage.database_path, "/var/lib/cohort/cohort.db");
        assert!(config.storage.wal_mode);
        assert_eq!(config.gateway.admin_token.as_deref(), Some("secret"));
        assert_eq!(config.gateway.port, 8710);
        assert_eq!(config.generation.feed_size, 5);
    }
}
