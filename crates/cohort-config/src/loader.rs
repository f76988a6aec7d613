// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./cohort.toml` > `~/.config/cohort/cohort.toml` >
//! `/etc/cohort/cohort.toml` with environment variable overrides via the
//! `COHORT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CohortConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/cohort/cohort.toml` (system-wide)
/// 3. `~/.config/cohort/cohort.toml` (user XDG config)
/// 4. `./cohort.toml` (local directory)
/// 5. `COHORT_*` environment variables
pub fn load_config() -> Result<CohortConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CohortConfig::default()))
        .merge(Toml::file("/etc/cohort/cohort.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("cohort/cohort.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("cohort.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<CohortConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CohortConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CohortConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CohortConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `COHORT_ANTHROPIC_API_KEY` must map to
/// `anthropic.api_key`, not `anthropic.api.key`.
fn env_provider() -> Env {
    Env::prefixed("COHORT_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("platform_", "platform.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("engagement_", "engagement.", 1)
            .replacen("generation_", "generation.", 1);
        mapped.into()
    })
}
