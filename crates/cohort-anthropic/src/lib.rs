// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API adapter for the Cohort text-generation seam.
//!
//! Implements [`cohort_core::TextGenerator`] over the non-streaming Messages
//! API. The pipeline treats this collaborator as a fallible black box and
//! never retries automatically.

pub mod client;
pub mod types;

pub use client::AnthropicClient;

use cohort_config::model::AnthropicConfig;
use cohort_core::CohortError;

/// Build a client from the `[anthropic]` config section.
///
/// The API key may come from the config file or the `COHORT_ANTHROPIC_API_KEY`
/// environment override; without one the client cannot be constructed.
pub fn client_from_config(config: &AnthropicConfig) -> Result<AnthropicClient, CohortError> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| CohortError::Config("anthropic.api_key is not set".to_string()))?;
    AnthropicClient::new(api_key, &config.api_version, &config.default_model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_config_requires_api_key() {
        let config = AnthropicConfig::default();
        let err = client_from_config(&config).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn client_from_config_uses_configured_model() {
        let config = AnthropicConfig {
            api_key: Some("key".into()),
            ..AnthropicConfig::default()
        };
        let client = client_from_config(&config).unwrap();
        assert_eq!(client.default_model(), "claude-sonnet-4-20250514");
    }
}
