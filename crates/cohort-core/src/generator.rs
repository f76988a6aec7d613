// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seam for the external text-generation collaborator.
//!
//! The orchestrator composes structured prompts and treats the collaborator
//! as a fallible, possibly slow black box. Implementations live in provider
//! crates (see `cohort-anthropic`).

use async_trait::async_trait;

use crate::error::CohortError;

/// A structured prompt sent to the text-generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Role and constraints for the generation (the system prompt).
    pub system: String,
    /// The user-content portion of the prompt.
    pub prompt: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// External text-generation collaborator.
///
/// Calls are idempotent-safe to retry, but callers in this core do not retry
/// automatically: a failure aborts the current pipeline run and is surfaced
/// to the trigger caller.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for the given structured prompt.
    async fn generate(&self, request: GenerationRequest) -> Result<String, CohortError>;
}
