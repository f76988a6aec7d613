// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Cohort platform core.

use thiserror::Error;

/// The primary error type used across the Cohort engagement and content pipeline.
#[derive(Debug, Error)]
pub enum CohortError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Text-generation collaborator errors (API failure, timeout, unparseable output).
    #[error("generator error: {message}")]
    Generator {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A content lifecycle transition that is not permitted from the current state.
    #[error("invalid transition for content {id}: {reason}")]
    InvalidTransition { id: String, reason: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
