// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Cohort community platform.
//!
//! This crate provides the shared error type, domain types, and the
//! text-generation collaborator trait used throughout the Cohort workspace.

pub mod error;
pub mod generator;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CohortError;
pub use generator::{GenerationRequest, TextGenerator};
pub use types::{
    ActionCategory, CommunityContext, ContentType, DiscussionSummary, EngagementLevel,
    EventSummary, FlagContext, FlagType, PracticeAction, ProgramState, WeeklyMetrics,
};
