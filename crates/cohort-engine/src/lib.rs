// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engagement analysis and content generation for the Cohort platform.
//!
//! The engine has two daily pipelines and a review surface:
//! - [`generate::ContentOrchestrator`] builds dashboard and discussion-prompt
//!   drafts from community context via an external text generator.
//! - [`flags::FlagPipeline`] classifies each member's week-over-week activity
//!   and persists engagement flags.
//! - [`review`] moves generated drafts through edit, approval, and activation.

pub mod classifier;
pub mod context;
pub mod flags;
pub mod generate;
pub mod review;
pub mod themes;

pub use flags::{AnalysisReport, FlagPipeline};
pub use generate::ContentOrchestrator;
