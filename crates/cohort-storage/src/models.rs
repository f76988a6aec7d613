// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for storage entities.
//!
//! Lifecycle and classification fields are stored as their string forms;
//! the engine converts to and from the typed enums in `cohort-core` at the
//! boundary.

use serde::{Deserialize, Serialize};

/// A program participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub display_name: String,
    pub active: bool,
    pub modules_completed: i64,
    pub joined_at: String,
}

/// One day's aggregated activity counters for one member.
///
/// Written by the external snapshot collaborator; immutable to this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementSnapshot {
    pub user_id: String,
    /// Calendar day, `YYYY-MM-DD`.
    pub snapshot_date: String,
    pub logins_count: i64,
    pub posts_count: i64,
    pub responses_count: i64,
    pub last_login: Option<String>,
    pub last_partner_interaction: Option<String>,
}

/// A persisted engagement flag. Append-only; `resolved` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementFlagRow {
    pub id: String,
    pub user_id: String,
    pub flag_type: String,
    pub reason: String,
    /// JSON serialization of `cohort_core::FlagContext`.
    pub context: String,
    pub resolved: bool,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

/// A generated content bundle moving through the review lifecycle.
///
/// Lifecycle is the (approved, active) pair: draft (false, false) ->
/// approved-inactive (true, false) -> active (true, true).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardContentRow {
    pub id: String,
    pub content_type: String,
    /// JSON body shown to end users once active.
    pub content: String,
    /// JSON audit record of the inputs that produced this content.
    pub generation_context: String,
    pub approved: bool,
    pub active: bool,
    pub generated_at: String,
}

/// A community discussion thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub view_count: i64,
    pub reply_count: i64,
    pub created_at: String,
}

/// An upcoming community event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start_time: String,
}

/// The single-row program state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSettings {
    pub current_week: i64,
    pub current_module: String,
}
