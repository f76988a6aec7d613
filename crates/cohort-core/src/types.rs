// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types used across the Cohort pipeline crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Risk/engagement tier assigned to a member by the classifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FlagType {
    Red,
    Yellow,
    Green,
}

/// Community-wide engagement band derived from active/total member counts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    High,
    Medium,
    Low,
}

impl EngagementLevel {
    /// Band the active/total member ratio: >= 70% high, >= 40% medium, else low.
    ///
    /// A community with no members at all is `Low`.
    pub fn from_member_counts(active: u64, total: u64) -> Self {
        if total == 0 {
            return EngagementLevel::Low;
        }
        let ratio = active as f64 / total as f64;
        if ratio >= 0.70 {
            EngagementLevel::High
        } else if ratio >= 0.40 {
            EngagementLevel::Medium
        } else {
            EngagementLevel::Low
        }
    }
}

/// Kind of generated content stored in a dashboard content row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    FullDashboard,
    DiscussionPrompt,
}

/// Category of a personalized practice action.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Connect,
    Reflect,
    Engage,
    Practice,
    Read,
}

/// One personalized, prioritized practice action for a member.
///
/// Actions are produced as a ranked list; priority 1 is the most important.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeAction {
    pub action: String,
    pub why: String,
    pub priority: u32,
    pub category: ActionCategory,
}

/// Where the program currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramState {
    pub current_week: u32,
    pub current_module: String,
}

/// A recent discussion, as seen by the context gatherer and the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionSummary {
    pub title: String,
    pub content: String,
    pub author: String,
}

/// An upcoming community event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub title: String,
    /// ISO 8601 timestamp.
    pub start_time: String,
}

/// Snapshot of community state gathered fresh for each generation run.
///
/// Transient by design: built from four independent reads and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityContext {
    pub program_state: ProgramState,
    pub discussions: Vec<DiscussionSummary>,
    pub upcoming_events: Vec<EventSummary>,
    pub active_users: u64,
    pub total_users: u64,
}

/// Per-member weekly metrics fed into practice-action generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyMetrics {
    pub user_id: String,
    pub days_active: u32,
    pub posts: u64,
    pub responses: u64,
    pub modules_completed: u64,
    pub last_partner_interaction: Option<String>,
}

/// The raw numbers that justified an engagement flag, kept for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagContext {
    pub logins_past_week: u32,
    pub logins_previous_week: u32,
    pub posts_past_week: u64,
    pub posts_previous_week: u64,
    pub responses_past_week: u64,
    /// False when the member has no previous-week snapshots at all.
    pub has_baseline: bool,
    pub last_login: Option<String>,
    pub last_partner_interaction: Option<String>,
}
