// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-member engagement classification.
//!
//! Aggregates a 14-day snapshot window into week-over-week numbers, then
//! applies the configured thresholds to decide whether the member gets a
//! red, yellow, or green flag, or no flag at all. Pure once the window has
//! been aggregated, so every rule is unit-testable without a database.

use chrono::{Duration, NaiveDate};
use cohort_config::model::EngagementConfig;
use cohort_core::{CohortError, FlagContext, FlagType};
use cohort_storage::models::EngagementSnapshot;

/// Week-over-week engagement numbers for one member.
///
/// "Past week" is the 7 days ending today; "previous week" is the 7 days
/// before that. Login counts are active days, not raw login events, so a
/// member who logs in five times on one day still counts as one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEngagementData {
    pub user_id: String,
    pub logins_past_week: u32,
    pub logins_previous_week: u32,
    pub posts_past_week: u64,
    pub posts_previous_week: u64,
    pub responses_past_week: u64,
    /// False when the previous week has no snapshots at all.
    pub has_baseline: bool,
    pub last_login: Option<String>,
    pub last_partner_interaction: Option<String>,
}

impl UserEngagementData {
    /// Aggregate a member's snapshot window into week-over-week numbers.
    ///
    /// `snapshots` must cover at most the 14 days before `today`; rows
    /// outside that window are ignored. A snapshot date that does not parse
    /// as `YYYY-MM-DD` is a hard error, not a skip: a malformed window would
    /// silently misclassify.
    pub fn from_snapshots(
        user_id: &str,
        today: NaiveDate,
        snapshots: &[EngagementSnapshot],
    ) -> Result<Self, CohortError> {
        let past_start = today - Duration::days(7);
        let previous_start = today - Duration::days(14);

        let mut data = UserEngagementData {
            user_id: user_id.to_string(),
            logins_past_week: 0,
            logins_previous_week: 0,
            posts_past_week: 0,
            posts_previous_week: 0,
            responses_past_week: 0,
            has_baseline: false,
            last_login: None,
            last_partner_interaction: None,
        };

        for snapshot in snapshots {
            let date = NaiveDate::parse_from_str(&snapshot.snapshot_date, "%Y-%m-%d").map_err(
                |e| {
                    CohortError::Internal(format!(
                        "malformed snapshot date {:?} for user {}: {e}",
                        snapshot.snapshot_date, user_id
                    ))
                },
            )?;

            if date >= past_start {
                if snapshot.logins_count > 0 {
                    data.logins_past_week += 1;
                }
                data.posts_past_week += snapshot.posts_count.max(0) as u64;
                data.responses_past_week += snapshot.responses_count.max(0) as u64;
            } else if date >= previous_start {
                data.has_baseline = true;
                if snapshot.logins_count > 0 {
                    data.logins_previous_week += 1;
                }
                data.posts_previous_week += snapshot.posts_count.max(0) as u64;
            }

            if let Some(login) = &snapshot.last_login {
                if data.last_login.as_deref().is_none_or(|seen| seen < login.as_str()) {
                    data.last_login = Some(login.clone());
                }
            }
            if let Some(interaction) = &snapshot.last_partner_interaction {
                if data
                    .last_partner_interaction
                    .as_deref()
                    .is_none_or(|seen| seen < interaction.as_str())
                {
                    data.last_partner_interaction = Some(interaction.clone());
                }
            }
        }

        Ok(data)
    }

    fn context(&self) -> FlagContext {
        FlagContext {
            logins_past_week: self.logins_past_week,
            logins_previous_week: self.logins_previous_week,
            posts_past_week: self.posts_past_week,
            posts_previous_week: self.posts_previous_week,
            responses_past_week: self.responses_past_week,
            has_baseline: self.has_baseline,
            last_login: self.last_login.clone(),
            last_partner_interaction: self.last_partner_interaction.clone(),
        }
    }
}

/// A classification decision: the tier, a human-readable reason, and the
/// numbers that justified it.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub flag_type: FlagType,
    pub reason: String,
    pub context: FlagContext,
}

/// Fraction lost week over week; `None` when there was nothing to lose.
fn decline(previous: f64, past: f64) -> Option<f64> {
    if previous > 0.0 {
        Some((previous - past) / previous)
    } else {
        None
    }
}

/// Fraction gained week over week. A jump from zero to anything counts as a
/// full improvement.
fn improvement(previous: f64, past: f64) -> Option<f64> {
    if previous > 0.0 {
        Some((past - previous) / previous)
    } else if past > 0.0 {
        Some(1.0)
    } else {
        None
    }
}

/// Classify one member's week-over-week engagement.
///
/// Returns `None` when no flag is warranted. Members without a baseline week
/// are never flagged red; a drop can only be measured against something.
pub fn classify(data: &UserEngagementData, policy: &EngagementConfig) -> Option<Classification> {
    if !data.has_baseline {
        if data.logins_past_week >= policy.new_member_active_days {
            return Some(Classification {
                flag_type: FlagType::Green,
                reason: format!(
                    "new member active on {} of the past 7 days",
                    data.logins_past_week
                ),
                context: data.context(),
            });
        }
        return None;
    }

    let login_decline = decline(
        data.logins_previous_week as f64,
        data.logins_past_week as f64,
    );
    let post_decline = decline(data.posts_previous_week as f64, data.posts_past_week as f64);

    if data.logins_previous_week > 0 && data.logins_past_week == 0 {
        return Some(Classification {
            flag_type: FlagType::Red,
            reason: format!(
                "no active days this week after {} last week",
                data.logins_previous_week
            ),
            context: data.context(),
        });
    }
    if login_decline.is_some_and(|d| d >= policy.red_decline_ratio) {
        return Some(Classification {
            flag_type: FlagType::Red,
            reason: format!(
                "active days fell from {} to {} week over week",
                data.logins_previous_week, data.logins_past_week
            ),
            context: data.context(),
        });
    }
    if post_decline.is_some_and(|d| d >= policy.red_decline_ratio) {
        return Some(Classification {
            flag_type: FlagType::Red,
            reason: format!(
                "posts fell from {} to {} week over week",
                data.posts_previous_week, data.posts_past_week
            ),
            context: data.context(),
        });
    }

    if data.logins_previous_week == 0 && data.logins_past_week == 0 {
        return Some(Classification {
            flag_type: FlagType::Yellow,
            reason: "no active days for two consecutive weeks".to_string(),
            context: data.context(),
        });
    }
    if login_decline.is_some_and(|d| d >= policy.yellow_decline_ratio) {
        return Some(Classification {
            flag_type: FlagType::Yellow,
            reason: format!(
                "active days slipped from {} to {} week over week",
                data.logins_previous_week, data.logins_past_week
            ),
            context: data.context(),
        });
    }
    if post_decline.is_some_and(|d| d >= policy.yellow_decline_ratio) {
        return Some(Classification {
            flag_type: FlagType::Yellow,
            reason: format!(
                "posts slipped from {} to {} week over week",
                data.posts_previous_week, data.posts_past_week
            ),
            context: data.context(),
        });
    }

    let login_gain = improvement(
        data.logins_previous_week as f64,
        data.logins_past_week as f64,
    );
    let post_gain = improvement(data.posts_previous_week as f64, data.posts_past_week as f64);
    if login_gain.is_some_and(|g| g >= policy.green_improvement_ratio) {
        return Some(Classification {
            flag_type: FlagType::Green,
            reason: format!(
                "active days rose from {} to {} week over week",
                data.logins_previous_week, data.logins_past_week
            ),
            context: data.context(),
        });
    }
    if post_gain.is_some_and(|g| g >= policy.green_improvement_ratio) {
        return Some(Classification {
            flag_type: FlagType::Green,
            reason: format!(
                "posts rose from {} to {} week over week",
                data.posts_previous_week, data.posts_past_week
            ),
            context: data.context(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> EngagementConfig {
        EngagementConfig::default()
    }

    fn data(logins_prev: u32, logins_past: u32, posts_prev: u64, posts_past: u64) -> UserEngagementData {
        UserEngagementData {
            user_id: "u1".into(),
            logins_past_week: logins_past,
            logins_previous_week: logins_prev,
            posts_past_week: posts_past,
            posts_previous_week: posts_prev,
            responses_past_week: 0,
            has_baseline: true,
            last_login: None,
            last_partner_interaction: None,
        }
    }

    fn snapshot(date: &str, logins: i64, posts: i64) -> EngagementSnapshot {
        EngagementSnapshot {
            user_id: "u1".into(),
            snapshot_date: date.into(),
            logins_count: logins,
            posts_count: posts,
            responses_count: 0,
            last_login: None,
            last_partner_interaction: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn aggregation_splits_past_and_previous_weeks() {
        let snapshots = vec![
            snapshot("2026-03-14", 2, 3), // past week
            snapshot("2026-03-09", 1, 1), // past week boundary: today - 6
            snapshot("2026-03-08", 1, 4), // exactly today - 7: past week
            snapshot("2026-03-02", 1, 5), // previous week
            snapshot("2026-03-01", 0, 2), // exactly today - 14: previous week
        ];
        let data = UserEngagementData::from_snapshots("u1", today(), &snapshots).unwrap();
        assert_eq!(data.logins_past_week, 3);
        assert_eq!(data.posts_past_week, 8);
        assert_eq!(data.logins_previous_week, 1);
        assert_eq!(data.posts_previous_week, 7);
        assert!(data.has_baseline);
    }

    #[test]
    fn logins_count_active_days_not_events() {
        // Five logins on one day is still a single active day.
        let snapshots = vec![snapshot("2026-03-14", 5, 0)];
        let data = UserEngagementData::from_snapshots("u1", today(), &snapshots).unwrap();
        assert_eq!(data.logins_past_week, 1);
    }

    #[test]
    fn no_previous_week_rows_means_no_baseline() {
        let snapshots = vec![snapshot("2026-03-14", 1, 0)];
        let data = UserEngagementData::from_snapshots("u1", today(), &snapshots).unwrap();
        assert!(!data.has_baseline);
    }

    #[test]
    fn malformed_snapshot_date_is_an_error() {
        let snapshots = vec![snapshot("last tuesday", 1, 0)];
        let err = UserEngagementData::from_snapshots("u1", today(), &snapshots).unwrap_err();
        assert!(err.to_string().contains("malformed snapshot date"));
    }

    #[test]
    fn latest_login_timestamp_wins() {
        let mut early = snapshot("2026-03-10", 1, 0);
        early.last_login = Some("2026-03-10T08:00:00Z".into());
        let mut late = snapshot("2026-03-14", 1, 0);
        late.last_login = Some("2026-03-14T21:30:00Z".into());
        // Ordering in the slice does not matter.
        let data =
            UserEngagementData::from_snapshots("u1", today(), &[late.clone(), early]).unwrap();
        assert_eq!(data.last_login, late.last_login);
    }

    #[test]
    fn collapse_to_zero_is_red() {
        let result = classify(&data(4, 0, 0, 0), &policy()).unwrap();
        assert_eq!(result.flag_type, FlagType::Red);
        assert!(result.reason.contains("no active days"));
    }

    #[test]
    fn steep_login_decline_is_red() {
        // 5 -> 2 is a 60% decline, at the default red threshold.
        let result = classify(&data(5, 2, 0, 0), &policy()).unwrap();
        assert_eq!(result.flag_type, FlagType::Red);
    }

    #[test]
    fn steep_post_decline_is_red() {
        let result = classify(&data(3, 3, 10, 2), &policy()).unwrap();
        assert_eq!(result.flag_type, FlagType::Red);
        assert!(result.reason.contains("posts fell"));
    }

    #[test]
    fn moderate_decline_is_yellow() {
        // 4 -> 3 is a 25% decline, at the default yellow threshold.
        let result = classify(&data(4, 3, 0, 0), &policy()).unwrap();
        assert_eq!(result.flag_type, FlagType::Yellow);
    }

    #[test]
    fn two_idle_weeks_is_yellow() {
        let result = classify(&data(0, 0, 0, 0), &policy()).unwrap();
        assert_eq!(result.flag_type, FlagType::Yellow);
        assert!(result.reason.contains("two consecutive weeks"));
    }

    #[test]
    fn strong_improvement_is_green() {
        // 2 -> 3 is a 50% improvement, at the default green threshold.
        let result = classify(&data(2, 3, 0, 0), &policy()).unwrap();
        assert_eq!(result.flag_type, FlagType::Green);
    }

    #[test]
    fn posts_from_zero_is_green() {
        let result = classify(&data(2, 2, 0, 4), &policy()).unwrap();
        assert_eq!(result.flag_type, FlagType::Green);
        assert!(result.reason.contains("posts rose"));
    }

    #[test]
    fn steady_engagement_gets_no_flag() {
        assert_eq!(classify(&data(4, 4, 5, 5), &policy()), None);
    }

    #[test]
    fn small_dip_below_yellow_threshold_gets_no_flag() {
        // 5 -> 4 is a 20% decline, under the default 25% yellow threshold.
        assert_eq!(classify(&data(5, 4, 0, 0), &policy()), None);
    }

    #[test]
    fn no_baseline_is_never_red() {
        let mut idle = data(0, 0, 0, 0);
        idle.has_baseline = false;
        assert_eq!(classify(&idle, &policy()), None);
    }

    #[test]
    fn active_new_member_is_green() {
        let mut fresh = data(0, 3, 0, 0);
        fresh.has_baseline = false;
        let result = classify(&fresh, &policy()).unwrap();
        assert_eq!(result.flag_type, FlagType::Green);
        assert!(result.reason.contains("new member"));
    }

    #[test]
    fn classification_carries_audit_context() {
        let input = data(4, 0, 6, 1);
        let result = classify(&input, &policy()).unwrap();
        assert_eq!(result.context.logins_previous_week, 4);
        assert_eq!(result.context.posts_previous_week, 6);
        assert!(result.context.has_baseline);
    }
}
