// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily engagement flag analysis.
//!
//! Walks the active roster, classifies each member's 14-day snapshot window,
//! and persists a flag for every classification. One member failing must not
//! starve the rest of the roster, so per-member errors are logged and
//! counted, not propagated; only roster-level failures abort the run.

use chrono::{DateTime, Duration, Utc};
use cohort_config::model::EngagementConfig;
use cohort_core::CohortError;
use cohort_storage::models::EngagementFlagRow;
use cohort_storage::queries::{flags, members, snapshots};
use cohort_storage::Database;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::classifier::{self, UserEngagementData};

/// Outcome of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// Members whose window was classified, flagged or not.
    pub analyzed: u64,
    pub flags_created: u64,
}

/// Runs the daily engagement analysis over the active roster.
pub struct FlagPipeline {
    db: Database,
    policy: EngagementConfig,
}

impl FlagPipeline {
    pub fn new(db: Database, policy: EngagementConfig) -> Self {
        Self { db, policy }
    }

    /// Analyze every active member as of `now` and persist resulting flags.
    ///
    /// Failing to load the roster is fatal; a single member failing is
    /// isolated and excluded from the `analyzed` count.
    pub async fn run_daily_analysis(&self, now: DateTime<Utc>) -> Result<AnalysisReport, CohortError> {
        let roster = members::list_active(&self.db).await?;
        let today = now.date_naive();
        let since = (today - Duration::days(14)).format("%Y-%m-%d").to_string();

        let mut report = AnalysisReport {
            analyzed: 0,
            flags_created: 0,
        };
        for member in &roster {
            match self.analyze_member(&member.id, today, &since, now).await {
                Ok(flagged) => {
                    report.analyzed += 1;
                    if flagged {
                        report.flags_created += 1;
                    }
                }
                Err(error) => {
                    warn!(user_id = %member.id, %error, "skipping member after analysis failure");
                }
            }
        }

        info!(
            analyzed = report.analyzed,
            flags_created = report.flags_created,
            roster = roster.len(),
            "engagement analysis complete"
        );
        Ok(report)
    }

    async fn analyze_member(
        &self,
        user_id: &str,
        today: chrono::NaiveDate,
        since: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, CohortError> {
        let window = snapshots::window(&self.db, user_id, since).await?;
        let data = UserEngagementData::from_snapshots(user_id, today, &window)?;

        let Some(classification) = classifier::classify(&data, &self.policy) else {
            return Ok(false);
        };

        let row = EngagementFlagRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            flag_type: classification.flag_type.to_string(),
            reason: classification.reason,
            context: serde_json::to_string(&classification.context).map_err(|e| {
                CohortError::Internal(format!("failed to serialize flag context: {e}"))
            })?,
            resolved: false,
            resolved_by: None,
            resolved_at: None,
            notes: None,
            created_at: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        };
        flags::insert(&self.db, &row).await?;
        Ok(true)
    }
}

/// Mark a flag resolved. Idempotent; resolving again preserves the original
/// resolution.
pub async fn resolve_flag(
    db: &Database,
    id: &str,
    resolved_by: &str,
    notes: Option<&str>,
) -> Result<(), CohortError> {
    flags::resolve(db, id, resolved_by, notes).await?;
    info!(flag_id = %id, resolved_by, "flag resolved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_core::{FlagContext, FlagType};
    use rusqlite::params;
    use std::str::FromStr;

    fn now() -> DateTime<Utc> {
        "2026-03-15T12:00:00Z".parse().unwrap()
    }

    async fn seed_member(db: &Database, id: &str, active: bool) {
        let id = id.to_string();
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO members (id, display_name, active, modules_completed, joined_at)
                     VALUES (?1, ?1, ?2, 0, '2026-01-01T00:00:00Z')",
                    params![id, active],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    async fn seed_snapshot(db: &Database, user_id: &str, date: &str, logins: i64, posts: i64) {
        let (user_id, date) = (user_id.to_string(), date.to_string());
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO engagement_snapshots
                     (user_id, snapshot_date, logins_count, posts_count, responses_count)
                     VALUES (?1, ?2, ?3, ?4, 0)",
                    params![user_id, date, logins, posts],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    /// Active 2026-03-02..=2026-03-07 (previous week), silent since.
    async fn seed_dropoff(db: &Database, user_id: &str) {
        for day in 2..=7 {
            seed_snapshot(db, user_id, &format!("2026-03-0{day}"), 1, 2).await;
        }
    }

    fn pipeline(db: &Database) -> FlagPipeline {
        FlagPipeline::new(db.clone(), EngagementConfig::default())
    }

    #[tokio::test]
    async fn dropoff_member_gets_a_red_flag() {
        let db = Database::open_in_memory().await.unwrap();
        seed_member(&db, "m1", true).await;
        seed_dropoff(&db, "m1").await;

        let report = pipeline(&db).run_daily_analysis(now()).await.unwrap();
        assert_eq!(report.analyzed, 1);
        assert_eq!(report.flags_created, 1);

        let rows = flags::list(&db, Some(false)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "m1");
        assert_eq!(FlagType::from_str(&rows[0].flag_type).unwrap(), FlagType::Red);
        assert!(!rows[0].resolved);

        let context: FlagContext = serde_json::from_str(&rows[0].context).unwrap();
        assert_eq!(context.logins_past_week, 0);
        assert_eq!(context.logins_previous_week, 6);
        assert!(context.has_baseline);
    }

    #[tokio::test]
    async fn steady_member_gets_no_flag() {
        let db = Database::open_in_memory().await.unwrap();
        seed_member(&db, "m1", true).await;
        // Three active days in each week.
        for date in ["2026-03-03", "2026-03-05", "2026-03-07"] {
            seed_snapshot(&db, "m1", date, 1, 1).await;
        }
        for date in ["2026-03-10", "2026-03-12", "2026-03-14"] {
            seed_snapshot(&db, "m1", date, 1, 1).await;
        }

        let report = pipeline(&db).run_daily_analysis(now()).await.unwrap();
        assert_eq!(report.analyzed, 1);
        assert_eq!(report.flags_created, 0);
        assert!(flags::list(&db, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn brand_new_member_without_baseline_is_never_red() {
        let db = Database::open_in_memory().await.unwrap();
        seed_member(&db, "m1", true).await;
        // No snapshots at all: no baseline, no activity, no flag.

        let report = pipeline(&db).run_daily_analysis(now()).await.unwrap();
        assert_eq!(report.analyzed, 1);
        assert_eq!(report.flags_created, 0);
    }

    #[tokio::test]
    async fn inactive_members_are_not_analyzed() {
        let db = Database::open_in_memory().await.unwrap();
        seed_member(&db, "gone", false).await;
        seed_dropoff(&db, "gone").await;

        let report = pipeline(&db).run_daily_analysis(now()).await.unwrap();
        assert_eq!(report.analyzed, 0);
        assert_eq!(report.flags_created, 0);
    }

    #[tokio::test]
    async fn one_bad_member_does_not_starve_the_rest() {
        let db = Database::open_in_memory().await.unwrap();
        seed_member(&db, "bad", true).await;
        seed_snapshot(&db, "bad", "not-a-date", 1, 0).await;
        seed_member(&db, "ok", true).await;
        seed_dropoff(&db, "ok").await;

        let report = pipeline(&db).run_daily_analysis(now()).await.unwrap();
        assert_eq!(report.analyzed, 1);
        assert_eq!(report.flags_created, 1);
        let rows = flags::list(&db, None).await.unwrap();
        assert_eq!(rows[0].user_id, "ok");
    }

    #[tokio::test]
    async fn rerunning_analysis_may_duplicate_unresolved_flags() {
        // Flags are append-only observations; dedup is a reviewer concern.
        let db = Database::open_in_memory().await.unwrap();
        seed_member(&db, "m1", true).await;
        seed_dropoff(&db, "m1").await;

        let pipeline = pipeline(&db);
        pipeline.run_daily_analysis(now()).await.unwrap();
        pipeline.run_daily_analysis(now()).await.unwrap();
        assert_eq!(flags::list(&db, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn resolve_flag_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        seed_member(&db, "m1", true).await;
        seed_dropoff(&db, "m1").await;
        pipeline(&db).run_daily_analysis(now()).await.unwrap();

        let id = flags::list(&db, None).await.unwrap()[0].id.clone();
        resolve_flag(&db, &id, "coach-ana", Some("reached out by email"))
            .await
            .unwrap();
        resolve_flag(&db, &id, "coach-ben", None).await.unwrap();

        let row = flags::get(&db, &id).await.unwrap().unwrap();
        assert!(row.resolved);
        // First resolution wins.
        assert_eq!(row.resolved_by.as_deref(), Some("coach-ana"));
        assert_eq!(row.notes.as_deref(), Some("reached out by email"));
    }

    #[tokio::test]
    async fn resolve_missing_flag_is_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        let err = resolve_flag(&db, "missing", "coach", None).await.unwrap_err();
        assert!(matches!(err, CohortError::NotFound { .. }));
    }
}
