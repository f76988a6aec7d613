// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read access to the activity snapshot store.
//!
//! Snapshot rows are written by an external collaborator; this core only
//! reads a date window per user.

use cohort_core::CohortError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::EngagementSnapshot;

/// Fetch all snapshots for one user on or after `since` (a `YYYY-MM-DD` day),
/// ordered oldest first.
pub async fn window(
    db: &Database,
    user_id: &str,
    since: &str,
) -> Result<Vec<EngagementSnapshot>, CohortError> {
    let user_id = user_id.to_string();
    let since = since.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, snapshot_date, logins_count, posts_count, responses_count,
                        last_login, last_partner_interaction
                 FROM engagement_snapshots
                 WHERE user_id = ?1 AND snapshot_date >= ?2
                 ORDER BY snapshot_date ASC",
            )?;
            let snapshots = stmt
                .query_map(params![user_id, since], |row| {
                    Ok(EngagementSnapshot {
                        user_id: row.get(0)?,
                        snapshot_date: row.get(1)?,
                        logins_count: row.get(2)?,
                        posts_count: row.get(3)?,
                        responses_count: row.get(4)?,
                        last_login: row.get(5)?,
                        last_partner_interaction: row.get(6)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(snapshots)
        })
        .await
        .map_err(map_tr_err)
}
