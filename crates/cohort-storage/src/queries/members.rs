// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Member read operations.

use cohort_core::CohortError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::Member;

/// List all active members, ordered by join date.
pub async fn list_active(db: &Database) -> Result<Vec<Member>, CohortError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, display_name, active, modules_completed, joined_at
                 FROM members WHERE active = 1 ORDER BY joined_at ASC",
            )?;
            let members = stmt
                .query_map([], |row| {
                    Ok(Member {
                        id: row.get(0)?,
                        display_name: row.get(1)?,
                        active: row.get(2)?,
                        modules_completed: row.get(3)?,
                        joined_at: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(members)
        })
        .await
        .map_err(map_tr_err)
}

/// Count (active, total) members.
pub async fn counts(db: &Database) -> Result<(u64, u64), CohortError> {
    db.connection()
        .call(|conn| {
            let (active, total): (i64, i64) = conn.query_row(
                "SELECT COALESCE(SUM(active), 0), COUNT(*) FROM members",
                params![],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok((active as u64, total as u64))
        })
        .await
        .map_err(map_tr_err)
}
