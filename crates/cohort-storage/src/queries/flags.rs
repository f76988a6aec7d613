// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engagement flag operations.
//!
//! Flags are append-only observations. The only permitted mutation is the
//! resolve transition, which is terminal and idempotent.

use cohort_core::CohortError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::EngagementFlagRow;

fn row_to_flag(row: &rusqlite::Row<'_>) -> Result<EngagementFlagRow, rusqlite::Error> {
    Ok(EngagementFlagRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        flag_type: row.get(2)?,
        reason: row.get(3)?,
        context: row.get(4)?,
        resolved: row.get(5)?,
        resolved_by: row.get(6)?,
        resolved_at: row.get(7)?,
        notes: row.get(8)?,
        created_at: row.get(9)?,
    })
}

const FLAG_COLUMNS: &str = "id, user_id, flag_type, reason, context, resolved, \
                            resolved_by, resolved_at, notes, created_at";

/// Insert a new flag row.
pub async fn insert(db: &Database, flag: &EngagementFlagRow) -> Result<(), CohortError> {
    let flag = flag.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO engagement_flags
                 (id, user_id, flag_type, reason, context, resolved, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    flag.id,
                    flag.user_id,
                    flag.flag_type,
                    flag.reason,
                    flag.context,
                    flag.resolved,
                    flag.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a flag by ID.
pub async fn get(db: &Database, id: &str) -> Result<Option<EngagementFlagRow>, CohortError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let flag = conn
                .query_row(
                    &format!("SELECT {FLAG_COLUMNS} FROM engagement_flags WHERE id = ?1"),
                    params![id],
                    row_to_flag,
                )
                .optional()?;
            Ok(flag)
        })
        .await
        .map_err(map_tr_err)
}

/// List flags, optionally filtered by resolution state, newest first.
pub async fn list(
    db: &Database,
    resolved: Option<bool>,
) -> Result<Vec<EngagementFlagRow>, CohortError> {
    db.connection()
        .call(move |conn| {
            let flags = match resolved {
                Some(filter) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {FLAG_COLUMNS} FROM engagement_flags
                         WHERE resolved = ?1 ORDER BY created_at DESC"
                    ))?;
                    let rows = stmt.query_map(params![filter], row_to_flag)?;
                    rows.collect::<Result<Vec<_>, _>>()?
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {FLAG_COLUMNS} FROM engagement_flags ORDER BY created_at DESC"
                    ))?;
                    let rows = stmt.query_map([], row_to_flag)?;
                    rows.collect::<Result<Vec<_>, _>>()?
                }
            };
            Ok(flags)
        })
        .await
        .map_err(map_tr_err)
}

/// Resolve a flag: set `resolved`, the resolver identity, timestamp, and
/// optional notes.
///
/// Idempotent: resolving an already-resolved flag is a no-op success; the
/// original resolution is preserved. A missing flag is `NotFound`.
pub async fn resolve(
    db: &Database,
    id: &str,
    resolved_by: &str,
    notes: Option<&str>,
) -> Result<(), CohortError> {
    let id_owned = id.to_string();
    let resolved_by = resolved_by.to_string();
    let notes = notes.map(|n| n.to_string());

    let previous = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let previous: Option<bool> = tx
                .query_row(
                    "SELECT resolved FROM engagement_flags WHERE id = ?1",
                    params![id_owned],
                    |row| row.get(0),
                )
                .optional()?;

            if previous == Some(false) {
                tx.execute(
                    "UPDATE engagement_flags
                     SET resolved = 1,
                         resolved_by = ?1,
                         resolved_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                         notes = ?2
                     WHERE id = ?3",
                    params![resolved_by, notes, id_owned],
                )?;
            }
            tx.commit()?;
            Ok(previous)
        })
        .await
        .map_err(map_tr_err)?;

    match previous {
        None => Err(CohortError::NotFound {
            entity: "engagement flag",
            id: id.to_string(),
        }),
        Some(_) => Ok(()),
    }
}
