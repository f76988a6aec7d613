// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard content lifecycle operations.
//!
//! Lifecycle: draft (approved=0, active=0) -> approved-inactive ->
//! active. `approve` is the one multi-row atomic step: it must flip the
//! previously active row of the same content type to inactive in the same
//! transaction, preserving the at-most-one-active invariant.

use cohort_core::CohortError;
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::DashboardContentRow;

fn row_to_content(row: &rusqlite::Row<'_>) -> Result<DashboardContentRow, rusqlite::Error> {
    Ok(DashboardContentRow {
        id: row.get(0)?,
        content_type: row.get(1)?,
        content: row.get(2)?,
        generation_context: row.get(3)?,
        approved: row.get(4)?,
        active: row.get(5)?,
        generated_at: row.get(6)?,
    })
}

const CONTENT_COLUMNS: &str =
    "id, content_type, content, generation_context, approved, active, generated_at";

/// Insert a new content row (always in draft state).
pub async fn insert(db: &Database, content: &DashboardContentRow) -> Result<(), CohortError> {
    let content = content.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO dashboard_content
                 (id, content_type, content, generation_context, approved, active, generated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    content.id,
                    content.content_type,
                    content.content,
                    content.generation_context,
                    content.approved,
                    content.active,
                    content.generated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a content row by ID.
pub async fn get(db: &Database, id: &str) -> Result<Option<DashboardContentRow>, CohortError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let content = conn
                .query_row(
                    &format!("SELECT {CONTENT_COLUMNS} FROM dashboard_content WHERE id = ?1"),
                    params![id],
                    row_to_content,
                )
                .optional()?;
            Ok(content)
        })
        .await
        .map_err(map_tr_err)
}

/// The currently active row of the given content type, if any.
pub async fn active(
    db: &Database,
    content_type: &str,
) -> Result<Option<DashboardContentRow>, CohortError> {
    let content_type = content_type.to_string();
    db.connection()
        .call(move |conn| {
            let content = conn
                .query_row(
                    &format!(
                        "SELECT {CONTENT_COLUMNS} FROM dashboard_content
                         WHERE content_type = ?1 AND active = 1"
                    ),
                    params![content_type],
                    row_to_content,
                )
                .optional()?;
            Ok(content)
        })
        .await
        .map_err(map_tr_err)
}

/// List all rows of a content type, newest first. Used by review tooling.
pub async fn list_by_type(
    db: &Database,
    content_type: &str,
) -> Result<Vec<DashboardContentRow>, CohortError> {
    let content_type = content_type.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONTENT_COLUMNS} FROM dashboard_content
                 WHERE content_type = ?1 ORDER BY generated_at DESC"
            ))?;
            let rows = stmt
                .query_map(params![content_type], row_to_content)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the body of a draft. Permitted only while `approved = 0`;
/// lifecycle flags are untouched.
pub async fn update_body(db: &Database, id: &str, new_body: &str) -> Result<(), CohortError> {
    let id_owned = id.to_string();
    let new_body = new_body.to_string();

    let approved = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let approved: Option<bool> = tx
                .query_row(
                    "SELECT approved FROM dashboard_content WHERE id = ?1",
                    params![id_owned],
                    |row| row.get(0),
                )
                .optional()?;

            if approved == Some(false) {
                tx.execute(
                    "UPDATE dashboard_content SET content = ?1 WHERE id = ?2",
                    params![new_body, id_owned],
                )?;
            }
            tx.commit()?;
            Ok(approved)
        })
        .await
        .map_err(map_tr_err)?;

    match approved {
        None => Err(CohortError::NotFound {
            entity: "dashboard content",
            id: id.to_string(),
        }),
        Some(true) => Err(CohortError::InvalidTransition {
            id: id.to_string(),
            reason: "content is already approved and can no longer be edited".to_string(),
        }),
        Some(false) => Ok(()),
    }
}

/// Approve a row: set `approved = 1` and `active = 1`, and deactivate any
/// other active row of the same content type, all in one transaction.
pub async fn approve(db: &Database, id: &str) -> Result<(), CohortError> {
    let id_owned = id.to_string();

    let found = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let content_type: Option<String> = tx
                .query_row(
                    "SELECT content_type FROM dashboard_content WHERE id = ?1",
                    params![id_owned],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(ref content_type) = content_type {
                tx.execute(
                    "UPDATE dashboard_content SET active = 0
                     WHERE content_type = ?1 AND active = 1 AND id <> ?2",
                    params![content_type, id_owned],
                )?;
                tx.execute(
                    "UPDATE dashboard_content SET approved = 1, active = 1 WHERE id = ?1",
                    params![id_owned],
                )?;
            }
            tx.commit()?;
            Ok(content_type.is_some())
        })
        .await
        .map_err(map_tr_err)?;

    if found {
        Ok(())
    } else {
        Err(CohortError::NotFound {
            entity: "dashboard content",
            id: id.to_string(),
        })
    }
}
