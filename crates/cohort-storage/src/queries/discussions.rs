// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discussion read operations.

use cohort_core::CohortError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::Discussion;

fn row_to_discussion(row: &rusqlite::Row<'_>) -> Result<Discussion, rusqlite::Error> {
    Ok(Discussion {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        author: row.get(3)?,
        view_count: row.get(4)?,
        reply_count: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// The most recent discussions, newest first.
pub async fn recent(db: &Database, limit: u32) -> Result<Vec<Discussion>, CohortError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, body, author, view_count, reply_count, created_at
                 FROM discussions ORDER BY created_at DESC LIMIT ?1",
            )?;
            let discussions = stmt
                .query_map(params![limit], row_to_discussion)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(discussions)
        })
        .await
        .map_err(map_tr_err)
}

/// Discussions with many views but few replies, most-viewed first.
///
/// Feeds the discussion-prompt generator; not part of member classification.
pub async fn stuck(
    db: &Database,
    min_views: u32,
    max_replies: u32,
    limit: u32,
) -> Result<Vec<Discussion>, CohortError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, body, author, view_count, reply_count, created_at
                 FROM discussions
                 WHERE view_count >= ?1 AND reply_count <= ?2
                 ORDER BY view_count DESC LIMIT ?3",
            )?;
            let discussions = stmt
                .query_map(params![min_views, max_replies, limit], row_to_discussion)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(discussions)
        })
        .await
        .map_err(map_tr_err)
}
