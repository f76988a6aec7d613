// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event read operations.

use cohort_core::CohortError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::Event;

/// Events starting at or after `after` (ISO 8601), soonest first.
pub async fn upcoming(db: &Database, after: &str, limit: u32) -> Result<Vec<Event>, CohortError> {
    let after = after.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, start_time FROM events
                 WHERE start_time >= ?1 ORDER BY start_time ASC LIMIT ?2",
            )?;
            let events = stmt
                .query_map(params![after, limit], |row| {
                    Ok(Event {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        start_time: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(events)
        })
        .await
        .map_err(map_tr_err)
}
