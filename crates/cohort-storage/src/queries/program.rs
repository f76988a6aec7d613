// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Program settings read operations.

use cohort_core::CohortError;
use rusqlite::OptionalExtension;

use crate::database::{Database, map_tr_err};
use crate::models::ProgramSettings;

/// Fetch the single program settings row.
///
/// The row is seeded by the initial migration; its absence is a storage
/// integrity error, not an empty result.
pub async fn settings(db: &Database) -> Result<ProgramSettings, CohortError> {
    let row = db
        .connection()
        .call(|conn| {
            let settings = conn
                .query_row(
                    "SELECT current_week, current_module FROM program_settings WHERE id = 1",
                    [],
                    |row| {
                        Ok(ProgramSettings {
                            current_week: row.get(0)?,
                            current_module: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(settings)
        })
        .await
        .map_err(map_tr_err)?;

    row.ok_or(CohortError::NotFound {
        entity: "program_settings",
        id: "1".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    #[tokio::test]
    async fn settings_returns_seeded_row() {
        let db = Database::open_in_memory().await.unwrap();
        let settings = settings(&db).await.unwrap();
        assert_eq!(settings.current_week, 1);
        assert_eq!(settings.current_module, "orientation");
    }

    #[tokio::test]
    async fn settings_reflects_updates() {
        let db = Database::open_in_memory().await.unwrap();
        db.connection()
            .call(|conn| {
                conn.execute(
                    "UPDATE program_settings SET current_week = ?1, current_module = ?2 WHERE id = 1",
                    params![4, "delegation"],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
            .unwrap();

        let settings = settings(&db).await.unwrap();
        assert_eq!(settings.current_week, 4);
        assert_eq!(settings.current_module, "delegation");
    }
}
