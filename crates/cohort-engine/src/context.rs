// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Community context gathering.
//!
//! Builds the transient [`CommunityContext`] snapshot that seeds every
//! generation run: program state, recent discussions, upcoming events, and
//! member counts, read concurrently. Any read failing fails the gather;
//! generating from a partial picture would produce misleading content.

use chrono::{DateTime, Utc};
use cohort_config::model::GenerationConfig;
use cohort_core::{
    CohortError, CommunityContext, DiscussionSummary, EventSummary, ProgramState,
};
use cohort_storage::queries::{discussions, events, members, program};
use cohort_storage::Database;
use tracing::debug;

/// Gather a fresh community context as of `now`.
///
/// The four reads run concurrently over the same connection; the snapshot is
/// never persisted.
pub async fn gather(
    db: &Database,
    now: DateTime<Utc>,
    config: &GenerationConfig,
) -> Result<CommunityContext, CohortError> {
    let after = now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

    let (settings, recent, upcoming, (active_users, total_users)) = tokio::try_join!(
        program::settings(db),
        discussions::recent(db, config.recent_discussions),
        events::upcoming(db, &after, config.upcoming_events),
        members::counts(db),
    )?;

    debug!(
        discussions = recent.len(),
        events = upcoming.len(),
        active_users,
        total_users,
        "community context gathered"
    );

    Ok(CommunityContext {
        program_state: ProgramState {
            current_week: settings.current_week.max(0) as u32,
            current_module: settings.current_module,
        },
        discussions: recent
            .into_iter()
            .map(|d| DiscussionSummary {
                title: d.title,
                content: d.body,
                author: d.author,
            })
            .collect(),
        upcoming_events: upcoming
            .into_iter()
            .map(|e| EventSummary {
                title: e.title,
                start_time: e.start_time,
            })
            .collect(),
        active_users,
        total_users,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    async fn seed_discussion(db: &Database, id: &str, title: &str, created_at: &str) {
        let (id, title, created_at) = (id.to_string(), title.to_string(), created_at.to_string());
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO discussions (id, title, body, author, view_count, reply_count, created_at)
                     VALUES (?1, ?2, 'body', 'ana', 0, 0, ?3)",
                    params![id, title, created_at],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
            .unwrap();
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

    async fn seed_event(db: &Database, id: &str, start_time: &str) {
        let (id, start_time) = (id.to_string(), start_time.to_string());
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO events (id, title, start_time) VALUES (?1, ?1, ?2)",
                    params![id, start_time],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    fn now() -> DateTime<Utc> {
        "2026-03-15T12:00:00Z".parse().unwrap()
    }

    #[tokio::test]
    async fn gather_combines_all_four_reads() {
        let db = Database::open_in_memory().await.unwrap();
        seed_discussion(&db, "d1", "Delegation woes", "2026-03-14T10:00:00Z").await;
        seed_member(&db, "m1", true).await;
        seed_member(&db, "m2", false).await;
        seed_event(&db, "e1", "2026-03-20T18:00:00Z").await;

        let context = gather(&db, now(), &GenerationConfig::default())
            .await
            .unwrap();

        // Migration seeds program state at week 1, orientation.
        assert_eq!(context.program_state.current_week, 1);
        assert_eq!(context.program_state.current_module, "orientation");
        assert_eq!(context.discussions.len(), 1);
        assert_eq!(context.discussions[0].title, "Delegation woes");
        assert_eq!(context.upcoming_events.len(), 1);
        assert_eq!(context.active_users, 1);
        assert_eq!(context.total_users, 2);
    }

    #[tokio::test]
    async fn gather_excludes_past_events() {
        let db = Database::open_in_memory().await.unwrap();
        seed_event(&db, "past", "2026-03-01T18:00:00Z").await;
        seed_event(&db, "future", "2026-03-20T18:00:00Z").await;

        let context = gather(&db, now(), &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(context.upcoming_events.len(), 1);
        assert_eq!(context.upcoming_events[0].title, "future");
    }

    #[tokio::test]
    async fn gather_respects_discussion_limit() {
        let db = Database::open_in_memory().await.unwrap();
        for i in 0..5 {
            seed_discussion(
                &db,
                &format!("d{i}"),
                &format!("topic {i}"),
                &format!("2026-03-1{i}T10:00:00Z"),
            )
            .await;
        }

        let config = GenerationConfig {
            recent_discussions: 2,
            ..GenerationConfig::default()
        };
        let context = gather(&db, now(), &config).await.unwrap();
        assert_eq!(context.discussions.len(), 2);
        // Newest first.
        assert_eq!(context.discussions[0].title, "topic 4");
    }

    #[tokio::test]
    async fn gather_on_empty_database_still_succeeds() {
        let db = Database::open_in_memory().await.unwrap();
        let context = gather(&db, now(), &GenerationConfig::default())
            .await
            .unwrap();
        assert!(context.discussions.is_empty());
        assert!(context.upcoming_events.is_empty());
        assert_eq!(context.total_users, 0);
    }
}
