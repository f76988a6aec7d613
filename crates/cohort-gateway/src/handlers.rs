// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Trigger routes run the engine pipelines; review routes move content
//! through its lifecycle; read routes back the admin review UI.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use cohort_core::{CohortError, ContentType};
use cohort_storage::models::{DashboardContentRow, EngagementFlagRow};
use cohort_storage::queries::flags;
use serde::{Deserialize, Serialize};

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Query parameters for the generation trigger routes.
#[derive(Debug, Default, Deserialize)]
pub struct GenerationParams {
    /// `full_dashboard` (default) or `discussion_prompt`.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Response body for the generation trigger routes.
#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub content_id: String,
}

/// Request body for `POST /v1/flags/{id}/resolve`.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub resolved_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Query parameters for `GET /v1/flags`.
#[derive(Debug, Default, Deserialize)]
pub struct FlagsQuery {
    #[serde(default)]
    pub resolved: Option<bool>,
}

/// Query parameters for `GET /v1/content/active`.
#[derive(Debug, Deserialize)]
pub struct ActiveContentQuery {
    pub content_type: String,
}

/// A flag row with its audit context expanded to JSON.
#[derive(Debug, Serialize)]
pub struct FlagResponse {
    pub id: String,
    pub user_id: String,
    pub flag_type: String,
    pub reason: String,
    pub context: serde_json::Value,
    pub resolved: bool,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<EngagementFlagRow> for FlagResponse {
    fn from(row: EngagementFlagRow) -> Self {
        let context =
            serde_json::from_str(&row.context).unwrap_or(serde_json::Value::Null);
        FlagResponse {
            id: row.id,
            user_id: row.user_id,
            flag_type: row.flag_type,
            reason: row.reason,
            context,
            resolved: row.resolved,
            resolved_by: row.resolved_by,
            resolved_at: row.resolved_at,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

/// A content row with its body expanded to JSON.
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub id: String,
    pub content_type: String,
    pub content: serde_json::Value,
    pub approved: bool,
    pub active: bool,
    pub generated_at: String,
}

impl From<DashboardContentRow> for ContentResponse {
    fn from(row: DashboardContentRow) -> Self {
        let content =
            serde_json::from_str(&row.content).unwrap_or(serde_json::Value::Null);
        ContentResponse {
            id: row.id,
            content_type: row.content_type,
            content,
            approved: row.approved,
            active: row.active,
            generated_at: row.generated_at,
        }
    }
}

fn error_response(error: CohortError) -> Response {
    let status = match &error {
        CohortError::NotFound { .. } => StatusCode::NOT_FOUND,
        CohortError::InvalidTransition { .. } => StatusCode::CONFLICT,
        CohortError::Generator { .. } => StatusCode::BAD_GATEWAY,
        CohortError::Config(_) | CohortError::Storage { .. } | CohortError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    tracing::warn!(%error, %status, "request failed");
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response()
}

/// GET /health
///
/// Public liveness probe: status, version, uptime.
pub async fn get_public_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// POST /v1/cron/generation and /v1/admin/generation/run
///
/// Runs a generation pipeline and returns the new draft id. Defaults to the
/// full dashboard; `?content_type=discussion_prompt` runs the prompt pipeline.
pub async fn post_generation_run(
    State(state): State<GatewayState>,
    Query(params): Query<GenerationParams>,
) -> Response {
    let content_type = match params.content_type.as_deref() {
        None => ContentType::FullDashboard,
        Some(raw) => match ContentType::from_str(raw) {
            Ok(parsed) => parsed,
            Err(_) => return bad_request(format!("unknown content_type: {raw}")),
        },
    };

    let now = Utc::now();
    let result = match content_type {
        ContentType::FullDashboard => state.orchestrator.run_daily_generation(now).await,
        ContentType::DiscussionPrompt => state.orchestrator.run_discussion_prompt(now).await,
    };
    match result {
        Ok(content_id) => (StatusCode::OK, Json(GenerationResponse { content_id })).into_response(),
        Err(error) => error_response(error),
    }
}

/// POST /v1/cron/analysis and /v1/admin/analysis/run
pub async fn post_analysis_run(State(state): State<GatewayState>) -> Response {
    match state.pipeline.run_daily_analysis(Utc::now()).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

/// PUT /v1/content/{id}
///
/// Replaces a draft body with reviewer-edited JSON.
pub async fn put_content(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let serialized = body.to_string();
    match cohort_engine::review::edit_content(&state.db, &id, &serialized).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

/// POST /v1/content/{id}/approve
pub async fn post_approve_content(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    match cohort_engine::review::approve_content(&state.db, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

/// POST /v1/flags/{id}/resolve
pub async fn post_resolve_flag(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<ResolveRequest>,
) -> Response {
    let resolved_by = body.resolved_by.as_deref().unwrap_or("admin");
    match cohort_engine::flags::resolve_flag(&state.db, &id, resolved_by, body.notes.as_deref())
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

/// GET /v1/flags?resolved=
pub async fn get_flags(
    State(state): State<GatewayState>,
    Query(query): Query<FlagsQuery>,
) -> Response {
    match flags::list(&state.db, query.resolved).await {
        Ok(rows) => {
            let body: Vec<FlagResponse> = rows.into_iter().map(FlagResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

/// GET /v1/content/active?content_type=
pub async fn get_active_content(
    State(state): State<GatewayState>,
    Query(query): Query<ActiveContentQuery>,
) -> Response {
    let content_type = match ContentType::from_str(&query.content_type) {
        Ok(parsed) => parsed,
        Err(_) => {
            return bad_request(format!("unknown content_type: {}", query.content_type));
        }
    };
    match cohort_engine::review::active_content(&state.db, content_type).await {
        Ok(Some(row)) => (StatusCode::OK, Json(ContentResponse::from(row))).into_response(),
        Ok(None) => error_response(CohortError::NotFound {
            entity: "active content",
            id: query.content_type,
        }),
        Err(error) => error_response(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use crate::server::{GatewayState, HealthState};
    use async_trait::async_trait;
    use cohort_config::model::{EngagementConfig, GenerationConfig};
    use cohort_core::{GenerationRequest, TextGenerator};
    use cohort_engine::{ContentOrchestrator, FlagPipeline};
    use cohort_storage::queries::content;
    use cohort_storage::Database;
    use rusqlite::params;
    use std::sync::Arc;

    /// Always answers with the same text.
    struct FixedGenerator(String);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _request: GenerationRequest) -> Result<String, CohortError> {
            Ok(self.0.clone())
        }
    }

    async fn test_state(db: Database) -> GatewayState {
        // The feed step parses JSON, so a fixed empty array keeps every
        // generation step parseable.
        let generator = Arc::new(FixedGenerator("[]".to_string()));
        GatewayState {
            db: db.clone(),
            orchestrator: Arc::new(ContentOrchestrator::new(
                db.clone(),
                generator,
                GenerationConfig::default(),
                512,
            )),
            pipeline: Arc::new(FlagPipeline::new(db, EngagementConfig::default())),
            auth: AuthConfig {
                admin_token: Some("token".to_string()),
                cron_secret: Some("secret".to_string()),
            },
            health: HealthState {
                start_time: std::time::Instant::now(),
            },
        }
    }

    async fn seed_draft(db: &Database, id: &str) {
        let row = DashboardContentRow {
            id: id.to_string(),
            content_type: "full_dashboard".to_string(),
            content: r#"{"hero_message":"Hi"}"#.to_string(),
            generation_context: "{}".to_string(),
            approved: false,
            active: false,
            generated_at: "2026-03-15T00:00:00Z".to_string(),
        };
        content::insert(db, &row).await.unwrap();
    }

    async fn seed_flag(db: &Database, id: &str, resolved: bool) {
        let (id, resolved) = (id.to_string(), resolved);
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO engagement_flags
                     (id, user_id, flag_type, reason, context, resolved, created_at)
                     VALUES (?1, 'u1', 'red', 'dropoff', '{}', ?2, '2026-03-15T00:00:00Z')",
                    params![id, resolved],
                )?;
                Ok::<_, rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let db = Database::open_in_memory().await.unwrap();
        let state = test_state(db).await;
        let Json(body) = get_public_health(State(state)).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn generation_run_rejects_unknown_content_type() {
        let db = Database::open_in_memory().await.unwrap();
        let state = test_state(db).await;
        let params = GenerationParams {
            content_type: Some("newsletter".to_string()),
        };
        let response = post_generation_run(State(state), Query(params)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analysis_run_returns_report() {
        let db = Database::open_in_memory().await.unwrap();
        let state = test_state(db).await;
        let response = post_analysis_run(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn edit_then_approve_then_read_active() {
        let db = Database::open_in_memory().await.unwrap();
        seed_draft(&db, "c1").await;
        let state = test_state(db.clone()).await;

        let body = serde_json::json!({"hero_message": "Edited"});
        let response = put_content(
            State(state.clone()),
            Path("c1".to_string()),
            Json(body),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response =
            post_approve_content(State(state.clone()), Path("c1".to_string())).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let query = ActiveContentQuery {
            content_type: "full_dashboard".to_string(),
        };
        let response = get_active_content(State(state), Query(query)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn edit_after_approval_is_conflict() {
        let db = Database::open_in_memory().await.unwrap();
        seed_draft(&db, "c1").await;
        let state = test_state(db).await;

        post_approve_content(State(state.clone()), Path("c1".to_string())).await;
        let response = put_content(
            State(state),
            Path("c1".to_string()),
            Json(serde_json::json!({"hero_message": "Late edit"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn approve_missing_content_is_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        let state = test_state(db).await;
        let response = post_approve_content(State(state), Path("nope".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn active_content_before_approval_is_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        seed_draft(&db, "c1").await;
        let state = test_state(db).await;
        let query = ActiveContentQuery {
            content_type: "full_dashboard".to_string(),
        };
        let response = get_active_content(State(state), Query(query)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn resolve_flag_and_filter_listing() {
        let db = Database::open_in_memory().await.unwrap();
        seed_flag(&db, "f1", false).await;
        seed_flag(&db, "f2", false).await;
        let state = test_state(db).await;

        let response = post_resolve_flag(
            State(state.clone()),
            Path("f1".to_string()),
            Json(ResolveRequest {
                resolved_by: Some("coach".to_string()),
                notes: Some("checked in".to_string()),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = get_flags(
            State(state),
            Query(FlagsQuery {
                resolved: Some(false),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn resolve_missing_flag_is_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        let state = test_state(db).await;
        let response = post_resolve_flag(
            State(state),
            Path("missing".to_string()),
            Json(ResolveRequest {
                resolved_by: None,
                notes: None,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn flag_response_expands_context_json() {
        let row = EngagementFlagRow {
            id: "f1".into(),
            user_id: "u1".into(),
            flag_type: "red".into(),
            reason: "dropoff".into(),
            context: r#"{"logins_past_week":0}"#.into(),
            resolved: false,
            resolved_by: None,
            resolved_at: None,
            notes: None,
            created_at: "2026-03-15T00:00:00Z".into(),
        };
        let response = FlagResponse::from(row);
        assert_eq!(response.context["logins_past_week"], 0);
    }

    #[test]
    fn error_response_serializes() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "boom".into(),
        })
        .unwrap();
        assert!(json.contains("boom"));
    }
}
