// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Three route groups: a public health probe, scheduler trigger routes
//! behind the shared secret, and the admin surface behind the bearer token.

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use cohort_core::CohortError;
use cohort_engine::{ContentOrchestrator, FlagPipeline};
use cohort_storage::Database;
use tower_http::cors::CorsLayer;

use crate::auth::{admin_auth_middleware, cron_auth_middleware, AuthConfig};
use crate::handlers;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub db: Database,
    pub orchestrator: Arc<ContentOrchestrator>,
    pub pipeline: Arc<FlagPipeline>,
    pub auth: AuthConfig,
    pub health: HealthState,
}

/// Gateway server configuration (mirrors `[gateway]` in cohort-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Assemble the full gateway router.
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .with_state(state.clone());

    let cron_routes = Router::new()
        .route("/v1/cron/generation", post(handlers::post_generation_run))
        .route("/v1/cron/analysis", post(handlers::post_analysis_run))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state.clone(),
            cron_auth_middleware,
        ))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route(
            "/v1/admin/generation/run",
            post(handlers::post_generation_run),
        )
        .route("/v1/admin/analysis/run", post(handlers::post_analysis_run))
        .route("/v1/content/{id}", put(handlers::put_content))
        .route(
            "/v1/content/{id}/approve",
            post(handlers::post_approve_content),
        )
        .route("/v1/content/active", get(handlers::get_active_content))
        .route("/v1/flags/{id}/resolve", post(handlers::post_resolve_flag))
        .route("/v1/flags", get(handlers::get_flags))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            admin_auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(cron_routes)
        .merge(admin_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server and serve until the process exits.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), CohortError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| CohortError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| CohortError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
