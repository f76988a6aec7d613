// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cohort serve` command implementation.
//!
//! Wires the pieces together: opens the database, builds the Anthropic
//! client, constructs the engine pipelines, and starts the gateway server.

use std::sync::Arc;

use cohort_config::model::CohortConfig;
use cohort_core::CohortError;
use cohort_gateway::{AuthConfig, GatewayState, HealthState, ServerConfig};
use cohort_storage::Database;
use tracing::{info, warn};

/// Runs the `cohort serve` command.
pub async fn run_serve(config: CohortConfig) -> Result<(), CohortError> {
    init_tracing(&config.platform.log_level);

    info!(platform = %config.platform.name, "starting cohort serve");

    let db = Database::open(&config.storage.database_path, config.storage.wal_mode).await?;
    info!(path = %config.storage.database_path, "database open, migrations applied");

    let generator = Arc::new(cohort_anthropic::client_from_config(&config.anthropic)?);

    if config.gateway.admin_token.is_none() {
        warn!("gateway.admin_token is not set; the admin surface will reject all requests");
    }
    if config.gateway.cron_secret.is_none() {
        warn!("gateway.cron_secret is not set; the cron routes will reject all requests");
    }

    let state = GatewayState {
        db: db.clone(),
        orchestrator: Arc::new(cohort_engine::ContentOrchestrator::new(
            db.clone(),
            generator,
            config.generation.clone(),
            config.anthropic.max_tokens,
        )),
        pipeline: Arc::new(cohort_engine::FlagPipeline::new(
            db.clone(),
            config.engagement.clone(),
        )),
        auth: AuthConfig {
            admin_token: config.gateway.admin_token.clone(),
            cron_secret: config.gateway.cron_secret.clone(),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
        },
    };

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let result = tokio::select! {
        result = cohort_gateway::start_server(&server_config, state) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    };

    db.close().await?;
    info!("cohort serve stopped");
    result
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cohort={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
