// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP trigger and admin surface for the Cohort platform.
//!
//! Routes:
//! - `GET /health` (public)
//! - `POST /v1/cron/{generation,analysis}` (shared `x-cron-secret` header)
//! - `POST /v1/admin/{generation,analysis}/run`, content review, and flag
//!   endpoints (admin bearer token)

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{build_router, start_server, GatewayState, HealthState, ServerConfig};
