// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication middleware for the gateway.
//!
//! Two independent checks: a bearer token for the admin surface and a shared
//! secret (`x-cron-secret` header) for the scheduler trigger routes. Either
//! check being unconfigured rejects every request on its routes (fail-closed).

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

/// Authentication configuration for the gateway.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected admin bearer token. `None` disables the admin surface.
    pub admin_token: Option<String>,
    /// Expected `x-cron-secret` value. `None` disables the cron routes.
    pub cron_secret: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_token", &self.admin_token.as_ref().map(|_| "[redacted]"))
            .field("cron_secret", &self.cron_secret.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Whether the request carries the expected admin bearer token.
///
/// An unconfigured token authorizes nothing.
pub fn bearer_authorized(headers: &HeaderMap, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == expected)
}

/// Whether the request carries the expected scheduler shared secret.
pub fn cron_authorized(headers: &HeaderMap, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    headers
        .get("x-cron-secret")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|secret| secret == expected)
}

/// Middleware guarding the admin routes with the bearer token.
pub async fn admin_auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth.admin_token.is_none() {
        tracing::error!("admin surface has no bearer token configured, rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    }
    if bearer_authorized(request.headers(), auth.admin_token.as_deref()) {
        return Ok(next.run(request).await);
    }
    Err(StatusCode::UNAUTHORIZED)
}

/// Middleware guarding the scheduler trigger routes with the shared secret.
pub async fn cron_auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth.cron_secret.is_none() {
        tracing::error!("cron routes have no shared secret configured, rejecting request");
        return Err(StatusCode::UNAUTHORIZED);
    }
    if cron_authorized(request.headers(), auth.cron_secret.as_deref()) {
        return Ok(next.run(request).await);
    }
    Err(StatusCode::UNAUTHORIZED)
}
