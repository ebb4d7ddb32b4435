use std::time::Duration;

use crate::db::Database;
use crate::error::{AppError, AppResult};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct VersionInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub profile: String,
    pub os: String,
    pub arch: String,
    pub database: String,
}

// Health check endpoint - lightweight, no database access
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Health",
    responses((status = 200, description = "Process is alive", body = String))
)]
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness probe: checks DB connectivity with timeout protection
#[utoipa::path(
    get,
    path = "/readyz",
    tag = "Health",
    responses(
        (status = 200, description = "Database reachable", body = String),
        (status = 503, description = "Database unreachable or timed out")
    )
)]
pub async fn readyz(State(db): State<Database>) -> AppResult<impl IntoResponse> {
    tokio::time::timeout(Duration::from_secs(5), db.ping())
        .await
        .map_err(|_| AppError::ServiceUnavailable("not ready: timeout".to_string()))??;
    Ok((StatusCode::OK, "ready"))
}

#[utoipa::path(
    get,
    path = "/version",
    tag = "Health",
    responses((status = 200, description = "Build information", body = VersionInfo))
)]
pub async fn version(State(db): State<Database>) -> Json<VersionInfo> {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: env!("CARGO_PKG_DESCRIPTION").to_string(),
        profile: if cfg!(debug_assertions) { "debug" } else { "release" }.to_string(),
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        database: db.backend_name().to_string(),
    })
}
