//! # Codex Backend
//!
//! Composition root of the Codex web API. Everything here runs once at process
//! start: configuration is resolved into an immutable [`config::AppConfig`],
//! the relational backend is selected (PostgreSQL when `DATABASE_URL` is set,
//! an SQLite file otherwise), pending migrations are applied, and the HTTP
//! server is started behind CORS and JWT bearer authentication.
//!
//! ## Core Components
//!
//! - [`app`]: startup sequence and router assembly
//! - [`auth`]: bearer token validation rules
//! - [`config`]: layered configuration and environment resolution
//! - [`db`]: pool registration, migrations, readiness ping
//! - [`docs`]: OpenAPI document and Swagger UI
//! - [`error`]: HTTP error responses
//! - [`middleware`]: CORS policy, authentication and authorization
//! - [`routes`]: operational endpoints
//! - [`state`]: shared application state

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

#[cfg(test)]
mod tests;
