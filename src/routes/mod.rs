//! HTTP route handlers.
//!
//! - `health`: liveness, readiness and build information
//! - `session`: identity of the authenticated caller

pub mod health;
pub mod session;
