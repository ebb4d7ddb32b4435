//! Middleware components for HTTP request processing.
//!
//! The stack is installed in a fixed order: CORS first, then authentication,
//! then authorization on the routes that need a caller identity.

pub mod auth;
pub mod cors;

pub use auth::{authenticate, require_auth, Principal};
pub use cors::{cors_layer, OriginPolicy};
