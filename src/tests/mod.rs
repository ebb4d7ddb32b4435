//! Unit and in-process integration tests for the backend.
//!
//! ## Test Modules
//!
//! - **config_tests**: configuration resolution against injected environments
//! - **cors_tests**: origin allow-list evaluation
//! - **auth_tests**: bearer token validation rules
//! - **error_tests**: HTTP error envelopes
//! - **api_tests**: router behaviour (CORS headers, auth pipeline, health)
//! - **startup_tests**: full startup sequence against real SQLite files
//!
//! Environment lookups are injected, so the tests never touch process env and
//! can run in parallel.

pub mod config_tests;

use std::collections::HashMap;

use crate::config::{self, AppConfig, FileConfig};

pub const TEST_SECRET: &str = "test-signing-secret-with-enough-length";

/// Environment lookup backed by a fixed set of variables.
pub fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> =
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| vars.get(key).cloned()
}

/// Structured configuration from the embedded defaults only.
pub fn default_file_config() -> FileConfig {
    config::build_file_config(false).unwrap()
}

/// Embedded defaults resolved with a signing key and the given extra variables.
pub fn test_config(pairs: &[(&str, &str)]) -> AppConfig {
    let mut vars = vec![(config::ENV_JWT_KEY, TEST_SECRET)];
    vars.extend_from_slice(pairs);
    config::resolve(default_file_config(), env_of(&vars)).unwrap()
}

pub fn now_secs() -> u64 {
    chrono::Utc::now().timestamp() as u64
}

pub fn sign(secret: &str, claims: serde_json::Value) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
