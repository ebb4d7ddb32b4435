use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::TokenValidator;
use crate::config::JwtSettings;
use crate::db::Database;

/// The shared application state. Handlers and middleware pull the part they
/// need through `FromRef`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pool for the backend selected at boot.
    pub db: Database,
    pub tokens: Arc<TokenValidator>,
}

impl AppState {
    pub fn new(db: Database, jwt: &JwtSettings) -> Self {
        Self { db, tokens: Arc::new(TokenValidator::new(jwt)) }
    }
}

impl FromRef<AppState> for Arc<TokenValidator> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
