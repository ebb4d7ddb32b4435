use axum::Json;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::middleware::Principal;

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub subject: Option<String>,
    pub issuer: Option<String>,
    /// Expiry as seconds since the Unix epoch.
    pub expires_at: u64,
    /// Every other claim the token carried.
    #[schema(value_type = Object)]
    pub claims: Value,
}

#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Session",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Claims of the authenticated caller", body = SessionResponse),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn current_session(principal: Principal) -> Json<SessionResponse> {
    let claims = principal.claims;
    Json(SessionResponse {
        subject: claims.sub,
        issuer: claims.iss,
        expires_at: claims.exp,
        claims: Value::Object(claims.extra),
    })
}
