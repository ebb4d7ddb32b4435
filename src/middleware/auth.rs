use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{bearer_token, AuthError, Claims, TokenValidator};
use crate::error::AppError;

/// The caller identified by a validated bearer token.
#[derive(Debug, Clone)]
pub struct Principal {
    pub claims: Claims,
}

/// Why a presented token did not produce a [`Principal`].
#[derive(Debug, Clone)]
struct RejectedToken(String);

/// Authentication: attaches a [`Principal`] when the request carries a valid token.
///
/// Requests without credentials, or with bad ones, still go through. Whether a
/// route needs a principal is decided by [`require_auth`].
pub async fn authenticate(
    State(validator): State<Arc<TokenValidator>>,
    mut req: Request,
    next: Next,
) -> Response {
    let outcome = match bearer_token(req.headers()) {
        Ok(None) => None,
        Ok(Some(token)) => Some(validator.validate(token)),
        Err(e) => Some(Err(e)),
    };

    match outcome {
        Some(Ok(claims)) => {
            req.extensions_mut().insert(Principal { claims });
        }
        Some(Err(e)) => {
            debug!(error = %e, "bearer token rejected");
            req.extensions_mut().insert(RejectedToken(e.to_string()));
        }
        None => {}
    }

    next.run(req).await
}

/// Authorization: rejects requests that `authenticate` did not attach a principal to.
pub async fn require_auth(req: Request, next: Next) -> Result<Response, AppError> {
    if req.extensions().get::<Principal>().is_none() {
        return Err(challenge(req.extensions()));
    }
    Ok(next.run(req).await)
}

fn challenge(extensions: &axum::http::Extensions) -> AppError {
    match extensions.get::<RejectedToken>() {
        Some(RejectedToken(reason)) => AuthError::Verification(reason.clone()).into(),
        None => AppError::unauthorized("authentication required"),
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Principal>().cloned().ok_or_else(|| challenge(&parts.extensions))
    }
}
