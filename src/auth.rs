//! Bearer token validation.
//!
//! Tokens are HMAC-signed JWTs. The signing secret is used as-is (its UTF-8
//! bytes), expiry and not-before are always checked, and issuer/audience are
//! only checked (and then required) when they were configured.

use std::fmt;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::JwtSettings;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
    #[error("token verification failed: {0}")]
    Verification(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::Verification(value.to_string())
    }
}

/// Claims carried by an accepted token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone)]
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = settings.leeway_seconds;

        // set_issuer/set_audience only compare a claim that is present, so a
        // configured check must also make the claim mandatory.
        match settings.issuer.as_deref() {
            Some(issuer) => {
                validation.set_issuer(&[issuer]);
                validation.required_spec_claims.insert("iss".to_string());
            }
            None => validation.iss = None,
        }
        match settings.audience.as_deref() {
            Some(audience) => {
                validation.set_audience(&[audience]);
                validation.required_spec_claims.insert("aud".to_string());
            }
            None => validation.validate_aud = false,
        }

        Self { key: DecodingKey::from_secret(settings.key.as_bytes()), validation }
    }

    pub fn validate(&self, token: &str) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        debug!(sub = ?data.claims.sub, "verified bearer token");
        Ok(data.claims)
    }

    pub fn validates_issuer(&self) -> bool {
        self.validation.iss.is_some()
    }

    pub fn validates_audience(&self) -> bool {
        self.validation.validate_aud
    }
}

impl fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenValidator")
            .field("algorithms", &self.validation.algorithms)
            .field("issuer", &self.validation.iss)
            .field("audience", &self.validation.aud)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
///
/// `Ok(None)` means the request carries no credentials at all.
pub fn bearer_token(headers: &HeaderMap) -> AuthResult<Option<&str>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| AuthError::InvalidAuthorization)?.trim();
    let (scheme, token) = raw.split_once(' ').ok_or(AuthError::InvalidAuthorization)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthorization);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthorization);
    }
    Ok(Some(token))
}
