//! Bearer-token access control.
//!
//! When `auth.enabled` is set, routes wrapped with [`require_auth`] need an
//! HS256 JWT signed with the configured secret and carrying the configured
//! issuer and audience. Validated claims are attached to the request.

use std::sync::Arc;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;
use crate::http::error::AppError;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    pub iat: u64,
    pub iss: String,
    pub aud: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Access token is required")]
    MissingToken,

    #[error("Access token has expired")]
    Expired,

    #[error("Invalid access token")]
    Invalid,

    #[error("Authentication failed")]
    Failed,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => AuthError::Invalid,
            _ => AuthError::Failed,
        }
    }
}

/// Issues and validates access tokens.
pub struct TokenValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    expires_in_secs: u64,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            expires_in_secs: config.expires_in_secs,
        }
    }

    /// Sign a token for `subject` valid for the configured lifetime.
    pub fn create_token(&self, subject: &str) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.expires_in_secs,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(AuthError::from)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Accept `Bearer <token>` or a bare token.
fn extract_token(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// Middleware rejecting requests without a valid access token.
pub async fn require_auth(
    State(validator): State<Arc<TokenValidator>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(extract_token)
        .map(str::to_string);

    let Some(token) = token else {
        return AppError::Unauthorized(AuthError::MissingToken.to_string()).into_response();
    };

    match validator.validate_token(&token) {
        Ok(claims) => {
            tracing::debug!(subject = %claims.sub, "Access token accepted");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Access token rejected");
            AppError::Unauthorized(e.to_string()).into_response()
        }
    }
}
