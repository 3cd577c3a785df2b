//! Application error type and its HTTP rendering.
//!
//! Every failure leaving a handler or middleware is an [`AppError`], rendered
//! as the standard envelope `{ data: null, message, status, error, details? }`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::security::violation::SecurityViolation;

/// Field name to messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

static EXPOSE_ERROR_DETAILS: AtomicBool = AtomicBool::new(false);

/// Include internal error causes in responses. Off in production.
pub fn set_expose_error_details(expose: bool) {
    EXPOSE_ERROR_DETAILS.store(expose, Ordering::Relaxed);
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Security(#[from] SecurityViolation),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("Internal server error")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
    pub fn internal<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AppError::Internal(Box::new(err))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Security(violation) => violation.status,
            AppError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Name reported in the envelope's `error` field.
    pub fn name(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "ValidationError",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Security(_) => "SecurityViolation",
            AppError::Timeout(_) => "RequestTimeout",
            AppError::Internal(_) => "InternalServerError",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Validation(fields) => Some(json!({ "validationErrors": fields })),
            AppError::Security(violation) => Some(violation.details()),
            AppError::Internal(source) if EXPOSE_ERROR_DETAILS.load(Ordering::Relaxed) => {
                let mut chain = vec![source.to_string()];
                let mut cause = source.source();
                while let Some(err) = cause {
                    chain.push(err.to_string());
                    cause = err.source();
                }
                Some(json!({ "causes": chain }))
            }
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => format!("{field} is invalid ({})", e.code),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        AppError::Validation(fields)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let AppError::Internal(source) = &self {
            tracing::error!(error = %source, "Unhandled internal error");
        }

        let mut body = json!({
            "data": null,
            "message": self.to_string(),
            "status": status.as_u16(),
            "error": self.name(),
        });
        if let Some(details) = self.details() {
            body["details"] = details;
        }

        let mut response = (status, Json(body)).into_response();
        if let AppError::Security(SecurityViolation {
            retry_after: Some(secs),
            ..
        }) = &self
        {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::violation::ViolationKind;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let response = AppError::NotFound("Example with ID x not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["data"], serde_json::Value::Null);
        assert_eq!(body["message"], "Example with ID x not found");
        assert_eq!(body["status"], 404);
        assert_eq!(body["error"], "NotFound");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_security_envelope_and_retry_after() {
        let response = AppError::from(SecurityViolation::rate_limited(30)).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "30");

        let body = body_json(response).await;
        assert_eq!(body["message"], "Too many requests");
        assert_eq!(body["details"]["securityCode"], "SEC_005_RATE_LIMIT");
        assert_eq!(body["details"]["retryAfter"], 30);
    }

    #[tokio::test]
    async fn test_validation_details() {
        let mut fields = FieldErrors::new();
        fields.insert("name".into(), vec!["name must not be empty".into()]);
        let body = body_json(AppError::Validation(fields).into_response()).await;

        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["details"]["validationErrors"]["name"][0], "name must not be empty");
    }

    #[tokio::test]
    async fn test_timeout_message() {
        let violation = SecurityViolation::content(ViolationKind::Xss, "x");
        assert_eq!(AppError::from(violation).status(), StatusCode::BAD_REQUEST);

        let body = body_json(AppError::Timeout(250).into_response()).await;
        assert_eq!(body["status"], 408);
        assert_eq!(body["message"], "Request timeout after 250ms");
    }
}
