//! Success response envelope.
//!
//! Handlers return [`ApiResponse`], which wraps the payload as
//! `{ data, message, status }` with a message chosen from the request method.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
    pub status: u16,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, method: &Method, status: StatusCode, is_list: bool) -> Self {
        Self {
            data,
            message: success_message(method, status, is_list).to_string(),
            status: status.as_u16(),
        }
    }

    pub fn ok(data: T, method: &Method) -> Self {
        Self::new(data, method, StatusCode::OK, false)
    }

    pub fn list(data: T) -> Self {
        Self::new(data, &Method::GET, StatusCode::OK, true)
    }

    pub fn created(data: T) -> Self {
        Self::new(data, &Method::POST, StatusCode::CREATED, false)
    }
}

/// Message for a successful response.
pub fn success_message(method: &Method, status: StatusCode, is_list: bool) -> &'static str {
    if method == Method::POST && status == StatusCode::CREATED {
        "Resource created successfully"
    } else if method == Method::GET && is_list {
        "Resources retrieved successfully"
    } else if method == Method::GET {
        "Resource retrieved successfully"
    } else if method == Method::PUT || method == Method::PATCH {
        "Resource updated successfully"
    } else if method == Method::DELETE {
        "Resource deleted successfully"
    } else {
        "Operation completed successfully"
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_by_method() {
        assert_eq!(
            success_message(&Method::POST, StatusCode::CREATED, false),
            "Resource created successfully"
        );
        assert_eq!(
            success_message(&Method::POST, StatusCode::OK, false),
            "Operation completed successfully"
        );
        assert_eq!(
            success_message(&Method::GET, StatusCode::OK, true),
            "Resources retrieved successfully"
        );
        assert_eq!(
            success_message(&Method::GET, StatusCode::OK, false),
            "Resource retrieved successfully"
        );
        assert_eq!(
            success_message(&Method::PATCH, StatusCode::OK, false),
            "Resource updated successfully"
        );
        assert_eq!(
            success_message(&Method::DELETE, StatusCode::OK, false),
            "Resource deleted successfully"
        );
    }

    #[test]
    fn test_created_envelope() {
        let response = ApiResponse::created(serde_json::json!({ "id": 1 }));
        assert_eq!(response.status, 201);
        assert_eq!(response.message, "Resource created successfully");
        assert_eq!(response.into_response().status(), StatusCode::CREATED);
    }
}
