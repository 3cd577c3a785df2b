//! Request size limits.
//!
//! # Responsibilities
//! - Reject bodies whose declared `Content-Length` exceeds the limit
//! - Reject over-long URLs and string values
//!
//! # Design Decisions
//! - `Content-Length` is checked before any body bytes are read
//! - Bodies without a declared length are still capped while buffering

use axum::http::{header, HeaderMap};

use crate::security::violation::{SecurityViolation, ViolationKind};

/// Reject a declared body length above `max_body_size`.
pub fn check_content_length(headers: &HeaderMap, max_body_size: usize) -> Result<(), SecurityViolation> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());

    match declared {
        Some(length) if length > max_body_size as u64 => Err(SecurityViolation::payload_too_large()),
        _ => Ok(()),
    }
}

/// Reject a string value longer than `max_len` UTF-16 code units, so
/// characters outside the BMP count twice.
pub fn check_string_length(value: &str, max_len: usize, context: &str) -> Result<(), SecurityViolation> {
    if value.encode_utf16().count() > max_len {
        return Err(SecurityViolation::content(
            ViolationKind::PayloadTooLarge,
            format!("Input too long in {context}"),
        ));
    }
    Ok(())
}

pub fn check_url_length(url: &str, max_url_length: usize) -> Result<(), SecurityViolation> {
    if url.len() > max_url_length {
        return Err(SecurityViolation::content(
            ViolationKind::PayloadTooLarge,
            "URL too long",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    #[test]
    fn test_content_length_limit() {
        let mut headers = HeaderMap::new();
        assert!(check_content_length(&headers, 10).is_ok());

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("10"));
        assert!(check_content_length(&headers, 10).is_ok());

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("11"));
        let err = check_content_length(&headers, 10).unwrap_err();
        assert_eq!(err.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.message, "Request entity too large");
    }

    #[test]
    fn test_string_length_limit() {
        assert!(check_string_length("abc", 3, "request body").is_ok());
        let err = check_string_length("abcd", 3, "request body.name").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Input too long in request body.name");
        assert_eq!(err.code(), "SEC_007_PAYLOAD_TOO_LARGE");
    }

    #[test]
    fn test_string_length_counts_utf16_units() {
        assert!(check_string_length("é", 1, "request body").is_ok());
        assert!(check_string_length("😀", 2, "request body").is_ok());
        assert!(check_string_length("😀", 1, "request body").is_err());
        assert!(check_string_length(&"😀".repeat(5001), 10_000, "request body").is_err());
    }

    #[test]
    fn test_url_length_limit() {
        assert!(check_url_length("/examples", 2048).is_ok());
        assert!(check_url_length(&"/a".repeat(1025), 2048).is_err());
    }
}
