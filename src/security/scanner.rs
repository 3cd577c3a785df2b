//! Recursive content scanning for request bodies, query strings and URLs.

use serde_json::Value;

use crate::security::limits::check_string_length;
use crate::security::patterns::{
    classify_suspicious, contains_os_command, is_suspicious_url, is_valid_path,
};
use crate::security::violation::{SecurityViolation, ViolationKind};

/// Check one string value. `context` names where it came from
/// (e.g. `request body.items[2]`).
pub fn check_string(value: &str, context: &str, max_len: usize) -> Result<(), SecurityViolation> {
    check_string_length(value, max_len, context)?;

    if let Some(kind) = classify_suspicious(value) {
        return Err(SecurityViolation::content(
            kind,
            format!("Suspicious content detected in {context}"),
        ));
    }

    if contains_os_command(value) {
        return Err(SecurityViolation::content(
            ViolationKind::CommandInjection,
            format!("OS command detected in {context}"),
        ));
    }

    if !is_valid_path(value) {
        return Err(SecurityViolation::content(
            ViolationKind::PathTraversal,
            format!("Directory traversal attempt detected in {context}"),
        ));
    }

    Ok(())
}

/// Walk a JSON value, checking every string. Object keys are not checked.
pub fn scan_value(value: &Value, context: &str, max_len: usize) -> Result<(), SecurityViolation> {
    match value {
        Value::String(s) => check_string(s, context, max_len),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| scan_value(item, &format!("{context}[{i}]"), max_len)),
        Value::Object(map) => map
            .iter()
            .try_for_each(|(key, item)| scan_value(item, &format!("{context}.{key}"), max_len)),
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
    }
}

/// Scan a JSON request body.
pub fn scan_body(body: &Value, max_len: usize) -> Result<(), SecurityViolation> {
    scan_value(body, "request body", max_len)
}

/// Scan decoded query parameters.
pub fn scan_query(params: &[(String, String)], max_len: usize) -> Result<(), SecurityViolation> {
    params
        .iter()
        .try_for_each(|(key, value)| check_string(value, &format!("query parameters.{key}"), max_len))
}

/// Check the request target (path and query, as received).
pub fn check_url(raw: &str, max_url_length: usize) -> Result<(), SecurityViolation> {
    let traversal = || {
        SecurityViolation::content(ViolationKind::PathTraversal, "Suspicious URL pattern detected")
    };

    let decoded = urlencoding::decode(raw).map_err(|_| {
        SecurityViolation::content(ViolationKind::PathTraversal, "Malformed URL encoding")
    })?;

    if is_suspicious_url(&decoded) || !is_valid_path(raw) || !is_valid_path(&decoded) {
        return Err(traversal());
    }

    crate::security::limits::check_url_length(raw, max_url_length)
}
