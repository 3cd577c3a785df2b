//! Request payloads and their validation rules.

use std::sync::LazyLock;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

/// Letters, digits, whitespace, `-`, `_` and `.`.
pub static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s\-_.]+$").expect("invalid name pattern"));

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateExampleDto {
    #[validate(
        length(min = 1, max = 255, message = "name must be between 1 and 255 characters"),
        regex(
            path = *NAME_PATTERN,
            message = "name may only contain letters, numbers, spaces, hyphens, underscores and dots"
        )
    )]
    pub name: String,

    #[validate(length(max = 1000, message = "description must not exceed 1000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateExampleDto {
    #[validate(
        length(min = 1, max = 255, message = "name must be between 1 and 255 characters"),
        regex(
            path = *NAME_PATTERN,
            message = "name may only contain letters, numbers, spaces, hyphens, underscores and dots"
        )
    )]
    pub name: Option<String>,

    /// Absent leaves the description alone; `null` clears it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[validate(length(max = 1000, message = "description must not exceed 1000 characters"))]
    pub description: Option<Option<String>>,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, max = 1_000_000, message = "page must be between 1 and 1000000"))]
    pub page: usize,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: usize,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 1, max = 255, message = "name must be between 1 and 255 characters"))]
    pub name: String,
}
