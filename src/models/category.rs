use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Fallback color applied when a request omits one.
pub const DEFAULT_COLOR: &str = "#1976d2";

lazy_static! {
    static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// A category as returned by the API. `todo_count` is derived at query time
/// from the todos referencing the row; it is not a stored column.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub user_id: i64,
    pub todo_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a category.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Category name must be between 1 and 100 characters"
    ))]
    pub name: String,

    #[validate(length(max = 255, message = "Description must not exceed 255 characters"))]
    pub description: Option<String>,

    /// Hex color such as `#1976d2`. Defaults to [`DEFAULT_COLOR`] when absent.
    #[validate(regex(
        path = "HEX_COLOR_REGEX",
        message = "Color must be a hex color like #1976d2"
    ))]
    pub color: Option<String>,
}
