use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Priority of a todo, stored as uppercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// A todo item as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    /// Optional deadline, always interpreted in UTC.
    pub due_date: Option<DateTime<Utc>>,
    pub category_id: Option<i64>,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a todo. `completed` is intentionally
/// absent: creation starts at `false` and updates preserve the stored flag,
/// so the only way to flip it is the explicit toggle operation.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TodoInput {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description must not exceed 1000 characters"))]
    pub description: Option<String>,

    /// Defaults to `MEDIUM` when absent.
    pub priority: Option<Priority>,

    pub due_date: Option<DateTime<Utc>>,

    /// Category to attach the todo to. Must name a category owned by the
    /// caller; omitting it detaches the todo.
    pub category_id: Option<i64>,
}

/// Query parameters accepted when listing todos. A non-blank `search` takes
/// precedence over `completed`.
#[derive(Debug, Deserialize)]
pub struct TodoListQuery {
    pub completed: Option<bool>,
    pub search: Option<String>,
}

/// Per-owner completion counts, taken from a single snapshot.
#[derive(Debug, Serialize)]
pub struct TodoStats {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> TodoInput {
        TodoInput {
            title: "Buy groceries".to_string(),
            description: Some("Milk, eggs".to_string()),
            priority: Some(Priority::High),
            due_date: Some(Utc::now()),
            category_id: None,
        }
    }

    #[test]
    fn test_todo_input_validation() {
        assert!(valid_input().validate().is_ok());

        let input = TodoInput {
            title: "".to_string(),
            ..valid_input()
        };
        assert!(input.validate().is_err());

        let input = TodoInput {
            title: "x".repeat(256),
            ..valid_input()
        };
        assert!(input.validate().is_err());

        let input = TodoInput {
            description: Some("y".repeat(1001)),
            ..valid_input()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_priority_serializes_uppercase() {
        assert_eq!(serde_json::to_value(Priority::Low).unwrap(), "LOW");
        assert_eq!(serde_json::to_value(Priority::High).unwrap(), "HIGH");

        let parsed: Priority = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(parsed, Priority::Medium);
    }

    #[test]
    fn test_todo_input_accepts_camel_case_payload() {
        let input: TodoInput = serde_json::from_value(serde_json::json!({
            "title": "Call dentist",
            "dueDate": "2026-09-01T09:00:00Z",
            "categoryId": 4
        }))
        .unwrap();

        assert_eq!(input.title, "Call dentist");
        assert_eq!(input.category_id, Some(4));
        assert!(input.due_date.is_some());
        assert!(input.priority.is_none());
    }
}
