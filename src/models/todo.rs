use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A todo record as the service returns it. `created_at` is an epoch
/// timestamp in milliseconds on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    pub fn status_marker(&self) -> &'static str {
        if self.completed {
            "[x]"
        } else {
            "[ ]"
        }
    }
}

/// Body for creating a todo.
#[derive(Debug, Clone, Serialize)]
pub struct NewTodo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update body. Absent fields are omitted from the PATCH payload
/// so the server leaves them untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// Patch that only flips the completion flag.
    pub fn completion(done: bool) -> Self {
        Self {
            completed: Some(done),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_record() {
        let json = r#"{"id": 12, "created_at": 1735689600000, "title": "Buy milk", "description": "2%", "completed": false, "user_id": 3}"#;
        let todo: Todo = serde_json::from_str(json).expect("Failed to parse todo record");
        assert_eq!(todo.id, 12);
        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.description.as_deref(), Some("2%"));
        assert!(!todo.completed);
        let created = todo.created_at.expect("created_at present");
        assert_eq!(created.timestamp_millis(), 1_735_689_600_000);
    }

    #[test]
    fn test_parse_minimal_record() {
        // Only id and title are guaranteed; everything else defaults.
        let json = r#"{"id": 1, "title": "Ship it"}"#;
        let todo: Todo = serde_json::from_str(json).expect("Failed to parse minimal todo");
        assert!(todo.created_at.is_none());
        assert!(todo.description.is_none());
        assert!(!todo.completed);
    }

    #[test]
    fn test_patch_omits_absent_fields() {
        let patch = TodoPatch::completion(true);
        let body = serde_json::to_string(&patch).expect("Failed to serialize patch");
        assert_eq!(body, r#"{"completed":true}"#);
    }

    #[test]
    fn test_new_todo_without_description() {
        let new = NewTodo {
            title: "Water plants".to_string(),
            description: None,
        };
        let body = serde_json::to_string(&new).expect("Failed to serialize new todo");
        assert_eq!(body, r#"{"title":"Water plants"}"#);
    }
}
