use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Task priority, 1 (most urgent) through 4 (default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const URGENT: Priority = Priority(1);
    pub const LOWEST: Priority = Priority(4);

    /// All priorities, most urgent first
    pub const ALL: [Priority; 4] = [Priority(1), Priority(2), Priority(3), Priority(4)];

    /// Build a priority, rejecting values outside 1..=4
    pub fn new(n: u8) -> Option<Priority> {
        (1..=4).contains(&n).then_some(Priority(n))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::LOWEST
    }
}

/// Stored documents are trusted loosely: out-of-range values clamp.
impl From<u8> for Priority {
    fn from(n: u8) -> Self {
        Priority(n.clamp(1, 4))
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> Self {
        p.0
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A checklist entry under a task. Order is user-controlled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// An append-only comment on a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

/// A task as stored inside a board column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    /// ISO calendar date (`YYYY-MM-DD`); absent means no due date
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    /// Id of the column holding this task
    #[serde(default)]
    pub column: String,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<String>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub tag: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Display name of the owning project. Only set on flattened list-view copies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Manual ordering hint used by list views
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

impl Task {
    /// Create a task with default fields in the given column
    pub fn new(id: String, text: String, column: String) -> Self {
        Task {
            id,
            text,
            description: String::new(),
            completed: false,
            priority: Priority::default(),
            date: None,
            column,
            label: None,
            tag: None,
            subtasks: Vec::new(),
            comments: Vec::new(),
            project_id: None,
            project_name: None,
            order: None,
        }
    }

    /// Ordering hint with the missing value treated as 0
    pub fn order_or_zero(&self) -> f64 {
        self.order.unwrap_or(0.0)
    }
}

/// Generate a fresh opaque identifier for tasks, columns, subtasks and comments
pub fn fresh_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Older documents store "no value" as an empty string.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_clamps_out_of_range() {
        assert_eq!(Priority::from(0).get(), 1);
        assert_eq!(Priority::from(9).get(), 4);
        assert_eq!(Priority::new(5), None);
        assert_eq!(Priority::new(2), Some(Priority::from(2)));
    }

    #[test]
    fn task_defaults_from_minimal_json() {
        let task: Task = serde_json::from_str(r#"{"id":"t1","text":"Write report"}"#).unwrap();
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::LOWEST);
        assert!(task.date.is_none());
        assert!(task.subtasks.is_empty());
        assert!(task.comments.is_empty());
    }

    #[test]
    fn empty_strings_read_as_absent() {
        let task: Task = serde_json::from_str(
            r#"{"id":"t1","text":"x","date":"","label":"  ","tag":"","column":"Inbox"}"#,
        )
        .unwrap();
        assert_eq!(task.date, None);
        assert_eq!(task.label, None);
        assert_eq!(task.tag, None);
        assert_eq!(task.column, "Inbox");
    }

    #[test]
    fn serializes_camel_case_and_skips_absent() {
        let mut task = Task::new("t1".into(), "x".into(), "col".into());
        task.project_id = Some("p1".into());
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["projectId"], "p1");
        assert!(value.get("date").is_none());
        assert!(value.get("projectName").is_none());
        assert_eq!(value["priority"], 4);
    }

    #[test]
    fn fresh_ids_are_unique() {
        assert_ne!(fresh_id(), fresh_id());
    }
}
