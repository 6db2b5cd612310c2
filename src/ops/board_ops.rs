use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::board::{Board, ColumnRef};
use crate::model::task::{Comment, Priority, Subtask, Task, fresh_id};

/// Error type for board mutations.
///
/// Unknown column or task ids on rename/update/delete are not errors: those
/// calls return `false` and leave the board untouched.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Append a new empty column. Returns the new column's id.
pub fn add_column(board: &mut Board, name: &str) -> Result<String, BoardError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BoardError::Validation("column name is empty".into()));
    }
    let id = fresh_id();
    board.column_order.push(ColumnRef::new(id.clone(), name));
    board.columns.insert(id.clone(), Vec::new());
    tracing::debug!(column = %id, name, "column added");
    Ok(id)
}

/// Rename a column. Returns false (and changes nothing) if the column is
/// unknown or the new name is blank.
pub fn rename_column(board: &mut Board, column_id: &str, new_name: &str) -> bool {
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return false;
    }
    match board.column_order.iter_mut().find(|c| c.id == column_id) {
        Some(col) => {
            col.name = new_name.to_string();
            true
        }
        None => false,
    }
}

/// Remove a column and its task list.
///
/// The tasks in the removed list are dropped with it; callers that want to
/// keep them must move them first. Deleting the last column is refused.
/// Returns the removed tasks, or `Ok(None)` if the column was unknown.
pub fn delete_column(board: &mut Board, column_id: &str) -> Result<Option<Vec<Task>>, BoardError> {
    let Some(idx) = board.column_order.iter().position(|c| c.id == column_id) else {
        return Ok(None);
    };
    if board.column_order.len() <= 1 {
        return Err(BoardError::InvariantViolation(
            "a board must keep at least one column".into(),
        ));
    }
    board.column_order.remove(idx);
    let removed = board.columns.shift_remove(column_id).unwrap_or_default();
    if !removed.is_empty() {
        tracing::warn!(
            column = column_id,
            tasks = removed.len(),
            "column deleted with tasks still inside"
        );
    }
    Ok(Some(removed))
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Caller-supplied fields for a new task; everything else is defaulted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub text: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl NewTask {
    pub fn titled(text: impl Into<String>) -> Self {
        NewTask {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Create a task at the bottom of `column_id`. Returns a copy of the stored task.
pub fn add_task(board: &mut Board, column_id: &str, new: NewTask) -> Result<Task, BoardError> {
    let text = new.text.trim();
    if text.is_empty() {
        return Err(BoardError::Validation("task text is empty".into()));
    }
    if !board.has_column(column_id) {
        return Err(BoardError::Validation(format!("unknown column: {}", column_id)));
    }

    let mut task = Task::new(fresh_id(), text.to_string(), column_id.to_string());
    task.description = new.description;
    task.priority = new.priority.unwrap_or_default();
    task.date = non_blank(new.date);
    task.label = non_blank(new.label);
    task.tag = non_blank(new.tag);
    task.project_id = new.project_id;

    board
        .columns
        .entry(column_id.to_string())
        .or_default()
        .push(task.clone());
    tracing::debug!(task = %task.id, column = column_id, "task added");
    Ok(task)
}

/// A shallow patch over a task's editable fields. `None` leaves a field alone;
/// for optional fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub text: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "present")]
    pub date: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub label: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub tag: Option<Option<String>>,
    pub subtasks: Option<Vec<Subtask>>,
    pub order: Option<f64>,
}

/// Keep an explicit JSON `null` apart from a missing field.
fn present<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(d)?))
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.date.is_none()
            && self.label.is_none()
            && self.tag.is_none()
            && self.subtasks.is_none()
            && self.order.is_none()
    }

    fn apply(self, task: &mut Task) {
        if let Some(text) = self.text {
            task.text = text.trim().to_string();
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(date) = self.date {
            task.date = non_blank(date);
        }
        if let Some(label) = self.label {
            task.label = non_blank(label);
        }
        if let Some(tag) = self.tag {
            task.tag = non_blank(tag);
        }
        if let Some(subtasks) = self.subtasks {
            task.subtasks = subtasks;
        }
        if let Some(order) = self.order {
            task.order = Some(order);
        }
    }
}

/// Merge `patch` into the task. Returns false if the task is not in that
/// column. A patch that blanks the text is rejected before anything changes.
pub fn update_task(
    board: &mut Board,
    column_id: &str,
    task_id: &str,
    patch: TaskPatch,
) -> Result<bool, BoardError> {
    if patch.text.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(BoardError::Validation("task text is empty".into()));
    }
    let Some(task) = find_task_mut(board, column_id, task_id) else {
        return Ok(false);
    };
    patch.apply(task);
    Ok(true)
}

/// Remove a task. Returns the removed task if it was found.
pub fn delete_task(board: &mut Board, column_id: &str, task_id: &str) -> Option<Task> {
    let tasks = board.columns.get_mut(column_id)?;
    let idx = tasks.iter().position(|t| t.id == task_id)?;
    Some(tasks.remove(idx))
}

/// Locate a task anywhere on the board, returning its column id too.
pub fn find_task<'a>(board: &'a Board, task_id: &str) -> Option<(&'a str, &'a Task)> {
    board.iter_tasks().find(|(_, t)| t.id == task_id)
}

fn find_task_mut<'a>(board: &'a mut Board, column_id: &str, task_id: &str) -> Option<&'a mut Task> {
    board
        .columns
        .get_mut(column_id)?
        .iter_mut()
        .find(|t| t.id == task_id)
}

fn find_task_anywhere_mut<'a>(board: &'a mut Board, task_id: &str) -> Option<&'a mut Task> {
    let column_id = board.column_of(task_id)?.to_string();
    find_task_mut(board, &column_id, task_id)
}

// ---------------------------------------------------------------------------
// Subtasks and comments
// ---------------------------------------------------------------------------

/// Append a subtask. Returns the new subtask id, or `Ok(None)` if the task
/// is unknown.
pub fn add_subtask(board: &mut Board, task_id: &str, text: &str) -> Result<Option<String>, BoardError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(BoardError::Validation("subtask text is empty".into()));
    }
    let Some(task) = find_task_anywhere_mut(board, task_id) else {
        return Ok(None);
    };
    let id = fresh_id();
    task.subtasks.push(Subtask {
        id: id.clone(),
        text: text.to_string(),
        completed: false,
    });
    Ok(Some(id))
}

/// Flip a subtask's completed flag. Returns false if either id is unknown.
pub fn toggle_subtask(board: &mut Board, task_id: &str, subtask_id: &str) -> bool {
    let Some(task) = find_task_anywhere_mut(board, task_id) else {
        return false;
    };
    match task.subtasks.iter_mut().find(|s| s.id == subtask_id) {
        Some(sub) => {
            sub.completed = !sub.completed;
            true
        }
        None => false,
    }
}

/// Append a comment. Returns the new comment id, or `Ok(None)` if the task
/// is unknown.
pub fn add_comment(
    board: &mut Board,
    task_id: &str,
    text: &str,
    author: &str,
    timestamp: DateTime<Utc>,
) -> Result<Option<String>, BoardError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(BoardError::Validation("comment text is empty".into()));
    }
    let Some(task) = find_task_anywhere_mut(board, task_id) else {
        return Ok(None);
    };
    let id = fresh_id();
    task.comments.push(Comment {
        id: id.clone(),
        text: text.to_string(),
        author: author.to_string(),
        timestamp,
    });
    Ok(Some(id))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
