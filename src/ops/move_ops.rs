use crate::model::board::Board;

/// Error type for moving a task between boards
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("destination project {0} has no columns")]
    NoColumns(String),
}

/// Move a task from `source` into the first column of the destination
/// project's board, rewriting its `column` and `project_id`.
///
/// The destination is validated before the source is touched, so a failed
/// move leaves both boards unchanged. Returns the destination column id.
pub fn move_task_to_project(
    source: &mut Board,
    dest: &mut Board,
    dest_project_id: &str,
    task_id: &str,
) -> Result<String, MoveError> {
    let dest_column = dest
        .column_order
        .first()
        .map(|c| c.id.clone())
        .ok_or_else(|| MoveError::NoColumns(dest_project_id.to_string()))?;

    let source_column = source
        .column_of(task_id)
        .map(str::to_string)
        .ok_or_else(|| MoveError::NotFound(task_id.to_string()))?;
    let tasks = source
        .columns
        .get_mut(&source_column)
        .ok_or_else(|| MoveError::NotFound(task_id.to_string()))?;
    let idx = tasks
        .iter()
        .position(|t| t.id == task_id)
        .ok_or_else(|| MoveError::NotFound(task_id.to_string()))?;

    let mut task = tasks.remove(idx);
    task.column = dest_column.clone();
    task.project_id = Some(dest_project_id.to_string());
    task.project_name = None;
    dest.columns.entry(dest_column.clone()).or_default().push(task);

    tracing::debug!(
        task = task_id,
        project = dest_project_id,
        column = %dest_column,
        "task moved to project"
    );
    Ok(dest_column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::board::ColumnRef;
    use crate::ops::board_ops::{NewTask, add_task};
    use indexmap::IndexMap;

    fn project_board() -> Board {
        let mut board = Board::with_default_column("backlog");
        board.column_order.push(ColumnRef::new("active", "Active"));
        board.columns.insert("active".into(), Vec::new());
        board
    }

    #[test]
    fn moves_inbox_task_to_first_column() {
        let mut inbox = Board::inbox();
        let task = add_task(&mut inbox, "Inbox", NewTask::titled("File taxes")).unwrap();
        let mut dest = project_board();

        let column = move_task_to_project(&mut inbox, &mut dest, "p9", &task.id).unwrap();
        assert_eq!(column, "backlog");
        assert_eq!(inbox.task_count(), 0);
        let moved = &dest.tasks("backlog")[0];
        assert_eq!(moved.id, task.id);
        assert_eq!(moved.column, "backlog");
        assert_eq!(moved.project_id.as_deref(), Some("p9"));
    }

    #[test]
    fn destination_without_columns_leaves_source_alone() {
        let mut inbox = Board::inbox();
        let task = add_task(&mut inbox, "Inbox", NewTask::titled("File taxes")).unwrap();
        let before = inbox.clone();
        let mut dest = Board {
            column_order: Vec::new(),
            columns: IndexMap::new(),
        };
        let err = move_task_to_project(&mut inbox, &mut dest, "p9", &task.id).unwrap_err();
        assert_eq!(err, MoveError::NoColumns("p9".into()));
        assert_eq!(inbox, before);
    }

    #[test]
    fn unknown_task() {
        let mut inbox = Board::inbox();
        let mut dest = project_board();
        assert_eq!(
            move_task_to_project(&mut inbox, &mut dest, "p9", "nope"),
            Err(MoveError::NotFound("nope".into()))
        );
    }
}
