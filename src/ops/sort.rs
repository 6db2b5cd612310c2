use crate::model::task::{Subtask, Task};

/// Display order for a column: open tasks before completed ones, then by
/// priority (1 first). Ties keep their manual order.
pub fn sort_for_column(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by_key(|t| (t.completed, t.priority));
    sorted
}

/// Display order for a checklist: open subtasks first, otherwise unchanged.
pub fn sort_subtasks(subtasks: &[Subtask]) -> Vec<&Subtask> {
    let mut sorted: Vec<&Subtask> = subtasks.iter().collect();
    sorted.sort_by_key(|s| s.completed);
    sorted
}

/// Drop completed tasks unless the view shows them
pub fn visible_tasks<'a, I>(tasks: I, show_completed: bool) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .filter(|t| show_completed || !t.completed)
        .collect()
}
