use serde::Serialize;

use crate::model::board::Board;
use crate::model::task::Task;

/// Gap between consecutive order hints after a list-view reorder
pub const ORDER_SPACING: f64 = 1000.0;

/// A new order hint for one task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub task_id: String,
    pub order: f64,
}

/// Reorder a flat list view by dragging `active_id` onto `over_id`.
///
/// The list is put in `order` order, the active task takes the over task's
/// position, and every task is renumbered `index * ORDER_SPACING`. Only tasks
/// whose hint actually changes are returned. Tasks from different projects
/// never reorder against each other.
pub fn reorder_list(tasks: &[Task], active_id: &str, over_id: &str) -> Vec<OrderUpdate> {
    if active_id == over_id {
        return Vec::new();
    }
    let (Some(active), Some(over)) = (
        tasks.iter().find(|t| t.id == active_id),
        tasks.iter().find(|t| t.id == over_id),
    ) else {
        return Vec::new();
    };
    if active.project_id != over.project_id {
        tracing::debug!(active = active_id, over = over_id, "cross-project reorder ignored");
        return Vec::new();
    }

    let mut sorted: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.project_id == active.project_id)
        .collect();
    sorted.sort_by(|a, b| a.order_or_zero().total_cmp(&b.order_or_zero()));

    let (Some(from), Some(to)) = (
        sorted.iter().position(|t| t.id == active_id),
        sorted.iter().position(|t| t.id == over_id),
    ) else {
        return Vec::new();
    };
    let moved = sorted.remove(from);
    sorted.insert(to, moved);

    sorted
        .iter()
        .enumerate()
        .filter_map(|(i, t)| {
            let order = i as f64 * ORDER_SPACING;
            (t.order != Some(order)).then(|| OrderUpdate {
                task_id: t.id.clone(),
                order,
            })
        })
        .collect()
}

/// Write order updates into a board as one batch. Returns how many tasks
/// were updated; ids not on the board are skipped.
pub fn apply_order_updates(board: &mut Board, updates: &[OrderUpdate]) -> usize {
    let mut applied = 0;
    for tasks in board.columns.values_mut() {
        for task in tasks.iter_mut() {
            if let Some(update) = updates.iter().find(|u| u.task_id == task.id) {
                task.order = Some(update.order);
                applied += 1;
            }
        }
    }
    applied
}
