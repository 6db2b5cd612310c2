use serde::{Deserialize, Serialize};

use crate::model::board::Board;

/// One end of a drag: the id of a task or of a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragTarget {
    pub id: String,
}

/// A completed drag as reported by the pointer layer.
/// `over` is absent when the item was dropped outside any target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEvent {
    pub active: DragTarget,
    pub over: Option<DragTarget>,
}

impl DragEvent {
    pub fn new(active_id: &str, over_id: Option<&str>) -> Self {
        DragEvent {
            active: DragTarget {
                id: active_id.to_string(),
            },
            over: over_id.map(|id| DragTarget { id: id.to_string() }),
        }
    }
}

/// Apply a finished drag to a board snapshot and return the new snapshot.
///
/// The dragged task is spliced out of its column and inserted just before the
/// task it was dropped on, or appended when dropped on a column itself. Only
/// the source and destination lists change; every other task keeps its
/// column and relative order. Drops that resolve to nothing return the board
/// unchanged.
pub fn on_drag_end(mut board: Board, event: &DragEvent) -> Board {
    let active_id = event.active.id.as_str();
    let Some(over_id) = event.over.as_ref().map(|o| o.id.as_str()) else {
        return board;
    };
    if over_id == active_id {
        return board;
    }

    let Some(source) = board.column_of(active_id).map(str::to_string) else {
        tracing::debug!(active = active_id, "drag source not found");
        return board;
    };
    let dest = if board.columns.contains_key(over_id) {
        over_id.to_string()
    } else {
        match board.column_of(over_id) {
            Some(column) => column.to_string(),
            None => {
                tracing::debug!(over = over_id, "drop target not found");
                return board;
            }
        }
    };

    let Some(source_tasks) = board.columns.get_mut(&source) else {
        return board;
    };
    let Some(from) = source_tasks.iter().position(|t| t.id == active_id) else {
        return board;
    };
    let mut moved = source_tasks.remove(from);
    if source != dest {
        moved.column = dest.clone();
    }

    let dest_tasks = board.columns.entry(dest).or_default();
    match dest_tasks.iter().position(|t| t.id == over_id) {
        Some(at) => dest_tasks.insert(at, moved),
        None => dest_tasks.push(moved),
    }
    board
}
