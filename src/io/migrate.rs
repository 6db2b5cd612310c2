use indexmap::IndexMap;
use serde::Deserialize;

use crate::model::board::{Board, ColumnRef};
use crate::model::task::Task;

/// Column order as found in a stored document
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawColumnOrder {
    /// Oldest format: column names double as keys
    Legacy(Vec<String>),
    Current(Vec<ColumnRef>),
}

impl Default for RawColumnOrder {
    fn default() -> Self {
        RawColumnOrder::Current(Vec::new())
    }
}

/// A board document in any format we have ever written.
///
/// Project boards used to keep their tasks in a flat list tagged by
/// `column`; those arrive in `tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBoard {
    #[serde(default)]
    pub column_order: RawColumnOrder,
    #[serde(default)]
    pub columns: IndexMap<String, Vec<Task>>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl RawBoard {
    pub fn is_legacy(&self) -> bool {
        matches!(&self.column_order, RawColumnOrder::Legacy(names) if !names.is_empty())
    }
}

/// Upgrade a stored document to the canonical board shape.
///
/// Legacy string columns become `{id: name, name}`. Each column's list is
/// gathered from the keyed map and from loose tasks naming that column, and
/// every task's `column` is rewritten to the column id. The result always
/// has exactly one list per column; lists for unknown columns and loose
/// tasks pointing nowhere are dropped. Applying this to its own output
/// changes nothing.
pub fn migrate(raw: RawBoard) -> Board {
    let legacy = raw.is_legacy();
    let RawBoard {
        column_order,
        mut columns,
        tasks: mut loose,
    } = raw;

    let refs: Vec<ColumnRef> = match column_order {
        RawColumnOrder::Legacy(names) => names
            .into_iter()
            .map(|name| ColumnRef::new(name.clone(), name))
            .collect(),
        RawColumnOrder::Current(refs) => refs,
    };

    let mut board = Board {
        column_order: Vec::with_capacity(refs.len()),
        columns: IndexMap::with_capacity(refs.len()),
    };
    for col in refs {
        if board.columns.contains_key(&col.id) {
            tracing::warn!(column = %col.id, "duplicate column id dropped");
            continue;
        }
        // Legacy documents key their lists by name, current ones by id.
        let key = if legacy { &col.name } else { &col.id };
        let mut list = columns.shift_remove(key).unwrap_or_default();
        let (mine, rest): (Vec<Task>, Vec<Task>) =
            loose.into_iter().partition(|t| t.column == *key);
        loose = rest;
        list.extend(mine);
        for task in &mut list {
            task.column = col.id.clone();
        }
        board.columns.insert(col.id.clone(), list);
        board.column_order.push(col);
    }

    if !columns.is_empty() {
        tracing::warn!(
            columns = ?columns.keys().collect::<Vec<_>>(),
            "dropping task lists for columns missing from column order"
        );
    }
    if !loose.is_empty() {
        tracing::warn!(tasks = loose.len(), "dropping tasks whose column does not exist");
    }
    if legacy {
        tracing::debug!(columns = board.column_order.len(), "migrated legacy column order");
    }
    board
}

/// Parse and migrate a stored board document.
pub fn board_from_value(value: serde_json::Value) -> Result<Board, serde_json::Error> {
    let raw: RawBoard = serde_json::from_value(value)?;
    Ok(migrate(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn legacy_inbox_upgrades_to_id_columns() {
        let value = json!({
            "columnOrder": ["Inbox", "Later"],
            "columns": {
                "Inbox": [{"id": "t1", "text": "Buy milk", "column": "Inbox"}],
                "Later": [{"id": "t2", "text": "Paint fence", "column": "Later"}]
            }
        });
        let board = board_from_value(value).unwrap();
        assert_eq!(
            board.column_order,
            vec![ColumnRef::new("Inbox", "Inbox"), ColumnRef::new("Later", "Later")]
        );
        assert_eq!(board.tasks("Inbox")[0].id, "t1");
        assert_eq!(board.tasks("Inbox")[0].column, "Inbox");
        assert_eq!(board.tasks("Later")[0].column, "Later");
        assert!(board.is_consistent());
    }

    #[test]
    fn legacy_project_buckets_flat_tasks() {
        let value = json!({
            "columnOrder": ["To Do", "Done"],
            "tasks": [
                {"id": "a", "text": "A", "column": "Done"},
                {"id": "b", "text": "B", "column": "To Do"},
                {"id": "c", "text": "C", "column": "Done"},
                {"id": "x", "text": "X", "column": "Archive"}
            ]
        });
        let board = board_from_value(value).unwrap();
        let done: Vec<&str> = board.tasks("Done").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(done, vec!["a", "c"]);
        assert_eq!(board.tasks("To Do").len(), 1);
        assert_eq!(board.task_count(), 3);
    }

    #[test]
    fn current_format_passes_through() {
        let value = json!({
            "columnOrder": [{"id": "c1", "name": "Now"}, {"id": "c2", "name": "Next"}],
            "columns": {
                "c1": [{"id": "t1", "text": "One", "column": "c1"}],
                "c2": []
            }
        });
        let board = board_from_value(value).unwrap();
        assert_eq!(board.column_name("c1"), Some("Now"));
        assert_eq!(board.tasks("c1").len(), 1);
        assert!(board.is_consistent());
    }

    #[test]
    fn missing_and_stray_lists_reconciled() {
        let value = json!({
            "columnOrder": [{"id": "c1", "name": "Now"}, {"id": "c2", "name": "Next"}],
            "columns": {
                "c1": [],
                "ghost": [{"id": "t9", "text": "Lost", "column": "ghost"}]
            }
        });
        let board = board_from_value(value).unwrap();
        assert!(board.is_consistent());
        assert!(board.tasks("c2").is_empty());
        assert!(!board.columns.contains_key("ghost"));
    }

    #[test]
    fn duplicate_column_ids_collapse() {
        let value = json!({"columnOrder": ["Inbox", "Inbox"], "columns": {"Inbox": []}});
        let board = board_from_value(value).unwrap();
        assert_eq!(board.column_order.len(), 1);
        assert!(board.is_consistent());
    }

    #[test]
    fn migration_is_idempotent() {
        let value = json!({
            "columnOrder": ["Inbox", "Later"],
            "columns": {
                "Inbox": [{"id": "t1", "text": "Buy milk", "column": "Inbox"}],
                "Later": []
            }
        });
        let once = board_from_value(value).unwrap();
        let twice = board_from_value(serde_json::to_value(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_document_yields_empty_board() {
        let board = board_from_value(json!({})).unwrap();
        assert!(board.column_order.is_empty());
        assert!(board.columns.is_empty());
    }
}
