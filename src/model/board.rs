use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::task::Task;

/// Id of the column every fresh inbox starts with
pub const DEFAULT_COLUMN: &str = "Inbox";

/// A column's position entry. `id` is stable, `name` is user-editable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub id: String,
    pub name: String,
}

impl ColumnRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        ColumnRef {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A columnar container of tasks: the inbox or one project's kanban board.
///
/// `columns` holds exactly one list per id in `column_order`. Insertion order
/// within a list is the manual order of that column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub column_order: Vec<ColumnRef>,
    pub columns: IndexMap<String, Vec<Task>>,
}

impl Board {
    /// A board with a single empty column whose id and name are both `name`.
    pub fn with_default_column(name: &str) -> Self {
        let mut columns = IndexMap::new();
        columns.insert(name.to_string(), Vec::new());
        Board {
            column_order: vec![ColumnRef::new(name, name)],
            columns,
        }
    }

    /// A fresh inbox board
    pub fn inbox() -> Self {
        Board::with_default_column(DEFAULT_COLUMN)
    }

    /// Give a board with no columns its default column.
    /// Returns true if the board was changed.
    pub fn ensure_default_column(&mut self, name: &str) -> bool {
        if !self.column_order.is_empty() {
            return false;
        }
        *self = Board::with_default_column(name);
        true
    }

    pub fn has_column(&self, column_id: &str) -> bool {
        self.column_order.iter().any(|c| c.id == column_id)
    }

    pub fn column_name(&self, column_id: &str) -> Option<&str> {
        self.column_order
            .iter()
            .find(|c| c.id == column_id)
            .map(|c| c.name.as_str())
    }

    /// Tasks of a column in manual order (empty if the column is unknown)
    pub fn tasks(&self, column_id: &str) -> &[Task] {
        self.columns.get(column_id).map_or(&[], |v| v.as_slice())
    }

    /// The id of the column holding `task_id`, searching in column order.
    pub fn column_of(&self, task_id: &str) -> Option<&str> {
        self.column_order
            .iter()
            .find(|c| {
                self.columns
                    .get(&c.id)
                    .is_some_and(|tasks| tasks.iter().any(|t| t.id == task_id))
            })
            .map(|c| c.id.as_str())
    }

    /// All tasks with their column id, in column order then manual order
    pub fn iter_tasks(&self) -> impl Iterator<Item = (&str, &Task)> {
        self.column_order.iter().flat_map(move |c| {
            self.tasks(&c.id).iter().map(move |t| (c.id.as_str(), t))
        })
    }

    pub fn task_count(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    /// The key set of `columns` equals the id set of `column_order`, with no
    /// duplicate ids and at least one column.
    pub fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        !self.column_order.is_empty()
            && self.column_order.iter().all(|c| seen.insert(c.id.as_str()))
            && self.columns.len() == self.column_order.len()
            && self.column_order.iter().all(|c| self.columns.contains_key(&c.id))
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::inbox()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_tasks() -> Board {
        let mut board = Board::inbox();
        board.column_order.push(ColumnRef::new("later", "Later"));
        board.columns.insert("later".into(), Vec::new());
        board.columns["Inbox"].push(Task::new("a".into(), "A".into(), "Inbox".into()));
        board.columns["later"].push(Task::new("b".into(), "B".into(), "later".into()));
        board
    }

    #[test]
    fn inbox_has_single_default_column() {
        let board = Board::inbox();
        assert_eq!(board.column_order, vec![ColumnRef::new("Inbox", "Inbox")]);
        assert!(board.tasks("Inbox").is_empty());
        assert!(board.is_consistent());
    }

    #[test]
    fn column_of_finds_holding_column() {
        let board = board_with_tasks();
        assert_eq!(board.column_of("a"), Some("Inbox"));
        assert_eq!(board.column_of("b"), Some("later"));
        assert_eq!(board.column_of("zzz"), None);
        assert_eq!(board.column_name("later"), Some("Later"));
    }

    #[test]
    fn iter_tasks_follows_column_order() {
        let mut board = board_with_tasks();
        board.column_order.reverse();
        let ids: Vec<&str> = board.iter_tasks().map(|(_, t)| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(board.task_count(), 2);
    }

    #[test]
    fn inconsistent_when_keys_diverge() {
        let mut board = board_with_tasks();
        board.columns.insert("stray".into(), Vec::new());
        assert!(!board.is_consistent());
    }

    #[test]
    fn ensure_default_only_fills_empty_boards() {
        let mut board = board_with_tasks();
        assert!(!board.ensure_default_column("Inbox"));

        let mut empty = Board {
            column_order: Vec::new(),
            columns: IndexMap::new(),
        };
        assert!(empty.ensure_default_column("Todo"));
        assert_eq!(empty.column_order[0].id, "Todo");
        assert!(empty.is_consistent());
    }
}
