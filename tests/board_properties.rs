//! Structural properties of boards under long operation sequences.

use pretty_assertions::assert_eq;
use taskboard::io::migrate::board_from_value;
use taskboard::model::board::Board;
use taskboard::model::task::{Priority, Task};
use taskboard::ops::board_ops::{
    BoardError, NewTask, TaskPatch, add_column, add_task, delete_column, rename_column, update_task,
};
use taskboard::ops::drag::{DragEvent, on_drag_end};
use taskboard::ops::group::{GroupMode, group_tasks};
use taskboard::util::slug::{label_from_slug, normalize_tags, to_slug};

/// Small deterministic generator so failures reproduce exactly.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

fn all_ids(board: &Board) -> Vec<String> {
    let mut ids: Vec<String> = board.iter_tasks().map(|(_, t)| t.id.clone()).collect();
    ids.sort();
    ids
}

fn random_drag(board: &Board, rng: &mut Lcg) -> DragEvent {
    let tasks: Vec<&str> = board.iter_tasks().map(|(_, t)| t.id.as_str()).collect();
    let columns: Vec<&str> = board.column_order.iter().map(|c| c.id.as_str()).collect();
    let active = if tasks.is_empty() || rng.below(10) == 0 {
        "missing"
    } else {
        tasks[rng.below(tasks.len())]
    };
    let over = match rng.below(4) {
        0 => None,
        1 => Some(columns[rng.below(columns.len())]),
        _ if !tasks.is_empty() => Some(tasks[rng.below(tasks.len())]),
        _ => Some("nowhere"),
    };
    DragEvent::new(active, over)
}

#[test]
fn random_operation_sequences_keep_board_consistent() {
    for seed in 1..=20 {
        let mut rng = Lcg(seed);
        let mut board = Board::inbox();
        let mut added = 0usize;

        for step in 0..300 {
            let columns: Vec<String> = board.column_order.iter().map(|c| c.id.clone()).collect();
            match rng.below(6) {
                0 => {
                    add_column(&mut board, &format!("col {}", step)).unwrap();
                }
                1 => {
                    let id = &columns[rng.below(columns.len())];
                    rename_column(&mut board, id, &format!("renamed {}", step));
                }
                2 | 3 => {
                    let id = &columns[rng.below(columns.len())];
                    let new = NewTask {
                        priority: Priority::new((rng.below(4) + 1) as u8),
                        ..NewTask::titled(format!("task {}", step))
                    };
                    add_task(&mut board, id, new).unwrap();
                    added += 1;
                }
                4 => {
                    let first = board
                        .iter_tasks()
                        .next()
                        .map(|(c, t)| (c.to_string(), t.id.clone()));
                    if let Some((column, task)) = first {
                        let patch = TaskPatch {
                            completed: Some(true),
                            ..TaskPatch::default()
                        };
                        assert!(update_task(&mut board, &column, &task, patch).unwrap());
                    }
                }
                _ => {
                    let event = random_drag(&board, &mut rng);
                    let before = board.task_count();
                    let ids = all_ids(&board);
                    board = on_drag_end(board, &event);
                    assert_eq!(board.task_count(), before, "seed {} step {}", seed, step);
                    assert_eq!(all_ids(&board), ids);
                }
            }
            assert!(board.is_consistent(), "seed {} step {}", seed, step);
            for (column, task) in board.iter_tasks() {
                assert_eq!(task.column, column, "seed {} step {}", seed, step);
            }
        }
        assert_eq!(board.task_count(), added);
    }
}

#[test]
fn deleting_the_only_column_changes_nothing() {
    let mut board = Board::inbox();
    add_task(&mut board, "Inbox", NewTask::titled("keep me")).unwrap();
    let before = serde_json::to_string(&board).unwrap();

    let err = delete_column(&mut board, "Inbox").unwrap_err();
    assert!(matches!(err, BoardError::InvariantViolation(_)));
    assert_eq!(serde_json::to_string(&board).unwrap(), before);
}

#[test]
fn dropping_a_task_on_itself_is_identity() {
    let mut board = Board::inbox();
    let later = add_column(&mut board, "Later").unwrap();
    add_task(&mut board, "Inbox", NewTask::titled("a")).unwrap();
    let b = add_task(&mut board, &later, NewTask::titled("b")).unwrap();
    let before = board.clone();

    let after = on_drag_end(board, &DragEvent::new(&b.id, Some(b.id.as_str())));
    assert_eq!(after, before);
}

#[test]
fn priority_grouping_example() {
    let tasks: Vec<Task> = [1u8, 2, 2, 4]
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut t = Task::new(format!("t{}", i), format!("task {}", i), "Inbox".into());
            t.priority = Priority::from(*p);
            t
        })
        .collect();
    let groups = group_tasks(&tasks, GroupMode::Priority, &[]);
    let names: Vec<&str> = groups.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Priority 1", "Priority 2", "Priority 4"]);
    let p2: Vec<&str> = groups["Priority 2"].iter().map(|t| t.id.as_str()).collect();
    assert_eq!(p2, vec!["t1", "t2"]);
}

#[test]
fn due_date_grouping_example() {
    let tasks: Vec<Task> = [None, Some("2024-01-02"), Some("2024-01-01")]
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let mut t = Task::new(format!("t{}", i), format!("task {}", i), "Inbox".into());
            t.date = d.map(str::to_string);
            t
        })
        .collect();
    let groups = group_tasks(&tasks, GroupMode::DueDate, &[]);
    let names: Vec<&str> = groups.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Jan 1, 2024", "Jan 2, 2024", "No Date"]);
}

#[test]
fn grouping_never_loses_or_duplicates() {
    let mut rng = Lcg(7);
    let tasks: Vec<Task> = (0..60)
        .map(|i| {
            let mut t = Task::new(format!("t{}", i), format!("task {}", i), "Inbox".into());
            t.priority = Priority::from((rng.below(4) + 1) as u8);
            t.date = match rng.below(3) {
                0 => None,
                1 => Some(format!("2024-0{}-1{}", rng.below(9) + 1, rng.below(9))),
                _ => Some("someday".into()),
            };
            t.order = (rng.below(2) == 0).then(|| rng.below(100) as f64);
            if rng.below(2) == 0 {
                t.project_name = Some(format!("P{}", rng.below(3)));
            }
            t
        })
        .collect();

    for mode in [
        GroupMode::Priority,
        GroupMode::DueDate,
        GroupMode::Project,
        GroupMode::Column,
        GroupMode::Manual,
    ] {
        let groups = group_tasks(&tasks, mode, &[]);
        let mut ids: Vec<&str> = groups.values().flatten().map(|t| t.id.as_str()).collect();
        ids.sort();
        let mut expected: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        expected.sort();
        assert_eq!(ids, expected, "mode {}", mode);
        assert!(groups.values().all(|g| !g.is_empty()));
    }
}

#[test]
fn slug_examples() {
    assert_eq!(to_slug("#Client: Acme Co"), "client:acme-co");
    assert_eq!(label_from_slug("client:acme-co"), "Client: Acme Co");
    assert_eq!(
        normalize_tags(["Client: Acme", "client:acme", "Client: Acme"]),
        vec!["client:acme"]
    );
}

#[test]
fn legacy_migration_example() {
    let value = serde_json::json!({
        "columnOrder": ["Inbox", "Later"],
        "columns": {
            "Inbox": [{"id": "a", "text": "A", "column": "Inbox"}],
            "Later": [{"id": "b", "text": "B", "column": "Later"}]
        }
    });
    let board = board_from_value(value).unwrap();
    let order = serde_json::to_value(&board.column_order).unwrap();
    assert_eq!(
        order,
        serde_json::json!([{"id": "Inbox", "name": "Inbox"}, {"id": "Later", "name": "Later"}])
    );
    assert_eq!(board.tasks("Inbox")[0].column, "Inbox");
    assert_eq!(board.tasks("Later")[0].column, "Later");
}
