use serde::Serialize;

use crate::model::board::Board;
use crate::model::project::Workspace;
use crate::model::task::{Priority, Task};
use crate::ops::group::{Groups, format_due_date};
use crate::ops::sort::{sort_for_column, sort_subtasks, visible_tasks};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ColumnJson<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
pub struct BoardJson<'a> {
    pub key: &'a str,
    pub columns: Vec<ColumnJson<'a>>,
}

#[derive(Serialize)]
pub struct GroupJson<'a> {
    pub name: &'a str,
    pub tasks: &'a [&'a Task],
}

#[derive(Serialize)]
pub struct ProjectJson<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub group: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

#[derive(Serialize)]
pub struct SlugJson<'a> {
    pub input: &'a str,
    pub slug: String,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Columns in display order, each sorted for display
pub fn board_to_json<'a>(key: &'a str, board: &'a Board, show_completed: bool) -> BoardJson<'a> {
    BoardJson {
        key,
        columns: board
            .column_order
            .iter()
            .map(|c| ColumnJson {
                id: &c.id,
                name: &c.name,
                tasks: visible_tasks(sort_for_column(board.tasks(&c.id)), show_completed),
            })
            .collect(),
    }
}

pub fn groups_to_json<'a>(groups: &'a Groups<'a>) -> Vec<GroupJson<'a>> {
    groups
        .iter()
        .map(|(name, tasks)| GroupJson {
            name,
            tasks: tasks.as_slice(),
        })
        .collect()
}

pub fn projects_to_json(ws: &Workspace) -> Vec<ProjectJson<'_>> {
    ws.groups
        .iter()
        .flat_map(|g| {
            g.projects.iter().map(move |p| ProjectJson {
                id: &p.id,
                name: &p.name,
                group: &g.name,
                order: p.order,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Generated ids are 32 hex digits; show the first 8. Anything else (legacy
/// column names used as ids) is shown whole.
pub fn short_id(id: &str) -> &str {
    if id.len() == 32 && id.bytes().all(|b| b.is_ascii_hexdigit()) {
        &id[..8]
    } else {
        id
    }
}

fn check_char(completed: bool) -> char {
    if completed { 'x' } else { ' ' }
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let mut line = format!("[{}] {} {}", check_char(task.completed), short_id(&task.id), task.text);
    if task.priority != Priority::LOWEST {
        line.push_str(&format!("  P{}", task.priority));
    }
    if let Some(ref date) = task.date {
        line.push_str(&format!("  due {}", format_due_date(date)));
    }
    if let Some(ref tag) = task.tag {
        line.push_str(&format!("  #{}", tag));
    }
    if let Some(ref label) = task.label {
        line.push_str(&format!("  [{}]", label));
    }
    if !task.subtasks.is_empty() {
        let done = task.subtasks.iter().filter(|s| s.completed).count();
        line.push_str(&format!("  ({}/{})", done, task.subtasks.len()));
    }
    if let Some(ref project) = task.project_name {
        line.push_str(&format!("  @{}", project));
    }
    line
}

/// Format a board column by column
pub fn format_board(board: &Board, show_completed: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, col) in board.column_order.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        if col.id == col.name {
            lines.push(format!("== {} ==", col.name));
        } else {
            lines.push(format!("== {} ({}) ==", col.name, short_id(&col.id)));
        }
        let tasks = visible_tasks(sort_for_column(board.tasks(&col.id)), show_completed);
        if tasks.is_empty() {
            lines.push("  (empty)".to_string());
        }
        for task in tasks {
            lines.push(format!("  {}", format_task_line(task)));
        }
    }
    lines
}

/// Format grouped tasks with a header per group
pub fn format_groups(groups: &Groups) -> Vec<String> {
    let mut lines = Vec::new();
    if groups.is_empty() {
        lines.push("(no tasks)".to_string());
    }
    for (i, (name, tasks)) in groups.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!("== {} ({}) ==", name, tasks.len()));
        for task in tasks {
            lines.push(format!("  {}", format_task_line(task)));
        }
    }
    lines
}

/// Format detailed task view
pub fn format_task_detail(task: &Task, column_name: &str) -> Vec<String> {
    let mut lines = vec![format!("[{}] {} {}", check_char(task.completed), task.id, task.text)];
    lines.push(format!("column: {}", column_name));
    lines.push(format!("priority: {}", task.priority));
    if let Some(ref date) = task.date {
        lines.push(format!("due: {}", format_due_date(date)));
    }
    if let Some(ref tag) = task.tag {
        lines.push(format!("tag: #{}", tag));
    }
    if let Some(ref label) = task.label {
        lines.push(format!("label: {}", label));
    }
    if !task.description.is_empty() {
        lines.push("description:".to_string());
        for line in task.description.lines() {
            lines.push(format!("  {}", line));
        }
    }
    if !task.subtasks.is_empty() {
        lines.push(String::new());
        lines.push("subtasks:".to_string());
        for sub in sort_subtasks(&task.subtasks) {
            lines.push(format!("  [{}] {} {}", check_char(sub.completed), short_id(&sub.id), sub.text));
        }
    }
    if !task.comments.is_empty() {
        lines.push(String::new());
        lines.push("comments:".to_string());
        for c in &task.comments {
            lines.push(format!("  {} ({}): {}", c.author, c.timestamp.format("%Y-%m-%d %H:%M"), c.text));
        }
    }
    lines
}

/// Format the project list grouped by sidebar section
pub fn format_workspace(ws: &Workspace) -> Vec<String> {
    let mut lines = Vec::new();
    if ws.groups.is_empty() {
        lines.push("(no projects)".to_string());
    }
    for group in &ws.groups {
        lines.push(format!("{}:", group.name));
        for p in &group.projects {
            lines.push(format!("  {}  {}", short_id(&p.id), p.name));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::board::ColumnRef;
    use crate::model::task::Subtask;
    use crate::ops::group::{GroupMode, group_tasks};
    use chrono::TimeZone;
    use insta::assert_snapshot;

    const ID_A: &str = "aaaaaaaa000000000000000000000001";
    const ID_B: &str = "bbbbbbbb000000000000000000000002";
    const ID_C: &str = "cccccccc000000000000000000000003";
    const COL_DOING: &str = "dddddddd000000000000000000000004";

    fn sample_board() -> Board {
        let mut board = Board::inbox();
        board.column_order.push(ColumnRef::new(COL_DOING, "Doing"));
        board.columns.insert(COL_DOING.into(), Vec::new());

        let mut a = Task::new(ID_A.into(), "Buy milk".into(), "Inbox".into());
        a.tag = Some("errands".into());
        let mut b = Task::new(ID_B.into(), "File taxes".into(), "Inbox".into());
        b.priority = Priority::URGENT;
        b.date = Some("2024-04-15".into());
        b.subtasks.push(Subtask {
            id: "s1".into(),
            text: "Find receipts".into(),
            completed: true,
        });
        b.subtasks.push(Subtask {
            id: "s2".into(),
            text: "Submit".into(),
            completed: false,
        });
        let mut c = Task::new(ID_C.into(), "Call plumber".into(), COL_DOING.into());
        c.completed = true;
        c.label = Some("home".into());

        board.columns["Inbox"] = vec![a, b];
        board.columns[COL_DOING] = vec![c];
        board
    }

    #[test]
    fn short_ids() {
        assert_eq!(short_id(ID_A), "aaaaaaaa");
        assert_eq!(short_id("Inbox"), "Inbox");
        assert_eq!(short_id("not-hex-but-thirty-two-characters"), "not-hex-but-thirty-two-characters");
    }

    #[test]
    fn board_text() {
        let out = format_board(&sample_board(), true).join("\n");
        assert_snapshot!(out, @r"
        == Inbox ==
          [ ] bbbbbbbb File taxes  P1  due Apr 15, 2024  (1/2)
          [ ] aaaaaaaa Buy milk  #errands

        == Doing (dddddddd) ==
          [x] cccccccc Call plumber  [home]
        ");
    }

    #[test]
    fn board_text_hides_completed() {
        let out = format_board(&sample_board(), false).join("\n");
        assert_snapshot!(out, @r"
        == Inbox ==
          [ ] bbbbbbbb File taxes  P1  due Apr 15, 2024  (1/2)
          [ ] aaaaaaaa Buy milk  #errands

        == Doing (dddddddd) ==
          (empty)
        ");
    }

    #[test]
    fn grouped_text() {
        let board = sample_board();
        let tasks: Vec<Task> = board.iter_tasks().map(|(_, t)| t.clone()).collect();
        let groups = group_tasks(&tasks, GroupMode::Priority, &[]);
        assert_snapshot!(format_groups(&groups).join("\n"), @r"
        == Priority 1 (1) ==
          [ ] bbbbbbbb File taxes  P1  due Apr 15, 2024  (1/2)

        == Priority 4 (2) ==
          [ ] aaaaaaaa Buy milk  #errands
          [x] cccccccc Call plumber  [home]
        ");
    }

    #[test]
    fn task_detail_text() {
        let mut board = sample_board();
        let task = &mut board.columns["Inbox"][1];
        task.description = "Both federal and state".into();
        task.comments.push(crate::model::task::Comment {
            id: "c1".into(),
            text: "Accountant says April".into(),
            author: "sam".into(),
            timestamp: chrono::Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
        });
        let out = format_task_detail(task, "Inbox").join("\n");
        assert_snapshot!(out, @r"
        [ ] bbbbbbbb000000000000000000000002 File taxes
        column: Inbox
        priority: 1
        due: Apr 15, 2024
        description:
          Both federal and state

        subtasks:
          [ ] s2 Submit
          [x] s1 Find receipts

        comments:
          sam (2024-03-01 09:30): Accountant says April
        ");
    }

    #[test]
    fn board_json_shape() {
        let board = sample_board();
        let json = serde_json::to_value(board_to_json("inbox", &board, true)).unwrap();
        assert_eq!(json["key"], "inbox");
        assert_eq!(json["columns"][0]["id"], "Inbox");
        assert_eq!(json["columns"][0]["tasks"][0]["id"], ID_B);
        assert_eq!(json["columns"][1]["name"], "Doing");
    }
}
