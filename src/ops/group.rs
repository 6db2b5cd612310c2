use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::board::Board;
use crate::model::project::{ProjectGroup, ProjectMeta};
use crate::model::task::{Priority, Task};

pub const NO_DATE: &str = "No Date";
pub const UNCATEGORIZED: &str = "Uncategorized";
pub const DEFAULT_GROUP: &str = "Tasks";
/// Bucket for tasks whose column is missing from their project's column order
pub const NO_COLUMN: &str = "No Column";

/// How a list view buckets its tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupMode {
    Priority,
    DueDate,
    Project,
    Column,
    #[default]
    Manual,
}

impl GroupMode {
    /// Parse a mode name; anything unrecognised means `Manual`.
    pub fn parse(s: &str) -> GroupMode {
        match s.trim() {
            "priority" => GroupMode::Priority,
            "dueDate" | "due-date" | "due_date" | "date" => GroupMode::DueDate,
            "project" => GroupMode::Project,
            "column" => GroupMode::Column,
            _ => GroupMode::Manual,
        }
    }
}

impl std::fmt::Display for GroupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GroupMode::Priority => "priority",
            GroupMode::DueDate => "dueDate",
            GroupMode::Project => "project",
            GroupMode::Column => "column",
            GroupMode::Manual => "manual",
        };
        f.write_str(s)
    }
}

/// Ordered mapping of group name to the tasks in that group
pub type Groups<'a> = IndexMap<String, Vec<&'a Task>>;

/// Bucket `tasks` for display.
///
/// Tasks are first put in baseline order: ascending `order` (missing = 0),
/// ties kept in input order. Every input task lands in exactly one group and
/// empty groups are removed. Fixed bucket sets (priority, column) keep their
/// declared order; dynamic ones keep first-seen order.
pub fn group_tasks<'a>(tasks: &'a [Task], mode: GroupMode, projects: &[ProjectGroup]) -> Groups<'a> {
    let mut baseline: Vec<&Task> = tasks.iter().collect();
    baseline.sort_by(|a, b| a.order_or_zero().total_cmp(&b.order_or_zero()));

    let mut groups: Groups<'a> = IndexMap::new();
    match mode {
        GroupMode::Priority => {
            for p in Priority::ALL {
                groups.insert(priority_group(p), Vec::new());
            }
            for task in baseline {
                groups.entry(priority_group(task.priority)).or_default().push(task);
            }
        }
        GroupMode::DueDate => {
            baseline.sort_by_key(|t| date_sort_key(t.date.as_deref()));
            for task in baseline {
                let name = match task.date.as_deref() {
                    Some(date) => format_due_date(date),
                    None => NO_DATE.to_string(),
                };
                groups.entry(name).or_default().push(task);
            }
        }
        GroupMode::Project => {
            for task in baseline {
                let name = task.project_name.as_deref().unwrap_or(UNCATEGORIZED);
                groups.entry(name.to_string()).or_default().push(task);
            }
        }
        GroupMode::Column => {
            let project = tasks
                .first()
                .and_then(|t| t.project_id.as_deref())
                .and_then(|id| find_project(projects, id));
            match project {
                Some(project) => group_by_column(&mut groups, baseline, project),
                None => group_manual(&mut groups, tasks, baseline),
            }
        }
        GroupMode::Manual => group_manual(&mut groups, tasks, baseline),
    }

    groups.retain(|_, v| !v.is_empty());
    groups
}

fn group_manual<'a>(groups: &mut Groups<'a>, tasks: &'a [Task], baseline: Vec<&'a Task>) {
    let name = tasks
        .first()
        .and_then(|t| t.project_name.as_deref())
        .unwrap_or(DEFAULT_GROUP);
    groups.insert(name.to_string(), baseline);
}

fn group_by_column<'a>(groups: &mut Groups<'a>, baseline: Vec<&'a Task>, project: &ProjectMeta) {
    for col in &project.column_order {
        groups.entry(col.name.clone()).or_default();
    }
    for task in baseline {
        let name = project
            .column_order
            .iter()
            .find(|c| c.id == task.column)
            .map_or(NO_COLUMN, |c| c.name.as_str());
        groups.entry(name.to_string()).or_default().push(task);
    }
}

fn find_project<'p>(projects: &'p [ProjectGroup], project_id: &str) -> Option<&'p ProjectMeta> {
    projects
        .iter()
        .flat_map(|g| g.projects.iter())
        .find(|p| p.id == project_id)
}

pub fn priority_group(priority: Priority) -> String {
    format!("Priority {}", priority)
}

/// Dated tasks first (ascending), then unparseable dates, then undated.
fn date_sort_key(date: Option<&str>) -> (u8, Option<NaiveDate>) {
    match date {
        None => (2, None),
        Some(raw) => match parse_date(raw) {
            Some(d) => (0, Some(d)),
            None => (1, None),
        },
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// `"2024-01-02"` becomes `"Jan 2, 2024"`; unparseable input is returned as-is.
pub fn format_due_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(d) => d.format("%b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

/// Copy a board's tasks into one flat list for a list view, stamping each
/// with its owning project. Board order is kept.
pub fn flatten_tasks(board: &Board, project: Option<&ProjectMeta>) -> Vec<Task> {
    board
        .iter_tasks()
        .map(|(_, task)| {
            let mut task = task.clone();
            if let Some(project) = project {
                task.project_id = Some(project.id.clone());
                task.project_name = Some(project.name.clone());
            }
            task
        })
        .collect()
}
