use serde::{Deserialize, Serialize};

use super::board::ColumnRef;

/// Metadata for one project. Its board lives in its own document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    pub id: String,
    pub name: String,
    /// Mirrors the project board's column order. Filled from the board on
    /// load, never persisted with the workspace.
    #[serde(default, skip_serializing)]
    pub column_order: Vec<ColumnRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

/// A named, ordered group of projects (sidebar section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectGroup {
    pub name: String,
    #[serde(default)]
    pub projects: Vec<ProjectMeta>,
}

/// All project groups, in sidebar order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub groups: Vec<ProjectGroup>,
}

/// Group name for projects created without one
pub const UNGROUPED: &str = "Ungrouped";

impl Workspace {
    pub fn projects(&self) -> impl Iterator<Item = &ProjectMeta> {
        self.groups.iter().flat_map(|g| g.projects.iter())
    }

    pub fn project(&self, project_id: &str) -> Option<&ProjectMeta> {
        self.projects().find(|p| p.id == project_id)
    }

    /// Look a project up by id, falling back to a case-insensitive name match
    pub fn resolve(&self, id_or_name: &str) -> Option<&ProjectMeta> {
        self.project(id_or_name).or_else(|| {
            self.projects()
                .find(|p| p.name.eq_ignore_ascii_case(id_or_name))
        })
    }

    /// Append a project to the named group, creating the group if needed.
    /// The new project is ordered after every existing project in its group.
    pub fn add_project(&mut self, meta: ProjectMeta, group: Option<&str>) -> &ProjectMeta {
        let group_name = group.unwrap_or(UNGROUPED);
        let idx = match self.groups.iter().position(|g| g.name == group_name) {
            Some(i) => i,
            None => {
                self.groups.push(ProjectGroup {
                    name: group_name.to_string(),
                    projects: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        let projects = &mut self.groups[idx].projects;
        let next_order = projects
            .iter()
            .filter_map(|p| p.order)
            .fold(None, |max: Option<f64>, o| Some(max.map_or(o, |m| m.max(o))))
            .map_or(0.0, |m| m + 1.0);
        projects.push(ProjectMeta {
            order: meta.order.or(Some(next_order)),
            ..meta
        });
        &projects[projects.len() - 1]
    }

    /// Sort each group's projects by their order hint (missing = 0), stable.
    pub fn sort_projects(&mut self) {
        for group in &mut self.groups {
            group
                .projects
                .sort_by(|a, b| a.order.unwrap_or(0.0).total_cmp(&b.order.unwrap_or(0.0)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: &str, name: &str) -> ProjectMeta {
        ProjectMeta {
            id: id.into(),
            name: name.into(),
            column_order: Vec::new(),
            order: None,
        }
    }

    #[test]
    fn add_project_creates_group_and_orders() {
        let mut ws = Workspace::default();
        ws.add_project(meta("p1", "Home"), None);
        ws.add_project(meta("p2", "Garden"), None);
        ws.add_project(meta("p3", "Client"), Some("Work"));

        assert_eq!(ws.groups.len(), 2);
        assert_eq!(ws.groups[0].name, UNGROUPED);
        assert_eq!(ws.groups[0].projects[0].order, Some(0.0));
        assert_eq!(ws.groups[0].projects[1].order, Some(1.0));
        assert_eq!(ws.project("p3").unwrap().name, "Client");
    }

    #[test]
    fn resolve_by_name() {
        let mut ws = Workspace::default();
        ws.add_project(meta("p1", "Home"), None);
        assert_eq!(ws.resolve("home").unwrap().id, "p1");
        assert!(ws.resolve("nope").is_none());
    }

    #[test]
    fn column_order_not_persisted() {
        let mut ws = Workspace::default();
        let mut m = meta("p1", "Home");
        m.column_order.push(ColumnRef::new("todo", "To Do"));
        ws.add_project(m, None);
        let json = serde_json::to_string(&ws).unwrap();
        assert!(!json.contains("columnOrder"));
    }
}
