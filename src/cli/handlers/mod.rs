use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::repository::{BoardRepository, INBOX_KEY, TAGS_KEY, WORKSPACE_KEY, project_key};
use crate::io::store::FileStore;
use crate::model::board::{Board, ColumnRef};
use crate::model::config::AppConfig;
use crate::model::project::{ProjectMeta, Workspace};
use crate::model::tags::TagCatalog;
use crate::model::task::{Priority, Task, fresh_id};
use crate::ops::board_ops::{self, NewTask, TaskPatch};
use crate::ops::drag::{DragEvent, on_drag_end};
use crate::ops::group::{GroupMode, flatten_tasks, group_tasks};
use crate::ops::move_ops::move_task_to_project;
use crate::ops::reorder::{apply_order_updates, reorder_list};
use crate::ops::sort::visible_tasks;
use crate::ops::tag_ops;
use crate::util::slug::{label_from_slug, to_slug};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let store_dir = PathBuf::from(&cli.store);
    let config = config_io::read_config(&store_dir)?;
    let store = FileStore::new(&store_dir)
        .with_lock_timeout(Duration::from_millis(config.store.lock_timeout_ms));
    let mut session = Session {
        repo: BoardRepository::with_config(store, &config),
        config,
        json: cli.json,
    };

    match cli.command {
        // Read commands
        Commands::Board(args) => cmd_board(&mut session, args),
        Commands::Show(args) => cmd_show(&mut session, args),
        Commands::Group(args) => cmd_group(&mut session, args),

        // Write commands
        Commands::Column(args) => cmd_column(&mut session, args),
        Commands::Add(args) => cmd_add(&mut session, args),
        Commands::Update(args) => cmd_update(&mut session, args),
        Commands::Done(args) => cmd_done(&mut session, args),
        Commands::Rm(args) => cmd_rm(&mut session, args),
        Commands::Sub(args) => cmd_sub(&mut session, args),
        Commands::Comment(args) => cmd_comment(&mut session, args),
        Commands::Drag(args) => cmd_drag(&mut session, args),
        Commands::Reorder(args) => cmd_reorder(&mut session, args),
        Commands::Move(args) => cmd_move(&mut session, args),

        // Projects and tags
        Commands::Project(args) => cmd_project(&mut session, args),
        Commands::Tag(args) => cmd_tag(&mut session, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Session {
    repo: BoardRepository<FileStore>,
    config: AppConfig,
    json: bool,
}

/// A loaded board and where it came from
struct Loaded {
    key: String,
    project: Option<ProjectMeta>,
    board: Board,
}

impl Session {
    fn workspace(&mut self) -> Result<Workspace, Box<dyn std::error::Error>> {
        Ok(self.repo.load_document(WORKSPACE_KEY)?)
    }

    fn resolve_project(&mut self, id_or_name: &str) -> Result<ProjectMeta, Box<dyn std::error::Error>> {
        let ws = self.workspace()?;
        ws.resolve(id_or_name)
            .or_else(|| unique_prefix(ws.projects(), id_or_name, |p| p.id.as_str()))
            .cloned()
            .ok_or_else(|| format!("project not found: {}", id_or_name).into())
    }

    fn open(&mut self, sel: &BoardSel) -> Result<Loaded, Box<dyn std::error::Error>> {
        self.open_project(sel.project.as_deref())
    }

    fn open_project(&mut self, project: Option<&str>) -> Result<Loaded, Box<dyn std::error::Error>> {
        let (key, project) = match project {
            None => (INBOX_KEY.to_string(), None),
            Some(p) => {
                let meta = self.resolve_project(p)?;
                (project_key(&meta.id), Some(meta))
            }
        };
        let board = self.repo.load(&key)?;
        Ok(Loaded { key, project, board })
    }

    /// Persist after a local change. The change itself already happened; a
    /// failed write only turns into a non-zero exit.
    fn persist(&mut self, key: &str, board: &Board) -> CmdResult {
        if self.repo.persist(key, board) {
            Ok(())
        } else {
            Err(format!("could not save {} (run with RUST_LOG=error for details)", key).into())
        }
    }

    fn show_completed(&self, open_only: bool) -> bool {
        self.config.view.show_completed && !open_only
    }
}

/// Find the single item whose key starts with `prefix`
fn unique_prefix<'a, T, I, F>(items: I, prefix: &str, key: F) -> Option<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> &str,
{
    if prefix.is_empty() {
        return None;
    }
    let mut found = None;
    for item in items {
        if key(item).starts_with(prefix) {
            if found.is_some() {
                return None;
            }
            found = Some(item);
        }
    }
    found
}

/// Resolve a task id or unique id prefix to `(column id, task id)`
fn resolve_task(board: &Board, id: &str) -> Result<(String, String), Box<dyn std::error::Error>> {
    if let Some((column, task)) = board_ops::find_task(board, id) {
        return Ok((column.to_string(), task.id.clone()));
    }
    let matches: Vec<(&str, &Task)> = board
        .iter_tasks()
        .filter(|(_, t)| t.id.starts_with(id))
        .collect();
    match matches.as_slice() {
        [(column, task)] => Ok((column.to_string(), task.id.clone())),
        [] => Err(format!("task not found: {}", id).into()),
        _ => Err(format!("ambiguous task id: {} matches {} tasks", id, matches.len()).into()),
    }
}

/// Resolve a column id, or a case-insensitive column name
fn resolve_column(board: &Board, column: &str) -> Option<String> {
    exact_column(board, column)
        .or_else(|| unique_prefix(&board.column_order, column, |c| c.id.as_str()))
        .map(|c| c.id.clone())
}

fn exact_column<'a>(board: &'a Board, column: &str) -> Option<&'a ColumnRef> {
    board
        .column_order
        .iter()
        .find(|c| c.id == column)
        .or_else(|| board.column_order.iter().find(|c| c.name.eq_ignore_ascii_case(column)))
}

/// Resolve a drop target to a task or column id. Exact task ids and exact
/// column ids or names win; a prefix must match exactly one column or task.
fn resolve_drop_target(board: &Board, target: &str) -> Result<String, Box<dyn std::error::Error>> {
    if board_ops::find_task(board, target).is_some() {
        return Ok(target.to_string());
    }
    if let Some(column) = exact_column(board, target) {
        return Ok(column.id.clone());
    }
    let columns: Vec<&str> = board
        .column_order
        .iter()
        .map(|c| c.id.as_str())
        .filter(|id| id.starts_with(target))
        .collect();
    let tasks: Vec<&str> = board
        .iter_tasks()
        .map(|(_, t)| t.id.as_str())
        .filter(|id| id.starts_with(target))
        .collect();
    match (columns.as_slice(), tasks.as_slice()) {
        _ if target.is_empty() => Err("empty drop target".into()),
        ([column], []) => Ok(column.to_string()),
        ([], [task]) => Ok(task.to_string()),
        ([], []) => Err(format!("no column or task matches: {}", target).into()),
        _ => Err(format!(
            "ambiguous drop target: {} matches {} column(s) and {} task(s)",
            target,
            columns.len(),
            tasks.len()
        )
        .into()),
    }
}

fn parse_priority(p: Option<u8>) -> Result<Option<Priority>, Box<dyn std::error::Error>> {
    match p {
        None => Ok(None),
        Some(n) => Priority::new(n)
            .map(Some)
            .ok_or_else(|| format!("priority must be 1-4, got {}", n).into()),
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_board(s: &mut Session, args: BoardArgs) -> CmdResult {
    let loaded = s.open(&args.board)?;
    let show = s.show_completed(args.open);
    if s.json {
        let json = board_to_json(&loaded.key, &loaded.board, show);
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print_lines(format_board(&loaded.board, show));
    }
    Ok(())
}

fn cmd_show(s: &mut Session, args: TaskRefArgs) -> CmdResult {
    let loaded = s.open(&args.board)?;
    let (column, task_id) = resolve_task(&loaded.board, &args.id)?;
    let (_, task) = board_ops::find_task(&loaded.board, &task_id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;
    if s.json {
        println!("{}", serde_json::to_string_pretty(task)?);
    } else {
        let name = loaded.board.column_name(&column).unwrap_or(&column);
        print_lines(format_task_detail(task, name));
    }
    Ok(())
}

fn cmd_group(s: &mut Session, args: GroupArgs) -> CmdResult {
    let mode = GroupMode::parse(args.mode.as_deref().unwrap_or(&s.config.view.group_by));
    let mut ws = s.workspace()?;

    // Project metadata mirrors each board's columns for column grouping.
    let mut flat = Vec::new();
    if args.project.is_none() {
        let inbox = s.repo.load(INBOX_KEY)?;
        flat.extend(flatten_tasks(&inbox, None));
    }
    let wanted = match args.project.as_deref() {
        Some(p) => Some(s.resolve_project(p)?.id),
        None => None,
    };
    for group in &mut ws.groups {
        for meta in &mut group.projects {
            if wanted.as_deref().is_some_and(|id| id != meta.id) {
                continue;
            }
            let board = s.repo.load(&project_key(&meta.id))?;
            meta.column_order = board.column_order.clone();
            flat.extend(flatten_tasks(&board, Some(&*meta)));
        }
    }

    let show = s.show_completed(args.open);
    let tasks: Vec<Task> = visible_tasks(&flat, show).into_iter().cloned().collect();
    let groups = group_tasks(&tasks, mode, &ws.groups);
    if s.json {
        println!("{}", serde_json::to_string_pretty(&groups_to_json(&groups))?);
    } else {
        print_lines(format_groups(&groups));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

fn cmd_column(s: &mut Session, args: ColumnCmd) -> CmdResult {
    match args.action {
        ColumnAction::Add(a) => {
            let mut loaded = s.open(&a.board)?;
            let id = board_ops::add_column(&mut loaded.board, &a.name)?;
            s.persist(&loaded.key, &loaded.board)?;
            println!("{}", id);
        }
        ColumnAction::Rename(a) => {
            let mut loaded = s.open(&a.board)?;
            let id = resolve_column(&loaded.board, &a.column)
                .ok_or_else(|| format!("column not found: {}", a.column))?;
            if !board_ops::rename_column(&mut loaded.board, &id, &a.name) {
                return Err("column name is empty".into());
            }
            s.persist(&loaded.key, &loaded.board)?;
            println!("renamed column {} to {}", short_id(&id), a.name.trim());
        }
        ColumnAction::Rm(a) => {
            let mut loaded = s.open(&a.board)?;
            let id = resolve_column(&loaded.board, &a.column)
                .ok_or_else(|| format!("column not found: {}", a.column))?;
            let removed = board_ops::delete_column(&mut loaded.board, &id)?.unwrap_or_default();
            s.persist(&loaded.key, &loaded.board)?;
            if removed.is_empty() {
                println!("removed column {}", short_id(&id));
            } else {
                println!("removed column {} and {} task(s)", short_id(&id), removed.len());
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

fn cmd_add(s: &mut Session, args: AddArgs) -> CmdResult {
    let mut loaded = s.open(&args.board)?;
    let column = match args.column.as_deref() {
        Some(c) => resolve_column(&loaded.board, c).ok_or_else(|| format!("column not found: {}", c))?,
        None => loaded
            .board
            .column_order
            .first()
            .map(|c| c.id.clone())
            .ok_or("board has no columns")?,
    };
    let new = NewTask {
        text: args.text,
        description: args.description.unwrap_or_default(),
        priority: parse_priority(args.priority)?,
        date: args.date,
        label: args.label,
        tag: args.tag.map(|t| to_slug(&t)),
        project_id: loaded.project.as_ref().map(|p| p.id.clone()),
    };
    let task = board_ops::add_task(&mut loaded.board, &column, new)?;
    s.persist(&loaded.key, &loaded.board)?;
    if let Some(ref tag) = task.tag {
        let mut catalog: TagCatalog = s.repo.load_document(TAGS_KEY)?;
        if !catalog.contains(tag) {
            tag_ops::ensure_tags(&mut catalog, [tag]);
            s.repo.save_document(TAGS_KEY, &catalog)?;
        }
    }
    if s.json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        println!("{}", task.id);
    }
    Ok(())
}

fn cmd_update(s: &mut Session, args: UpdateArgs) -> CmdResult {
    let mut loaded = s.open(&args.board)?;
    let (column, task_id) = resolve_task(&loaded.board, &args.id)?;
    let patch = TaskPatch {
        text: args.text,
        description: args.description,
        priority: parse_priority(args.priority)?,
        date: args.date.map(Some),
        label: args.label.map(Some),
        tag: args.tag.map(|t| Some(to_slug(&t))),
        ..TaskPatch::default()
    };
    if patch.is_empty() {
        return Err("nothing to update".into());
    }
    board_ops::update_task(&mut loaded.board, &column, &task_id, patch)?;
    s.persist(&loaded.key, &loaded.board)?;
    println!("updated {}", short_id(&task_id));
    Ok(())
}

fn cmd_done(s: &mut Session, args: DoneArgs) -> CmdResult {
    let mut loaded = s.open(&args.board)?;
    let (column, task_id) = resolve_task(&loaded.board, &args.id)?;
    let patch = TaskPatch {
        completed: Some(!args.undo),
        ..TaskPatch::default()
    };
    board_ops::update_task(&mut loaded.board, &column, &task_id, patch)?;
    s.persist(&loaded.key, &loaded.board)?;
    let state = if args.undo { "open" } else { "done" };
    println!("{} {}", short_id(&task_id), state);
    Ok(())
}

fn cmd_rm(s: &mut Session, args: TaskRefArgs) -> CmdResult {
    let mut loaded = s.open(&args.board)?;
    let (column, task_id) = resolve_task(&loaded.board, &args.id)?;
    let removed = board_ops::delete_task(&mut loaded.board, &column, &task_id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;
    s.persist(&loaded.key, &loaded.board)?;
    println!("deleted {} {}", short_id(&removed.id), removed.text);
    Ok(())
}

fn cmd_sub(s: &mut Session, args: SubCmd) -> CmdResult {
    match args.action {
        SubAction::Add(a) => {
            let mut loaded = s.open(&a.board)?;
            let (_, task_id) = resolve_task(&loaded.board, &a.task)?;
            let id = board_ops::add_subtask(&mut loaded.board, &task_id, &a.text)?
                .ok_or_else(|| format!("task not found: {}", a.task))?;
            s.persist(&loaded.key, &loaded.board)?;
            println!("{}", id);
        }
        SubAction::Toggle(a) => {
            let mut loaded = s.open(&a.board)?;
            let (_, task_id) = resolve_task(&loaded.board, &a.task)?;
            let sub_id = board_ops::find_task(&loaded.board, &task_id)
                .and_then(|(_, t)| {
                    t.subtasks
                        .iter()
                        .find(|st| st.id == a.subtask)
                        .or_else(|| unique_prefix(&t.subtasks, &a.subtask, |st| st.id.as_str()))
                })
                .map(|st| st.id.clone())
                .ok_or_else(|| format!("subtask not found: {}", a.subtask))?;
            board_ops::toggle_subtask(&mut loaded.board, &task_id, &sub_id);
            s.persist(&loaded.key, &loaded.board)?;
            println!("toggled {}", short_id(&sub_id));
        }
    }
    Ok(())
}

fn cmd_comment(s: &mut Session, args: CommentArgs) -> CmdResult {
    let mut loaded = s.open(&args.board)?;
    let (_, task_id) = resolve_task(&loaded.board, &args.task)?;
    let author = args
        .author
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "anonymous".to_string());
    let id = board_ops::add_comment(&mut loaded.board, &task_id, &args.text, &author, chrono::Utc::now())?
        .ok_or_else(|| format!("task not found: {}", args.task))?;
    s.persist(&loaded.key, &loaded.board)?;
    println!("{}", id);
    Ok(())
}

// ---------------------------------------------------------------------------
// Reordering
// ---------------------------------------------------------------------------

fn cmd_drag(s: &mut Session, args: DragArgs) -> CmdResult {
    let loaded = s.open(&args.board)?;
    let (_, active) = resolve_task(&loaded.board, &args.active)?;
    let over = match args.over.as_deref() {
        None => None,
        Some(o) => Some(resolve_drop_target(&loaded.board, o)?),
    };

    let event = DragEvent::new(&active, over.as_deref());
    let before = loaded.board.clone();
    let board = on_drag_end(loaded.board, &event);
    if board == before {
        println!("no change");
        return Ok(());
    }
    s.persist(&loaded.key, &board)?;
    let column = board.column_of(&active).unwrap_or_default();
    let name = board.column_name(column).unwrap_or(column);
    println!("moved {} to {}", short_id(&active), name);
    Ok(())
}

fn cmd_reorder(s: &mut Session, args: ReorderArgs) -> CmdResult {
    let mut loaded = s.open(&args.board)?;
    let (_, active) = resolve_task(&loaded.board, &args.active)?;
    let (_, over) = resolve_task(&loaded.board, &args.over)?;
    let flat = flatten_tasks(&loaded.board, loaded.project.as_ref());
    let updates = reorder_list(&flat, &active, &over);
    if updates.is_empty() {
        println!("no change");
        return Ok(());
    }
    apply_order_updates(&mut loaded.board, &updates);
    s.persist(&loaded.key, &loaded.board)?;
    if s.json {
        println!("{}", serde_json::to_string_pretty(&updates)?);
    } else {
        println!("reordered {} task(s)", updates.len());
    }
    Ok(())
}

fn cmd_move(s: &mut Session, args: MoveArgs) -> CmdResult {
    let mut source = s.open_project(args.from.as_deref())?;
    let mut dest = s.open_project(Some(&args.to))?;
    let Some(dest_project) = dest.project.as_ref() else {
        return Err("destination must be a project".into());
    };
    if dest.key == source.key {
        return Err("task is already on that board".into());
    }
    let (_, task_id) = resolve_task(&source.board, &args.task)?;
    let column = move_task_to_project(&mut source.board, &mut dest.board, &dest_project.id, &task_id)?;

    // Destination first: a failed second write duplicates the task rather than losing it.
    s.persist(&dest.key, &dest.board)?;
    s.persist(&source.key, &source.board)?;
    let name = dest.board.column_name(&column).unwrap_or(&column);
    println!("moved {} to {} / {}", short_id(&task_id), dest_project.name, name);
    Ok(())
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

fn cmd_project(s: &mut Session, args: ProjectCmd) -> CmdResult {
    match args.action.unwrap_or(ProjectAction::List) {
        ProjectAction::List => {
            let mut ws = s.workspace()?;
            ws.sort_projects();
            if s.json {
                println!("{}", serde_json::to_string_pretty(&projects_to_json(&ws))?);
            } else {
                print_lines(format_workspace(&ws));
            }
        }
        ProjectAction::Add(a) => {
            let name = a.name.trim();
            if name.is_empty() {
                return Err("project name is empty".into());
            }
            let mut board = Board {
                column_order: Vec::new(),
                columns: IndexMap::new(),
            };
            for column in &a.columns {
                board_ops::add_column(&mut board, column)?;
            }
            board.ensure_default_column(&s.config.inbox.default_column);

            let mut ws = s.workspace()?;
            let meta = ws
                .add_project(
                    ProjectMeta {
                        id: fresh_id(),
                        name: name.to_string(),
                        column_order: Vec::new(),
                        order: None,
                    },
                    a.group.as_deref(),
                )
                .clone();
            s.persist(&project_key(&meta.id), &board)?;
            s.repo.save_document(WORKSPACE_KEY, &ws)?;
            println!("{}", meta.id);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

fn cmd_tag(s: &mut Session, args: TagCmd) -> CmdResult {
    match args.action {
        TagAction::Slug(a) => {
            let entries: Vec<SlugJson> = a
                .tags
                .iter()
                .map(|t| {
                    let slug = to_slug(t);
                    SlugJson {
                        input: t,
                        label: label_from_slug(&slug),
                        slug,
                    }
                })
                .collect();
            if s.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for e in entries {
                    println!("{}\t{}", e.slug, e.label);
                }
            }
        }
        TagAction::List => {
            let catalog: TagCatalog = s.repo.load_document(TAGS_KEY)?;
            if s.json {
                println!("{}", serde_json::to_string_pretty(&catalog.slugs)?);
            } else {
                for slug in catalog.iter() {
                    println!("{}\t{}", slug, label_from_slug(slug));
                }
            }
        }
        TagAction::Add(a) => {
            let mut catalog: TagCatalog = s.repo.load_document(TAGS_KEY)?;
            let slugs = tag_ops::ensure_tags(&mut catalog, &a.tags);
            s.repo.save_document(TAGS_KEY, &catalog)?;
            for slug in slugs {
                println!("{}", slug);
            }
        }
        TagAction::Rename(a) => {
            let mut catalog: TagCatalog = s.repo.load_document(TAGS_KEY)?;
            if !tag_ops::rename_tag(&mut catalog, &a.from, &a.to) {
                return Err(format!("cannot rename {} to {}", a.from, a.to).into());
            }
            s.repo.save_document(TAGS_KEY, &catalog)?;
            let changed = retag_all_boards(s, |board| tag_ops::rename_tag_in_board(board, &a.from, &a.to))?;
            println!("renamed {} to {} on {} task(s)", to_slug(&a.from), to_slug(&a.to), changed);
        }
        TagAction::Rm(a) => {
            let mut catalog: TagCatalog = s.repo.load_document(TAGS_KEY)?;
            let in_catalog = tag_ops::delete_tag(&mut catalog, &a.tag);
            if in_catalog {
                s.repo.save_document(TAGS_KEY, &catalog)?;
            }
            let changed = retag_all_boards(s, |board| tag_ops::remove_tag_from_board(board, &a.tag))?;
            if !in_catalog && changed == 0 {
                return Err(format!("tag not found: {}", a.tag).into());
            }
            println!("removed {} from {} task(s)", to_slug(&a.tag), changed);
        }
    }
    Ok(())
}

/// Apply a tag edit to the inbox and every project board, saving the ones
/// that changed. Returns the total number of tasks changed.
fn retag_all_boards<F>(s: &mut Session, mut edit: F) -> Result<usize, Box<dyn std::error::Error>>
where
    F: FnMut(&mut Board) -> usize,
{
    let mut total = 0;
    for key in s.repo.board_keys()? {
        let mut board = s.repo.load(&key)?;
        let changed = edit(&mut board);
        if changed > 0 {
            s.persist(&key, &board)?;
            total += changed;
        }
    }
    Ok(total)
}
