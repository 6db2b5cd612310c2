use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tb", about = concat!("taskboard v", env!("CARGO_PKG_VERSION"), " - kanban boards and grouped task lists"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the board documents and config.toml
    #[arg(long, global = true, default_value = ".taskboard")]
    pub store: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a board's columns and tasks
    Board(BoardArgs),
    /// Add, rename or remove columns
    Column(ColumnCmd),
    /// Add a task to a column (bottom)
    Add(AddArgs),
    /// Edit a task's fields
    Update(UpdateArgs),
    /// Mark a task done (or not done with --undo)
    Done(DoneArgs),
    /// Delete a task
    Rm(TaskRefArgs),
    /// Show a task with its subtasks and comments
    Show(TaskRefArgs),
    /// Add or toggle subtasks
    Sub(SubCmd),
    /// Add a comment to a task
    Comment(CommentArgs),
    /// Drop a task onto another task or a column
    Drag(DragArgs),
    /// Move a task to a position in the flat list view
    Reorder(ReorderArgs),
    /// List tasks grouped by priority, due date, project, column or manual order
    Group(GroupArgs),
    /// Project management
    Project(ProjectCmd),
    /// Move a task to another project's board
    Move(MoveArgs),
    /// Tag catalog and tag normalization
    Tag(TagCmd),
}

/// Selects the inbox (default) or a project board
#[derive(Args, Clone)]
pub struct BoardSel {
    /// Project id or name (default: inbox)
    #[arg(long, short)]
    pub project: Option<String>,
}

// ---------------------------------------------------------------------------
// Boards and columns
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct BoardArgs {
    #[command(flatten)]
    pub board: BoardSel,
    /// Hide completed tasks
    #[arg(long)]
    pub open: bool,
}

#[derive(Args)]
pub struct ColumnCmd {
    #[command(subcommand)]
    pub action: ColumnAction,
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// Append a new column
    Add(ColumnAddArgs),
    /// Rename a column
    Rename(ColumnRenameArgs),
    /// Remove a column and the tasks in it
    Rm(ColumnRmArgs),
}

#[derive(Args)]
pub struct ColumnAddArgs {
    /// Column name
    pub name: String,
    #[command(flatten)]
    pub board: BoardSel,
}

#[derive(Args)]
pub struct ColumnRenameArgs {
    /// Column id or current name
    pub column: String,
    /// New name
    pub name: String,
    #[command(flatten)]
    pub board: BoardSel,
}

#[derive(Args)]
pub struct ColumnRmArgs {
    /// Column id or name
    pub column: String,
    #[command(flatten)]
    pub board: BoardSel,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub text: String,
    /// Column id or name (default: first column)
    #[arg(long, short)]
    pub column: Option<String>,
    #[command(flatten)]
    pub board: BoardSel,
    /// Priority 1 (urgent) to 4 (lowest)
    #[arg(long)]
    pub priority: Option<u8>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub label: Option<String>,
    #[arg(long)]
    pub tag: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Task id (or unique prefix)
    pub id: String,
    #[command(flatten)]
    pub board: BoardSel,
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub priority: Option<u8>,
    /// Due date (YYYY-MM-DD); an empty value clears it
    #[arg(long)]
    pub date: Option<String>,
    /// An empty value clears the label
    #[arg(long)]
    pub label: Option<String>,
    /// An empty value clears the tag
    #[arg(long)]
    pub tag: Option<String>,
}

#[derive(Args)]
pub struct DoneArgs {
    /// Task id (or unique prefix)
    pub id: String,
    #[command(flatten)]
    pub board: BoardSel,
    /// Mark as not done
    #[arg(long)]
    pub undo: bool,
}

#[derive(Args)]
pub struct TaskRefArgs {
    /// Task id (or unique prefix)
    pub id: String,
    #[command(flatten)]
    pub board: BoardSel,
}

#[derive(Args)]
pub struct SubCmd {
    #[command(subcommand)]
    pub action: SubAction,
}

#[derive(Subcommand)]
pub enum SubAction {
    /// Append a subtask
    Add(SubAddArgs),
    /// Flip a subtask between open and completed
    Toggle(SubToggleArgs),
}

#[derive(Args)]
pub struct SubAddArgs {
    /// Parent task id (or unique prefix)
    pub task: String,
    /// Subtask text
    pub text: String,
    #[command(flatten)]
    pub board: BoardSel,
}

#[derive(Args)]
pub struct SubToggleArgs {
    /// Parent task id (or unique prefix)
    pub task: String,
    /// Subtask id (or unique prefix)
    pub subtask: String,
    #[command(flatten)]
    pub board: BoardSel,
}

#[derive(Args)]
pub struct CommentArgs {
    /// Task id (or unique prefix)
    pub task: String,
    /// Comment text
    pub text: String,
    /// Comment author (default: $USER)
    #[arg(long)]
    pub author: Option<String>,
    #[command(flatten)]
    pub board: BoardSel,
}

// ---------------------------------------------------------------------------
// Reordering and views
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct DragArgs {
    /// Task being dragged (id or unique prefix)
    pub active: String,
    /// Task or column it was dropped on; omit for a drop outside any target
    pub over: Option<String>,
    #[command(flatten)]
    pub board: BoardSel,
}

#[derive(Args)]
pub struct ReorderArgs {
    /// Task being moved (id or unique prefix)
    pub active: String,
    /// Task whose position it takes
    pub over: String,
    #[command(flatten)]
    pub board: BoardSel,
}

#[derive(Args)]
pub struct GroupArgs {
    /// priority, dueDate, project, column or manual (default: from config)
    pub mode: Option<String>,
    /// Only this project's tasks (default: inbox and every project)
    #[arg(long, short)]
    pub project: Option<String>,
    /// Hide completed tasks
    #[arg(long)]
    pub open: bool,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: Option<ProjectAction>,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List projects by group (default)
    List,
    /// Create a project with its own board
    Add(ProjectAddArgs),
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Project name
    pub name: String,
    /// Group to file the project under
    #[arg(long)]
    pub group: Option<String>,
    /// Initial columns, comma separated
    #[arg(long, value_delimiter = ',', default_value = "To Do,In Progress,Done")]
    pub columns: Vec<String>,
}

#[derive(Args)]
pub struct MoveArgs {
    /// Task id (or unique prefix)
    pub task: String,
    /// Destination project id or name
    #[arg(long)]
    pub to: String,
    /// Source project id or name (default: inbox)
    #[arg(long)]
    pub from: Option<String>,
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TagCmd {
    #[command(subcommand)]
    pub action: TagAction,
}

#[derive(Subcommand)]
pub enum TagAction {
    /// Print the normalized slug of each tag
    Slug(TagSlugArgs),
    /// List the tag catalog
    List,
    /// Add tags to the catalog
    Add(TagSlugArgs),
    /// Rename a tag in the catalog and on every task
    Rename(TagRenameArgs),
    /// Remove a tag from the catalog and from every task
    Rm(TagRmArgs),
}

#[derive(Args)]
pub struct TagSlugArgs {
    /// Tag texts, e.g. "#Client: Acme Co"
    #[arg(required = true)]
    pub tags: Vec<String>,
}

#[derive(Args)]
pub struct TagRenameArgs {
    pub from: String,
    pub to: String,
}

#[derive(Args)]
pub struct TagRmArgs {
    pub tag: String,
}
