use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flow", about = concat!("flowstate v", env!("CARGO_PKG_VERSION"), " - tasks with nested checklists"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a workspace in the current directory
    Init(InitArgs),
    /// Add a task
    Add(AddArgs),
    /// List tasks
    List(ListArgs),
    /// Show a task and its subtask outline
    Show(TaskArg),
    /// Toggle a task between open and completed
    Done(TaskArg),
    /// Change a task title
    Title(TitleArgs),
    /// Delete a task
    Rm(TaskArg),
    /// Edit a task's subtask outline
    Sub(SubArgs),
    /// Validate the task store
    Check,
    /// Open the interactive outline editor for a task
    Edit(TaskArg),
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Reinitialize even if .flowstate/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Due date (YYYY-MM-DD, today, tomorrow)
    #[arg(long)]
    pub due: Option<String>,
    /// Tag (repeatable)
    #[arg(long)]
    pub tag: Vec<String>,
    /// Star the task
    #[arg(long)]
    pub star: bool,
    /// Repeat: daily, weekly, monthly, yearly
    #[arg(long)]
    pub repeat: Option<String>,
    /// Repeat every N units
    #[arg(long, default_value_t = 1, requires = "repeat")]
    pub every: u32,
    /// Estimated minutes
    #[arg(long)]
    pub estimate: Option<u32>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only tasks due on this date (YYYY-MM-DD, today, tomorrow)
    #[arg(long)]
    pub due: Option<String>,
    /// Only tasks whose title or tags match this regex
    #[arg(long)]
    pub search: Option<String>,
    /// Hide completed tasks
    #[arg(long)]
    pub open: bool,
}

#[derive(Args)]
pub struct TaskArg {
    /// Task id (or unique prefix)
    pub task: String,
}

#[derive(Args)]
pub struct TitleArgs {
    /// Task id (or unique prefix)
    pub task: String,
    /// New title
    pub title: String,
}

// ---------------------------------------------------------------------------
// Subtask outline args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SubArgs {
    /// Task id (or unique prefix)
    pub task: String,
    #[command(subcommand)]
    pub action: SubAction,
}

#[derive(Subcommand)]
pub enum SubAction {
    /// Add a subtask at the end of the top level, or under --parent
    Add {
        /// Parent subtask id (or unique prefix)
        #[arg(long)]
        parent: Option<String>,
        /// Title (default: empty)
        #[arg(default_value = "")]
        title: String,
    },
    /// Insert a sibling right after a subtask
    After {
        /// Subtask id (or unique prefix)
        node: String,
        /// Title (default: empty)
        #[arg(default_value = "")]
        title: String,
    },
    /// Rename a subtask
    Title {
        /// Subtask id (or unique prefix)
        node: String,
        /// New title
        title: String,
    },
    /// Toggle a subtask's completed flag
    Toggle {
        /// Subtask id (or unique prefix)
        node: String,
    },
    /// Delete a subtask and everything under it
    Rm {
        /// Subtask id (or unique prefix)
        node: String,
    },
    /// Make a subtask the last child of its previous sibling
    Indent {
        /// Subtask id (or unique prefix)
        node: String,
    },
    /// Move a subtask out to follow its parent
    Outdent {
        /// Subtask id (or unique prefix)
        node: String,
    },
    /// Print the subtask shown just above this one
    Prev {
        /// Subtask id (or unique prefix)
        node: String,
    },
}
