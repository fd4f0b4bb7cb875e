mod init;
pub use init::cmd_init;

use std::path::PathBuf;

use chrono::{Days, Local, NaiveDate, Utc};
use regex::Regex;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::store::{JsonFileStore, TaskStore};
use crate::io::workspace_io;
use crate::logging;
use crate::model::outline::Forest;
use crate::model::task::{Recurrence, RecurrenceKind, Task, TaskPatch};
use crate::model::workspace::Workspace;
use crate::ops::outline_command::{self, OutlineCommand};
use crate::ops::task_ops::{self, PrefixError};
use crate::ops::{check, outline_ops};
use crate::util::id::UuidSource;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("task {0}")]
    Task(PrefixError),
    #[error("subtask {0}")]
    Node(PrefixError),
    #[error("invalid date '{0}' (expected YYYY-MM-DD, today or tomorrow)")]
    BadDate(String),
    #[error("invalid repeat '{0}' (expected daily, weekly, monthly or yearly)")]
    BadRepeat(String),
    #[error("invalid search pattern: {0}")]
    BadSearch(#[from] regex::Error),
    #[error("check found {0} error(s)")]
    CheckFailed(usize),
}

/// Everything a workspace command needs
struct Context {
    workspace: Workspace,
    store: JsonFileStore,
    json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = resolve_start(cli.workspace_dir.as_deref()).map_err(|e| {
        format!(
            "cannot resolve workspace directory '{}': {}",
            cli.workspace_dir.as_deref().unwrap_or("."),
            e
        )
    })?;
    let verbose_level = cli.verbose.then_some("debug");

    // Init runs before workspace discovery
    let args = match cli.command {
        Commands::Init(args) => {
            logging::init_logging(verbose_level.unwrap_or("warn"));
            return cmd_init(args, &start, json);
        }
        other => other,
    };

    let root = workspace_io::discover_workspace(&start)?;
    let workspace = workspace_io::load_workspace(&root)?;
    logging::init_logging(verbose_level.unwrap_or(workspace.config.log.level.as_str()));
    let store = JsonFileStore::open(workspace.store_path());
    let mut ctx = Context {
        workspace,
        store,
        json,
    };

    match args {
        Commands::Init(_) => Ok(()),
        Commands::Add(args) => cmd_add(&mut ctx, args),
        Commands::List(args) => cmd_list(&ctx, args),
        Commands::Show(args) => cmd_show(&ctx, args),
        Commands::Done(args) => cmd_done(&mut ctx, args),
        Commands::Title(args) => cmd_title(&mut ctx, args),
        Commands::Rm(args) => cmd_rm(&mut ctx, args),
        Commands::Sub(args) => cmd_sub(&mut ctx, args),
        Commands::Check => cmd_check(&ctx),
        Commands::Edit(args) => cmd_edit(ctx, args),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// `YYYY-MM-DD`, `today` or `tomorrow` (local time)
pub fn parse_date(s: &str) -> Result<NaiveDate, CliError> {
    let today = Local::now().date_naive();
    match s.to_ascii_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| CliError::BadDate(s.to_string())),
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| CliError::BadDate(s.to_string())),
    }
}

fn find_task(tasks: &[Task], query: &str) -> Result<Task, CliError> {
    let id = task_ops::resolve_prefix(tasks.iter().map(|t| t.id.as_str()), query)
        .map_err(CliError::Task)?;
    let task = tasks.iter().find(|t| t.id == id).cloned();
    task.ok_or_else(|| CliError::Task(PrefixError::NotFound(query.to_string())))
}

fn find_node_id(forest: &Forest, query: &str) -> Result<String, CliError> {
    task_ops::resolve_prefix(
        outline_ops::preorder(forest).map(|(_, node)| node.id.as_str()),
        query,
    )
    .map(str::to_string)
    .map_err(CliError::Node)
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &mut Context, args: AddArgs) -> CmdResult {
    let mut task = task_ops::new_task(&args.title, &mut UuidSource, now_ms());
    task.due_date = args.due.as_deref().map(parse_date).transpose()?;
    task.tags = args.tag;
    task.star_level = u8::from(args.star);
    task.estimated_minutes = args.estimate;
    if let Some(repeat) = &args.repeat {
        let kind = RecurrenceKind::parse(repeat).ok_or_else(|| CliError::BadRepeat(repeat.clone()))?;
        task.recurrence = Some(Recurrence {
            kind,
            interval: args.every,
        });
    }

    ctx.store.save(task.clone())?;
    if ctx.json {
        print_json(&task_to_json(&task))
    } else {
        println!("{}", task.id);
        Ok(())
    }
}

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    let tasks = ctx.store.list()?;
    let search = args.search.as_deref().map(Regex::new).transpose().map_err(CliError::from)?;

    let mut selected = match &args.due {
        Some(due) => task_ops::tasks_due_on(&tasks, parse_date(due)?),
        None => task_ops::sorted_by_created(&tasks),
    };
    if args.open {
        selected.retain(|t| !t.is_completed());
    }
    if let Some(re) = &search {
        selected.retain(|t| re.is_match(&t.title) || t.tags.iter().any(|tag| re.is_match(tag)));
    }

    if ctx.json {
        let out: Vec<TaskJson> = selected.iter().map(|t| task_to_json(t)).collect();
        return print_json(&out);
    }
    for task in selected {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

fn cmd_show(ctx: &Context, args: TaskArg) -> CmdResult {
    let task = find_task(&ctx.store.list()?, &args.task)?;
    if ctx.json {
        return print_json(&task_to_json(&task));
    }
    for line in format_task_detail(&task, ctx.workspace.config.ui.indent_width) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_done(ctx: &mut Context, args: TaskArg) -> CmdResult {
    let id = find_task(&ctx.store.list()?, &args.task)?.id;

    // Status change and next occurrence land in one write
    let now = now_ms();
    let mut done = None;
    ctx.store.modify_tasks("done", &mut |tasks: &mut Vec<Task>| {
        done = task_ops::toggle_in_list(tasks, &id, &mut UuidSource, now);
        done.is_some()
    })?;
    let Some((updated, spawned)) = done else {
        return Err(CliError::Task(PrefixError::NotFound(args.task)).into());
    };

    if ctx.json {
        let value = serde_json::json!({
            "task": task_to_json(&updated),
            "spawned": spawned.as_ref().map(task_to_json),
        });
        return print_json(&value);
    }
    println!("{}", format_task_line(&updated));
    if let Some(next) = &spawned {
        println!("next: {}", format_task_line(next));
    }
    Ok(())
}

fn cmd_title(ctx: &mut Context, args: TitleArgs) -> CmdResult {
    let task = find_task(&ctx.store.list()?, &args.task)?;
    ctx.store.update(&task.id, &TaskPatch::title(args.title.trim()))?;
    Ok(())
}

fn cmd_rm(ctx: &mut Context, args: TaskArg) -> CmdResult {
    let task = find_task(&ctx.store.list()?, &args.task)?;
    ctx.store.delete(&task.id)?;
    if !ctx.json {
        println!("deleted {}", task.id);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Outline commands
// ---------------------------------------------------------------------------

fn cmd_sub(ctx: &mut Context, args: SubArgs) -> CmdResult {
    let task = find_task(&ctx.store.list()?, &args.task)?;
    let forest = &task.subtasks;

    let command = match args.action {
        SubAction::Prev { node } => {
            let id = find_node_id(forest, &node)?;
            let prev = outline_ops::find_predecessor(forest, &id);
            if ctx.json {
                return print_json(&PredecessorJson {
                    node_id: &id,
                    predecessor: prev,
                });
            }
            if let Some(prev) = prev {
                println!("{}", prev);
            }
            return Ok(());
        }
        SubAction::Add { parent: None, title } => OutlineCommand::AddRoot { title },
        SubAction::Add {
            parent: Some(parent),
            title,
        } => OutlineCommand::AddChild {
            parent: find_node_id(forest, &parent)?,
            title,
        },
        SubAction::After { node, title } => OutlineCommand::InsertAfter {
            id: find_node_id(forest, &node)?,
            title,
        },
        SubAction::Title { node, title } => OutlineCommand::Rename {
            id: find_node_id(forest, &node)?,
            title,
        },
        SubAction::Toggle { node } => OutlineCommand::Toggle {
            id: find_node_id(forest, &node)?,
        },
        SubAction::Rm { node } => OutlineCommand::Delete {
            id: find_node_id(forest, &node)?,
        },
        SubAction::Indent { node } => OutlineCommand::Indent {
            id: find_node_id(forest, &node)?,
        },
        SubAction::Outdent { node } => OutlineCommand::Outdent {
            id: find_node_id(forest, &node)?,
        },
    };

    let creates = matches!(
        command,
        OutlineCommand::AddRoot { .. } | OutlineCommand::AddChild { .. } | OutlineCommand::InsertAfter { .. }
    );
    // Ids were resolved on the snapshot; the edit itself runs on the stored outline
    let mut outcome = None;
    let saved = ctx.store.update_with(&task.id, &mut |stored: &mut Task| {
        let result = outline_command::apply(&stored.subtasks, &command, &mut UuidSource);
        if result.applied {
            stored.subtasks = result.forest.clone();
        }
        let applied = result.applied;
        outcome = Some(result);
        applied
    })?;
    let outcome = match (saved, outcome) {
        (Some(_), Some(outcome)) => outcome,
        _ => return Err(CliError::Task(PrefixError::NotFound(args.task)).into()),
    };

    if ctx.json {
        return print_json(&OutlineEditJson {
            task_id: &task.id,
            applied: outcome.applied,
            focus: outcome.focus.as_deref(),
            subtasks: &outcome.forest,
            progress: outline_ops::count(&outcome.forest),
        });
    }
    if !outcome.applied {
        eprintln!("nothing to {}", command.name());
        return Ok(());
    }
    if creates && let Some(new_id) = &outcome.focus {
        println!("{}", new_id);
        return Ok(());
    }
    let indent = ctx.workspace.config.ui.indent_width;
    for line in format_outline(&outcome.forest, indent, outcome.focus.as_deref()) {
        println!("{}", line);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Maintenance
// ---------------------------------------------------------------------------

fn cmd_check(ctx: &Context) -> CmdResult {
    let result = check::check_tasks(&ctx.store.list()?);
    if ctx.json {
        print_json(&result)?;
    } else {
        for line in format_check(&result) {
            println!("{}", line);
        }
    }
    if result.valid {
        Ok(())
    } else {
        Err(CliError::CheckFailed(result.errors.len()).into())
    }
}

fn cmd_edit(ctx: Context, args: TaskArg) -> CmdResult {
    let task = find_task(&ctx.store.list()?, &args.task)?;
    crate::tui::run(&ctx.workspace, ctx.store, &task.id)?;
    Ok(())
}

/// Where workspace discovery starts: `-C` if given, else the cwd
fn resolve_start(dir: Option<&str>) -> std::io::Result<PathBuf> {
    match dir {
        Some(dir) => std::fs::canonicalize(dir),
        None => std::env::current_dir(),
    }
}
