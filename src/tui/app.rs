use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, warn};

use crate::io::store::{JsonFileStore, TaskStore};
use crate::io::watcher::StoreWatcher;
use crate::model::config::UiConfig;
use crate::model::outline::OutlineCount;
use crate::model::task::Task;
use crate::model::workspace::Workspace;
use crate::ops::outline_command::{self, OutlineCommand};
use crate::ops::outline_ops;
use crate::util::id::{IdSource, UuidSource};

use super::input;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Editing the title of `App::editing`
    Edit,
}

/// One visible outline row (pre-order)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub depth: usize,
    pub title: String,
    pub completed: bool,
}

/// State of the outline editor for a single task
pub struct App {
    pub task: Task,
    pub rows: Vec<Row>,
    pub cursor: usize,
    /// First visible row in the outline view
    pub scroll_offset: usize,
    pub mode: Mode,
    /// Node whose title is being edited
    pub editing: Option<String>,
    pub edit_buffer: String,
    /// One-shot message for the status row
    pub status: Option<String>,
    pub should_quit: bool,
    pub theme: Theme,
    pub indent_width: usize,
    pub show_key_hints: bool,
    pub store: Box<dyn TaskStore>,
    ids: Box<dyn IdSource>,
}

impl App {
    pub fn new(
        task: Task,
        store: Box<dyn TaskStore>,
        ids: Box<dyn IdSource>,
        ui: &UiConfig,
    ) -> Self {
        let mut app = App {
            task,
            rows: Vec::new(),
            cursor: 0,
            scroll_offset: 0,
            mode: Mode::Navigate,
            editing: None,
            edit_buffer: String::new(),
            status: None,
            should_quit: false,
            theme: Theme::default(),
            indent_width: ui.indent_width,
            show_key_hints: ui.show_key_hints,
            store,
            ids,
        };
        app.rebuild_rows();
        app
    }

    fn rebuild_rows(&mut self) {
        self.rows = outline_ops::preorder(&self.task.subtasks)
            .map(|(depth, node)| Row {
                id: node.id.clone(),
                depth,
                title: node.title.clone(),
                completed: node.completed,
            })
            .collect();
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
    }

    pub fn cursor_id(&self) -> Option<&str> {
        self.rows.get(self.cursor).map(|r| r.id.as_str())
    }

    /// Move the cursor to the row for `id`, if it is visible.
    pub fn focus(&mut self, id: &str) {
        if let Some(idx) = self.rows.iter().position(|r| r.id == id) {
            self.cursor = idx;
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let max = self.rows.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(max);
    }

    pub fn progress(&self) -> OutlineCount {
        outline_ops::count(&self.task.subtasks)
    }

    /// Run an outline command against the stored outline and persist it.
    ///
    /// The command runs on the task as it is in the store at write time, so
    /// edits made by other processes since the last reload are kept. Returns
    /// true when the outline changed. A failed save leaves the in-memory
    /// outline untouched.
    pub fn apply(&mut self, command: OutlineCommand) -> bool {
        let ids = self.ids.as_mut();
        let mut outcome = None;
        let saved = self.store.update_with(&self.task.id, &mut |task: &mut Task| {
            let result = outline_command::apply(&task.subtasks, &command, &mut *ids);
            let applied = result.applied;
            if applied {
                task.subtasks = result.forest.clone();
            }
            outcome = Some(result);
            applied
        });

        let task = match saved {
            Ok(Some(task)) => task,
            Ok(None) => {
                self.status = Some("task no longer exists".to_string());
                return false;
            }
            Err(e) => {
                warn!(command = command.name(), error = %e, "could not save outline");
                self.status = Some(format!("save failed: {}", e));
                return false;
            }
        };

        self.replace_task(task);
        match outcome {
            Some(outcome) if outcome.applied => {
                if let Some(id) = outcome.focus {
                    self.focus(&id);
                }
                true
            }
            _ => false,
        }
    }

    /// Start editing the title of the node under the cursor.
    pub fn begin_edit(&mut self) {
        let Some(row) = self.rows.get(self.cursor) else {
            return;
        };
        self.editing = Some(row.id.clone());
        self.edit_buffer = row.title.clone();
        self.mode = Mode::Edit;
    }

    /// Write the edit buffer back as the node's title and leave edit mode.
    /// Returns the id of the node that was being edited.
    pub fn commit_edit(&mut self) -> Option<String> {
        self.mode = Mode::Navigate;
        let id = self.editing.take()?;
        let title = std::mem::take(&mut self.edit_buffer);
        let unchanged = self
            .rows
            .iter()
            .any(|r| r.id == id && r.title == title);
        if !unchanged {
            self.apply(OutlineCommand::Rename {
                id: id.clone(),
                title,
            });
        }
        Some(id)
    }

    /// Swap in a newer copy of the task, keeping the cursor on the same node.
    fn replace_task(&mut self, task: Task) {
        let focused = self.cursor_id().map(str::to_string);
        self.task = task;
        self.rebuild_rows();
        if let Some(id) = focused {
            self.focus(&id);
        }
        if let Some(editing) = &self.editing
            && !self.rows.iter().any(|r| &r.id == editing)
        {
            self.editing = None;
            self.edit_buffer.clear();
            self.mode = Mode::Navigate;
        }
    }

    /// Re-read the task after an outside write to the store.
    pub fn reload(&mut self) {
        match self.store.get(&self.task.id) {
            Ok(Some(task)) => {
                self.replace_task(task);
                debug!(task = %self.task.id, "reloaded task");
            }
            Ok(None) => {
                self.status = Some("task was deleted elsewhere".to_string());
            }
            Err(e) => {
                self.status = Some(format!("reload failed: {}", e));
            }
        }
    }
}

/// Run the outline editor for one task
pub fn run(
    workspace: &Workspace,
    store: JsonFileStore,
    task_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let task = store
        .get(task_id)?
        .ok_or_else(|| format!("task not found: {}", task_id))?;

    let watcher = match StoreWatcher::start(store.path()) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(error = %e, "file watching disabled");
            None
        }
    };

    let mut app = App::new(
        task,
        Box::new(store),
        Box::new(UuidSource),
        &workspace.config.ui,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    // Commit a pending title edit on the way out
    if app.mode == Mode::Edit {
        app.commit_edit();
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&StoreWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            break;
        }

        if let Some(w) = watcher
            && w.poll_changed()
        {
            app.reload();
        }
    }
    Ok(())
}
