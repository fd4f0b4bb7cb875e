//! Task persistence behind a small repository trait.
//!
//! Stores treat a task's outline as an opaque nested value; they never look
//! inside `subtasks`. Every successful write pushes the full, current task
//! list to all subscribers.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::io::lock::{LockError, StoreLock};
use crate::model::task::{Task, TaskPatch};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("{path} is not a valid task file: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Handle returned by [`TaskStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&[Task]) + Send>;

/// Storage collaborator for task records.
pub trait TaskStore {
    /// All tasks in stored order
    fn list(&self) -> Result<Vec<Task>, StoreError>;

    /// Insert or replace (by id). New tasks go to the front.
    fn save(&mut self, task: Task) -> Result<(), StoreError>;

    /// Apply a partial update. Returns false if no task has `id`.
    fn update(&mut self, id: &str, patch: &TaskPatch) -> Result<bool, StoreError>;

    /// Remove a task. Returns false if no task has `id`.
    fn delete(&mut self, id: &str) -> Result<bool, StoreError>;

    /// Register a listener. It is called at once with the current list and
    /// again after every successful write through this store.
    fn subscribe(&mut self, listener: Listener) -> Result<SubscriptionId, StoreError>;

    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Read-modify-write of the whole list as one step. `edit` sees the
    /// current stored list and returns whether it changed it; nothing is
    /// written otherwise. No other writer can interleave.
    fn modify_tasks(
        &mut self,
        op: &str,
        edit: &mut dyn FnMut(&mut Vec<Task>) -> bool,
    ) -> Result<bool, StoreError>;

    /// Fetch one task by id
    fn get(&self, id: &str) -> Result<Option<Task>, StoreError> {
        Ok(self.list()?.into_iter().find(|t| t.id == id))
    }

    /// Edit one task against its freshly stored state.
    ///
    /// Returns the task as `edit` left it, or `None` if no task has `id`.
    fn update_with(
        &mut self,
        id: &str,
        edit: &mut dyn FnMut(&mut Task) -> bool,
    ) -> Result<Option<Task>, StoreError> {
        let mut current = None;
        self.modify_tasks("update", &mut |tasks: &mut Vec<Task>| {
            let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
                return false;
            };
            let changed = edit(task);
            current = Some(task.clone());
            changed
        })?;
        Ok(current)
    }
}

// ---------------------------------------------------------------------------
// Shared list edits
// ---------------------------------------------------------------------------

fn upsert(tasks: &mut Vec<Task>, task: Task) {
    match tasks.iter_mut().find(|t| t.id == task.id) {
        Some(existing) => *existing = task,
        None => tasks.insert(0, task),
    }
}

fn patch(tasks: &mut [Task], id: &str, patch: &TaskPatch) -> bool {
    match tasks.iter_mut().find(|t| t.id == id) {
        Some(task) => {
            patch.apply(task);
            true
        }
        None => false,
    }
}

fn remove(tasks: &mut Vec<Task>, id: &str) -> bool {
    let before = tasks.len();
    tasks.retain(|t| t.id != id);
    tasks.len() != before
}

#[derive(Default)]
struct Listeners {
    next: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    fn add(&mut self, mut listener: Listener, current: &[Task]) -> SubscriptionId {
        self.next += 1;
        let id = SubscriptionId(self.next);
        listener(current);
        self.entries.push((id, listener));
        id
    }

    fn remove(&mut self, id: SubscriptionId) {
        self.entries.retain(|(sid, _)| *sid != id);
    }

    fn notify(&mut self, tasks: &[Task]) {
        for (_, listener) in &mut self.entries {
            listener(tasks);
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local store. Used by tests and as a scratch backend.
#[derive(Default)]
pub struct MemoryStore {
    tasks: Vec<Task>,
    listeners: Listeners,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        MemoryStore {
            tasks,
            listeners: Listeners::default(),
        }
    }
}

impl TaskStore for MemoryStore {
    fn list(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.tasks.clone())
    }

    fn save(&mut self, task: Task) -> Result<(), StoreError> {
        upsert(&mut self.tasks, task);
        self.listeners.notify(&self.tasks);
        Ok(())
    }

    fn update(&mut self, id: &str, changes: &TaskPatch) -> Result<bool, StoreError> {
        let found = patch(&mut self.tasks, id, changes);
        if found {
            self.listeners.notify(&self.tasks);
        }
        Ok(found)
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let found = remove(&mut self.tasks, id);
        if found {
            self.listeners.notify(&self.tasks);
        }
        Ok(found)
    }

    fn subscribe(&mut self, listener: Listener) -> Result<SubscriptionId, StoreError> {
        Ok(self.listeners.add(listener, &self.tasks))
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.remove(id);
    }

    fn modify_tasks(
        &mut self,
        _op: &str,
        edit: &mut dyn FnMut(&mut Vec<Task>) -> bool,
    ) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.clone();
        if !edit(&mut tasks) {
            return Ok(false);
        }
        self.tasks = tasks;
        self.listeners.notify(&self.tasks);
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

/// Tasks as a pretty-printed JSON array in one file.
///
/// Each write re-reads the file under a [`StoreLock`], applies the change
/// and replaces the file atomically, so concurrent `flow` processes never
/// lose each other's writes. A missing file is an empty store; a corrupt
/// one is reported, never overwritten.
pub struct JsonFileStore {
    path: PathBuf,
    listeners: Listeners,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            listeners: Listeners::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<Task>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }

    fn write(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let mut content = serde_json::to_vec_pretty(tasks).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            source: e.into(),
        })?;
        content.push(b'\n');
        atomic_write(&self.path, &content).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Locked read-modify-write. `edit` returns whether anything changed;
    /// unchanged lists are not written and listeners are not called.
    fn modify<F>(&mut self, op: &str, edit: F) -> Result<bool, StoreError>
    where
        F: FnOnce(&mut Vec<Task>) -> bool,
    {
        let _lock = StoreLock::acquire_default(&self.path)?;
        let mut tasks = self.read()?;
        if !edit(&mut tasks) {
            debug!(op, path = %self.path.display(), "store unchanged");
            return Ok(false);
        }
        self.write(&tasks)?;
        debug!(op, count = tasks.len(), path = %self.path.display(), "store written");
        self.listeners.notify(&tasks);
        Ok(true)
    }
}

impl TaskStore for JsonFileStore {
    fn list(&self) -> Result<Vec<Task>, StoreError> {
        self.read()
    }

    fn save(&mut self, task: Task) -> Result<(), StoreError> {
        self.modify("save", |tasks| {
            upsert(tasks, task);
            true
        })?;
        Ok(())
    }

    fn update(&mut self, id: &str, changes: &TaskPatch) -> Result<bool, StoreError> {
        self.modify("update", |tasks| patch(tasks, id, changes))
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        self.modify("delete", |tasks| remove(tasks, id))
    }

    fn subscribe(&mut self, listener: Listener) -> Result<SubscriptionId, StoreError> {
        let current = self.read()?;
        Ok(self.listeners.add(listener, &current))
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.remove(id);
    }

    fn modify_tasks(
        &mut self,
        op: &str,
        edit: &mut dyn FnMut(&mut Vec<Task>) -> bool,
    ) -> Result<bool, StoreError> {
        self.modify(op, edit)
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
