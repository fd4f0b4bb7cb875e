use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the store watcher to an event loop.
#[derive(Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// The store file was created, rewritten or removed on disk.
    Changed,
}

/// Watches a task store file for writes made by other processes.
///
/// The directory is watched rather than the file because atomic writes
/// replace the file (new inode) on every save.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<StoreEvent>,
}

impl StoreWatcher {
    pub fn start(store_path: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let target: PathBuf = store_path.to_path_buf();
        let dir = store_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else {
                    return;
                };
                if is_store_change(&event, &target) {
                    let _ = tx.send(StoreEvent::Changed);
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(StoreWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking: true if at least one change arrived since the last poll.
    pub fn poll_changed(&self) -> bool {
        let mut changed = false;
        while let Ok(StoreEvent::Changed) = self.rx.try_recv() {
            changed = true;
        }
        changed
    }
}

fn is_store_change(event: &Event, target: &Path) -> bool {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
        _ => return false,
    }
    let Some(name) = target.file_name() else {
        return false;
    };
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(name))
}
