use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::io::store::atomic_write;
use crate::model::config::WorkspaceConfig;
use crate::model::workspace::Workspace;

/// Name of the per-workspace state directory
pub const STATE_DIR: &str = ".flowstate";
const CONFIG_FILE: &str = "config.toml";

const DEFAULT_CONFIG: &str = "\
# flowstate workspace configuration

[store]
# Task file, relative to this directory
file = \"tasks.json\"

[log]
# tracing filter directive; FLOWSTATE_LOG overrides it
level = \"warn\"

[ui]
indent_width = 2
show_key_hints = true
";

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a flowstate workspace: no .flowstate/ directory found (run `flow init`)")]
    NotAWorkspace,
    #[error(".flowstate/ already exists in {0}")]
    AlreadyInitialized(PathBuf),
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Walk up from `start` looking for a directory that contains `.flowstate/`.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(STATE_DIR).is_dir() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Load the workspace rooted at `root`. A missing config file means defaults.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let state_dir = root.join(STATE_DIR);
    if !state_dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let config = read_config(&state_dir)?;
    Ok(Workspace {
        root: root.to_path_buf(),
        state_dir,
        config,
    })
}

pub fn read_config(state_dir: &Path) -> Result<WorkspaceConfig, WorkspaceError> {
    let path = state_dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(WorkspaceConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| WorkspaceError::Read {
        path: path.clone(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| WorkspaceError::Config { path, source: e })
}

/// Create `.flowstate/` with a commented default config and an empty store.
pub fn init_workspace(root: &Path, force: bool) -> Result<Workspace, WorkspaceError> {
    let state_dir = root.join(STATE_DIR);
    if state_dir.exists() && !force {
        return Err(WorkspaceError::AlreadyInitialized(root.to_path_buf()));
    }
    fs::create_dir_all(&state_dir)?;

    let config_path = state_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        atomic_write(&config_path, DEFAULT_CONFIG.as_bytes())?;
    }

    let workspace = load_workspace(root)?;
    let store_path = workspace.store_path();
    if !store_path.exists() {
        atomic_write(&store_path, b"[]\n")?;
    }
    info!(root = %root.display(), "initialized workspace");
    Ok(workspace)
}
