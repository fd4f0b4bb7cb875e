use std::path::PathBuf;

use super::config::WorkspaceConfig;

/// A discovered flowstate workspace
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory that contains `.flowstate/`
    pub root: PathBuf,
    /// Path to the `.flowstate/` directory
    pub state_dir: PathBuf,
    /// Parsed config.toml (defaults when absent)
    pub config: WorkspaceConfig,
}

impl Workspace {
    /// Absolute path of the task store file
    pub fn store_path(&self) -> PathBuf {
        self.state_dir.join(&self.config.store.file)
    }
}
