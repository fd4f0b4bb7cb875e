use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::workspace_io;

pub fn cmd_init(args: InitArgs, root: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = workspace_io::init_workspace(root, args.force)?;
    if json {
        let value = serde_json::json!({
            "root": workspace.root,
            "store": workspace.store_path(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!(
            "initialized flowstate workspace in {}",
            workspace.state_dir.display()
        );
    }
    Ok(())
}
