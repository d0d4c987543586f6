//! `canopy cd`: print a worktree's path for the shell wrapper.

use anyhow::{bail, Result};

use crate::commands::CommandContext;
use crate::worktree::get_worktree;

pub fn execute(name: String) -> Result<()> {
    let ctx = CommandContext::load()?;

    // "main" always means the main repository.
    if name == "main" {
        println!("{}", ctx.repo_root.display());
        return Ok(());
    }

    match get_worktree(&ctx.home, &ctx.repo_root, &ctx.config, &name)? {
        Some(info) => {
            println!("{}", info.path);
            Ok(())
        }
        None => bail!("no worktree named '{name}'"),
    }
}
