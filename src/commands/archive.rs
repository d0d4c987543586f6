//! `canopy archive` / `canopy unarchive`: soft-hide worktrees without
//! touching their directories.

use anyhow::Result;

use crate::commands::CommandContext;
use crate::display::print_success;
use crate::worktree::{archive_worktree, unarchive_worktree};

pub fn archive(name: String) -> Result<()> {
    let ctx = CommandContext::load()?;
    archive_worktree(&ctx.home, &ctx.repo_root, &ctx.config, &name)?;
    print_success(&format!("Archived {name} (directory kept)"));
    Ok(())
}

pub fn unarchive(name: String) -> Result<()> {
    let ctx = CommandContext::load()?;
    let info = unarchive_worktree(&ctx.home, &ctx.repo_root, &ctx.config, &name)?;
    print_success(&format!("Unarchived {name}"));

    // Path on stdout so the shell wrapper can cd into it.
    println!("{}", info.path);
    Ok(())
}
