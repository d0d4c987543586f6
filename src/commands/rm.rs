//! `canopy rm`: remove a worktree, its branch, and its record.

use anyhow::Result;

use crate::commands::CommandContext;
use crate::display::print_success;
use crate::worktree::remove_worktree;

pub fn execute(name: String, force: bool, keep_branch: bool) -> Result<()> {
    let ctx = CommandContext::load()?;
    remove_worktree(
        &ctx.home,
        &ctx.repo_root,
        &ctx.config,
        &name,
        force,
        keep_branch,
    )?;
    print_success(&format!("Removed worktree {name}"));

    // Main repo path on stdout: the shell wrapper cds back to it.
    println!("{}", ctx.repo_root.display());
    Ok(())
}
