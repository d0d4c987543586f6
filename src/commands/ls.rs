//! `canopy ls`: list managed worktrees.

use anyhow::Result;

use crate::commands::CommandContext;
use crate::display::print_worktree_table;
use crate::worktree::list_worktrees;

pub fn execute(all: bool, json: bool, paths: bool) -> Result<()> {
    let ctx = CommandContext::load()?;
    let worktrees = list_worktrees(&ctx.home, &ctx.repo_root, &ctx.config, all)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&worktrees)?);
    } else if paths {
        for wt in &worktrees {
            println!("{}", wt.path);
        }
    } else {
        print_worktree_table(&worktrees);
    }
    Ok(())
}
