//! `canopy sync`: rebase worktrees onto their base branch and refresh env
//! files.

use anyhow::Result;
use std::path::Path;

use crate::commands::CommandContext;
use crate::display::{print_success, print_warning};
use crate::envfiles::{copy_env_files, discover_env_files};
use crate::worktree::{list_worktrees, sync_worktree};

pub fn execute(name: Option<String>, all: bool) -> Result<()> {
    let ctx = CommandContext::load()?;

    let targets: Vec<String> = match (name, all) {
        (Some(name), _) => vec![name],
        (None, true) => list_worktrees(&ctx.home, &ctx.repo_root, &ctx.config, false)?
            .into_iter()
            .map(|wt| wt.name)
            .collect(),
        (None, false) => {
            // Default to the worktree the command was run from.
            let cwd = std::env::current_dir()?;
            let worktrees = list_worktrees(&ctx.home, &ctx.repo_root, &ctx.config, false)?;
            match worktrees
                .iter()
                .find(|wt| cwd.starts_with(&wt.path))
                .map(|wt| wt.name.clone())
            {
                Some(name) => vec![name],
                None => anyhow::bail!("not inside a worktree; pass a name or --all"),
            }
        }
    };

    let env_files = discover_env_files(&ctx.repo_root, &ctx.config.env);
    for name in targets {
        match sync_worktree(&ctx.home, &ctx.repo_root, &ctx.config, &name) {
            Ok(info) => {
                if ctx.config.env.auto_copy && !env_files.is_empty() {
                    copy_env_files(&ctx.repo_root, Path::new(&info.path), &env_files)?;
                }
                print_success(&format!("Synced {} onto {}", name, info.base_branch));
            }
            Err(e) => print_warning(&format!("Sync failed for {name}: {e}")),
        }
    }
    Ok(())
}
