//! `canopy status`: detailed view of one or all worktrees, including
//! ahead/behind counts and uncommitted line totals.

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

use crate::commands::CommandContext;
use crate::display::print_worktree_detail;
use crate::git;
use crate::models::WorktreeInfo;
use crate::worktree::{get_worktree, list_worktrees};

pub fn execute(name: Option<String>) -> Result<()> {
    let ctx = CommandContext::load()?;

    match name {
        Some(name) => {
            let Some(info) = get_worktree(&ctx.home, &ctx.repo_root, &ctx.config, &name)?
            else {
                bail!("no worktree named '{name}'");
            };
            show_one(&info);
        }
        None => {
            let worktrees = list_worktrees(&ctx.home, &ctx.repo_root, &ctx.config, true)?;
            if worktrees.is_empty() {
                println!("{}", "No worktrees".dimmed());
                return Ok(());
            }
            for (i, info) in worktrees.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                show_one(info);
            }
        }
    }
    Ok(())
}

fn show_one(info: &WorktreeInfo) {
    print_worktree_detail(info);

    let path = Path::new(&info.path);
    if info.is_archived() || !path.exists() {
        return;
    }

    let (ahead, behind) = git::ahead_behind(&info.branch, &info.base_branch, path);
    if ahead > 0 || behind > 0 {
        println!(
            "  {} {} ahead, {} behind {}",
            "commits:".dimmed(),
            ahead,
            behind,
            info.base_branch
        );
    }
    if let Ok((added, removed)) = git::diff_numstat(path) {
        if added > 0 || removed > 0 {
            println!(
                "  {} {} {}",
                "changes:".dimmed(),
                format!("+{added}").green(),
                format!("-{removed}").red()
            );
        }
    }
}
