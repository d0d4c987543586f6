//! `canopy env`: inspect and propagate env files into worktrees.

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

use crate::commands::CommandContext;
use crate::display::print_success;
use crate::envfiles::{copy_env_files, diff_env_files, discover_env_files, EnvFileStatus};
use crate::worktree::{get_worktree, list_worktrees};

pub fn list() -> Result<()> {
    let ctx = CommandContext::load()?;
    let files = discover_env_files(&ctx.repo_root, &ctx.config.env);
    if files.is_empty() {
        println!("{}", "No env files found".dimmed());
        return Ok(());
    }
    for file in files {
        println!("{}", file.display());
    }
    Ok(())
}

pub fn sync(name: Option<String>) -> Result<()> {
    let ctx = CommandContext::load()?;
    let files = discover_env_files(&ctx.repo_root, &ctx.config.env);

    let targets = match name {
        Some(name) => {
            let Some(info) = get_worktree(&ctx.home, &ctx.repo_root, &ctx.config, &name)?
            else {
                bail!("no worktree named '{name}'");
            };
            vec![info]
        }
        None => list_worktrees(&ctx.home, &ctx.repo_root, &ctx.config, false)?,
    };

    for info in targets {
        let copied = copy_env_files(&ctx.repo_root, Path::new(&info.path), &files)?;
        print_success(&format!("{}: copied {copied} env file(s)", info.name));
    }
    Ok(())
}

pub fn diff(name: String) -> Result<()> {
    let ctx = CommandContext::load()?;
    let Some(info) = get_worktree(&ctx.home, &ctx.repo_root, &ctx.config, &name)? else {
        bail!("no worktree named '{name}'");
    };

    let files = discover_env_files(&ctx.repo_root, &ctx.config.env);
    if files.is_empty() {
        println!("{}", "No env files found".dimmed());
        return Ok(());
    }

    for (file, status) in diff_env_files(&ctx.repo_root, Path::new(&info.path), &files)? {
        let padded = format!("{:<10}", status.to_string());
        let label = match status {
            EnvFileStatus::Same => padded.green(),
            EnvFileStatus::Different => padded.yellow(),
            EnvFileStatus::Missing => padded.red(),
        };
        println!("{} {}", label, file.display());
    }
    Ok(())
}
