//! Command implementations
//! Each submodule is one CLI subcommand; all of them resolve the same
//! context (repo root, config, canopy home) before doing work.

pub mod agent_cmd;
pub mod archive;
pub mod cd;
pub mod checkout;
pub mod config_cmd;
pub mod env;
pub mod init;
pub mod ls;
pub mod new;
pub mod rm;
pub mod run_init;
pub mod shell_cmd;
pub mod status;
pub mod sync;

use anyhow::{Context as _, Result};
use std::path::PathBuf;

use crate::config::{load_config, CanopyConfig};
use crate::git;
use crate::home::{resolve_project_name, CanopyHome};

/// Everything a command needs: resolved from the current directory, which
/// may be the main repo, a linked worktree, or a managed clone.
pub struct CommandContext {
    pub home: CanopyHome,
    pub repo_root: PathBuf,
    pub config: CanopyConfig,
}

impl CommandContext {
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let repo_root = git::find_repo_root(&cwd)
            .context("not inside a git repository")?;
        let config = load_config(&repo_root)?;
        Ok(CommandContext {
            home: CanopyHome::resolve(),
            repo_root,
            config,
        })
    }

    pub fn project(&self) -> String {
        resolve_project_name(&self.repo_root, self.config.project_name.as_deref())
    }
}
