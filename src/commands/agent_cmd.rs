//! `canopy agent`: launch a coding agent inside a worktree with canopy
//! context injected and env vars set.

use anyhow::{bail, Result};
use colored::Colorize;

use crate::agent::{
    agent_binary_path, agent_def, build_env_vars, detect_installed_agents,
    inject_agent_context,
};
use crate::commands::CommandContext;
use crate::display::print_info;
use crate::models::WorktreeInfo;
use crate::worktree::{get_worktree, list_worktrees};

pub fn execute(
    name: String,
    agent: Option<String>,
    command: Option<String>,
    no_context: bool,
) -> Result<()> {
    let ctx = CommandContext::load()?;
    let Some(info) = get_worktree(&ctx.home, &ctx.repo_root, &ctx.config, &name)? else {
        bail!("no worktree named '{name}'");
    };
    if info.is_archived() {
        bail!("'{name}' is archived; unarchive it first");
    }

    let agent_name = agent.unwrap_or_else(|| ctx.config.default_agent.clone());
    if no_context {
        launch_without_context(&ctx, &info, &agent_name, command.as_deref())
    } else {
        launch(&ctx, &info, &agent_name, command.as_deref())
    }
}

pub fn list() -> Result<()> {
    let installed = detect_installed_agents();
    if installed.is_empty() {
        println!("{}", "No known agents on PATH".dimmed());
        return Ok(());
    }
    for name in installed {
        println!("{name}");
    }
    Ok(())
}

/// Inject context, then exec the agent. Shared with `canopy new --agent`.
pub(crate) fn launch(
    ctx: &CommandContext,
    info: &WorktreeInfo,
    agent_name: &str,
    command: Option<&str>,
) -> Result<()> {
    let def = agent_def(agent_name, ctx.config.agent.context_file.as_deref());
    let all = list_worktrees(&ctx.home, &ctx.repo_root, &ctx.config, false)?;
    inject_agent_context(
        &def,
        std::path::Path::new(&info.path),
        info,
        &all,
        &ctx.project(),
    )?;
    exec_agent(ctx, info, agent_name, command)
}

fn launch_without_context(
    ctx: &CommandContext,
    info: &WorktreeInfo,
    agent_name: &str,
    command: Option<&str>,
) -> Result<()> {
    exec_agent(ctx, info, agent_name, command)
}

fn exec_agent(
    ctx: &CommandContext,
    info: &WorktreeInfo,
    agent_name: &str,
    command: Option<&str>,
) -> Result<()> {
    let def = agent_def(agent_name, ctx.config.agent.context_file.as_deref());
    if command.is_none() && agent_binary_path(&def).is_none() {
        bail!("agent binary '{}' not found on PATH", def.binary);
    }

    let env_vars = build_env_vars(info, &ctx.repo_root);
    print_info(&format!("Launching {} in {}", def.binary, info.name));
    // Only returns on spawn failure.
    crate::agent::launch_agent(&def, std::path::Path::new(&info.path), &env_vars, command)?;
    Ok(())
}
