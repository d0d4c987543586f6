//! `canopy new`: create a worktree on a fresh branch, then provision it.

use anyhow::Result;
use std::path::Path;

use crate::agent::{agent_def, inject_agent_context};
use crate::commands::CommandContext;
use crate::display::{print_info, print_success, print_warning};
use crate::envfiles::{copy_env_files, discover_env_files};
use crate::git;
use crate::init_deps::detect_and_install;
use crate::models::WorktreeInfo;
use crate::worktree::{create_worktree, list_worktrees};

pub fn execute(
    name: Option<String>,
    branch: Option<String>,
    base: Option<String>,
    branch_type: Option<String>,
    no_init: bool,
    agent: Option<String>,
) -> Result<()> {
    let ctx = CommandContext::load()?;
    let mut rng = rand::rng();

    let info = create_worktree(
        &ctx.home,
        &ctx.repo_root,
        &ctx.config,
        name.as_deref(),
        branch.as_deref(),
        base.as_deref(),
        branch_type.as_deref(),
        &mut rng,
    )?;

    print_success(&format!(
        "Created worktree {} on branch {}",
        info.name, info.branch
    ));

    provision(&ctx, &info, no_init)?;

    let launch = agent.is_some() || ctx.config.agent.auto_launch;
    if launch {
        let agent_name = agent.unwrap_or_else(|| ctx.config.default_agent.clone());
        return super::agent_cmd::launch(&ctx, &info, &agent_name, None);
    }

    // Path on stdout: the shell wrapper cds into it.
    println!("{}", info.path);
    Ok(())
}

/// Post-create provisioning shared with `checkout`: env files, submodules,
/// dependency installs, agent context. Failures here warn instead of
/// aborting; the worktree itself already exists.
pub(crate) fn provision(ctx: &CommandContext, info: &WorktreeInfo, no_init: bool) -> Result<()> {
    let wt_path = Path::new(&info.path);

    if ctx.config.env.auto_copy {
        let files = discover_env_files(&ctx.repo_root, &ctx.config.env);
        if !files.is_empty() {
            let copied = copy_env_files(&ctx.repo_root, wt_path, &files)?;
            print_info(&format!("Copied {copied} env file(s)"));
        }
    }

    if ctx.config.submodules.auto_init && git::has_submodules(&ctx.repo_root) {
        match git::init_submodules(wt_path, ctx.config.submodules.recursive) {
            Ok(()) => print_info("Initialized submodules"),
            Err(e) => print_warning(&format!("Submodule init failed: {e}")),
        }
    }

    if ctx.config.init.auto_init && !no_init {
        for (step, ok) in detect_and_install(wt_path, &ctx.config.init) {
            if ok {
                print_info(&step);
            } else {
                print_warning(&format!("Install step failed: {step}"));
            }
        }
    }

    if ctx.config.agent.inject_context {
        let def = agent_def(
            &ctx.config.default_agent,
            ctx.config.agent.context_file.as_deref(),
        );
        let all = list_worktrees(&ctx.home, &ctx.repo_root, &ctx.config, false)?;
        inject_agent_context(&def, wt_path, info, &all, &ctx.project())?;
        print_info(&format!("Injected agent context into {}", def.context_file));
    }

    Ok(())
}
