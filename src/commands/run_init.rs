//! `canopy run-init`: run dependency-install detection in a worktree on
//! demand, e.g. after creating one with --no-init.

use anyhow::{bail, Result};
use std::path::Path;

use crate::commands::CommandContext;
use crate::display::{print_info, print_warning};
use crate::init_deps::detect_and_install;
use crate::worktree::get_worktree;

pub fn execute(name: Option<String>) -> Result<()> {
    let ctx = CommandContext::load()?;

    let target = match name {
        Some(name) => {
            let Some(info) = get_worktree(&ctx.home, &ctx.repo_root, &ctx.config, &name)?
            else {
                bail!("no worktree named '{name}'");
            };
            Path::new(&info.path).to_path_buf()
        }
        None => std::env::current_dir()?,
    };

    let results = detect_and_install(&target, &ctx.config.init);
    if results.is_empty() {
        print_info("Nothing to install");
        return Ok(());
    }
    for (step, ok) in results {
        if ok {
            print_info(&step);
        } else {
            print_warning(&format!("Install step failed: {step}"));
        }
    }
    Ok(())
}
