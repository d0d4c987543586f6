//! `canopy checkout`: attach a worktree to an existing branch, e.g. to
//! review a PR locally.

use anyhow::Result;

use crate::commands::{new::provision, CommandContext};
use crate::display::print_success;
use crate::worktree::checkout_worktree;

pub fn execute(
    branch: String,
    name: Option<String>,
    base: Option<String>,
    pr: Option<u64>,
    no_init: bool,
) -> Result<()> {
    let ctx = CommandContext::load()?;
    let mut rng = rand::rng();

    let info = checkout_worktree(
        &ctx.home,
        &ctx.repo_root,
        &ctx.config,
        &branch,
        name.as_deref(),
        base.as_deref(),
        pr.unwrap_or(0),
        &mut rng,
    )?;

    print_success(&format!(
        "Checked out branch {} into worktree {}",
        info.branch, info.name
    ));

    provision(&ctx, &info, no_init)?;

    println!("{}", info.path);
    Ok(())
}
