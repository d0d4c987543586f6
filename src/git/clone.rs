//! Checkout-mode plumbing: full local clones used in place of linked
//! worktrees, plus repo-root discovery that sees through both layouts.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::git::runner::run_git;

/// Clone the main repository locally (fast, shares nothing afterwards), then
/// point origin at the real remote so pushes land in the right place.
pub fn clone_local(repo_root: &Path, target: &Path, remote_url: &str) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let src = repo_root.to_string_lossy();
    let dst = target.to_string_lossy();
    run_git(&["clone", &src, &dst], None)?;
    run_git(&["remote", "set-url", "origin", remote_url], Some(target))?;
    Ok(())
}

/// Create and switch to a new branch inside a clone.
pub fn clone_checkout_new_branch(branch: &str, base: &str, target: &Path) -> Result<()> {
    run_git(&["checkout", "-b", branch, base], Some(target))?;
    Ok(())
}

/// Switch a clone to an existing branch. Git resolves `origin/<branch>` into
/// a tracking branch automatically when it is not yet local.
pub fn clone_checkout_existing_branch(branch: &str, target: &Path) -> Result<()> {
    run_git(&["checkout", branch], Some(target))?;
    Ok(())
}

/// Find the main repository root from anywhere inside it, a linked worktree,
/// or a canopy-managed clone.
///
/// Linked worktrees have a `.git` file containing
/// `gitdir: /main/.git/worktrees/<name>`; walking three levels up from that
/// gitdir lands on the main repo. Clones are their own root.
pub fn find_repo_root(cwd: &Path) -> Result<PathBuf> {
    let toplevel = PathBuf::from(run_git(&["rev-parse", "--show-toplevel"], Some(cwd))?);

    let git_path = toplevel.join(".git");
    if git_path.is_file() {
        let content = std::fs::read_to_string(&git_path)?;
        if let Some(gitdir) = content.trim().strip_prefix("gitdir: ") {
            let main_git_dir = PathBuf::from(gitdir);
            if let Some(root) = main_git_dir
                .parent() // .git/worktrees
                .and_then(Path::parent) // .git
                .and_then(Path::parent) // repo root
            {
                return Ok(root.to_path_buf());
            }
        }
    }

    Ok(toplevel)
}
