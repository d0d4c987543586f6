//! Git operations for canopy worktree management
//!
//! This module provides:
//! - Worktree creation/removal and porcelain list parsing
//! - Branch management and working-tree status checks
//! - Full-clone helpers for checkout mode
//! - Repo-root discovery that resolves through worktrees and clones

pub mod branch;
pub mod clone;
pub mod runner;
pub mod worktree;

pub use branch::{
    ahead_behind, branch_exists, default_branch, delete_branch, diff_numstat, fetch_branch,
    has_submodules, has_tracked_changes, init_submodules, rebase_onto, remote_url,
    status_short, status_summary,
};
pub use clone::{
    clone_checkout_existing_branch, clone_checkout_new_branch, clone_local, find_repo_root,
};
pub use runner::{run_git, run_git_bool, run_git_raw};
pub use worktree::{
    add_worktree_existing_branch, add_worktree_new_branch, list_worktrees, parse_worktree_list,
    prune_worktrees, remove_worktree, GitWorktreeEntry,
};
