//! State reconciliation: make the persisted mapping agree with what git and
//! the filesystem actually report.
//!
//! Two passes over a pure value, caller persists the result:
//!
//! 1. Prune: worktree-mode records survive only if git still lists their
//!    path. Checkout-mode clones and archived records are invisible to
//!    `git worktree list`, so directory existence is their liveness signal.
//! 2. Discovery: git entries under a recognized canopy prefix (current
//!    layout or the legacy in-repo layout) with no record get adopted under
//!    the path segment following the prefix. Foreign paths, the main repo
//!    root included, are never adopted.
//!
//! The pass is idempotent: feeding its output back in with the same ground
//! truth changes nothing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::git::GitWorktreeEntry;
use crate::home::CanopyHome;
use crate::models::{StateFile, WorktreeRecord};

/// Reconcile `state` against the ground truth in `git_entries`.
///
/// `legacy_dir` is the old worktree directory name relative to the repo root
/// (e.g. ".canopy"), kept recognized for state files predating the
/// home-directory layout.
pub fn reconcile_state(
    state: &StateFile,
    git_entries: &[GitWorktreeEntry],
    home: &CanopyHome,
    project: &str,
    legacy_dir: &str,
) -> StateFile {
    let git_paths: HashSet<&Path> = git_entries.iter().map(|e| e.path.as_path()).collect();

    let mut new_state = StateFile {
        version: state.version,
        repo_root: state.repo_root.clone(),
        worktrees: Default::default(),
    };

    // Prune pass.
    for (name, record) in &state.worktrees {
        let path = record.path_buf();
        let in_git = git_paths.contains(path.as_path());
        let lives_by_directory = record.is_archived() || record.mode == crate::models::WorktreeMode::Checkout;

        let survives = if lives_by_directory {
            path.is_dir()
        } else {
            in_git
        };

        if survives {
            new_state
                .worktrees
                .insert(name.clone(), record.clone());
        } else {
            tracing::debug!(name, path = %record.path, "pruning orphaned record");
        }
    }

    // Discovery pass.
    let known_paths: HashSet<PathBuf> = new_state
        .worktrees
        .values()
        .map(|r| r.path_buf())
        .collect();

    let current_prefix = home.worktree_base(project);
    let legacy_prefix = if state.repo_root.is_empty() || legacy_dir.is_empty() {
        None
    } else {
        Some(Path::new(&state.repo_root).join(legacy_dir))
    };

    for entry in git_entries {
        if known_paths.contains(&entry.path) {
            continue;
        }

        let name = name_under_prefix(&entry.path, &current_prefix)
            .or_else(|| {
                legacy_prefix
                    .as_deref()
                    .and_then(|p| name_under_prefix(&entry.path, p))
            });

        let Some(name) = name else {
            continue; // foreign path, never adopted
        };

        if name.is_empty() || new_state.worktrees.contains_key(&name) {
            continue;
        }

        tracing::debug!(name, path = %entry.path.display(), "adopting untracked worktree");
        new_state.worktrees.insert(
            name,
            WorktreeRecord {
                branch: entry.branch.clone().unwrap_or_default(),
                path: entry.path.to_string_lossy().to_string(),
                ..Default::default()
            },
        );
    }

    new_state
}

/// The path segment immediately following `prefix`, when `path` is under it.
fn name_under_prefix(path: &Path, prefix: &Path) -> Option<String> {
    let rest = path.strip_prefix(prefix).ok()?;
    let first = rest.components().next()?;
    Some(first.as_os_str().to_string_lossy().to_string())
}
