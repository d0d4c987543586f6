//! Worktree lifecycle orchestration
//!
//! The only module that mutates on-disk worktrees. Combines the name
//! generator, state store, reconciler, and git plumbing, and enforces the
//! cross-cutting invariants: no duplicate names or paths, no fabricated
//! branches, no silent dirty removal, archived state transitions checked.

use chrono::Utc;
use rand::Rng;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::CanopyConfig;
use crate::error::{Error, Result};
use crate::git;
use crate::home::{resolve_project_name, CanopyHome};
use crate::models::{WorktreeInfo, WorktreeMode, WorktreeRecord};
use crate::names::generate_name;
use crate::reconcile::reconcile_state;
use crate::state::{
    add_worktree, archive_worktree as archive_in_state, load_state, remove_worktree as remove_from_state,
    save_state, unarchive_worktree as unarchive_in_state,
};

fn project_name(config: &CanopyConfig, repo_root: &Path) -> String {
    resolve_project_name(repo_root, config.project_name.as_deref())
}

/// Computed location for a (possibly not yet existing) worktree.
pub fn worktree_path(
    home: &CanopyHome,
    config: &CanopyConfig,
    repo_root: &Path,
    name: &str,
) -> PathBuf {
    home.worktree_path(&project_name(config, repo_root), name)
}

/// Expand the branch template with user/type/name.
pub fn resolve_branch_name(config: &CanopyConfig, name: &str, branch_type: Option<&str>) -> String {
    let branch_type = branch_type.unwrap_or(&config.default_type);
    config
        .branch_template
        .replace("{user}", &config.user)
        .replace("{type}", branch_type)
        .replace("{name}", name)
}

fn pick_name<R: Rng + ?Sized>(
    home: &CanopyHome,
    config: &CanopyConfig,
    repo_root: &Path,
    project: &str,
    rng: &mut R,
) -> Result<String> {
    // Archived names count too: their directories may still exist.
    let state = load_state(home, project, repo_root)?;
    let existing: HashSet<String> = state.worktrees.keys().cloned().collect();
    generate_name(config.naming_scheme, &existing, rng)
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Create a new worktree (or clone, per configured mode) on a new branch.
pub fn create_worktree<R: Rng + ?Sized>(
    home: &CanopyHome,
    repo_root: &Path,
    config: &CanopyConfig,
    name: Option<&str>,
    branch: Option<&str>,
    base: Option<&str>,
    branch_type: Option<&str>,
    rng: &mut R,
) -> Result<WorktreeInfo> {
    let project = project_name(config, repo_root);

    let name = match name {
        Some(n) => n.to_string(),
        None => pick_name(home, config, repo_root, &project, rng)?,
    };

    let wt_path = home.worktree_path(&project, &name);
    if wt_path.exists() {
        return Err(Error::AlreadyExists {
            name,
            path: wt_path,
        });
    }

    let branch_type = branch_type.unwrap_or(&config.default_type).to_string();
    let branch = match branch {
        Some(b) => b.to_string(),
        None => resolve_branch_name(config, &name, Some(&branch_type)),
    };
    let base_branch = base.unwrap_or(&config.base_branch).to_string();

    if git::branch_exists(&branch, repo_root) {
        return Err(Error::BranchAlreadyExists(branch));
    }

    home.write_repo_root_marker(&project, repo_root)?;

    match config.mode {
        WorktreeMode::Worktree => {
            git::add_worktree_new_branch(repo_root, &wt_path, &branch, &base_branch)?;
        }
        WorktreeMode::Checkout => {
            let remote = git::remote_url(repo_root)?;
            git::clone_local(repo_root, &wt_path, &remote)?;
            git::clone_checkout_new_branch(&branch, &base_branch, &wt_path)?;
        }
    }

    let record = WorktreeRecord {
        branch,
        base_branch,
        branch_type,
        path: wt_path.to_string_lossy().to_string(),
        created_at: now_rfc3339(),
        mode: config.mode,
        ..Default::default()
    };

    let state = load_state(home, &project, repo_root)?;
    let state = add_worktree(&state, &name, record.clone());
    save_state(home, &project, &state)?;

    tracing::debug!(name, branch = %record.branch, "worktree created");
    Ok(WorktreeInfo::from_record(&name, &record, ""))
}

/// Attach a new worktree to an existing branch (fetched first; local branch
/// accepted as fallback when the remote is unreachable).
pub fn checkout_worktree<R: Rng + ?Sized>(
    home: &CanopyHome,
    repo_root: &Path,
    config: &CanopyConfig,
    branch: &str,
    name: Option<&str>,
    base: Option<&str>,
    pr: u64,
    rng: &mut R,
) -> Result<WorktreeInfo> {
    let project = project_name(config, repo_root);

    // Generator-assigned names even here, so checkout worktrees follow the
    // same naming scheme as created ones.
    let name = match name {
        Some(n) => n.to_string(),
        None => pick_name(home, config, repo_root, &project, rng)?,
    };

    let wt_path = home.worktree_path(&project, &name);
    if wt_path.exists() {
        return Err(Error::AlreadyExists {
            name,
            path: wt_path,
        });
    }

    if git::fetch_branch(branch, repo_root).is_err() && !git::branch_exists(branch, repo_root) {
        return Err(Error::BranchNotFound(branch.to_string()));
    }

    home.write_repo_root_marker(&project, repo_root)?;

    match config.mode {
        WorktreeMode::Worktree => {
            git::add_worktree_existing_branch(repo_root, &wt_path, branch)?;
        }
        WorktreeMode::Checkout => {
            let remote = git::remote_url(repo_root)?;
            git::clone_local(repo_root, &wt_path, &remote)?;
            git::clone_checkout_existing_branch(branch, &wt_path)?;
        }
    }

    let record = WorktreeRecord {
        branch: branch.to_string(),
        base_branch: base.unwrap_or(&config.base_branch).to_string(),
        branch_type: String::new(),
        path: wt_path.to_string_lossy().to_string(),
        created_at: now_rfc3339(),
        mode: config.mode,
        pr,
        ..Default::default()
    };

    let state = load_state(home, &project, repo_root)?;
    let state = add_worktree(&state, &name, record.clone());
    save_state(home, &project, &state)?;

    Ok(WorktreeInfo::from_record(&name, &record, ""))
}

/// Remove a worktree: directory, git bookkeeping, branch (unless kept),
/// state record.
pub fn remove_worktree(
    home: &CanopyHome,
    repo_root: &Path,
    config: &CanopyConfig,
    name: &str,
    force: bool,
    keep_branch: bool,
) -> Result<()> {
    let project = project_name(config, repo_root);
    let state = load_state(home, &project, repo_root)?;

    // The record's stored path wins over the computed one so legacy-layout
    // and adopted records remove cleanly.
    let record = state.worktrees.get(name);
    let wt_path = record
        .map(|r| r.path_buf())
        .unwrap_or_else(|| home.worktree_path(&project, name));

    if !wt_path.exists() {
        return Err(Error::NotFound(name.to_string()));
    }

    if !force && git::has_tracked_changes(&wt_path)? {
        return Err(Error::DirtyWorktree(name.to_string()));
    }

    let branch = record.map(|r| r.branch.clone()).unwrap_or_default();
    let mode = record.map(|r| r.mode).unwrap_or_default();

    match mode {
        WorktreeMode::Worktree => {
            // Force always: git rejects removal over untracked files, and
            // injected context files are expected untracked content.
            git::remove_worktree(repo_root, &wt_path)?;
            git::prune_worktrees(repo_root)?;
            if !branch.is_empty() && !keep_branch {
                // A branch checked out elsewhere cannot be deleted; that is
                // not fatal to the removal.
                if let Err(e) = git::delete_branch(&branch, repo_root) {
                    tracing::warn!(branch, error = %e, "could not delete branch");
                }
            }
        }
        WorktreeMode::Checkout => {
            // Clones are invisible to the main repo's worktree bookkeeping;
            // their branches live inside the clone being deleted.
            std::fs::remove_dir_all(&wt_path)?;
        }
    }

    let state = remove_from_state(&state, name);
    save_state(home, &project, &state)?;
    tracing::debug!(name, "worktree removed");
    Ok(())
}

/// List managed worktrees, reconciling state against git first. The healed
/// state is persisted before the filtered view is built, so callers never
/// see a list reflecting stale reconciliation.
pub fn list_worktrees(
    home: &CanopyHome,
    repo_root: &Path,
    config: &CanopyConfig,
    include_archived: bool,
) -> Result<Vec<WorktreeInfo>> {
    let project = project_name(config, repo_root);
    let state = load_state(home, &project, repo_root)?;
    let git_entries = git::list_worktrees(repo_root)?;

    let state = reconcile_state(&state, &git_entries, home, &project, &config.worktree_dir);
    save_state(home, &project, &state)?;

    let mut worktrees = Vec::new();
    // BTreeMap iteration order = ascending by name.
    for (name, record) in &state.worktrees {
        if record.is_archived() && !include_archived {
            continue;
        }

        let status = if record.is_archived() {
            "archived".to_string()
        } else {
            let path = record.path_buf();
            if path.exists() {
                git::status_summary(&path)?
            } else {
                String::new()
            }
        };

        worktrees.push(WorktreeInfo::from_record(name, record, status));
    }

    Ok(worktrees)
}

/// Lookup by name. `Ok(None)` is the not-found signal; errors are reserved
/// for real failures.
pub fn get_worktree(
    home: &CanopyHome,
    repo_root: &Path,
    config: &CanopyConfig,
    name: &str,
) -> Result<Option<WorktreeInfo>> {
    let worktrees = list_worktrees(home, repo_root, config, true)?;
    Ok(worktrees.into_iter().find(|wt| wt.name == name))
}

/// Soft-remove: stamp the record, leave the directory untouched.
pub fn archive_worktree(
    home: &CanopyHome,
    repo_root: &Path,
    config: &CanopyConfig,
    name: &str,
) -> Result<WorktreeInfo> {
    let project = project_name(config, repo_root);
    let mut info = get_worktree(home, repo_root, config, name)?
        .ok_or_else(|| Error::NotFound(name.to_string()))?;
    if info.is_archived() {
        return Err(Error::AlreadyArchived(name.to_string()));
    }

    let timestamp = now_rfc3339();
    let state = load_state(home, &project, repo_root)?;
    let state = archive_in_state(&state, name, &timestamp);
    save_state(home, &project, &state)?;

    info.archived = timestamp;
    info.status = "archived".to_string();
    Ok(info)
}

/// Reverse of archive. Fails on active records.
pub fn unarchive_worktree(
    home: &CanopyHome,
    repo_root: &Path,
    config: &CanopyConfig,
    name: &str,
) -> Result<WorktreeInfo> {
    let project = project_name(config, repo_root);
    let mut info = get_worktree(home, repo_root, config, name)?
        .ok_or_else(|| Error::NotFound(name.to_string()))?;
    if !info.is_archived() {
        return Err(Error::NotArchived(name.to_string()));
    }

    let state = load_state(home, &project, repo_root)?;
    let state = unarchive_in_state(&state, name);
    save_state(home, &project, &state)?;

    info.archived = String::new();
    info.status = String::new();
    Ok(info)
}

/// Rebase a worktree onto the latest base branch.
pub fn sync_worktree(
    home: &CanopyHome,
    repo_root: &Path,
    config: &CanopyConfig,
    name: &str,
) -> Result<WorktreeInfo> {
    let info = get_worktree(home, repo_root, config, name)?
        .ok_or_else(|| Error::NotFound(name.to_string()))?;

    let base = if info.base_branch.is_empty() {
        config.base_branch.clone()
    } else {
        info.base_branch.clone()
    };
    git::rebase_onto(&base, Path::new(&info.path))?;
    Ok(info)
}
