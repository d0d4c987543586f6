//! Durable worktree state: one versioned JSON document per project.
//!
//! Load is lazy (missing file = fresh empty state) but never lossy: a file
//! that exists and fails to parse is a hard error. Saves go through a temp
//! file in the same directory followed by a rename, so a concurrent reader
//! never sees a half-written document.
//!
//! Mutations are pure: each takes a state by reference and returns a new
//! value, leaving the input untouched. Persisting is a separate, explicit
//! step.
//!
//! Known limitation: there is no cross-invocation locking. Two canopy
//! processes racing on the same project can lose one of the two updates.
//! Acceptable for a single-user CLI; saves stay atomic regardless.

use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::home::CanopyHome;
use crate::models::{StateFile, WorktreeRecord};

/// Load a project's state. Missing file yields an empty state carrying
/// `repo_root`; a corrupt file is a hard failure.
pub fn load_state(home: &CanopyHome, project: &str, repo_root: &Path) -> Result<StateFile> {
    let path = home.state_path(project);
    if !path.exists() {
        return Ok(StateFile::new(repo_root.to_string_lossy()));
    }

    let content = std::fs::read_to_string(&path)?;
    let mut state: StateFile =
        serde_json::from_str(&content).map_err(|source| Error::CorruptState {
            path: path.clone(),
            source,
        })?;
    if state.repo_root.is_empty() {
        state.repo_root = repo_root.to_string_lossy().to_string();
    }
    Ok(state)
}

/// Persist a project's state atomically (temp file + rename in the target
/// directory), creating parent directories as needed.
pub fn save_state(home: &CanopyHome, project: &str, state: &StateFile) -> Result<()> {
    let path = home.state_path(project);
    let dir = path
        .parent()
        .expect("state path always has a parent directory");
    std::fs::create_dir_all(dir)?;

    let mut json = serde_json::to_string_pretty(state).map_err(|source| Error::CorruptState {
        path: path.clone(),
        source,
    })?;
    json.push('\n');

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(json.as_bytes())?;
    temp.persist(&path).map_err(|e| Error::Io(e.error))?;
    tracing::debug!(path = %path.display(), "state saved");
    Ok(())
}

/// Insert (or overwrite) a record under `name`. Uniqueness checks belong to
/// the caller.
pub fn add_worktree(state: &StateFile, name: &str, record: WorktreeRecord) -> StateFile {
    let mut new_state = state.clone();
    new_state.worktrees.insert(name.to_string(), record);
    new_state
}

/// Drop `name` from the state. No-op when absent.
pub fn remove_worktree(state: &StateFile, name: &str) -> StateFile {
    let mut new_state = state.clone();
    new_state.worktrees.remove(name);
    new_state
}

/// Replace only the `branch` field of `name`'s record. No-op when absent.
pub fn update_branch(state: &StateFile, name: &str, new_branch: &str) -> StateFile {
    let mut new_state = state.clone();
    if let Some(record) = new_state.worktrees.get_mut(name) {
        record.branch = new_branch.to_string();
    }
    new_state
}

/// Stamp `name` as archived at `timestamp`. No-op when absent.
pub fn archive_worktree(state: &StateFile, name: &str, timestamp: &str) -> StateFile {
    let mut new_state = state.clone();
    if let Some(record) = new_state.worktrees.get_mut(name) {
        record.archived = timestamp.to_string();
    }
    new_state
}

/// Clear `name`'s archived marker. No-op when absent.
pub fn unarchive_worktree(state: &StateFile, name: &str) -> StateFile {
    let mut new_state = state.clone();
    if let Some(record) = new_state.worktrees.get_mut(name) {
        record.archived = String::new();
    }
    new_state
}
