//! Core data model: worktree records, the state document, and the string
//! enums persisted inside them.
//!
//! Records are loosely typed on disk for backward compatibility: every field
//! beyond the map key has a serde default, and unknown keys survive a
//! load/save round trip through the flattened `extra` map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Naming scheme used when auto-generating worktree names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NamingScheme {
    #[default]
    Minerals,
    Cities,
    /// adjective-mineral pairs, e.g. "swift-obsidian"
    Compound,
}

impl fmt::Display for NamingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NamingScheme::Minerals => "minerals",
            NamingScheme::Cities => "cities",
            NamingScheme::Compound => "compound",
        };
        f.write_str(s)
    }
}

/// How a workspace is materialized on disk.
///
/// `Worktree` is a linked git worktree sharing object storage with the main
/// repository; `Checkout` is a fully independent clone. Unrecognized values
/// in a state document fail deserialization rather than defaulting silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorktreeMode {
    #[default]
    Worktree,
    Checkout,
}

impl fmt::Display for WorktreeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorktreeMode::Worktree => f.write_str("worktree"),
            WorktreeMode::Checkout => f.write_str("checkout"),
        }
    }
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// One persisted worktree entry. The worktree name is the key in
/// [`StateFile::worktrees`], not a field here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorktreeRecord {
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub base_branch: String,
    /// Free-form category label ("feature", "fix", ...). Empty for
    /// checkout-derived worktrees.
    #[serde(default, rename = "type")]
    pub branch_type: String,
    /// Absolute path of the worktree/clone. Disjoint across all records.
    #[serde(default)]
    pub path: String,
    /// RFC 3339, set once at creation.
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub mode: WorktreeMode,
    /// Associated pull request number; 0 means none.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub pr: u64,
    /// Empty = active; RFC 3339 timestamp = archived at that moment.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub archived: String,
    /// Keys written by other (newer/older) versions of the tool. Preserved
    /// verbatim so round-tripping never corrupts a document.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl WorktreeRecord {
    pub fn is_archived(&self) -> bool {
        !self.archived.is_empty()
    }

    pub fn path_buf(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

pub const STATE_VERSION: u32 = 1;

fn default_version() -> u32 {
    STATE_VERSION
}

/// The per-project state document. One per project under
/// `$CANOPY_HOME/projects/<project>/state.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Main repository this state belongs to. Informational.
    #[serde(default)]
    pub repo_root: String,
    #[serde(default)]
    pub worktrees: BTreeMap<String, WorktreeRecord>,
}

impl StateFile {
    pub fn new(repo_root: impl Into<String>) -> Self {
        StateFile {
            version: STATE_VERSION,
            repo_root: repo_root.into(),
            worktrees: BTreeMap::new(),
        }
    }
}

impl Default for StateFile {
    fn default() -> Self {
        StateFile::new("")
    }
}

/// A worktree as surfaced by list/get: the record plus its name and a
/// computed status summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorktreeInfo {
    pub name: String,
    pub branch: String,
    pub base_branch: String,
    #[serde(rename = "type")]
    pub branch_type: String,
    pub path: String,
    pub created_at: String,
    pub mode: WorktreeMode,
    pub pr: u64,
    pub archived: String,
    /// "clean", "N modified", "archived", or empty when unknown.
    pub status: String,
}

impl WorktreeInfo {
    pub fn from_record(name: &str, record: &WorktreeRecord, status: impl Into<String>) -> Self {
        WorktreeInfo {
            name: name.to_string(),
            branch: record.branch.clone(),
            base_branch: record.base_branch.clone(),
            branch_type: record.branch_type.clone(),
            path: record.path.clone(),
            created_at: record.created_at.clone(),
            mode: record.mode,
            pr: record.pr,
            archived: record.archived.clone(),
            status: status.into(),
        }
    }

    pub fn is_archived(&self) -> bool {
        !self.archived.is_empty()
    }
}
