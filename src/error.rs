//! Error taxonomy for canopy operations
//!
//! Every failure mode a caller might branch on gets its own variant, so the
//! CLI can map kinds to exit behavior instead of string-matching messages.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Target worktree name/path collides with an existing one.
    #[error("worktree '{name}' already exists at {}", path.display())]
    AlreadyExists { name: String, path: PathBuf },

    #[error("branch '{0}' already exists")]
    BranchAlreadyExists(String),

    #[error("branch '{0}' not found locally or on remote")]
    BranchNotFound(String),

    #[error("worktree '{0}' not found")]
    NotFound(String),

    /// Removal blocked by uncommitted tracked changes; retry with force.
    #[error("worktree '{0}' has uncommitted changes (use --force to override)")]
    DirtyWorktree(String),

    #[error("worktree '{0}' is already archived")]
    AlreadyArchived(String),

    #[error("worktree '{0}' is not archived")]
    NotArchived(String),

    #[error("could not generate a unique worktree name; remove old worktrees")]
    NameSpaceExhausted,

    /// Opaque failure from the git binary, stderr preserved verbatim.
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("git not found on PATH")]
    GitMissing,

    /// State document exists but cannot be parsed. Never treated as empty
    /// state: losing the worktree mapping is worse than failing the command.
    #[error("state file {} is corrupt: {source}", path.display())]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a Git error from a failed invocation.
    pub fn git(args: &[&str], stderr: impl AsRef<str>) -> Self {
        Error::Git {
            command: args.join(" "),
            stderr: stderr.as_ref().trim().to_string(),
        }
    }
}
