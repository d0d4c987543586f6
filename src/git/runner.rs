//! Git command runner
//!
//! Centralizes `Command::new("git")` invocation so every call site gets the
//! same error handling: spawn failures become [`Error::GitMissing`], non-zero
//! exits become [`Error::Git`] with stderr preserved verbatim.

use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Run a git command and return the raw Output. Only spawn failures error
/// here; callers inspect the exit status themselves.
pub fn run_git_raw(args: &[&str], cwd: Option<&Path>) -> Result<Output> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::GitMissing
        } else {
            Error::Io(e)
        }
    })
}

/// Run a git command, check for success, and return stdout trimmed.
pub fn run_git(args: &[&str], cwd: Option<&Path>) -> Result<String> {
    tracing::debug!(command = %args.join(" "), "running git");
    let output = run_git_raw(args, cwd)?;
    if !output.status.success() {
        return Err(Error::git(args, String::from_utf8_lossy(&output.stderr)));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run a git command and return true if the exit code is 0. Swallows both
/// spawn failures and non-zero exits; use for existence checks only.
pub fn run_git_bool(args: &[&str], cwd: Option<&Path>) -> bool {
    run_git_raw(args, cwd)
        .map(|output| output.status.success())
        .unwrap_or(false)
}
