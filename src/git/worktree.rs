//! Linked-worktree plumbing: `git worktree` add/remove/prune and porcelain
//! list parsing. This is the ground truth the reconciler runs against.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::git::runner::run_git;

/// One entry from `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitWorktreeEntry {
    pub path: PathBuf,
    pub head: String,
    /// None for bare or detached entries.
    pub branch: Option<String>,
    pub bare: bool,
    pub detached: bool,
}

/// List every worktree the repository knows about, main root included.
pub fn list_worktrees(repo_root: &Path) -> Result<Vec<GitWorktreeEntry>> {
    let output = run_git(&["worktree", "list", "--porcelain"], Some(repo_root))?;
    Ok(parse_worktree_list(&output))
}

/// Parse porcelain output. Entries are blank-line separated blocks of
/// `worktree <path>` / `HEAD <sha>` / `branch refs/heads/<name>` lines.
pub fn parse_worktree_list(output: &str) -> Vec<GitWorktreeEntry> {
    let mut entries = Vec::new();
    let mut current: Option<GitWorktreeEntry> = None;

    for line in output.lines() {
        if line.trim().is_empty() {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            continue;
        }

        if let Some(path) = line.strip_prefix("worktree ") {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            current = Some(GitWorktreeEntry {
                path: PathBuf::from(path),
                head: String::new(),
                branch: None,
                bare: false,
                detached: false,
            });
        } else if let Some(entry) = current.as_mut() {
            if let Some(head) = line.strip_prefix("HEAD ") {
                entry.head = head.to_string();
            } else if let Some(branch) = line.strip_prefix("branch ") {
                let name = branch.strip_prefix("refs/heads/").unwrap_or(branch);
                entry.branch = Some(name.to_string());
            } else if line == "bare" {
                entry.bare = true;
            } else if line == "detached" {
                entry.detached = true;
            }
        }
    }

    if let Some(entry) = current {
        entries.push(entry);
    }

    entries
}

/// `git worktree add -b <branch> <path> <base>`: new branch from base.
pub fn add_worktree_new_branch(
    repo_root: &Path,
    path: &Path,
    branch: &str,
    base: &str,
) -> Result<()> {
    let path_str = path.to_string_lossy();
    run_git(
        &["worktree", "add", "-b", branch, &path_str, base],
        Some(repo_root),
    )?;
    Ok(())
}

/// `git worktree add <path> <branch>`: attach to an existing branch.
pub fn add_worktree_existing_branch(repo_root: &Path, path: &Path, branch: &str) -> Result<()> {
    let path_str = path.to_string_lossy();
    run_git(&["worktree", "add", &path_str, branch], Some(repo_root))?;
    Ok(())
}

/// Remove a worktree. Always forced: git refuses to remove a worktree with
/// even untracked files present, and canopy injects untracked context files
/// into every worktree it creates.
pub fn remove_worktree(repo_root: &Path, path: &Path) -> Result<()> {
    let path_str = path.to_string_lossy();
    run_git(
        &["worktree", "remove", "--force", &path_str],
        Some(repo_root),
    )?;
    Ok(())
}

/// Drop stale worktree bookkeeping.
pub fn prune_worktrees(repo_root: &Path) -> Result<()> {
    run_git(&["worktree", "prune"], Some(repo_root))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_porcelain_output() {
        let output = "\
worktree /home/user/repo
HEAD abc123def456
branch refs/heads/main

worktree /home/user/.canopy/projects/repo/worktrees/opal
HEAD def789abc012
branch refs/heads/nik/feature/opal
";
        let entries = parse_worktree_list(output);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].branch.as_deref(), Some("main"));
        assert_eq!(entries[1].branch.as_deref(), Some("nik/feature/opal"));
        assert_eq!(
            entries[1].path,
            PathBuf::from("/home/user/.canopy/projects/repo/worktrees/opal")
        );
    }

    #[test]
    fn parses_bare_and_detached_flags() {
        let output = "\
worktree /srv/repo.git
bare

worktree /srv/scratch
HEAD abc123
detached
";
        let entries = parse_worktree_list(output);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].bare);
        assert!(entries[0].branch.is_none());
        assert!(entries[1].detached);
        assert!(entries[1].branch.is_none());
    }

    #[test]
    fn parses_output_without_trailing_blank_line() {
        let output = "worktree /repo\nHEAD abc\nbranch refs/heads/main";
        let entries = parse_worktree_list(output);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].branch.as_deref(), Some("main"));
    }
}
