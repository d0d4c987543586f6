//! Branch and working-tree status helpers.

use std::path::Path;

use crate::error::{Error, Result};
use crate::git::runner::{run_git, run_git_bool};

pub fn branch_exists(name: &str, cwd: &Path) -> bool {
    run_git_bool(
        &["rev-parse", "--verify", &format!("refs/heads/{name}")],
        Some(cwd),
    )
}

/// Detect the repository's default branch by convention.
pub fn default_branch(cwd: &Path) -> String {
    for candidate in ["main", "master", "develop"] {
        if branch_exists(candidate, cwd) {
            return candidate.to_string();
        }
    }
    "main".to_string()
}

pub fn delete_branch(name: &str, cwd: &Path) -> Result<()> {
    run_git(&["branch", "-D", name], Some(cwd))?;
    Ok(())
}

pub fn fetch_branch(branch: &str, cwd: &Path) -> Result<()> {
    run_git(&["fetch", "origin", branch], Some(cwd))?;
    Ok(())
}

/// Short status including untracked files; used for list display summaries.
pub fn status_short(cwd: &Path) -> Result<String> {
    run_git(&["status", "--short"], Some(cwd))
}

/// True when tracked files are modified or staged. Untracked files never
/// count: injected context files should not block removal.
pub fn has_tracked_changes(cwd: &Path) -> Result<bool> {
    let output = run_git(&["status", "--short", "--untracked-files=no"], Some(cwd))?;
    Ok(!output.trim().is_empty())
}

/// Status summary for display: "clean" or "N modified".
pub fn status_summary(cwd: &Path) -> Result<String> {
    let short = status_short(cwd)?;
    let count = short.lines().filter(|line| !line.trim().is_empty()).count();
    if count == 0 {
        Ok("clean".to_string())
    } else {
        Ok(format!("{count} modified"))
    }
}

fn parse_numstat(output: &str) -> (u64, u64) {
    let mut added = 0;
    let mut removed = 0;
    for line in output.lines() {
        let mut parts = line.split('\t');
        let (Some(a), Some(r)) = (parts.next(), parts.next()) else {
            continue;
        };
        if parts.next().is_none() {
            continue;
        }
        // "-" marks binary files
        if let Ok(n) = a.parse::<u64>() {
            added += n;
        }
        if let Ok(n) = r.parse::<u64>() {
            removed += n;
        }
    }
    (added, removed)
}

/// Uncommitted line counts, staged plus unstaged: (added, removed).
pub fn diff_numstat(cwd: &Path) -> Result<(u64, u64)> {
    let unstaged = run_git(&["diff", "--numstat"], Some(cwd))?;
    let staged = run_git(&["diff", "--numstat", "--cached"], Some(cwd))?;
    let (ua, ur) = parse_numstat(&unstaged);
    let (sa, sr) = parse_numstat(&staged);
    Ok((ua + sa, ur + sr))
}

/// Commits ahead/behind base: (ahead, behind). Zeroes on any git failure
/// (missing ref, offline) since this only feeds display.
pub fn ahead_behind(branch: &str, base: &str, cwd: &Path) -> (u64, u64) {
    let range = format!("{base}...{branch}");
    match run_git(&["rev-list", "--left-right", "--count", &range], Some(cwd)) {
        Ok(output) => {
            let parts: Vec<&str> = output.split_whitespace().collect();
            if parts.len() == 2 {
                let behind = parts[0].parse().unwrap_or(0);
                let ahead = parts[1].parse().unwrap_or(0);
                return (ahead, behind);
            }
            (0, 0)
        }
        Err(_) => (0, 0),
    }
}

/// Rebase the current branch of `cwd` onto `base`, fetching it first.
pub fn rebase_onto(base: &str, cwd: &Path) -> Result<()> {
    // Best effort fetch: offline rebases against the local base are fine.
    let _ = fetch_branch(base, cwd);
    run_git(&["rebase", base], Some(cwd))?;
    Ok(())
}

/// Initialize submodules in a fresh worktree.
pub fn init_submodules(cwd: &Path, recursive: bool) -> Result<()> {
    if recursive {
        run_git(
            &["submodule", "update", "--init", "--recursive"],
            Some(cwd),
        )?;
    } else {
        run_git(&["submodule", "update", "--init"], Some(cwd))?;
    }
    Ok(())
}

pub fn has_submodules(repo_root: &Path) -> bool {
    repo_root.join(".gitmodules").exists()
}

/// The configured origin URL. Errors when no remote is configured, which
/// checkout mode treats as a hard failure.
pub fn remote_url(cwd: &Path) -> Result<String> {
    let url = run_git(&["remote", "get-url", "origin"], Some(cwd))?;
    if url.is_empty() {
        return Err(Error::git(&["remote", "get-url", "origin"], "no origin remote"));
    }
    Ok(url)
}
