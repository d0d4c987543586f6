//! Env-file propagation
//!
//! Worktrees start from a clean checkout, so local-only files like `.env`
//! never arrive on their own. Discovery walks the repo to a bounded depth,
//! matching filenames against include/exclude patterns (`!` prefix
//! excludes).

use glob::Pattern;
use std::path::{Path, PathBuf};

use crate::config::EnvConfig;
use crate::error::Result;

/// Directories never worth scanning for env files.
const SKIP_DIRS: &[&str] = &[
    ".canopy",
    "node_modules",
    ".git",
    "__pycache__",
    ".venv",
    "dist",
    "target",
    "vendor",
    ".bundle",
];

fn split_patterns(config: &EnvConfig) -> (Vec<Pattern>, Vec<Pattern>) {
    let mut include = Vec::new();
    let mut exclude = Vec::new();
    for raw in &config.patterns {
        let (list, pat) = match raw.strip_prefix('!') {
            Some(rest) => (&mut exclude, rest),
            None => (&mut include, raw.as_str()),
        };
        if let Ok(pattern) = Pattern::new(pat) {
            list.push(pattern);
        } else {
            tracing::warn!(pattern = raw, "invalid env pattern, ignoring");
        }
    }
    (include, exclude)
}

fn matches_any(name: &str, patterns: &[Pattern]) -> bool {
    patterns.iter().any(|p| p.matches(name))
}

fn walk(
    repo_root: &Path,
    dir: &Path,
    depth: usize,
    config: &EnvConfig,
    include: &[Pattern],
    exclude: &[Pattern],
    found: &mut Vec<PathBuf>,
) {
    if depth > config.scan_depth {
        return;
    }

    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        if path.is_dir() {
            if SKIP_DIRS.contains(&name.as_str()) {
                continue;
            }
            // scan_dirs restricts which top-level directories are entered
            if depth == 0 {
                if let Some(allowed) = &config.scan_dirs {
                    if !allowed.iter().any(|d| d == &name) {
                        continue;
                    }
                }
            }
            walk(repo_root, &path, depth + 1, config, include, exclude, found);
        } else if matches_any(&name, include) && !matches_any(&name, exclude) {
            if let Ok(rel) = path.strip_prefix(repo_root) {
                found.push(rel.to_path_buf());
            }
        }
    }
}

/// Find env files to copy, as paths relative to the repo root, sorted.
pub fn discover_env_files(repo_root: &Path, config: &EnvConfig) -> Vec<PathBuf> {
    let (include, exclude) = split_patterns(config);
    let mut found = Vec::new();
    walk(repo_root, repo_root, 0, config, &include, &exclude, &mut found);
    found.sort();
    found
}

/// Copy the given relative paths from the repo into the worktree. Returns
/// the number of files copied.
pub fn copy_env_files(
    repo_root: &Path,
    worktree_path: &Path,
    env_files: &[PathBuf],
) -> Result<usize> {
    let mut copied = 0;
    for rel in env_files {
        let src = repo_root.join(rel);
        if !src.exists() {
            continue;
        }
        let dst = worktree_path.join(rel);
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&src, &dst)?;
        copied += 1;
    }
    Ok(copied)
}

/// Per-file comparison between repo and worktree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvFileStatus {
    Missing,
    Different,
    Same,
}

impl std::fmt::Display for EnvFileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvFileStatus::Missing => f.write_str("missing"),
            EnvFileStatus::Different => f.write_str("different"),
            EnvFileStatus::Same => f.write_str("same"),
        }
    }
}

/// Compare env files between the repo and a worktree.
pub fn diff_env_files(
    repo_root: &Path,
    worktree_path: &Path,
    env_files: &[PathBuf],
) -> Result<Vec<(PathBuf, EnvFileStatus)>> {
    let mut result = Vec::new();
    for rel in env_files {
        let src = repo_root.join(rel);
        let dst = worktree_path.join(rel);
        let status = if !dst.exists() {
            EnvFileStatus::Missing
        } else if std::fs::read(&src)? != std::fs::read(&dst)? {
            EnvFileStatus::Different
        } else {
            EnvFileStatus::Same
        };
        result.push((rel.clone(), status));
    }
    Ok(result)
}
