//! Canopy home directory layout
//!
//! All durable tool state lives under one home directory:
//!
//! ```text
//! $CANOPY_HOME/
//!   projects/<project>/state.json       per-project worktree mapping
//!   projects/<project>/worktrees/<name> the worktrees/clones themselves
//!   projects/<project>/repo_root        marker pointing back at the main repo
//! ```
//!
//! The home is resolved once at the CLI edge and threaded explicitly into
//! everything that touches disk, so tests point it at a temp directory
//! without mutating process-wide environment.

use std::path::{Path, PathBuf};

use crate::error::Result;

pub const HOME_ENV_VAR: &str = "CANOPY_HOME";
const DEFAULT_HOME_DIR: &str = ".canopy";
const REPO_ROOT_MARKER: &str = "repo_root";

/// Resolved canopy home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanopyHome {
    root: PathBuf,
}

impl CanopyHome {
    /// Resolve from `CANOPY_HOME`, falling back to `~/.canopy`.
    pub fn resolve() -> Self {
        if let Ok(home) = std::env::var(HOME_ENV_VAR) {
            if !home.is_empty() {
                return CanopyHome {
                    root: PathBuf::from(home),
                };
            }
        }
        let base = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        CanopyHome {
            root: base.join(DEFAULT_HOME_DIR),
        }
    }

    /// Use an explicit root. Tests point this at a temp directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        CanopyHome { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.root.join("projects").join(project)
    }

    pub fn state_path(&self, project: &str) -> PathBuf {
        self.project_dir(project).join("state.json")
    }

    /// Directory that holds all of a project's worktrees/clones.
    pub fn worktree_base(&self, project: &str) -> PathBuf {
        self.project_dir(project).join("worktrees")
    }

    pub fn worktree_path(&self, project: &str, name: &str) -> PathBuf {
        self.worktree_base(project).join(name)
    }

    /// Write the marker file recording which repo this project belongs to.
    /// Creates the project directory if needed.
    pub fn write_repo_root_marker(&self, project: &str, repo_root: &Path) -> Result<()> {
        let dir = self.project_dir(project);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(
            dir.join(REPO_ROOT_MARKER),
            format!("{}\n", repo_root.display()),
        )?;
        Ok(())
    }

    /// Read back the repo-root marker, if present.
    pub fn read_repo_root_marker(&self, project: &str) -> Option<PathBuf> {
        let path = self.project_dir(project).join(REPO_ROOT_MARKER);
        let content = std::fs::read_to_string(path).ok()?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }
}

/// Project identifier: the configured name if set, otherwise the repo
/// directory's basename.
pub fn resolve_project_name(repo_root: &Path, configured: Option<&str>) -> String {
    if let Some(name) = configured {
        if !name.is_empty() {
            return name.to_string();
        }
    }
    repo_root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let home = CanopyHome::at("/tmp/canopy-home");
        assert_eq!(
            home.state_path("myproj"),
            PathBuf::from("/tmp/canopy-home/projects/myproj/state.json")
        );
        assert_eq!(
            home.worktree_path("myproj", "obsidian"),
            PathBuf::from("/tmp/canopy-home/projects/myproj/worktrees/obsidian")
        );
    }

    #[test]
    fn repo_root_marker_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let home = CanopyHome::at(temp.path());
        home.write_repo_root_marker("p", Path::new("/repo/main"))
            .unwrap();
        assert_eq!(
            home.read_repo_root_marker("p"),
            Some(PathBuf::from("/repo/main"))
        );
        assert_eq!(home.read_repo_root_marker("missing"), None);
    }

    #[test]
    fn project_name_falls_back_to_basename() {
        assert_eq!(
            resolve_project_name(Path::new("/code/widget"), None),
            "widget"
        );
        assert_eq!(
            resolve_project_name(Path::new("/code/widget"), Some("custom")),
            "custom"
        );
        assert_eq!(
            resolve_project_name(Path::new("/code/widget"), Some("")),
            "widget"
        );
    }
}
