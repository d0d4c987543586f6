//! Dependency-install detection for fresh worktrees
//!
//! A new worktree has no node_modules/.venv/target. Detection maps the
//! lockfiles present to an installer command, preferring lockfiles over bare
//! project files, then runs installs in phases: repo root, nested projects
//! from other ecosystems, custom init command, post-init commands.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::InitConfig;

/// Detection priority order. Lockfiles before project files, grouped by
/// ecosystem.
const LOCKFILE_MAP: &[(&str, &[&str])] = &[
    ("bun.lock", &["bun", "install"]),
    ("bun.lockb", &["bun", "install"]),
    ("package-lock.json", &["npm", "install"]),
    ("yarn.lock", &["yarn", "install"]),
    ("pnpm-lock.yaml", &["pnpm", "install"]),
    ("package.json", &["bun", "install"]),
    ("uv.lock", &["uv", "sync"]),
    ("pyproject.toml", &["uv", "sync"]),
    ("requirements.txt", &["uv", "pip", "install", "-r", "requirements.txt"]),
    ("Cargo.lock", &["cargo", "fetch"]),
    ("Cargo.toml", &["cargo", "fetch"]),
    ("go.sum", &["go", "mod", "download"]),
    ("go.mod", &["go", "mod", "download"]),
    ("composer.lock", &["composer", "install"]),
    ("composer.json", &["composer", "install"]),
    ("Gemfile.lock", &["bundle", "install"]),
    ("Gemfile", &["bundle", "install"]),
];

const ECOSYSTEMS: &[(&str, &str)] = &[
    ("bun", "js"),
    ("npm", "js"),
    ("yarn", "js"),
    ("pnpm", "js"),
    ("uv", "python"),
    ("pip", "python"),
    ("cargo", "rust"),
    ("go", "go"),
    ("composer", "php"),
    ("bundle", "ruby"),
];

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

/// The installer command for a project directory, or None when nothing
/// recognizable is present.
pub fn detect_installer(project_dir: &Path) -> Option<Vec<String>> {
    for (filename, cmd) in LOCKFILE_MAP {
        if project_dir.join(filename).exists() {
            return Some(cmd.iter().map(|s| s.to_string()).collect());
        }
    }
    None
}

fn ecosystem(cmd: &[String]) -> Option<&'static str> {
    let tool = cmd.first()?;
    ECOSYSTEMS
        .iter()
        .find(|(name, _)| name == tool)
        .map(|(_, eco)| *eco)
}

/// Whether two installer commands belong to different ecosystems. Unknown
/// tools are treated as different, erring on the side of running both.
pub fn is_different_ecosystem(a: Option<&[String]>, b: Option<&[String]>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return true;
    };
    match (ecosystem(a), ecosystem(b)) {
        (Some(ea), Some(eb)) => ea != eb,
        _ => true,
    }
}

/// Find nested directories with their own package-manager files.
pub fn find_project_dirs(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut results = Vec::new();
    walk(root, 1, max_depth, &mut results);
    results
}

fn walk(dir: &Path, depth: usize, max_depth: usize, results: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_dir()
                && p.file_name()
                    .map(|n| !SKIP_DIRS.contains(&n.to_string_lossy().as_ref()))
                    .unwrap_or(false)
        })
        .collect();
    dirs.sort();
    for sub in dirs {
        if detect_installer(&sub).is_some() {
            results.push(sub.clone());
        }
        walk(&sub, depth + 1, max_depth, results);
    }
}

fn has_make_target(project_dir: &Path, target: &str) -> bool {
    let Ok(content) = std::fs::read_to_string(project_dir.join("Makefile")) else {
        return false;
    };
    content.contains(&format!("{target}:"))
}

fn has_json_script(json_file: &Path, script: &str) -> bool {
    let Ok(content) = std::fs::read_to_string(json_file) else {
        return false;
    };
    let Ok(data) = serde_json::from_str::<serde_json::Value>(&content) else {
        return false;
    };
    data.get("scripts")
        .and_then(|s| s.get(script))
        .is_some()
}

fn package_script(project_dir: &Path, script: &str) -> Option<String> {
    if !has_json_script(&project_dir.join("package.json"), script) {
        return None;
    }
    let has_bun =
        project_dir.join("bun.lock").exists() || project_dir.join("bun.lockb").exists();
    let runner = if has_bun { "bun run" } else { "npm run" };
    Some(format!("{runner} {script}"))
}

fn composer_script(project_dir: &Path, script: &str) -> Option<String> {
    if !has_json_script(&project_dir.join("composer.json"), script) {
        return None;
    }
    Some(format!("composer run-script {script}"))
}

/// Detect a pre-land check command: `make check` and package "check"
/// scripts outrank test fallbacks.
pub fn detect_pre_land(project_dir: &Path) -> Option<String> {
    if has_make_target(project_dir, "check") {
        return Some("make check".to_string());
    }
    if let Some(cmd) = package_script(project_dir, "check") {
        return Some(cmd);
    }
    if let Some(cmd) = composer_script(project_dir, "check") {
        return Some(cmd);
    }
    if has_make_target(project_dir, "test") {
        return Some("make test".to_string());
    }
    if let Some(cmd) = package_script(project_dir, "test") {
        return Some(cmd);
    }
    if let Some(cmd) = composer_script(project_dir, "test") {
        return Some(cmd);
    }
    if project_dir.join("Cargo.toml").exists() {
        return Some("cargo test".to_string());
    }
    if project_dir.join("go.mod").exists() {
        return Some("go test ./...".to_string());
    }
    None
}

/// One executed install step: (description, succeeded).
pub type StepResult = (String, bool);

fn run_argv(cmd: &[String], cwd: &Path) -> StepResult {
    let desc = cmd.join(" ");
    let ok = Command::new(&cmd[0])
        .args(&cmd[1..])
        .current_dir(cwd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    (desc, ok)
}

fn run_shell(cmd: &str, cwd: &Path) -> StepResult {
    let ok = Command::new("sh")
        .args(["-c", cmd])
        .current_dir(cwd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    (cmd.to_string(), ok)
}

/// Full install sequence for a fresh worktree.
pub fn detect_and_install(worktree_path: &Path, config: &InitConfig) -> Vec<StepResult> {
    let mut results = Vec::new();

    let root_installer = detect_installer(worktree_path);
    if let Some(cmd) = &root_installer {
        results.push(run_argv(cmd, worktree_path));
    }

    for subdir in find_project_dirs(worktree_path, 3) {
        if let Some(cmd) = detect_installer(&subdir) {
            if is_different_ecosystem(root_installer.as_deref(), Some(&cmd)) {
                results.push(run_argv(&cmd, &subdir));
            }
        }
    }

    if let Some(cmd) = &config.init_command {
        results.push(run_shell(cmd, worktree_path));
    }

    for cmd in &config.post_init {
        results.push(run_shell(cmd, worktree_path));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn lockfiles_outrank_project_files() {
        let temp = tempfile::tempdir().unwrap();
        touch(temp.path(), "package.json");
        touch(temp.path(), "package-lock.json");
        assert_eq!(
            detect_installer(temp.path()),
            Some(vec!["npm".to_string(), "install".to_string()])
        );
    }

    #[test]
    fn bare_package_json_defaults_to_bun() {
        let temp = tempfile::tempdir().unwrap();
        touch(temp.path(), "package.json");
        assert_eq!(
            detect_installer(temp.path()),
            Some(vec!["bun".to_string(), "install".to_string()])
        );
    }

    #[test]
    fn nothing_detected_in_empty_dir() {
        let temp = tempfile::tempdir().unwrap();
        assert_eq!(detect_installer(temp.path()), None);
    }

    #[test]
    fn ecosystem_comparison() {
        let npm = vec!["npm".to_string(), "install".to_string()];
        let bun = vec!["bun".to_string(), "install".to_string()];
        let cargo = vec!["cargo".to_string(), "fetch".to_string()];
        assert!(!is_different_ecosystem(Some(&npm), Some(&bun)));
        assert!(is_different_ecosystem(Some(&npm), Some(&cargo)));
        assert!(is_different_ecosystem(None, Some(&cargo)));
    }

    #[test]
    fn finds_nested_project_dirs_skipping_vendored() {
        let temp = tempfile::tempdir().unwrap();
        touch(temp.path(), "api/Cargo.toml");
        touch(temp.path(), "web/package.json");
        touch(temp.path(), "node_modules/dep/package.json");

        let dirs = find_project_dirs(temp.path(), 3);
        assert_eq!(
            dirs,
            vec![temp.path().join("api"), temp.path().join("web")]
        );
    }

    #[test]
    fn pre_land_prefers_make_check() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("Makefile"), "check:\n\ttrue\n").unwrap();
        touch(temp.path(), "Cargo.toml");
        assert_eq!(detect_pre_land(temp.path()), Some("make check".to_string()));
    }

    #[test]
    fn pre_land_uses_package_scripts() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join("package.json"),
            r#"{"scripts": {"test": "vitest"}}"#,
        )
        .unwrap();
        touch(temp.path(), "bun.lock");
        assert_eq!(detect_pre_land(temp.path()), Some("bun run test".to_string()));
    }

    #[test]
    fn pre_land_falls_back_to_cargo_test() {
        let temp = tempfile::tempdir().unwrap();
        touch(temp.path(), "Cargo.toml");
        assert_eq!(detect_pre_land(temp.path()), Some("cargo test".to_string()));
    }
}
