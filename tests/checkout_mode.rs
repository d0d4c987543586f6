//! Checkout mode: independent clones instead of linked worktrees.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serial_test::serial;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

use canopy::config::CanopyConfig;
use canopy::error::Error;
use canopy::home::CanopyHome;
use canopy::models::WorktreeMode;
use canopy::worktree::{
    checkout_worktree, create_worktree, get_worktree, list_worktrees, remove_worktree,
};

fn git(args: &[&str], cwd: &Path) {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A bare "remote" plus a working clone of it, so checkout mode has a real
/// origin URL to rewire clones to.
fn setup() -> (TempDir, TempDir, TempDir, CanopyHome, CanopyConfig) {
    let origin = TempDir::new().unwrap();
    git(&["init", "--bare", "-b", "main"], origin.path());

    let work = TempDir::new().unwrap();
    let repo = work.path().join("repo");
    git(
        &[
            "clone",
            &origin.path().to_string_lossy(),
            &repo.to_string_lossy(),
        ],
        work.path(),
    );
    git(&["config", "user.email", "test@test.com"], &repo);
    git(&["config", "user.name", "Test User"], &repo);
    std::fs::write(repo.join("README.md"), "# Test Repository\n").unwrap();
    git(&["add", "."], &repo);
    git(&["commit", "-m", "Initial commit"], &repo);
    git(&["push", "origin", "main"], &repo);

    let home_dir = TempDir::new().unwrap();
    let home = CanopyHome::at(home_dir.path());
    let config = CanopyConfig {
        user: "nik".into(),
        mode: WorktreeMode::Checkout,
        ..Default::default()
    };
    (origin, work, home_dir, home, config)
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(11)
}

#[test]
#[serial]
fn create_makes_an_independent_clone() {
    let (origin, work, _home_dir, home, config) = setup();
    let repo = work.path().join("repo");

    let info = create_worktree(
        &home,
        &repo,
        &config,
        Some("obsidian"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();

    assert_eq!(info.mode, WorktreeMode::Checkout);
    let clone = Path::new(&info.path);
    // a full clone has a .git directory, not a linked-worktree .git file
    assert!(clone.join(".git").is_dir());
    assert!(clone.join("README.md").exists());

    // origin points at the real remote, not the local source repo
    let url = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(clone)
        .output()
        .unwrap();
    let url = String::from_utf8_lossy(&url.stdout);
    assert_eq!(url.trim(), origin.path().to_string_lossy());

    // the branch lives in the clone, not the main repo
    assert!(!canopy::git::branch_exists("nik/feature/obsidian", &repo));
    assert!(canopy::git::branch_exists("nik/feature/obsidian", clone));
}

#[test]
#[serial]
fn checkout_attaches_to_an_existing_branch() {
    let (_origin, work, _home_dir, home, config) = setup();
    let repo = work.path().join("repo");

    // a branch someone pushed, e.g. from a PR
    git(&["checkout", "-b", "pr-fix", "main"], &repo);
    std::fs::write(repo.join("fix.txt"), "fix\n").unwrap();
    git(&["add", "."], &repo);
    git(&["commit", "-m", "Fix"], &repo);
    git(&["push", "origin", "pr-fix"], &repo);
    git(&["checkout", "main"], &repo);

    let info = checkout_worktree(
        &home,
        &repo,
        &config,
        "pr-fix",
        None,
        None,
        42,
        &mut rng(),
    )
    .unwrap();

    assert_eq!(info.branch, "pr-fix");
    assert_eq!(info.pr, 42);
    // name came from the generator, not the branch
    assert_ne!(info.name, "pr-fix");
    assert!(Path::new(&info.path).join("fix.txt").exists());
}

#[test]
#[serial]
fn checkout_of_unknown_branch_fails() {
    let (_origin, work, _home_dir, home, config) = setup();
    let repo = work.path().join("repo");

    let err = checkout_worktree(
        &home,
        &repo,
        &config,
        "no-such-branch",
        None,
        None,
        0,
        &mut rng(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::BranchNotFound(_)));
}

#[test]
#[serial]
fn remove_deletes_the_clone_directory() {
    let (_origin, work, _home_dir, home, config) = setup();
    let repo = work.path().join("repo");

    let info = create_worktree(
        &home,
        &repo,
        &config,
        Some("opal"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();
    let clone = Path::new(&info.path).to_path_buf();

    remove_worktree(&home, &repo, &config, "opal", false, false).unwrap();
    assert!(!clone.exists());
    assert!(get_worktree(&home, &repo, &config, "opal").unwrap().is_none());
}

#[test]
#[serial]
fn clones_survive_reconcile_by_directory_presence() {
    let (_origin, work, _home_dir, home, config) = setup();
    let repo = work.path().join("repo");

    let info = create_worktree(
        &home,
        &repo,
        &config,
        Some("flint"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();

    // clones are invisible to `git worktree list`, yet the record stays
    let listed = list_worktrees(&home, &repo, &config, false).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "flint");

    // deleting the directory out of band prunes the record
    std::fs::remove_dir_all(&info.path).unwrap();
    let listed = list_worktrees(&home, &repo, &config, false).unwrap();
    assert!(listed.is_empty());
}
