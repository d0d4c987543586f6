//! End-to-end worktree lifecycle against real git repositories.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serial_test::serial;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

use canopy::config::CanopyConfig;
use canopy::error::Error;
use canopy::home::CanopyHome;
use canopy::worktree::{
    archive_worktree, create_worktree, get_worktree, list_worktrees, remove_worktree,
    unarchive_worktree,
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

/// A repo with one commit on `main`, plus a canopy home in its own tempdir.
fn setup() -> (TempDir, TempDir, CanopyHome, CanopyConfig) {
    let repo = TempDir::new().unwrap();
    git(&["init", "-b", "main"], repo.path());
    git(&["config", "user.email", "test@test.com"], repo.path());
    git(&["config", "user.name", "Test User"], repo.path());
    std::fs::write(repo.path().join("README.md"), "# Test Repository\n").unwrap();
    git(&["add", "."], repo.path());
    git(&["commit", "-m", "Initial commit"], repo.path());

    let home_dir = TempDir::new().unwrap();
    let home = CanopyHome::at(home_dir.path());
    let config = CanopyConfig {
        user: "nik".into(),
        ..Default::default()
    };
    (repo, home_dir, home, config)
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
#[serial]
fn create_uses_branch_template_and_records_state() {
    let (repo, _home_dir, home, config) = setup();

    let info = create_worktree(
        &home,
        repo.path(),
        &config,
        Some("obsidian"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();

    assert_eq!(info.branch, "nik/feature/obsidian");
    assert_eq!(info.base_branch, "main");
    let wt_path = Path::new(&info.path);
    assert!(wt_path.join("README.md").exists());
    // linked worktree, not a clone
    assert!(wt_path.join(".git").is_file());

    let listed = list_worktrees(&home, repo.path(), &config, false).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "obsidian");
    assert_eq!(listed[0].status, "clean");
}

#[test]
#[serial]
fn duplicate_name_and_branch_are_rejected() {
    let (repo, _home_dir, home, config) = setup();

    create_worktree(
        &home,
        repo.path(),
        &config,
        Some("opal"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();

    let err = create_worktree(
        &home,
        repo.path(),
        &config,
        Some("opal"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }));

    // same branch under a different name
    let err = create_worktree(
        &home,
        repo.path(),
        &config,
        Some("opal2"),
        Some("nik/feature/opal"),
        None,
        None,
        &mut rng(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::BranchAlreadyExists(_)));
}

#[test]
#[serial]
fn auto_generated_names_come_from_the_scheme() {
    let (repo, _home_dir, home, config) = setup();

    let info = create_worktree(
        &home,
        repo.path(),
        &config,
        None,
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();

    assert!(!info.name.is_empty());
    assert!(info.name.chars().all(|c| c.is_ascii_lowercase()));
    assert_eq!(info.branch, format!("nik/feature/{}", info.name));
}

#[test]
#[serial]
fn dirty_worktree_needs_force_to_remove() {
    let (repo, _home_dir, home, config) = setup();

    let info = create_worktree(
        &home,
        repo.path(),
        &config,
        Some("flint"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();
    let wt_path = Path::new(&info.path).to_path_buf();

    // modify a tracked file
    std::fs::write(wt_path.join("README.md"), "changed\n").unwrap();

    let err = remove_worktree(&home, repo.path(), &config, "flint", false, false).unwrap_err();
    assert!(matches!(err, Error::DirtyWorktree(_)));
    assert!(wt_path.exists());

    remove_worktree(&home, repo.path(), &config, "flint", true, false).unwrap();
    assert!(!wt_path.exists());
    assert!(get_worktree(&home, repo.path(), &config, "flint")
        .unwrap()
        .is_none());
}

#[test]
#[serial]
fn untracked_files_do_not_block_removal() {
    let (repo, _home_dir, home, config) = setup();

    let info = create_worktree(
        &home,
        repo.path(),
        &config,
        Some("jasper"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();
    std::fs::write(Path::new(&info.path).join("AGENTS.md"), "context\n").unwrap();

    remove_worktree(&home, repo.path(), &config, "jasper", false, false).unwrap();
    assert!(!Path::new(&info.path).exists());
}

#[test]
#[serial]
fn remove_deletes_branch_unless_kept() {
    let (repo, _home_dir, home, config) = setup();

    create_worktree(
        &home,
        repo.path(),
        &config,
        Some("mica"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();
    remove_worktree(&home, repo.path(), &config, "mica", false, false).unwrap();
    assert!(!canopy::git::branch_exists("nik/feature/mica", repo.path()));

    create_worktree(
        &home,
        repo.path(),
        &config,
        Some("slate"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();
    remove_worktree(&home, repo.path(), &config, "slate", false, true).unwrap();
    assert!(canopy::git::branch_exists("nik/feature/slate", repo.path()));
}

#[test]
#[serial]
fn archive_hides_but_keeps_the_directory() {
    let (repo, _home_dir, home, config) = setup();

    let info = create_worktree(
        &home,
        repo.path(),
        &config,
        Some("quartz"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();

    archive_worktree(&home, repo.path(), &config, "quartz").unwrap();
    assert!(Path::new(&info.path).exists());

    let active = list_worktrees(&home, repo.path(), &config, false).unwrap();
    assert!(active.is_empty());
    let all = list_worktrees(&home, repo.path(), &config, true).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, "archived");

    // double archive fails, unarchive restores
    let err = archive_worktree(&home, repo.path(), &config, "quartz").unwrap_err();
    assert!(matches!(err, Error::AlreadyArchived(_)));

    unarchive_worktree(&home, repo.path(), &config, "quartz").unwrap();
    let active = list_worktrees(&home, repo.path(), &config, false).unwrap();
    assert_eq!(active.len(), 1);
}

#[test]
#[serial]
fn list_self_heals_after_out_of_band_removal() {
    let (repo, _home_dir, home, config) = setup();

    let info = create_worktree(
        &home,
        repo.path(),
        &config,
        Some("basalt"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();

    // remove behind canopy's back
    git(
        &["worktree", "remove", "--force", &info.path],
        repo.path(),
    );

    let listed = list_worktrees(&home, repo.path(), &config, true).unwrap();
    assert!(listed.is_empty());

    // pruning was persisted, not just filtered from the view
    let project = repo.path().file_name().unwrap().to_string_lossy().to_string();
    let state = canopy::state::load_state(&home, &project, repo.path()).unwrap();
    assert!(!state.worktrees.contains_key("basalt"));
}

#[test]
#[serial]
fn list_adopts_worktrees_created_out_of_band() {
    let (repo, _home_dir, home, config) = setup();

    let project = repo.path().file_name().unwrap().to_string_lossy().to_string();
    let stray = home.worktree_path(&project, "stray");
    git(
        &[
            "worktree",
            "add",
            "-b",
            "nik/feature/stray",
            &stray.to_string_lossy(),
            "main",
        ],
        repo.path(),
    );

    let listed = list_worktrees(&home, repo.path(), &config, false).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "stray");
    assert_eq!(listed[0].branch, "nik/feature/stray");
}

#[test]
#[serial]
fn removed_name_can_be_reused_but_active_names_cannot() {
    let (repo, _home_dir, home, config) = setup();

    create_worktree(
        &home,
        repo.path(),
        &config,
        Some("coral"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();
    remove_worktree(&home, repo.path(), &config, "coral", false, false).unwrap();

    // record and branch are gone, the name is free again
    create_worktree(
        &home,
        repo.path(),
        &config,
        Some("coral"),
        None,
        None,
        None,
        &mut rng(),
    )
    .unwrap();
}
