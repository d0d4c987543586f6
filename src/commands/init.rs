//! `canopy init`: write a starter `.canopy.toml` with detected defaults.

use anyhow::{bail, Result};
use std::path::Path;

use crate::config::{config_exists, write_config, CanopyConfig};
use crate::display::{print_info, print_success};
use crate::git;
use crate::init_deps::detect_pre_land;

pub fn execute(user: Option<String>, force: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let repo_root = git::find_repo_root(&cwd)?;

    if config_exists(&repo_root) && !force {
        bail!(".canopy.toml already exists (use --force to overwrite)");
    }

    let mut config = CanopyConfig::default();
    config.user = user.unwrap_or_else(|| detect_user(&repo_root));
    config.base_branch = git::default_branch(&repo_root);
    if let Some(pre_land) = detect_pre_land(&repo_root) {
        print_info(&format!("Detected pre-land check: {pre_land}"));
        config.pre_land = Some(pre_land);
    }

    let path = write_config(&repo_root, &config)?;
    print_success(&format!("Wrote {}", path.display()));
    print_info(&format!(
        "Branches will look like {}",
        config
            .branch_template
            .replace("{user}", &config.user)
            .replace("{type}", &config.default_type)
            .replace("{name}", "obsidian")
    ));
    Ok(())
}

/// Best available username: git config, then $USER.
fn detect_user(repo_root: &Path) -> String {
    if let Ok(name) = git::run_git(&["config", "user.name"], Some(repo_root)) {
        let slug = slugify(&name);
        if !slug.is_empty() {
            return slug;
        }
    }
    std::env::var("USER").unwrap_or_default()
}

fn slugify(name: &str) -> String {
    name.split_whitespace()
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_takes_first_word_lowercased() {
        assert_eq!(slugify("Nik Tester"), "nik");
        assert_eq!(slugify("Mary-Jane"), "mary-jane");
        assert_eq!(slugify("  "), "");
    }
}
