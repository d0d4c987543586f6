//! Configuration loading and writing
//!
//! Config lives in a `[canopy]` table of `.canopy.toml` at the repo root,
//! layered over an optional global file at `~/.config/canopy/config.toml`.
//! Repo values win; nested sections deep-merge one level. Unknown keys get a
//! warning and are dropped rather than failing the command.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::{NamingScheme, WorktreeMode};

pub const CONFIG_FILENAME: &str = ".canopy.toml";
const TABLE_NAME: &str = "canopy";

fn default_worktree_dir() -> String {
    ".canopy".into()
}
fn default_branch_template() -> String {
    "{user}/{type}/{name}".into()
}
fn default_type() -> String {
    "feature".into()
}
fn default_base_branch() -> String {
    "main".into()
}
fn default_agent() -> String {
    "claude".into()
}
fn default_env_patterns() -> Vec<String> {
    vec![
        ".env".into(),
        ".env.*".into(),
        "!.env.example".into(),
        "!.env.template".into(),
    ]
}
fn default_scan_depth() -> usize {
    3
}

/// Worktree initialization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitConfig {
    /// Command to run in new worktrees (e.g. "uv sync", "npm install").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_command: Option<String>,
    /// Auto-run install detection when creating worktrees.
    pub auto_init: bool,
    /// Additional commands to run after the install step.
    pub post_init: Vec<String>,
}

impl Default for InitConfig {
    fn default() -> Self {
        InitConfig {
            init_command: None,
            auto_init: true,
            post_init: Vec::new(),
        }
    }
}

/// Environment-file propagation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Copy matching files into new worktrees.
    pub auto_copy: bool,
    /// Filename patterns; a `!` prefix excludes.
    pub patterns: Vec<String>,
    /// Directory depth to scan below the repo root.
    pub scan_depth: usize,
    /// Restrict scanning to these top-level directories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_dirs: Option<Vec<String>>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        EnvConfig {
            auto_copy: true,
            patterns: default_env_patterns(),
            scan_depth: default_scan_depth(),
            scan_dirs: None,
        }
    }
}

/// Git submodule settings for new worktrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmodulesConfig {
    pub auto_init: bool,
    pub recursive: bool,
}

impl Default for SubmodulesConfig {
    fn default() -> Self {
        SubmodulesConfig {
            auto_init: true,
            recursive: true,
        }
    }
}

/// Coding-agent settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Launch the agent after creating a worktree.
    pub auto_launch: bool,
    /// Inject the worktree context file for the agent.
    pub inject_context: bool,
    /// Custom context file path (default: agent-specific).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            auto_launch: false,
            inject_context: true,
            context_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanopyConfig {
    /// Legacy in-repo worktree directory, still recognized by reconcile.
    pub worktree_dir: String,
    /// Branch name template; must contain `{name}`. Vars: {user}, {type}, {name}.
    pub branch_template: String,
    /// Username prefix for branches.
    pub user: String,
    /// Default branch type (feature, fix, hotfix, chore, refactor).
    pub default_type: String,
    /// Base branch worktrees fork from.
    pub base_branch: String,
    /// Auto-name scheme: minerals, cities, or compound.
    pub naming_scheme: NamingScheme,
    /// worktree = linked worktree, checkout = independent clone.
    pub mode: WorktreeMode,
    /// Project identifier override (default: repo directory name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Coding agent to launch (claude, codex, aider, opencode).
    pub default_agent: String,
    /// Command to run before landing (e.g. "make check").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_land: Option<String>,
    pub init: InitConfig,
    pub env: EnvConfig,
    pub submodules: SubmodulesConfig,
    pub agent: AgentConfig,
}

impl Default for CanopyConfig {
    fn default() -> Self {
        CanopyConfig {
            worktree_dir: default_worktree_dir(),
            branch_template: default_branch_template(),
            user: String::new(),
            default_type: default_type(),
            base_branch: default_base_branch(),
            naming_scheme: NamingScheme::default(),
            mode: WorktreeMode::default(),
            project_name: None,
            default_agent: default_agent(),
            pre_land: None,
            init: InitConfig::default(),
            env: EnvConfig::default(),
            submodules: SubmodulesConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl CanopyConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.branch_template.contains("{name}") {
            return Err(Error::Config(
                "branch_template must contain {name}".into(),
            ));
        }
        if self.env.scan_depth < 1 {
            return Err(Error::Config("env.scan_depth must be >= 1".into()));
        }
        Ok(())
    }
}

const KNOWN_TOP_KEYS: &[&str] = &[
    "worktree_dir",
    "branch_template",
    "user",
    "default_type",
    "base_branch",
    "naming_scheme",
    "mode",
    "project_name",
    "default_agent",
    "pre_land",
    "init",
    "env",
    "submodules",
    "agent",
];

pub fn config_exists(repo_root: &Path) -> bool {
    repo_root.join(CONFIG_FILENAME).exists()
}

pub fn global_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("canopy")
        .join("config.toml")
}

/// Load config: repo `.canopy.toml` over global config over defaults.
pub fn load_config(repo_root: &Path) -> Result<CanopyConfig> {
    load_config_layered(repo_root, &global_config_path())
}

fn read_canopy_table(path: &Path) -> Result<toml::Table> {
    let content = std::fs::read_to_string(path)?;
    let doc: toml::Table = content
        .parse()
        .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
    match doc.get(TABLE_NAME) {
        Some(toml::Value::Table(table)) => Ok(table.clone()),
        Some(_) => Err(Error::Config(format!(
            "{}: [{TABLE_NAME}] is not a table",
            path.display()
        ))),
        None => Ok(toml::Table::new()),
    }
}

fn load_config_layered(repo_root: &Path, global_path: &Path) -> Result<CanopyConfig> {
    let mut data = toml::Table::new();

    if global_path.exists() {
        merge_tables(&mut data, read_canopy_table(global_path)?);
    }

    let repo_config = repo_root.join(CONFIG_FILENAME);
    if repo_config.exists() {
        merge_tables(&mut data, read_canopy_table(&repo_config)?);
    }

    warn_unknown_keys(&data);

    let config: CanopyConfig = toml::Value::Table(data)
        .try_into()
        .map_err(|e| Error::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Overlay `overlay` onto `base`, deep-merging nested tables one level.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                for (k, v) in incoming {
                    existing.insert(k, v);
                }
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn warn_unknown_keys(data: &toml::Table) {
    for key in data.keys() {
        if !KNOWN_TOP_KEYS.contains(&key.as_str()) {
            tracing::warn!(key, "unknown config key, ignoring");
        }
    }
}

/// Write the full config to the repo's `.canopy.toml`.
pub fn write_config(repo_root: &Path, config: &CanopyConfig) -> Result<PathBuf> {
    let path = repo_root.join(CONFIG_FILENAME);
    let body = toml::to_string_pretty(config).map_err(|e| Error::Config(e.to_string()))?;
    let mut doc = String::from("# Canopy configuration. See `canopy config show`.\n");
    doc.push_str(&format!("[{TABLE_NAME}]\n"));
    // Indent nested section headers into [canopy.*] tables.
    for line in body.lines() {
        if let Some(section) = line.strip_prefix('[') {
            doc.push_str(&format!("\n[{TABLE_NAME}.{section}\n"));
        } else {
            doc.push_str(line);
            doc.push('\n');
        }
    }
    std::fs::write(&path, doc)?;
    Ok(path)
}

fn coerce_value(value: &str) -> toml::Value {
    if value.eq_ignore_ascii_case("true") {
        return toml::Value::Boolean(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return toml::Value::Boolean(false);
    }
    if let Ok(n) = value.parse::<i64>() {
        return toml::Value::Integer(n);
    }
    toml::Value::String(value.to_string())
}

/// Update a single config field in the repo file. Supports one level of
/// dot-notation ("env.auto_copy"). Returns the reloaded config.
pub fn update_config_field(repo_root: &Path, key: &str, value: &str) -> Result<CanopyConfig> {
    let config_path = repo_root.join(CONFIG_FILENAME);
    let mut doc: toml::Table = if config_path.exists() {
        std::fs::read_to_string(&config_path)?
            .parse()
            .map_err(|e| Error::Config(format!("{}: {e}", config_path.display())))?
    } else {
        toml::Table::new()
    };

    let table = doc
        .entry(TABLE_NAME.to_string())
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    let Some(table) = table.as_table_mut() else {
        return Err(Error::Config(format!("[{TABLE_NAME}] is not a table")));
    };

    let coerced = coerce_value(value);
    match key.split_once('.') {
        Some((section, field)) => {
            let nested = table
                .entry(section.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            let Some(nested) = nested.as_table_mut() else {
                return Err(Error::Config(format!("{section} is not a table")));
            };
            nested.insert(field.to_string(), coerced);
        }
        None => {
            table.insert(key.to_string(), coerced);
        }
    }

    let body = toml::to_string_pretty(&doc).map_err(|e| Error::Config(e.to_string()))?;
    std::fs::write(&config_path, body)?;
    load_config(repo_root)
}
