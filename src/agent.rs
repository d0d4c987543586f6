//! Coding-agent integration: context injection, env vars, launching.
//!
//! Each known agent reads instructions from a well-known file; canopy
//! injects a marker-delimited block into that file so re-running create or
//! sync replaces the block instead of appending duplicates.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::models::{WorktreeInfo, WorktreeMode};

const MARKER_START: &str = "<!-- canopy:start -->";
const MARKER_END: &str = "<!-- canopy:end -->";

pub const DEFAULT_CONTEXT_FILE: &str = "AGENTS.md";

/// A known coding agent: its binary and the file it reads context from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDef {
    pub binary: String,
    pub context_file: String,
}

const KNOWN_AGENTS: &[(&str, &str, &str)] = &[
    ("claude", "claude", ".claude/rules/worktrees.md"),
    ("codex", "codex", "AGENTS.md"),
    ("gemini", "gemini", "GEMINI.md"),
    ("opencode", "opencode", "AGENTS.md"),
    ("aider", "aider", "CONVENTIONS.md"),
];

/// Lookup an agent definition by name. Unknown agents get the default
/// context file and their name as the binary.
pub fn agent_def(name: &str, context_file_override: Option<&str>) -> AgentDef {
    let (binary, context_file) = KNOWN_AGENTS
        .iter()
        .find(|(agent, _, _)| *agent == name)
        .map(|(_, bin, ctx)| (*bin, *ctx))
        .unwrap_or((name, DEFAULT_CONTEXT_FILE));
    AgentDef {
        binary: binary.to_string(),
        context_file: context_file_override.unwrap_or(context_file).to_string(),
    }
}

/// Names of known agents whose binary is on PATH.
pub fn detect_installed_agents() -> Vec<String> {
    KNOWN_AGENTS
        .iter()
        .filter(|(_, binary, _)| which::which(binary).is_ok())
        .map(|(name, _, _)| name.to_string())
        .collect()
}

/// Resolve the agent binary on PATH, if present.
pub fn agent_binary_path(def: &AgentDef) -> Option<std::path::PathBuf> {
    which::which(&def.binary).ok()
}

/// Env vars describing the worktree to a launched agent.
pub fn build_env_vars(info: &WorktreeInfo, repo_root: &Path) -> HashMap<String, String> {
    HashMap::from([
        ("CANOPY_WORKTREE".to_string(), info.name.clone()),
        ("CANOPY_BRANCH".to_string(), info.branch.clone()),
        ("CANOPY_BASE".to_string(), info.base_branch.clone()),
        (
            "CANOPY_ROOT".to_string(),
            repo_root.to_string_lossy().to_string(),
        ),
        ("CANOPY_TYPE".to_string(), info.branch_type.clone()),
    ])
}

/// The marker-delimited context block describing this worktree.
pub fn build_context_block(
    info: &WorktreeInfo,
    all_worktrees: &[WorktreeInfo],
    project_name: &str,
) -> String {
    let others: Vec<&str> = all_worktrees
        .iter()
        .filter(|wt| wt.name != info.name)
        .map(|wt| wt.name.as_str())
        .collect();
    let others = if others.is_empty() {
        "none".to_string()
    } else {
        others.join(", ")
    };
    let mode_desc = match info.mode {
        WorktreeMode::Checkout => "local clone",
        WorktreeMode::Worktree => "git worktree",
    };

    format!(
        "{MARKER_START}\n\n\
# Canopy Worktree Context\n\n\
You are working in a **canopy-managed {mode_desc}**.\n\n\
| Key         | Value |\n\
|-------------|-------|\n\
| Project     | {project} |\n\
| Worktree    | {name} |\n\
| Branch      | {branch} |\n\
| Base branch | {base} |\n\n\
## Guidelines\n\n\
- Your working directory is this worktree. All file operations MUST stay within this directory.\n\
- Do NOT write files outside this worktree.\n\
- Commit to this branch (`{branch}`). It can be merged via PR.\n\
- Other active worktrees: {others}. Do not modify those.\n\n\
## Useful Commands\n\n\
- `canopy status`: see all worktrees and their git status\n\
- `canopy sync`: rebase this worktree onto the latest base branch\n\
- `canopy env sync`: refresh .env files from the main repo\n\
- `canopy ls`: list all active worktrees\n\n\
{MARKER_END}",
        project = project_name,
        name = info.name,
        branch = info.branch,
        base = info.base_branch,
    )
}

/// Write (or replace) the context block in the agent's context file.
pub fn inject_agent_context(
    agent: &AgentDef,
    worktree_path: &Path,
    info: &WorktreeInfo,
    all_worktrees: &[WorktreeInfo],
    project_name: &str,
) -> Result<()> {
    let context_file = worktree_path.join(&agent.context_file);
    let block = build_context_block(info, all_worktrees, project_name);

    if let Some(parent) = context_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = if context_file.exists() {
        let existing = std::fs::read_to_string(&context_file)?;
        match (existing.find(MARKER_START), existing.find(MARKER_END)) {
            (Some(start), Some(end)) => {
                let before = &existing[..start];
                let after = &existing[end + MARKER_END.len()..];
                format!("{before}{block}{after}")
            }
            _ => format!("{}\n\n{block}\n", existing.trim_end()),
        }
    } else {
        format!("{block}\n")
    };

    std::fs::write(&context_file, content)?;
    Ok(())
}

/// Hand the process over to the agent in the worktree directory. Only
/// returns on spawn failure.
#[cfg(unix)]
pub fn launch_agent(
    agent: &AgentDef,
    worktree_path: &Path,
    env_vars: &HashMap<String, String>,
    command: Option<&str>,
) -> Result<()> {
    use std::os::unix::process::CommandExt;
    use std::process::Command;

    let (program, args): (String, Vec<String>) = match command {
        Some(cmd) => {
            let mut parts = cmd.split_whitespace().map(String::from);
            let program = parts.next().unwrap_or_else(|| agent.binary.clone());
            (program, parts.collect())
        }
        None => (agent.binary.clone(), Vec::new()),
    };

    let err = Command::new(program)
        .args(args)
        .current_dir(worktree_path)
        .envs(env_vars)
        .exec();
    Err(err.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorktreeRecord;

    fn info(name: &str) -> WorktreeInfo {
        let record = WorktreeRecord {
            branch: format!("nik/feature/{name}"),
            base_branch: "main".into(),
            branch_type: "feature".into(),
            path: format!("/wt/{name}"),
            ..Default::default()
        };
        WorktreeInfo::from_record(name, &record, "")
    }

    #[test]
    fn known_agent_lookup() {
        let def = agent_def("aider", None);
        assert_eq!(def.binary, "aider");
        assert_eq!(def.context_file, "CONVENTIONS.md");
    }

    #[test]
    fn unknown_agent_uses_defaults() {
        let def = agent_def("mystery", None);
        assert_eq!(def.binary, "mystery");
        assert_eq!(def.context_file, DEFAULT_CONTEXT_FILE);
    }

    #[test]
    fn override_replaces_context_file() {
        let def = agent_def("claude", Some("NOTES.md"));
        assert_eq!(def.binary, "claude");
        assert_eq!(def.context_file, "NOTES.md");
    }

    #[test]
    fn context_block_lists_other_worktrees() {
        let all = vec![info("opal"), info("jasper"), info("flint")];
        let block = build_context_block(&all[0], &all, "widget");
        assert!(block.contains("jasper, flint"));
        assert!(block.contains("nik/feature/opal"));
        assert!(block.starts_with(MARKER_START));
        assert!(block.ends_with(MARKER_END));
    }

    #[test]
    fn env_vars_describe_worktree() {
        let vars = build_env_vars(&info("opal"), Path::new("/repo"));
        assert_eq!(vars["CANOPY_WORKTREE"], "opal");
        assert_eq!(vars["CANOPY_BRANCH"], "nik/feature/opal");
        assert_eq!(vars["CANOPY_ROOT"], "/repo");
    }

    #[test]
    fn injection_creates_then_replaces_block() {
        let temp = tempfile::tempdir().unwrap();
        let def = agent_def("codex", None);
        let all = vec![info("opal")];

        inject_agent_context(&def, temp.path(), &all[0], &all, "widget").unwrap();
        let first = std::fs::read_to_string(temp.path().join("AGENTS.md")).unwrap();
        assert!(first.contains("Worktree    | opal"));

        let updated = info("opal-renamed");
        inject_agent_context(&def, temp.path(), &updated, &all, "widget").unwrap();
        let second = std::fs::read_to_string(temp.path().join("AGENTS.md")).unwrap();
        assert!(second.contains("opal-renamed"));
        assert_eq!(second.matches(MARKER_START).count(), 1);
    }

    #[test]
    fn injection_appends_to_existing_content() {
        let temp = tempfile::tempdir().unwrap();
        let def = agent_def("codex", None);
        std::fs::write(temp.path().join("AGENTS.md"), "# My notes\n").unwrap();

        let all = vec![info("opal")];
        inject_agent_context(&def, temp.path(), &all[0], &all, "widget").unwrap();
        let content = std::fs::read_to_string(temp.path().join("AGENTS.md")).unwrap();
        assert!(content.starts_with("# My notes"));
        assert!(content.contains(MARKER_START));
    }
}
