//! Shell integration: wrapper functions that cd into worktrees, installed
//! into the user's rc file between marker comments so re-installs replace
//! the block in place.

use std::path::PathBuf;

use crate::error::Result;

const START_MARKER: &str = "# canopy:start";
const END_MARKER: &str = "# canopy:end";

const BASH_INIT: &str = r#"# Canopy shell integration
cpcd() { cd "$(canopy cd "$1")" || return 1; }
cpn() { local d; d="$(canopy new "$@")" && cd "$d" || return 1; }
cpdone() { local d; d="$(canopy rm "$@")" && cd "$d" || return 1; }
cpunarchive() { local d; d="$(canopy unarchive "$@")" && cd "$d" || return 1; }

canopy-prompt() {
    if [ -n "$CANOPY_WORKTREE" ]; then
        echo "🌳 $CANOPY_WORKTREE"
    elif [ -f .git ] && grep -q ".canopy/projects/" .git 2>/dev/null; then
        echo "🌳 $(basename "$PWD")"
    fi
}
"#;

const ZSH_INIT: &str = r#"# Canopy shell integration
cpcd() { cd "$(canopy cd "$1")" || return 1; }
cpn() { local d; d="$(canopy new "$@")" && cd "$d" || return 1; }
cpdone() { local d; d="$(canopy rm "$@")" && cd "$d" || return 1; }
cpunarchive() { local d; d="$(canopy unarchive "$@")" && cd "$d" || return 1; }

canopy-prompt() {
    if [[ -n "$CANOPY_WORKTREE" ]]; then
        echo "🌳 $CANOPY_WORKTREE"
    elif [[ -f .git ]] && grep -q ".canopy/projects/" .git 2>/dev/null; then
        echo "🌳 $(basename "$PWD")"
    fi
}
"#;

const FISH_INIT: &str = r#"# Canopy shell integration
function cpcd
    cd (canopy cd $argv[1]); or return 1
end

function cpn
    set -l d (canopy new $argv); and cd $d; or return 1
end

function cpdone
    set -l d (canopy rm $argv); and cd $d; or return 1
end

function cpunarchive
    set -l d (canopy unarchive $argv); and cd $d; or return 1
end

function canopy-prompt
    if test -n "$CANOPY_WORKTREE"
        echo "🌳 $CANOPY_WORKTREE"
    else if test -f .git; and grep -q ".canopy/projects/" .git 2>/dev/null
        echo "🌳 "(basename $PWD)
    end
end
"#;

/// Shell name from `$SHELL`, defaulting to bash for anything unrecognized.
pub fn detect_shell() -> String {
    let shell = std::env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string());
    let name = shell.rsplit('/').next().unwrap_or("bash");
    match name {
        "bash" | "zsh" | "fish" => name.to_string(),
        _ => "bash".to_string(),
    }
}

pub fn shell_init(shell: &str) -> &'static str {
    match shell {
        "zsh" => ZSH_INIT,
        "fish" => FISH_INIT,
        _ => BASH_INIT,
    }
}

pub fn rc_file_path(shell: &str) -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    match shell {
        "fish" => home.join(".config").join("fish").join("config.fish"),
        "zsh" => home.join(".zshrc"),
        _ => home.join(".bashrc"),
    }
}

fn build_block(shell: &str) -> String {
    format!("{START_MARKER}\n{}{END_MARKER}\n", shell_init(shell))
}

/// Install (or replace) the init block in `rc`. Returns true when the file
/// changed.
pub fn install_into(rc: &std::path::Path, shell: &str) -> Result<bool> {
    let block = build_block(shell);
    let mut content = if rc.exists() {
        std::fs::read_to_string(rc)?
    } else {
        if let Some(parent) = rc.parent() {
            std::fs::create_dir_all(parent)?;
        }
        String::new()
    };

    if let (Some(start), Some(end)) = (content.find(START_MARKER), content.find(END_MARKER)) {
        let mut old_end = end + END_MARKER.len();
        if content[old_end..].starts_with('\n') {
            old_end += 1;
        }
        let new_content = format!("{}{}{}", &content[..start], block, &content[old_end..]);
        if new_content == content {
            return Ok(false);
        }
        std::fs::write(rc, new_content)?;
        return Ok(true);
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push('\n');
    content.push_str(&block);
    std::fs::write(rc, content)?;
    Ok(true)
}

/// Remove the init block from `rc`. Returns true when the file changed.
pub fn uninstall_from(rc: &std::path::Path) -> Result<bool> {
    if !rc.exists() {
        return Ok(false);
    }
    let content = std::fs::read_to_string(rc)?;
    let (Some(mut start), Some(end)) = (content.find(START_MARKER), content.find(END_MARKER))
    else {
        return Ok(false);
    };

    let mut end_pos = end + END_MARKER.len();
    if content[end_pos..].starts_with('\n') {
        end_pos += 1;
    }
    if start > 0 && content[..start].ends_with('\n') {
        start -= 1;
    }

    std::fs::write(rc, format!("{}{}", &content[..start], &content[end_pos..]))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_snippets_define_wrappers() {
        for shell in ["bash", "zsh", "fish"] {
            let snippet = shell_init(shell);
            assert!(snippet.contains("cpcd"), "{shell} missing cpcd");
            assert!(snippet.contains("canopy-prompt"), "{shell} missing prompt");
        }
    }

    #[test]
    fn unknown_shell_falls_back_to_bash() {
        assert_eq!(shell_init("tcsh"), BASH_INIT);
    }

    #[test]
    fn install_appends_block() {
        let temp = tempfile::tempdir().unwrap();
        let rc = temp.path().join(".bashrc");
        std::fs::write(&rc, "export PATH=$PATH:~/bin\n").unwrap();

        assert!(install_into(&rc, "bash").unwrap());
        let content = std::fs::read_to_string(&rc).unwrap();
        assert!(content.starts_with("export PATH"));
        assert!(content.contains(START_MARKER));
        assert!(content.contains(END_MARKER));
    }

    #[test]
    fn reinstall_replaces_block_in_place() {
        let temp = tempfile::tempdir().unwrap();
        let rc = temp.path().join(".bashrc");
        install_into(&rc, "bash").unwrap();
        // identical content → unchanged
        assert!(!install_into(&rc, "bash").unwrap());
        // different shell content → replaced, not duplicated
        assert!(install_into(&rc, "fish").unwrap());
        let content = std::fs::read_to_string(&rc).unwrap();
        assert_eq!(content.matches(START_MARKER).count(), 1);
        assert!(content.contains("function cpcd"));
    }

    #[test]
    fn uninstall_removes_block_and_preserves_rest() {
        let temp = tempfile::tempdir().unwrap();
        let rc = temp.path().join(".zshrc");
        std::fs::write(&rc, "alias g=git\n").unwrap();
        install_into(&rc, "zsh").unwrap();

        assert!(uninstall_from(&rc).unwrap());
        let content = std::fs::read_to_string(&rc).unwrap();
        assert_eq!(content, "alias g=git\n");
        // nothing left to remove
        assert!(!uninstall_from(&rc).unwrap());
    }
}
