//! `canopy shell`: print or install the shell integration snippet.

use anyhow::Result;

use crate::display::{print_info, print_success};
use crate::shell::{detect_shell, install_into, rc_file_path, shell_init, uninstall_from};

pub fn init(shell: Option<String>) -> Result<()> {
    let shell = shell.unwrap_or_else(detect_shell);
    print!("{}", shell_init(&shell));
    Ok(())
}

pub fn install(shell: Option<String>) -> Result<()> {
    let shell = shell.unwrap_or_else(detect_shell);
    let rc = rc_file_path(&shell);
    if install_into(&rc, &shell)? {
        print_success(&format!("Installed shell integration in {}", rc.display()));
        print_info("Restart your shell or source the file to activate");
    } else {
        print_info("Shell integration already installed");
    }
    Ok(())
}

pub fn uninstall(shell: Option<String>) -> Result<()> {
    let shell = shell.unwrap_or_else(detect_shell);
    let rc = rc_file_path(&shell);
    if uninstall_from(&rc)? {
        print_success(&format!("Removed shell integration from {}", rc.display()));
    } else {
        print_info("No shell integration found");
    }
    Ok(())
}
