//! Terminal output helpers shared by the commands.
//!
//! Human-facing messages go to stderr; stdout is reserved for data (tables,
//! paths, JSON) so the shell wrappers can capture it.

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::models::{WorktreeInfo, WorktreeMode};

pub fn print_success(msg: &str) {
    eprintln!("{} {msg}", "✓".green().bold());
}

pub fn print_error(msg: &str) {
    eprintln!("{} {msg}", "✗".red().bold());
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {msg}", "⚠".yellow().bold());
}

pub fn print_info(msg: &str) {
    eprintln!("{} {msg}", "─".dimmed());
}

/// Relative age of an RFC 3339 timestamp, e.g. "3h ago". Empty input or
/// unparseable timestamps render as "?".
pub fn format_age(created_at: &str) -> String {
    let Ok(then) = DateTime::parse_from_rfc3339(created_at) else {
        return "?".to_string();
    };
    let delta = Utc::now().signed_duration_since(then.with_timezone(&Utc));
    let minutes = delta.num_minutes();
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if minutes < 60 * 24 {
        format!("{}h ago", delta.num_hours())
    } else {
        format!("{}d ago", delta.num_days())
    }
}

fn status_colored(status: &str) -> colored::ColoredString {
    match status.trim_end() {
        "clean" => status.green(),
        "archived" | "?" | "" => status.dimmed(),
        _ => status.yellow(),
    }
}

/// The `ls`/`status` table. One row per worktree, widths computed from the
/// rows themselves.
pub fn print_worktree_table(worktrees: &[WorktreeInfo]) {
    if worktrees.is_empty() {
        println!("{}", "No worktrees".dimmed());
        return;
    }

    let name_w = worktrees
        .iter()
        .map(|wt| wt.name.len())
        .chain(std::iter::once(4))
        .max()
        .unwrap_or(4);
    let branch_w = worktrees
        .iter()
        .map(|wt| wt.branch.len())
        .chain(std::iter::once(6))
        .max()
        .unwrap_or(6);

    // Pad before coloring: ANSI escapes would otherwise count toward width.
    let header = format!(
        "{:<name_w$}  {:<branch_w$}  {:<10}  {:<8}  {}",
        "NAME", "BRANCH", "STATUS", "AGE", "MODE",
    );
    println!("{}", header.bold());
    println!("{}", "─".repeat(name_w + branch_w + 36).dimmed());

    for wt in worktrees {
        let mode = match wt.mode {
            WorktreeMode::Checkout => "checkout".cyan(),
            WorktreeMode::Worktree => "worktree".normal(),
        };
        let status = format!("{:<10}", if wt.status.is_empty() { "?" } else { &wt.status });
        println!(
            "{}  {:<branch_w$}  {}  {:<8}  {}",
            format!("{:<name_w$}", wt.name).bold(),
            wt.branch,
            status_colored(&status),
            format_age(&wt.created_at),
            mode,
        );
    }
}

/// A detailed multi-line block for one worktree, used by `status <name>`.
pub fn print_worktree_detail(wt: &WorktreeInfo) {
    println!("{}", wt.name.bold());
    println!("  {} {}", "branch:".dimmed(), wt.branch);
    println!("  {} {}", "base:".dimmed(), wt.base_branch);
    println!("  {} {}", "path:".dimmed(), wt.path);
    println!("  {} {}", "mode:".dimmed(), wt.mode);
    println!("  {} {}", "status:".dimmed(), status_colored(&wt.status));
    println!("  {} {}", "created:".dimmed(), format_age(&wt.created_at));
    if wt.pr != 0 {
        println!("  {} #{}", "pr:".dimmed(), wt.pr);
    }
    if wt.is_archived() {
        println!("  {} {}", "archived:".dimmed(), wt.archived);
    }
}
