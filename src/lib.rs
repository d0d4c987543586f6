pub mod agent;
pub mod commands;
pub mod config;
pub mod display;
pub mod envfiles;
pub mod error;
pub mod git;
pub mod home;
pub mod init_deps;
pub mod models;
pub mod names;
pub mod reconcile;
pub mod shell;
pub mod state;
pub mod worktree;
