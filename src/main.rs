use anyhow::Result;
use canopy::commands::{
    agent_cmd, archive, cd, checkout, config_cmd, env, init, ls, new, rm, run_init, shell_cmd,
    status, sync,
};
use canopy::display::print_error;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "Parallel git worktree manager for agent-driven development", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter .canopy.toml with detected defaults
    Init {
        /// Username used in branch names (default: git config user.name)
        #[arg(short, long)]
        user: Option<String>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Create a worktree on a new branch
    New {
        /// Worktree name (default: auto-generated)
        name: Option<String>,

        /// Full branch name (default: from branch_template)
        #[arg(short, long)]
        branch: Option<String>,

        /// Base branch to fork from (default: config base_branch)
        #[arg(long)]
        base: Option<String>,

        /// Branch type for the template: feature, fix, chore, ...
        #[arg(short = 't', long = "type")]
        branch_type: Option<String>,

        /// Skip dependency-install detection
        #[arg(long)]
        no_init: bool,

        /// Launch this agent in the new worktree
        #[arg(short, long)]
        agent: Option<String>,
    },

    /// Create a worktree for an existing branch (e.g. to review a PR)
    Checkout {
        /// Branch to check out
        branch: String,

        /// Worktree name (default: auto-generated)
        #[arg(short, long)]
        name: Option<String>,

        /// Base branch for sync (default: config base_branch)
        #[arg(long)]
        base: Option<String>,

        /// Associated pull request number
        #[arg(long)]
        pr: Option<u64>,

        /// Skip dependency-install detection
        #[arg(long)]
        no_init: bool,
    },

    /// List worktrees
    Ls {
        /// Include archived worktrees
        #[arg(short, long)]
        all: bool,

        /// JSON output
        #[arg(long)]
        json: bool,

        /// Print paths only, one per line
        #[arg(long)]
        paths: bool,
    },

    /// Remove a worktree, its branch, and its record
    Rm {
        /// Worktree name
        name: String,

        /// Remove even with uncommitted changes
        #[arg(short, long)]
        force: bool,

        /// Keep the branch after removing the worktree
        #[arg(long)]
        keep_branch: bool,
    },

    /// Print a worktree's path ("main" for the main repo)
    Cd {
        /// Worktree name
        name: String,
    },

    /// Show detailed status for one or all worktrees
    Status {
        /// Worktree name (default: all)
        name: Option<String>,
    },

    /// Rebase worktrees onto their base branch
    Sync {
        /// Worktree name (default: the one you are in)
        name: Option<String>,

        /// Sync every active worktree
        #[arg(long)]
        all: bool,
    },

    /// Archive a worktree (hide it from ls, keep the directory)
    Archive {
        /// Worktree name
        name: String,
    },

    /// Restore an archived worktree
    Unarchive {
        /// Worktree name
        name: String,
    },

    /// Manage env files across worktrees
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },

    /// Run dependency-install detection in a worktree
    RunInit {
        /// Worktree name (default: current directory)
        name: Option<String>,
    },

    /// Launch a coding agent inside a worktree
    Agent {
        #[command(subcommand)]
        command: Option<AgentCommands>,

        /// Worktree name (for direct launch without subcommand)
        name: Option<String>,

        /// Agent to launch (default: config default_agent)
        #[arg(short, long)]
        agent: Option<String>,

        /// Custom command to run instead of the agent binary
        #[arg(short, long)]
        command_line: Option<String>,

        /// Skip context-file injection
        #[arg(long)]
        no_context: bool,
    },

    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Shell integration
    Shell {
        #[command(subcommand)]
        command: ShellCommands,
    },
}

#[derive(Subcommand)]
enum EnvCommands {
    /// List discovered env files in the main repo
    Ls,

    /// Copy env files into worktrees
    Sync {
        /// Worktree name (default: all active)
        name: Option<String>,
    },

    /// Compare env files between the repo and a worktree
    Diff {
        /// Worktree name
        name: String,
    },
}

#[derive(Subcommand)]
enum AgentCommands {
    /// List known agents found on PATH
    Ls,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show {
        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Set a config field (dot-notation for sections, e.g. env.auto_copy)
    Set {
        key: String,
        value: String,
    },
}

#[derive(Subcommand)]
enum ShellCommands {
    /// Print the integration snippet for eval/source
    Init {
        /// bash, zsh, or fish (default: $SHELL)
        shell: Option<String>,
    },

    /// Append the integration snippet to your rc file
    Install {
        /// bash, zsh, or fish (default: $SHELL)
        shell: Option<String>,
    },

    /// Remove the integration snippet from your rc file
    Uninstall {
        /// bash, zsh, or fish (default: $SHELL)
        shell: Option<String>,
    },
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { user, force } => init::execute(user, force),
        Commands::New {
            name,
            branch,
            base,
            branch_type,
            no_init,
            agent,
        } => new::execute(name, branch, base, branch_type, no_init, agent),
        Commands::Checkout {
            branch,
            name,
            base,
            pr,
            no_init,
        } => checkout::execute(branch, name, base, pr, no_init),
        Commands::Ls { all, json, paths } => ls::execute(all, json, paths),
        Commands::Rm {
            name,
            force,
            keep_branch,
        } => rm::execute(name, force, keep_branch),
        Commands::Cd { name } => cd::execute(name),
        Commands::Status { name } => status::execute(name),
        Commands::Sync { name, all } => sync::execute(name, all),
        Commands::Archive { name } => archive::archive(name),
        Commands::Unarchive { name } => archive::unarchive(name),
        Commands::Env { command } => match command {
            EnvCommands::Ls => env::list(),
            EnvCommands::Sync { name } => env::sync(name),
            EnvCommands::Diff { name } => env::diff(name),
        },
        Commands::RunInit { name } => run_init::execute(name),
        Commands::Agent {
            command,
            name,
            agent,
            command_line,
            no_context,
        } => match (command, name) {
            (Some(AgentCommands::Ls), _) => agent_cmd::list(),
            (None, Some(name)) => agent_cmd::execute(name, agent, command_line, no_context),
            (None, None) => agent_cmd::list(),
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show { json } => config_cmd::show(json),
            ConfigCommands::Set { key, value } => config_cmd::set(key, value),
        },
        Commands::Shell { command } => match command {
            ShellCommands::Init { shell } => shell_cmd::init(shell),
            ShellCommands::Install { shell } => shell_cmd::install(shell),
            ShellCommands::Uninstall { shell } => shell_cmd::uninstall(shell),
        },
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CANOPY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
