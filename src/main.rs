//! prstack CLI - stacked pull requests for GitHub

mod cli;

use clap::{Parser, Subcommand};
use cli::below::{BelowOptions, run_below};
use cli::config::run_config;
use cli::context::CommandContext;
use cli::repos::{run_auth, run_repos};
use cli::sync::{SyncOptions, run_sync};
use cli::tree::{TreeOptions, run_tree};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Stacked pull requests for GitHub
#[derive(Parser, Debug)]
#[command(name = "prstack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the repository (defaults to the current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Repository as owner/name (overrides detection from the remote)
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Git remote to use (defaults to config, then origin)
    #[arg(long, global = true)]
    remote: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the PR dependency tree
    Tree {
        /// Indented tree instead of the horizontal diagram
        #[arg(long, conflicts_with = "json")]
        indent: bool,

        /// Print the forest as JSON
        #[arg(long)]
        json: bool,

        /// Render width in columns
        #[arg(long, env = "COLUMNS")]
        width: Option<usize>,
    },

    /// Merge each destination branch into the PRs stacked on it, root first
    Sync,

    /// Insert a new branch and PR beneath the current branch's PR
    Below {
        /// Name of the new branch
        new_branch: String,

        /// Title for the new PR
        #[arg(short, long)]
        title: String,

        /// Directory for the new branch's worktree
        #[arg(short, long)]
        worktree: PathBuf,

        /// File to copy into the new worktree (repeatable)
        #[arg(long = "copy", value_name = "FILE")]
        copy: Vec<String>,

        /// Run the configured hook (default `direnv allow`) in the new worktree
        #[arg(long)]
        hook: bool,

        /// Show what would be done without making changes
        #[arg(long, conflicts_with = "confirm")]
        dry_run: bool,

        /// Show the plan and ask before executing
        #[arg(long)]
        confirm: bool,
    },

    /// List repositories you can access
    Repos {
        /// GitHub Enterprise host
        #[arg(long)]
        host: Option<String>,
    },

    /// Check GitHub authentication
    Auth {
        /// GitHub Enterprise host
        #[arg(long)]
        host: Option<String>,
    },

    /// Show the effective configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("prstack=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let path = cli.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let repo = cli.repo.as_deref();
    let remote = cli.remote.as_deref();

    match cli.command {
        Commands::Tree {
            indent,
            json,
            width,
        } => {
            let ctx = CommandContext::new(&path, repo, remote).await?;
            run_tree(
                &ctx,
                TreeOptions {
                    indent,
                    json,
                    width,
                },
            )
            .await?;
        }
        Commands::Sync => {
            let ctx = CommandContext::new(&path, repo, remote).await?;
            let options = SyncOptions {
                verbose: cli.verbose,
            };
            if !run_sync(&ctx, options).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Below {
            new_branch,
            title,
            worktree,
            copy,
            hook,
            dry_run,
            confirm,
        } => {
            let ctx = CommandContext::new(&path, repo, remote).await?;
            run_below(
                &ctx,
                BelowOptions {
                    new_branch,
                    title,
                    worktree,
                    copy,
                    hook,
                    dry_run,
                    confirm,
                },
            )
            .await?;
        }
        Commands::Repos { host } => run_repos(host.as_deref()).await?,
        Commands::Auth { host } => run_auth(host.as_deref()).await?,
        Commands::Config { init } => run_config(&path, init)?,
    }

    Ok(ExitCode::SUCCESS)
}
