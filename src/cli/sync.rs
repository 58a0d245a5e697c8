//! Sync command - merge each destination into its stacked PRs

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, Stylize};
use anstream::println;
use prstack::error::Result;
use prstack::stack::{ShellResolver, SyncReport, sync_stacks};

/// Options for the sync command
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Report every state change
    pub verbose: bool,
}

/// Run the sync command; `Ok(false)` when the sync was aborted
pub async fn run_sync(ctx: &CommandContext, options: SyncOptions) -> Result<bool> {
    let progress = if options.verbose {
        CliProgress::verbose()
    } else {
        CliProgress::compact()
    };
    let resolver = ShellResolver::from_config(&ctx.config.sync);

    let report = sync_stacks(&ctx.repository, &resolver, &progress).await?;
    print_summary(&report);
    Ok(report.is_success())
}

fn print_summary(report: &SyncReport) {
    let touched = report.synced.len()
        + report.resolved.len()
        + report.skipped.len()
        + report.push_failed.len();
    if touched == 0 && report.is_success() {
        return;
    }

    println!();
    if let Some(branch) = &report.aborted_at {
        println!(
            "{} {}",
            "Sync stopped at".warn(),
            branch.accent()
        );
        return;
    }

    println!(
        "{} {} synced, {} resolved, {} skipped",
        format!("{CHECK} Sync complete:").success(),
        report.synced.len().accent(),
        report.resolved.len().accent(),
        report.skipped.len().accent()
    );
    if !report.push_failed.is_empty() {
        println!(
            "{} {}",
            "Not pushed:".warn(),
            report.push_failed.join(", ").accent()
        );
    }
}
