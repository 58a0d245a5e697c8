//! Below command - insert a new PR beneath the current one

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, arrow, check, link};
use anstream::println;
use dialoguer::Confirm;
use prstack::error::{Error, Result};
use prstack::repo::ProcessRunner;
use prstack::stack::{BelowPlan, BelowRequest, execute_below, plan_below};
use std::path::PathBuf;

/// Options for the below command
#[derive(Debug, Clone, Default)]
pub struct BelowOptions {
    /// Name of the new branch
    pub new_branch: String,
    /// Title for the new PR
    pub title: String,
    /// Worktree directory for the new branch
    pub worktree: PathBuf,
    /// Files to copy (config default when empty)
    pub copy: Vec<String>,
    /// Run the configured hook in the new worktree
    pub hook: bool,
    /// Dry run - show what would be done without making changes
    pub dry_run: bool,
    /// Preview plan and prompt for confirmation before executing
    pub confirm: bool,
}

/// Run the below command
pub async fn run_below(ctx: &CommandContext, options: BelowOptions) -> Result<()> {
    let copy_files = if options.copy.is_empty() {
        ctx.config.below.copy_files.clone()
    } else {
        options.copy
    };

    let request = BelowRequest {
        new_branch: options.new_branch,
        pr_title: options.title,
        worktree_path: std::path::absolute(&options.worktree)?,
        copy_files,
        hook: options.hook.then(|| ctx.config.below.hook.clone()),
    };

    let plan = plan_below(&ctx.repository, &request).await?;

    if options.dry_run {
        print_plan(&plan);
        println!("{}", "Dry run complete".muted());
        return Ok(());
    }

    if options.confirm {
        print_plan(&plan);
        if !Confirm::new()
            .with_prompt("Proceed?")
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?
        {
            println!("{}", "Aborted".muted());
            return Ok(());
        }
        println!();
    }

    let progress = CliProgress::compact();
    let result = execute_below(&ctx.repository, &plan, &ProcessRunner, &progress).await?;

    println!();
    println!(
        "{} Created {}: {}",
        check(),
        link(&format!("PR #{}", result.new_pr.number()), result.new_pr.url()).emphasis(),
        result.new_pr.title()
    );
    println!(
        "  {} PR #{} now targets {}",
        arrow(),
        result.original_pr.number(),
        result.new_branch.name().accent()
    );
    println!(
        "  {} Worktree: {}",
        arrow(),
        result.worktree_path.display().to_string().accent()
    );
    Ok(())
}

fn print_plan(plan: &BelowPlan) {
    println!("{}:", "Plan".emphasis());
    for line in plan.to_string().lines() {
        println!("  {line}");
    }
    println!();
}
