//! Below execution - effectful operations

use super::plan::BelowPlan;
use crate::error::{Error, Result};
use crate::model::{BranchRef, PullRequestRef, Repository};
use crate::progress::ProgressCallback;
use crate::repo::{CommandRunner, ExternalCommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Result of a completed below operation
#[derive(Debug, Clone)]
pub struct BelowResult {
    /// The inserted branch, bound to its worktree
    pub new_branch: BranchRef,
    /// PR from the new branch into the original destination
    pub new_pr: PullRequestRef,
    /// The original PR, now targeting the new branch
    pub original_pr: PullRequestRef,
    /// Worktree directory of the new branch
    pub worktree_path: PathBuf,
}

/// Execute a below plan
///
/// Stops at the first failing step. A hook that is missing or exits
/// non-zero only produces a warning.
pub async fn execute_below(
    repository: &dyn Repository,
    plan: &BelowPlan,
    runner: &dyn CommandRunner,
    progress: &dyn ProgressCallback,
) -> Result<BelowResult> {
    let original = plan.original_destination_name();

    progress
        .on_message(&format!(
            "Creating branch '{}' from '{original}'...",
            plan.new_branch_name
        ))
        .await;
    let created =
        repository.create_branch(&plan.new_branch_name, plan.original_destination.as_ref())?;

    progress
        .on_message(&format!(
            "Creating worktree at {}...",
            plan.worktree_path.display()
        ))
        .await;
    let new_branch = repository.create_worktree(created.as_ref(), &plan.worktree_path)?;

    progress
        .on_message(&format!("Pushing '{}'...", plan.new_branch_name))
        .await;
    if !new_branch.push()? {
        return Err(Error::PushFailed(plan.new_branch_name.clone()));
    }

    progress
        .on_message(&format!(
            "Creating PR '{}' -> '{original}'...",
            plan.new_branch_name
        ))
        .await;
    let new_pr = repository
        .create_pr(
            BranchRef::clone(&new_branch),
            BranchRef::clone(&plan.original_destination),
            &plan.pr_title,
        )
        .await?;

    progress
        .on_message(&format!(
            "Retargeting PR #{} to '{}'...",
            plan.current_pr.number(),
            plan.new_branch_name
        ))
        .await;
    plan.current_pr
        .change_destination(BranchRef::clone(&new_branch))
        .await?;

    if !plan.copy_files.is_empty() {
        for file in &plan.copy_files {
            copy_into_worktree(&plan.source_dir, &plan.worktree_path, file)?;
        }
        progress
            .on_message(&format!("Copied {}", plan.copy_files.join(", ")))
            .await;
    }

    if let Some(hook) = &plan.hook {
        run_hook(hook, &plan.worktree_path, runner, progress).await?;
    }

    Ok(BelowResult {
        new_branch,
        new_pr,
        original_pr: PullRequestRef::clone(&plan.current_pr),
        worktree_path: plan.worktree_path.clone(),
    })
}

fn copy_into_worktree(source_dir: &Path, worktree: &Path, file: &str) -> Result<()> {
    let from = source_dir.join(file);
    let to = worktree.join(file);
    if !from.exists() {
        return Err(Error::CopyFileMissing(file.to_string()));
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    debug!(from = %from.display(), to = %to.display(), "copying file");
    fs::copy(&from, &to)?;
    Ok(())
}

async fn run_hook(
    hook: &[String],
    dir: &Path,
    runner: &dyn CommandRunner,
    progress: &dyn ProgressCallback,
) -> Result<()> {
    let Some(command) = ExternalCommand::from_argv(hook) else {
        progress.on_warning("hook command is empty").await;
        return Ok(());
    };
    let command = command.current_dir(dir).env_remove("VIRTUAL_ENV");

    progress.on_message(&format!("Running '{command}'...")).await;
    match runner.output(&command) {
        Ok(output) if output.success() => Ok(()),
        Ok(output) => {
            let status = output
                .code
                .map_or_else(|| "a signal".to_string(), |c| format!("status {c}"));
            progress
                .on_warning(&format!("'{command}' exited with {status}"))
                .await;
            Ok(())
        }
        Err(Error::CommandNotFound(program)) => {
            progress
                .on_warning(&format!("'{program}' command not found"))
                .await;
            Ok(())
        }
        Err(e) => Err(e),
    }
}
