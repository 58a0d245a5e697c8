//! Below: splice a new PR underneath the current one
//!
//! Two phases:
//! 1. Plan - validate and describe every step (no mutation)
//! 2. Execute - create branch, worktree and PR, then retarget
//!
//! A dry run stops after phase 1 and returns the plan.

mod execute;
mod plan;

pub use execute::{BelowResult, execute_below};
pub use plan::{BelowPlan, BelowRequest, BelowStep, plan_below};

use crate::error::Result;
use crate::model::Repository;
use crate::progress::ProgressCallback;
use crate::repo::CommandRunner;

/// What a below call produced
#[derive(Debug, Clone)]
pub enum BelowOutcome {
    /// The splice was carried out
    Executed(BelowResult),
    /// Dry run: the plan that would have been carried out
    DryRun(BelowPlan),
}

/// Plan and, unless `dry_run`, execute a below operation
pub async fn below(
    repository: &dyn Repository,
    request: &BelowRequest,
    dry_run: bool,
    runner: &dyn CommandRunner,
    progress: &dyn ProgressCallback,
) -> Result<BelowOutcome> {
    let plan = plan_below(repository, request).await?;
    if dry_run {
        return Ok(BelowOutcome::DryRun(plan));
    }
    let result = execute_below(repository, &plan, runner, progress).await?;
    Ok(BelowOutcome::Executed(result))
}
