//! Top-down propagation of merges through PR stacks
//!
//! Each PR goes through `Clean → Syncing → {Clean, Conflicted}` and, when a
//! merge conflicts, `Conflicted → {Resolved, Aborted}`. Conflict resolution
//! is delegated to a [`ConflictResolver`]; an abort stops the whole sync.

use super::tree::build_forest;
use crate::error::{Error, Result};
use crate::model::{MergeOutcome, PullRequestRef, Repository};
use crate::progress::ProgressCallback;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Sync state of a single PR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncState {
    /// Not being processed, or merged cleanly
    Clean,
    /// Pull and merge in progress
    Syncing,
    /// Merge left conflicts; waiting for the operator
    Conflicted,
    /// Operator resolved the conflict and the result was pushed
    Resolved,
    /// Operator gave up, or conflicts remained; the merge was aborted
    Aborted,
}

impl SyncState {
    /// Whether `self → next` is a legal transition
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Clean, Self::Syncing)
                | (Self::Syncing, Self::Clean | Self::Conflicted)
                | (Self::Conflicted, Self::Resolved | Self::Aborted)
        )
    }

    /// Move to `next`, failing with [`Error::Internal`] on an illegal transition
    pub fn transition(self, next: Self) -> Result<Self> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(Error::Internal(format!(
                "illegal sync transition {self} -> {next}"
            )))
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clean => "clean",
            Self::Syncing => "syncing",
            Self::Conflicted => "conflicted",
            Self::Resolved => "resolved",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Operator decision for a conflicted merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Conflicts were resolved and committed
    Resolved,
    /// Stop the sync
    Aborted,
}

/// Where a merge conflicted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictContext {
    /// Branch being merged into (left mid-merge)
    pub source_branch: String,
    /// Branch merged from
    pub destination_branch: String,
    /// Working directory holding the conflicted checkout
    pub working_dir: PathBuf,
}

/// Hands a conflicted merge to the operator and waits for the outcome
#[async_trait]
pub trait ConflictResolver: Send + Sync {
    /// Text shown before waiting, if any
    fn instructions(&self, context: &ConflictContext) -> Option<String> {
        let _ = context;
        None
    }

    /// Block until the operator resolves or aborts
    async fn resolve(&self, context: &ConflictContext) -> Result<Resolution>;
}

/// Outcome of a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Source branches merged and pushed without conflict
    pub synced: Vec<String>,
    /// Source branches whose conflicts the operator resolved
    pub resolved: Vec<String>,
    /// Source branches skipped for lack of a local checkout
    pub skipped: Vec<String>,
    /// Source branches merged locally whose push failed
    pub push_failed: Vec<String>,
    /// Source branch where the sync was aborted
    pub aborted_at: Option<String>,
}

impl SyncReport {
    /// True unless the sync was aborted
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.aborted_at.is_none()
    }
}

struct Tracker<'a> {
    branch: String,
    state: SyncState,
    progress: &'a dyn ProgressCallback,
}

impl Tracker<'_> {
    async fn advance(&mut self, next: SyncState) -> Result<()> {
        self.state = self.state.transition(next)?;
        debug!(branch = %self.branch, state = %self.state, "sync state");
        self.progress.on_sync_state(&self.branch, self.state).await;
        Ok(())
    }
}

/// Sync every locally checked-out PR, root toward leaves
///
/// A destination branch is always brought up to date before any PR stacked
/// on it. Returns a report whose [`SyncReport::is_success`] is false when an
/// unresolved conflict stopped the run; later PRs, siblings included, are
/// then left untouched.
pub async fn sync_stacks(
    repository: &dyn Repository,
    resolver: &dyn ConflictResolver,
    progress: &dyn ProgressCallback,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    progress.on_message("Fetching open pull requests...").await;
    let prs = repository.open_pull_requests().await?;
    if prs.is_empty() {
        progress.on_message("No open pull requests found.").await;
        return Ok(report);
    }

    let local_count = prs.iter().filter(|pr| pr.is_local()).count();
    progress
        .on_message(&format!(
            "Found {} open PR(s), {local_count} with local checkouts.",
            prs.len()
        ))
        .await;

    if local_count == 0 {
        progress.on_message("No local PRs to sync.").await;
        return Ok(report);
    }

    let forest = build_forest(&prs)?;
    let roots: Vec<&str> = forest.iter().map(|t| t.branch_name.as_str()).collect();
    progress
        .on_message(&format!("Starting sync from root(s): {}", roots.join(", ")))
        .await;

    for tree in &forest {
        for node in tree.descendants() {
            let Some(pr) = node.pull_request.as_ref() else {
                continue;
            };
            if !sync_one(pr, resolver, progress, &mut report).await? {
                return Ok(report);
            }
        }
    }

    Ok(report)
}

/// Sync one PR; `Ok(false)` means the run must stop
async fn sync_one(
    pr: &PullRequestRef,
    resolver: &dyn ConflictResolver,
    progress: &dyn ProgressCallback,
    report: &mut SyncReport,
) -> Result<bool> {
    let source = pr.source_branch();
    let destination = pr.destination_branch();
    let source_name = source.name().to_string();

    if !pr.is_local() {
        progress
            .on_message(&format!(
                "Skipping '{source_name}' (not checked out locally)"
            ))
            .await;
        report.skipped.push(source_name);
        return Ok(true);
    }

    let mut tracker = Tracker {
        branch: source_name.clone(),
        state: SyncState::Clean,
        progress,
    };

    tracker.advance(SyncState::Syncing).await?;
    progress
        .on_message(&format!(
            "Syncing '{source_name}' <- '{}'...",
            destination.name()
        ))
        .await;
    progress
        .on_message(&format!("  Pulling {}...", destination.name()))
        .await;

    match pr.merge_destination()? {
        MergeOutcome::Pushed => {
            tracker.advance(SyncState::Clean).await?;
            progress.on_message("  Merged and pushed.").await;
            report.synced.push(source_name);
            return Ok(true);
        }
        MergeOutcome::PushFailed => {
            tracker.advance(SyncState::Clean).await?;
            progress
                .on_warning(&format!("merged but push of '{source_name}' failed"))
                .await;
            report.push_failed.push(source_name);
            return Ok(true);
        }
        MergeOutcome::Conflicted => {}
    }

    tracker.advance(SyncState::Conflicted).await?;
    let context = ConflictContext {
        source_branch: source_name.clone(),
        destination_branch: destination.name().to_string(),
        working_dir: source.working_dir()?,
    };
    if let Some(text) = resolver.instructions(&context) {
        progress.on_message(&text).await;
    }

    let resolution = resolver.resolve(&context).await?;
    if resolution == Resolution::Aborted {
        progress.on_message("  Sync aborted by user.").await;
        source.abort_merge()?;
        tracker.advance(SyncState::Aborted).await?;
        report.aborted_at = Some(source_name);
        return Ok(false);
    }

    if source.has_merge_conflicts()? {
        progress
            .on_message("  Merge conflicts still present. Aborting sync.")
            .await;
        source.abort_merge()?;
        tracker.advance(SyncState::Aborted).await?;
        report.aborted_at = Some(source_name);
        return Ok(false);
    }

    progress.on_message("  Conflict resolved. Pushing...").await;
    let pushed = source.push()?;
    tracker.advance(SyncState::Resolved).await?;
    if pushed {
        progress.on_message("  Merged and pushed.").await;
        report.resolved.push(source_name);
    } else {
        progress
            .on_warning(&format!("push of '{source_name}' failed"))
            .await;
        report.push_failed.push(source_name);
    }
    Ok(true)
}
