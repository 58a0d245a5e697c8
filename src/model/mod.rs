//! Capability model for branches, pull requests and repositories
//!
//! The stack engines are written against these traits only. Concrete
//! variants differ in what they can do: a [`RemoteBranch`] carries a name and
//! nothing else, while a [`LocalBranch`](crate::repo::LocalBranch) is backed by
//! a working directory and supports merge/pull/push. Local-only operations on
//! a variant without a checkout fail with [`Error::Unsupported`].

mod github;
mod remote;

pub use github::{GitHubPullRequest, GitHubRepository};
pub use remote::RemoteBranch;

use crate::error::{Error, Result};
use crate::types::RepoInfo;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// What [`PullRequest::merge_destination`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Merged (or already up to date) and pushed
    Pushed,
    /// Merged, but pushing the source failed
    PushFailed,
    /// Merge conflicted; the source is left mid-merge
    Conflicted,
}

/// Shared handle to a branch
pub type BranchRef = Arc<dyn Branch>;

/// Shared handle to a pull request
pub type PullRequestRef = Arc<dyn PullRequest>;

/// A named branch, optionally backed by a local checkout
pub trait Branch: Send + Sync + fmt::Debug {
    /// Branch name
    fn name(&self) -> &str;

    /// Whether this branch has a working directory (main checkout or worktree)
    fn is_local(&self) -> bool;

    /// Merge `other` into this branch.
    ///
    /// `Ok(true)` when merged cleanly (including "already up to date"),
    /// `Ok(false)` on conflict, leaving this branch mid-merge.
    fn merge(&self, other: &dyn Branch) -> Result<bool> {
        let _ = other;
        Err(unsupported("merge", self.name()))
    }

    /// Pull from the remote. `Ok(true)` when new commits arrived.
    fn pull(&self) -> Result<bool> {
        Err(unsupported("pull", self.name()))
    }

    /// Push to the remote. `Ok(false)` when the push was rejected.
    fn push(&self) -> Result<bool> {
        Err(unsupported("push", self.name()))
    }

    /// Whether a merge is in progress with unresolved conflicts
    fn has_merge_conflicts(&self) -> Result<bool> {
        Err(unsupported("has_merge_conflicts", self.name()))
    }

    /// Abort an in-progress merge, returning the branch to a clean state
    fn abort_merge(&self) -> Result<()> {
        Err(unsupported("abort_merge", self.name()))
    }

    /// Working directory holding this branch's checkout
    fn working_dir(&self) -> Result<PathBuf> {
        Err(unsupported("working_dir", self.name()))
    }
}

fn unsupported(operation: &'static str, branch: &str) -> Error {
    Error::Unsupported {
        operation,
        branch: branch.to_string(),
    }
}

/// A source → destination branch pair under review
#[async_trait]
pub trait PullRequest: Send + Sync + fmt::Debug {
    /// PR number on the platform
    fn number(&self) -> u64;

    /// PR title
    fn title(&self) -> &str;

    /// PR description
    fn description(&self) -> Option<&str>;

    /// Web URL
    fn url(&self) -> &str;

    /// Head branch
    fn source_branch(&self) -> BranchRef;

    /// Base branch (changes after [`change_destination`](Self::change_destination))
    fn destination_branch(&self) -> BranchRef;

    /// Retarget this PR onto `new_destination`, remotely and in memory
    async fn change_destination(&self, new_destination: BranchRef) -> Result<()>;

    /// Whether both branches are backed by local checkouts
    fn is_local(&self) -> bool {
        self.source_branch().is_local() && self.destination_branch().is_local()
    }

    /// Bring the source branch up to date with the destination.
    ///
    /// Pulls the destination, merges it into the source and pushes the
    /// source. Returns `Ok(false)` when the merge conflicted; the source is
    /// then left mid-merge for manual resolution and nothing is pushed.
    fn sync(&self) -> Result<bool> {
        Ok(self.merge_destination()? != MergeOutcome::Conflicted)
    }

    /// [`Self::sync`], distinguishing a failed push from a clean one
    fn merge_destination(&self) -> Result<MergeOutcome> {
        if !self.is_local() {
            return Err(Error::NotLocal(self.source_branch().name().to_string()));
        }
        let source = self.source_branch();
        let destination = self.destination_branch();

        destination.pull()?;
        if !source.merge(destination.as_ref())? {
            return Ok(MergeOutcome::Conflicted);
        }
        if !source.push()? {
            warn!(branch = source.name(), "push failed after merge");
            return Ok(MergeOutcome::PushFailed);
        }
        Ok(MergeOutcome::Pushed)
    }
}

/// A hosted repository, optionally attached to a local working copy
#[async_trait]
pub trait Repository: Send + Sync {
    /// Repository metadata
    fn info(&self) -> &RepoInfo;

    /// All open PRs
    async fn open_pull_requests(&self) -> Result<Vec<PullRequestRef>>;

    /// Open a PR from `source` into `destination`
    async fn create_pr(
        &self,
        source: BranchRef,
        destination: BranchRef,
        title: &str,
    ) -> Result<PullRequestRef>;

    /// Every known branch, remote and local
    async fn branches(&self) -> Result<Vec<BranchRef>>;

    /// Branches with a local checkout; no two share a name
    fn local_branches(&self) -> Result<Vec<BranchRef>>;

    /// Branch checked out in the current working directory (`None` on detached HEAD)
    fn current_branch(&self) -> Result<Option<BranchRef>>;

    /// Whether the current working directory has uncommitted changes
    fn has_uncommitted_changes(&self) -> Result<bool>;

    /// Create `name` at the same commit as `from`
    fn create_branch(&self, name: &str, from: &dyn Branch) -> Result<BranchRef>;

    /// Check `branch` out into a new worktree at `path`.
    ///
    /// Returns the branch bound to the new working directory.
    fn create_worktree(&self, branch: &dyn Branch, path: &Path) -> Result<BranchRef>;

    /// Current working directory of the local checkout
    fn working_dir(&self) -> Result<PathBuf>;
}
