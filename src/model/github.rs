//! Platform-backed pull requests and repositories

use super::{Branch, BranchRef, PullRequest, PullRequestRef, RemoteBranch, Repository};
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::repo::{GitWorkspace, LocalBranch};
use crate::types::{PullRequestData, RepoInfo};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// A pull request fetched from (or opened on) GitHub
pub struct GitHubPullRequest {
    number: u64,
    title: String,
    description: Option<String>,
    url: String,
    source: BranchRef,
    destination: Mutex<BranchRef>,
    platform: Arc<dyn PlatformService>,
}

impl GitHubPullRequest {
    /// Wrap platform data with already-resolved branches
    pub fn new(
        data: PullRequestData,
        source: BranchRef,
        destination: BranchRef,
        platform: Arc<dyn PlatformService>,
    ) -> Self {
        Self {
            number: data.number,
            title: data.title,
            description: data.body,
            url: data.html_url,
            source,
            destination: Mutex::new(destination),
            platform,
        }
    }
}

impl fmt::Debug for GitHubPullRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubPullRequest")
            .field("number", &self.number)
            .field("title", &self.title)
            .field("source", &self.source.name())
            .field("destination", &self.destination_branch().name())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PullRequest for GitHubPullRequest {
    fn number(&self) -> u64 {
        self.number
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn source_branch(&self) -> BranchRef {
        Arc::clone(&self.source)
    }

    fn destination_branch(&self) -> BranchRef {
        let guard = self
            .destination
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    async fn change_destination(&self, new_destination: BranchRef) -> Result<()> {
        self.platform
            .update_pr_base(self.number, new_destination.name())
            .await?;
        let mut guard = self
            .destination
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = new_destination;
        Ok(())
    }
}

/// A GitHub repository, optionally attached to a local working copy
pub struct GitHubRepository {
    info: RepoInfo,
    platform: Arc<dyn PlatformService>,
    workspace: Option<GitWorkspace>,
}

impl GitHubRepository {
    /// Create a repository handle from known metadata
    pub fn new(
        info: RepoInfo,
        platform: Arc<dyn PlatformService>,
        workspace: Option<GitWorkspace>,
    ) -> Self {
        Self {
            info,
            platform,
            workspace,
        }
    }

    /// Fetch metadata from the platform and create a handle
    pub async fn connect(
        platform: Arc<dyn PlatformService>,
        workspace: Option<GitWorkspace>,
    ) -> Result<Self> {
        let info = platform.get_repo_info().await?;
        Ok(Self::new(info, platform, workspace))
    }

    /// Attached working copy, if any
    pub const fn workspace(&self) -> Option<&GitWorkspace> {
        self.workspace.as_ref()
    }

    fn require_workspace(&self) -> Result<&GitWorkspace> {
        self.workspace
            .as_ref()
            .ok_or_else(|| Error::NoLocalRepository(self.info.full_name.clone()))
    }

    fn checked_out(&self) -> Result<HashMap<String, LocalBranch>> {
        let Some(workspace) = self.workspace.as_ref() else {
            return Ok(HashMap::new());
        };
        Ok(workspace
            .local_branches()?
            .into_iter()
            .map(|b| (b.name().to_string(), b))
            .collect())
    }
}

fn resolve_branch(name: &str, local: &HashMap<String, LocalBranch>) -> BranchRef {
    local.get(name).map_or_else(
        || Arc::new(RemoteBranch::new(name)) as BranchRef,
        |b| Arc::new(b.clone()) as BranchRef,
    )
}

#[async_trait]
impl Repository for GitHubRepository {
    fn info(&self) -> &RepoInfo {
        &self.info
    }

    async fn open_pull_requests(&self) -> Result<Vec<PullRequestRef>> {
        let data = self.platform.list_open_prs().await?;
        let local = self.checked_out()?;
        debug!(
            prs = data.len(),
            local_branches = local.len(),
            "resolving open PRs"
        );

        Ok(data
            .into_iter()
            .map(|pr| {
                let source = resolve_branch(&pr.head_ref, &local);
                let destination = resolve_branch(&pr.base_ref, &local);
                Arc::new(GitHubPullRequest::new(
                    pr,
                    source,
                    destination,
                    Arc::clone(&self.platform),
                )) as PullRequestRef
            })
            .collect())
    }

    async fn create_pr(
        &self,
        source: BranchRef,
        destination: BranchRef,
        title: &str,
    ) -> Result<PullRequestRef> {
        let data = self
            .platform
            .create_pr(source.name(), destination.name(), title)
            .await?;
        Ok(Arc::new(GitHubPullRequest::new(
            data,
            source,
            destination,
            Arc::clone(&self.platform),
        )))
    }

    async fn branches(&self) -> Result<Vec<BranchRef>> {
        let mut names = self.platform.list_branches().await?;
        if let Some(workspace) = self.workspace.as_ref() {
            names.extend(workspace.branch_names()?);
        }
        let local = self.checked_out()?;

        let mut seen = HashSet::new();
        Ok(names
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .map(|name| resolve_branch(&name, &local))
            .collect())
    }

    fn local_branches(&self) -> Result<Vec<BranchRef>> {
        Ok(self
            .require_workspace()?
            .local_branches()?
            .into_iter()
            .map(|b| Arc::new(b) as BranchRef)
            .collect())
    }

    fn current_branch(&self) -> Result<Option<BranchRef>> {
        Ok(self
            .require_workspace()?
            .current_branch()?
            .map(|b| Arc::new(b) as BranchRef))
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        self.require_workspace()?.has_uncommitted_changes()
    }

    fn create_branch(&self, name: &str, from: &dyn Branch) -> Result<BranchRef> {
        let branch = self.require_workspace()?.create_branch(name, from.name())?;
        Ok(Arc::new(branch))
    }

    fn create_worktree(&self, branch: &dyn Branch, path: &Path) -> Result<BranchRef> {
        let branch = self
            .require_workspace()?
            .create_worktree(branch.name(), path)?;
        Ok(Arc::new(branch))
    }

    fn working_dir(&self) -> Result<PathBuf> {
        Ok(self.require_workspace()?.root().to_path_buf())
    }
}
