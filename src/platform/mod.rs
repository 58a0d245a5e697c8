//! Platform services for GitHub
//!
//! Provides the PR and branch operations the stack engines need from the
//! hosting platform.

mod detection;
mod factory;
mod github;

pub use detection::{parse_repo_info, parse_repo_name};
pub use factory::create_platform_service;
pub use github::{GitHubService, github_client, list_user_repos};

use crate::error::Result;
use crate::types::{PlatformConfig, PullRequestData, RepoInfo};
use async_trait::async_trait;

/// Platform service trait for PR operations
///
/// Implemented by [`GitHubService`] and by the mock platform in the test
/// suite.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// List every open PR in the repository
    async fn list_open_prs(&self) -> Result<Vec<PullRequestData>>;

    /// Create a new PR with default options (non-draft, no body).
    ///
    /// This is a convenience method that delegates to [`create_pr_with_options`]
    /// with `body: None` and `draft: false`. Implementors should override
    /// `create_pr_with_options`, not this method.
    ///
    /// [`create_pr_with_options`]: Self::create_pr_with_options
    async fn create_pr(&self, head: &str, base: &str, title: &str) -> Result<PullRequestData> {
        self.create_pr_with_options(head, base, title, None, false)
            .await
    }

    /// Create a new PR with explicit body and draft options.
    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequestData>;

    /// Update the base branch of an existing PR
    async fn update_pr_base(&self, pr_number: u64, new_base: &str) -> Result<PullRequestData>;

    /// Names of all branches on the platform
    async fn list_branches(&self) -> Result<Vec<String>>;

    /// Fetch repository metadata
    async fn get_repo_info(&self) -> Result<RepoInfo>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
