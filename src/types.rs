//! Plain data types exchanged with the hosting platform

use serde::{Deserialize, Serialize};

/// A pull request as reported by the platform API
///
/// This is raw data; the capability-bearing view used by the stack engines is
/// [`crate::model::PullRequest`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestData {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Base (destination) branch name
    pub base_ref: String,
    /// Head (source) branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
    /// PR body, if any
    pub body: Option<String>,
    /// Whether PR is a draft
    pub is_draft: bool,
}

/// Repository metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepoInfo {
    /// Short name (`repo`)
    pub name: String,
    /// Full name (`owner/repo`)
    pub full_name: String,
    /// Description, if any
    pub description: Option<String>,
    /// Whether the repository is private
    pub private: bool,
    /// Web URL
    pub url: String,
}

impl RepoInfo {
    /// Minimal metadata derived from a platform config, used before (or
    /// instead of) fetching the real record.
    pub fn from_config(config: &PlatformConfig) -> Self {
        let host = config.host.as_deref().unwrap_or("github.com");
        Self {
            name: config.repo.clone(),
            full_name: format!("{}/{}", config.owner, config.repo),
            description: None,
            private: false,
            url: format!("https://{host}/{}/{}", config.owner, config.repo),
        }
    }
}

/// A git remote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitRemote {
    /// Remote name (e.g., "origin")
    pub name: String,
    /// Remote URL
    pub url: String,
}

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}

impl PlatformConfig {
    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
