//! Shared command context for CLI commands
//!
//! Extracts common setup code shared by tree, sync and below.

use prstack::config::{Config, load_config};
use prstack::error::{Error, Result};
use prstack::model::GitHubRepository;
use prstack::platform::{create_platform_service, parse_repo_info, parse_repo_name};
use prstack::repo::{GitWorkspace, select_remote};
use std::path::Path;
use tracing::debug;

/// Shared context for CLI commands that interact with the platform
///
/// This struct encapsulates the common setup:
/// - Opening the git workspace (optional when `--repo` is given)
/// - Loading configuration
/// - Selecting and validating the remote
/// - Detecting the repository and creating the platform service
pub struct CommandContext {
    /// Repository handle used by the engines
    pub repository: GitHubRepository,
    /// Effective configuration
    pub config: Config,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// `repo` (`owner/name`) overrides detection from the remote URL and
    /// allows running outside a checkout.
    pub async fn new(path: &Path, repo: Option<&str>, remote: Option<&str>) -> Result<Self> {
        let workspace = match GitWorkspace::open(path) {
            Ok(ws) => Some(ws),
            Err(Error::NotARepository(_)) if repo.is_some() => None,
            Err(e) => return Err(e),
        };

        let config = load_config(workspace.as_ref().map(GitWorkspace::root))?.config;

        let mut remote_name = None;
        let mut remote_url = None;
        let workspace = match workspace {
            Some(ws) => {
                let remotes = ws.git_remotes()?;
                let name = select_remote(&remotes, remote.or(config.remote.as_deref()))?;
                remote_url = remotes
                    .iter()
                    .find(|r| r.name == name)
                    .map(|r| r.url.clone());
                remote_name = Some(name.clone());
                Some(ws.with_remote(name))
            }
            None => None,
        };

        let platform_config = match (repo, remote_url) {
            (Some(name), _) => parse_repo_name(name)?,
            (None, Some(url)) => parse_repo_info(&url)?,
            (None, None) => return Err(Error::NoSupportedRemotes),
        };
        debug!(repo = %platform_config.full_name(), remote = ?remote_name, "resolved repository");

        let platform = create_platform_service(&platform_config).await?;
        let repository = GitHubRepository::connect(platform, workspace).await?;

        Ok(Self { repository, config })
    }
}
