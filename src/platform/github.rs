//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{PlatformConfig, PullRequestData, RepoInfo};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::params::State;
use tracing::debug;

const PER_PAGE: u8 = 100;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `host` selects a GitHub Enterprise instance (`None` for github.com).
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let client = github_client(token, host.as_deref())?;

        Ok(Self {
            client,
            config: PlatformConfig { owner, repo, host },
        })
    }
}

/// Repositories the authenticated user can access
pub async fn list_user_repos(token: &str, host: Option<&str>) -> Result<Vec<RepoInfo>> {
    debug!("listing repositories for authenticated user");
    let client = github_client(token, host)?;
    let page = client
        .current()
        .list_repos_for_authenticated_user()
        .per_page(PER_PAGE)
        .send()
        .await?;
    let repos = client.all_pages(page).await?;

    let result: Vec<RepoInfo> = repos.iter().map(repo_info_from_octocrab).collect();
    debug!(count = result.len(), "listed repositories");
    Ok(result)
}

/// Build an authenticated octocrab client, optionally for an enterprise host
pub fn github_client(token: &str, host: Option<&str>) -> Result<Octocrab> {
    let mut builder = Octocrab::builder().personal_token(token.to_string());

    if let Some(h) = host {
        let base_url = format!("https://{h}/api/v3");
        builder = builder
            .base_uri(&base_url)
            .map_err(|e| Error::GitHubApi(e.to_string()))?;
    }

    builder.build().map_err(|e| Error::GitHubApi(e.to_string()))
}

/// Helper to convert octocrab PR to our `PullRequestData` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequestData {
    PullRequestData {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        body: pr.body.clone(),
        is_draft: pr.draft.unwrap_or(false),
    }
}

fn repo_info_from_octocrab(repo: &octocrab::models::Repository) -> RepoInfo {
    RepoInfo {
        name: repo.name.clone(),
        full_name: repo
            .full_name
            .clone()
            .unwrap_or_else(|| repo.name.clone()),
        description: repo.description.clone(),
        private: repo.private.unwrap_or(false),
        url: repo
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn list_open_prs(&self) -> Result<Vec<PullRequestData>> {
        debug!(repo = %self.config.full_name(), "listing open PRs");
        let page = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .state(State::Open)
            .per_page(PER_PAGE)
            .send()
            .await?;
        let prs = self.client.all_pages(page).await?;

        let result: Vec<PullRequestData> = prs.iter().map(pr_from_octocrab).collect();
        debug!(count = result.len(), "listed open PRs");
        Ok(result)
    }

    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequestData> {
        debug!(head, base, draft, "creating PR");
        let pulls = self.client.pulls(&self.config.owner, &self.config.repo);
        let mut builder = pulls.create(title, head, base).draft(draft);

        if let Some(body_text) = body {
            builder = builder.body(body_text);
        }

        let pr = builder.send().await?;

        let result = pr_from_octocrab(&pr);
        debug!(pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn update_pr_base(&self, pr_number: u64, new_base: &str) -> Result<PullRequestData> {
        debug!(pr_number, new_base, "updating PR base");
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .update(pr_number)
            .base(new_base)
            .send()
            .await?;

        debug!(pr_number, "updated PR base");
        Ok(pr_from_octocrab(&pr))
    }

    async fn list_branches(&self) -> Result<Vec<String>> {
        debug!(repo = %self.config.full_name(), "listing branches");
        let page = self
            .client
            .repos(&self.config.owner, &self.config.repo)
            .list_branches()
            .per_page(PER_PAGE)
            .send()
            .await?;
        let branches = self.client.all_pages(page).await?;

        let result: Vec<String> = branches.into_iter().map(|b| b.name).collect();
        debug!(count = result.len(), "listed branches");
        Ok(result)
    }

    async fn get_repo_info(&self) -> Result<RepoInfo> {
        debug!(repo = %self.config.full_name(), "fetching repository");
        let repo = self
            .client
            .repos(&self.config.owner, &self.config.repo)
            .get()
            .await?;
        Ok(repo_info_from_octocrab(&repo))
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
