//! GitHub token discovery

use crate::auth::AuthSource;
use crate::error::{Error, Result};
use crate::platform::github_client;
use tokio::process::Command;
use tracing::debug;

/// Environment variables checked for a token, in order
pub const TOKEN_ENV_VARS: [&str; 3] = ["GITHUB_PERSONAL_ACCESS_TOKEN", "GITHUB_TOKEN", "GH_TOKEN"];

/// Resolved GitHub credentials
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// API token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// Host the token is for (`None` for github.com)
    pub host: Option<String>,
}

/// First non-empty token among [`TOKEN_ENV_VARS`], using `lookup` to read variables
pub fn token_from_env<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Find a GitHub token: environment first, then `gh auth token`
pub async fn get_github_auth(host: Option<&str>) -> Result<GitHubAuthConfig> {
    if let Some(token) = token_from_env(|name| std::env::var(name).ok()) {
        debug!("using GitHub token from environment");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
            host: host.map(String::from),
        });
    }

    let mut cmd = Command::new("gh");
    cmd.args(["auth", "token"]);
    if let Some(h) = host {
        cmd.args(["--hostname", h]);
    }

    let output = cmd.output().await.map_err(|e| {
        debug!(error = %e, "gh CLI unavailable");
        no_token_error()
    })?;

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !output.status.success() || token.is_empty() {
        return Err(no_token_error());
    }

    debug!("using GitHub token from gh CLI");
    Ok(GitHubAuthConfig {
        token,
        source: AuthSource::Cli,
        host: host.map(String::from),
    })
}

/// Verify the token by fetching the authenticated user; returns the login
pub async fn test_github_auth(config: &GitHubAuthConfig) -> Result<String> {
    let client = github_client(&config.token, config.host.as_deref())?;
    let user = client
        .current()
        .user()
        .await
        .map_err(|e| Error::Auth(format!("token rejected: {e}")))?;
    Ok(user.login)
}

fn no_token_error() -> Error {
    Error::Auth(format!(
        "No GitHub token found. Set {} or run 'gh auth login'.",
        TOKEN_ENV_VARS.join(", ")
    ))
}
