//! Repository detection from git remote URLs

use crate::error::{Error, Result};
use crate::types::PlatformConfig;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// `user@host:path` (scp-like ssh syntax)
static SCP_URL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+@([A-Za-z0-9.-]+):(.+)$").ok());

const GITHUB_HOST: &str = "github.com";

/// Parse `owner/repo` and host from a remote URL
///
/// Accepts scp-like ssh (`git@github.com:owner/repo.git`), `ssh://` and
/// `https://` forms. `github.com` yields `host: None`; any other host is
/// treated as GitHub Enterprise.
pub fn parse_repo_info(url: &str) -> Result<PlatformConfig> {
    let url = url.trim();
    let (host, path) = split_host_path(url)?;

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut segments = path.split('/').filter(|s| !s.is_empty());

    let (Some(owner), Some(repo), None) = (segments.next(), segments.next(), segments.next())
    else {
        return Err(Error::InvalidRemoteUrl(url.to_string()));
    };

    let host = if host.eq_ignore_ascii_case(GITHUB_HOST) {
        None
    } else {
        Some(host)
    };

    Ok(PlatformConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host,
    })
}

/// Parse an explicit `owner/name` repository argument (github.com)
pub fn parse_repo_name(name: &str) -> Result<PlatformConfig> {
    match name.trim().split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok(PlatformConfig {
                owner: owner.to_string(),
                repo: repo.to_string(),
                host: None,
            })
        }
        _ => Err(Error::Platform(format!(
            "invalid repository '{name}': expected owner/name"
        ))),
    }
}

fn split_host_path(url: &str) -> Result<(String, String)> {
    if !url.contains("://")
        && let Some(caps) = SCP_URL.as_ref().and_then(|re| re.captures(url))
    {
        return Ok((caps[1].to_string(), caps[2].to_string()));
    }

    let parsed = Url::parse(url).map_err(|_| Error::InvalidRemoteUrl(url.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::InvalidRemoteUrl(url.to_string()))?;
    Ok((host.to_string(), parsed.path().to_string()))
}
