//! Repos and auth commands

use crate::cli::style::{Stylize, check, link};
use anstream::println;
use prstack::auth::{get_github_auth, test_github_auth};
use prstack::error::Result;
use prstack::platform::list_user_repos;

/// List repositories the authenticated user can access
pub async fn run_repos(host: Option<&str>) -> Result<()> {
    let auth = get_github_auth(host).await?;
    let repos = list_user_repos(&auth.token, host).await?;

    if repos.is_empty() {
        println!("{}", "No repositories found.".muted());
        return Ok(());
    }

    for repo in &repos {
        let visibility = if repo.private { " (private)" } else { "" };
        println!(
            "{}{}",
            link(&repo.full_name, &repo.url),
            visibility.muted()
        );
    }
    Ok(())
}

/// Check that a GitHub token is available and accepted
pub async fn run_auth(host: Option<&str>) -> Result<()> {
    let auth = get_github_auth(host).await?;
    println!("Token found via {}", auth.source.to_string().accent());

    let login = test_github_auth(&auth).await?;
    println!("{} Authenticated as {}", check(), login.emphasis());
    Ok(())
}
