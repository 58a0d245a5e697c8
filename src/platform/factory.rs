//! Platform service factory

use crate::auth::get_github_auth;
use crate::error::Result;
use crate::platform::{GitHubService, PlatformService};
use crate::types::PlatformConfig;
use std::sync::Arc;

/// Create an authenticated platform service for `config`
pub async fn create_platform_service(config: &PlatformConfig) -> Result<Arc<dyn PlatformService>> {
    let auth = get_github_auth(config.host.as_deref()).await?;
    let service = GitHubService::new(
        &auth.token,
        config.owner.clone(),
        config.repo.clone(),
        config.host.clone(),
    )?;
    Ok(Arc::new(service))
}
