//! Persistence for configuration in `<git common dir>/prstack/` and the user
//! config directory.

use super::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name for prstack files
const PRSTACK_DIR: &str = "prstack";

/// Filename for configuration
const CONFIG_FILE: &str = "config.toml";

/// Resolve the git directory shared by every worktree of a repository.
///
/// In linked worktrees `.git` is a plain file (`gitdir: <path>`) pointing at
/// `<common>/.git/worktrees/<name>`, whose `commondir` file in turn points
/// back at the shared directory. Both indirections are followed.
///
/// Falls back to `<root>/.git` if resolution fails.
pub fn resolve_git_dir(workspace_root: &Path) -> PathBuf {
    let dot_git = workspace_root.join(".git");

    if !dot_git.is_file() {
        return dot_git;
    }

    let Some(gitdir) = fs::read_to_string(&dot_git)
        .ok()
        .and_then(|c| c.trim().strip_prefix("gitdir:").map(|p| p.trim().to_string()))
    else {
        // Pointer file exists but is invalid/unreadable - return as-is to surface error
        return dot_git;
    };

    let gitdir = workspace_root.join(gitdir);
    let common = fs::read_to_string(gitdir.join("commondir"))
        .map_or_else(|_| gitdir.clone(), |c| gitdir.join(c.trim()));

    fs::canonicalize(&common).unwrap_or(common)
}

/// Path of the repository-local config file
pub fn repo_config_path(workspace_root: &Path) -> PathBuf {
    resolve_git_dir(workspace_root)
        .join(PRSTACK_DIR)
        .join(CONFIG_FILE)
}

/// Path of the user config file, if the platform has a config directory
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(PRSTACK_DIR).join(CONFIG_FILE))
}

/// Effective configuration and the file it came from
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Parsed configuration (defaults if no file exists)
    pub config: Config,
    /// File the configuration was read from
    pub path: Option<PathBuf>,
}

fn read_config(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

    Ok(Some(config))
}

/// Load the repository file if present, else the user file, else defaults
pub fn load_layered(repo_path: Option<&Path>, user_path: Option<&Path>) -> Result<LoadedConfig> {
    for path in [repo_path, user_path].into_iter().flatten() {
        if let Some(config) = read_config(path)? {
            debug!(path = %path.display(), "loaded config");
            return Ok(LoadedConfig {
                config,
                path: Some(path.to_path_buf()),
            });
        }
    }
    Ok(LoadedConfig::default())
}

/// Load configuration for a workspace (or user config only without one)
pub fn load_config(workspace_root: Option<&Path>) -> Result<LoadedConfig> {
    let repo_path = workspace_root.map(repo_config_path);
    let user_path = user_config_path();
    load_layered(repo_path.as_deref(), user_path.as_deref())
}

/// Save configuration to `path`.
///
/// Creates the parent directory if it doesn't exist.
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.exists()
    {
        fs::create_dir_all(dir)
            .map_err(|e| Error::Config(format!("failed to create {}: {e}", dir.display())))?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;

    let content_with_header = format!(
        "# prstack configuration\n\
         # remote = \"origin\"   preferred remote\n\
         # width = 120          render width for `prstack tree`\n\n{content}"
    );

    fs::write(path, content_with_header)
        .map_err(|e| Error::Config(format!("failed to write {}: {e}", path.display())))?;

    Ok(())
}
