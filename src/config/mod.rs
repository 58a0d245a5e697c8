//! User and repository configuration
//!
//! Read from `<config dir>/prstack/config.toml` or, when present, the
//! repository-local `<git common dir>/prstack/config.toml`, which takes
//! precedence as a whole.

mod storage;

pub use storage::{
    LoadedConfig, load_config, load_layered, repo_config_path, resolve_git_dir, save_config,
    user_config_path,
};

use serde::{Deserialize, Serialize};

/// Default render width when nothing else supplies one
pub const DEFAULT_WIDTH: usize = 80;

/// prstack configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preferred remote name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    /// Render width for `tree`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
    /// Settings for `below`
    pub below: BelowConfig,
    /// Settings for `sync`
    pub sync: SyncConfig,
}

/// Settings for the `below` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BelowConfig {
    /// Hook run in a new worktree when `--hook` is given
    pub hook: Vec<String>,
    /// Files copied into a new worktree when no `--copy` is given
    pub copy_files: Vec<String>,
}

impl Default for BelowConfig {
    fn default() -> Self {
        Self {
            hook: vec!["direnv".to_string(), "allow".to_string()],
            copy_files: Vec::new(),
        }
    }
}

/// Settings for the `sync` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Conflict shell (defaults to `$SHELL`, then `/bin/sh`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
    /// Variables removed from the conflict shell's environment
    pub scrub_env: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            shell: None,
            scrub_env: vec!["VIRTUAL_ENV".to_string()],
        }
    }
}

impl Config {
    /// Render width: explicit value, else the terminal's column count, else
    /// config, else [`DEFAULT_WIDTH`]
    pub fn render_width(&self, explicit: Option<usize>, terminal: Option<usize>) -> usize {
        explicit
            .or(terminal)
            .or(self.width)
            .filter(|w| *w > 0)
            .unwrap_or(DEFAULT_WIDTH)
    }
}
