//! Conflict resolution in an interactive shell

use super::sync::{ConflictContext, ConflictResolver, Resolution};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::repo::{CommandRunner, ExternalCommand, ProcessRunner};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Shell used when neither config nor `$SHELL` names one
pub const FALLBACK_SHELL: &str = "/bin/sh";

/// Marker variable set inside the conflict shell
pub const CONFLICT_ENV_VAR: &str = "PRSTACK_MERGE_CONFLICT";

/// Drops the operator into a shell at the conflicted working directory
///
/// Exit status 0 means resolved; anything else aborts the sync.
#[derive(Debug, Clone)]
pub struct ShellResolver {
    runner: Arc<dyn CommandRunner>,
    shell: String,
    scrub_env: Vec<String>,
}

impl ShellResolver {
    /// Create a resolver running `shell`, removing `scrub_env` from its environment
    pub fn new(runner: Arc<dyn CommandRunner>, shell: String, scrub_env: Vec<String>) -> Self {
        Self {
            runner,
            shell,
            scrub_env,
        }
    }

    /// Configured shell, else `$SHELL`, else [`FALLBACK_SHELL`]
    pub fn from_config(config: &SyncConfig) -> Self {
        let shell = config
            .shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| FALLBACK_SHELL.to_string());
        Self::new(Arc::new(ProcessRunner), shell, config.scrub_env.clone())
    }

    /// Shell program
    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// The command run for `context`
    pub fn command(&self, context: &ConflictContext) -> ExternalCommand {
        self.scrub_env.iter().fold(
            ExternalCommand::new(&self.shell)
                .current_dir(&context.working_dir)
                .env(CONFLICT_ENV_VAR, "1"),
            |cmd, var| cmd.env_remove(var),
        )
    }
}

#[async_trait]
impl ConflictResolver for ShellResolver {
    fn instructions(&self, context: &ConflictContext) -> Option<String> {
        Some(format!(
            "\n  Merge conflict detected!\n\
             \x20 Dropping you into a shell at: {}\n\
             \x20 Resolve the conflicts, then 'git add' and 'git commit'.\n\
             \x20 Type 'exit' when done to continue syncing.\n\
             \x20 Type 'exit 1' to abort the sync.\n",
            context.working_dir.display()
        ))
    }

    async fn resolve(&self, context: &ConflictContext) -> Result<Resolution> {
        let command = self.command(context);
        let code = self.runner.interactive(&command)?;
        debug!(code, branch = %context.source_branch, "conflict shell exited");

        Ok(if code == 0 {
            Resolution::Resolved
        } else {
            Resolution::Aborted
        })
    }
}
