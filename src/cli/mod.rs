//! CLI commands and terminal output

pub mod below;
pub mod config;
pub mod context;
pub mod repos;
pub mod style;
pub mod sync;
pub mod tree;

use anstream::{eprintln, println};
use async_trait::async_trait;
use prstack::progress::ProgressCallback;
use prstack::stack::SyncState;
use style::Stylize;

/// Progress output for the terminal
#[derive(Debug, Clone, Copy)]
pub struct CliProgress {
    show_states: bool,
}

impl CliProgress {
    /// Messages and warnings only
    pub const fn compact() -> Self {
        Self { show_states: false }
    }

    /// Also report every sync state change
    pub const fn verbose() -> Self {
        Self { show_states: true }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        println!("{message}");
    }

    async fn on_warning(&self, message: &str) {
        eprintln!("{}", format!("Warning: {message}").warn());
    }

    async fn on_sync_state(&self, source_branch: &str, state: SyncState) {
        if self.show_states {
            println!("{}", format!("  [{source_branch}: {state}]").muted());
        }
    }
}
