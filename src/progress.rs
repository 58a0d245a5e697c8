//! Progress reporting shared by the sync and below engines

use crate::stack::SyncState;
use async_trait::async_trait;

/// Progress callback for status updates
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Informational message
    async fn on_message(&self, message: &str);

    /// Non-fatal problem
    async fn on_warning(&self, message: &str) {
        self.on_message(&format!("Warning: {message}")).await;
    }

    /// A PR's sync state changed
    async fn on_sync_state(&self, source_branch: &str, state: SyncState) {
        let _ = (source_branch, state);
    }
}

/// Discards all progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}
}
