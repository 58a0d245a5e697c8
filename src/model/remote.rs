//! Metadata-only branch

use super::Branch;

/// A branch known only by name (no local checkout)
///
/// Every local-only [`Branch`] operation returns
/// [`Error::Unsupported`](crate::error::Error::Unsupported).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBranch {
    name: String,
}

impl RemoteBranch {
    /// Create a metadata-only branch
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Branch for RemoteBranch {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_local(&self) -> bool {
        false
    }
}
