//! Error types for prstack

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in prstack
///
/// Merge conflicts and failed pulls/pushes are NOT errors: they are reported
/// as `bool` results by [`Branch`](crate::model::Branch) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HEAD does not point at a branch
    #[error("You are in detached HEAD state. Checkout a branch first.")]
    DetachedHead,

    /// Working tree has uncommitted changes to tracked files
    #[error("You have uncommitted changes. Commit or stash them first.")]
    UncommittedChanges,

    /// No open PR has the given branch as its source
    #[error("No open PR found for branch '{0}'. Create a PR first.")]
    NoOpenPr(String),

    /// More than one open PR has the given branch as its source
    #[error("Multiple open PRs found for branch '{0}'. This is ambiguous.")]
    MultipleOpenPrs(String),

    /// A branch with this name already exists
    #[error("Branch '{0}' already exists.")]
    BranchExists(String),

    /// Target path for a new worktree already exists
    #[error("Path '{}' already exists. Choose a different worktree path.", .0.display())]
    PathExists(PathBuf),

    /// A file requested for copying is missing from the current worktree
    #[error("Cannot copy '{0}': file does not exist")]
    CopyFileMissing(String),

    /// A local-only operation was invoked on a branch without a checkout
    #[error("{operation} is not supported on branch '{branch}': it has no local checkout")]
    Unsupported {
        /// Name of the rejected operation
        operation: &'static str,
        /// Branch the operation was invoked on
        branch: String,
    },

    /// A local-only operation was invoked on a PR whose branches are not both local
    #[error("Pull request '{0}' is not checked out locally")]
    NotLocal(String),

    /// A local-only repository query was made without an attached working copy
    #[error("No local git repository associated with '{0}'")]
    NoLocalRepository(String),

    /// The path is not inside a git working tree
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    /// The open-PR graph contains a destination/source cycle
    #[error("Pull request graph contains a cycle through branch '{0}'")]
    CycleDetected(String),

    /// Pushing a branch failed where the operation cannot continue without it
    #[error("Failed to push branch '{0}'")]
    PushFailed(String),

    /// Git command failed
    #[error("git error: {0}")]
    Git(String),

    /// An external executable could not be found
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Working directory of a command does not exist
    #[error("Working directory does not exist: {}", .0.display())]
    MissingWorkingDir(std::path::PathBuf),

    /// Requested remote does not exist
    #[error("Remote '{0}' not found")]
    RemoteNotFound(String),

    /// No remote points at a supported platform
    #[error("No supported remotes found (expected a GitHub remote)")]
    NoSupportedRemotes,

    /// Remote URL could not be parsed into owner/repo
    #[error("Could not determine repository from remote URL: {0}")]
    InvalidRemoteUrl(String),

    /// Authentication failed or no token available
    #[error("Authentication error: {0}")]
    Auth(String),

    /// GitHub API call failed
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Generic platform failure
    #[error("Platform error: {0}")]
    Platform(String),

    /// Configuration could not be read or written
    #[error("Config error: {0}")]
    Config(String),

    /// Invariant violation inside prstack
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Octocrab client error
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),
}

/// Result type alias for prstack
pub type Result<T> = std::result::Result<T, Error>;
