//! Shared test fixtures

#![allow(dead_code, unused_imports)]

mod mock_platform;
mod mock_repo;

pub use mock_platform::{CreatePrCall, MockPlatformService, UpdateBaseCall};
pub use mock_repo::{
    EventLog, MockBranch, MockPullRequest, MockRepository, RecordingProgress, ScriptedResolver,
    TrackingCommandRunner, make_pr,
};

use prstack::repo::GitWorkspace;
use prstack::types::PlatformConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Platform config for `test/repo` on github.com
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        owner: "test".to_string(),
        repo: "repo".to_string(),
        host: None,
    }
}

/// Run git in `dir`, panicking on failure; returns trimmed stdout
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env_remove("VIRTUAL_ENV")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Write `content` to `dir/name` and commit it
pub fn commit_file(dir: &Path, name: &str, content: &str, message: &str) {
    fs::write(dir.join(name), content).expect("write file");
    git(dir, &["add", name]);
    git(dir, &["commit", "-q", "-m", message]);
}

/// A bare `origin` plus a clone of it, with `main` pushed
///
/// Layout under the temp dir: `origin.git/`, `work/`, and any extra clones
/// or worktrees the test adds.
pub struct TempGitRepo {
    pub dir: TempDir,
    pub origin: PathBuf,
    pub path: PathBuf,
}

impl TempGitRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let origin = dir.path().join("origin.git");
        fs::create_dir(&origin).expect("create origin dir");
        git(&origin, &["init", "-q", "--bare", "-b", "main"]);

        let path = Self::clone_into(dir.path(), &origin, "work");
        commit_file(&path, "README.md", "# test\n", "Initial commit");
        git(&path, &["push", "-q", "-u", "origin", "main"]);

        Self { dir, origin, path }
    }

    fn clone_into(parent: &Path, origin: &Path, name: &str) -> PathBuf {
        let origin = origin.to_string_lossy().into_owned();
        git(parent, &["clone", "-q", &origin, name]);
        let path = parent.join(name);
        git(&path, &["config", "user.name", "Test User"]);
        git(&path, &["config", "user.email", "test@example.com"]);
        git(&path, &["config", "commit.gpgsign", "false"]);
        path
    }

    /// A second clone of `origin`, standing in for another developer
    pub fn other_clone(&self, name: &str) -> PathBuf {
        Self::clone_into(self.dir.path(), &self.origin, name)
    }

    /// Create `branch` from `from` in a new worktree and push it
    pub fn add_worktree(&self, branch: &str, from: &str) -> PathBuf {
        let path = self.dir.path().join(format!("wt-{branch}"));
        let target = path.to_string_lossy().into_owned();
        git(&self.path, &["worktree", "add", "-q", "-b", branch, &target, from]);
        git(&path, &["push", "-q", "-u", "origin", branch]);
        fs::canonicalize(&path).expect("canonicalize worktree")
    }

    /// Open the main checkout
    pub fn workspace(&self) -> GitWorkspace {
        GitWorkspace::open(&self.path).expect("open workspace")
    }

    /// Commit hash of `rev` in the origin repository
    pub fn origin_rev(&self, rev: &str) -> String {
        git(&self.origin, &["rev-parse", rev])
    }
}
