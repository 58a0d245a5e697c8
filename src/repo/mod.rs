//! Local git working copy
//!
//! All git access goes through the `git` executable via [`CommandRunner`].
//! Every invocation drops `VIRTUAL_ENV` from the child environment so hooks
//! in the target repository resolve their own tooling.

mod command;
mod worktree;

pub use command::{CommandOutput, CommandRunner, EnvOverride, ExternalCommand, ProcessRunner};
pub use worktree::{WorktreeEntry, parse_worktree_list};

use crate::error::{Error, Result};
use crate::model::{Branch, RemoteBranch};
use crate::types::GitRemote;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Default remote name
pub const DEFAULT_REMOTE: &str = "origin";

fn git(dir: &Path, args: &[&str]) -> ExternalCommand {
    ExternalCommand::new("git")
        .args(args.iter().copied())
        .current_dir(dir)
        .env_remove("VIRTUAL_ENV")
}

/// Run git, returning the output regardless of exit status
fn run_git(runner: &dyn CommandRunner, dir: &Path, args: &[&str]) -> Result<CommandOutput> {
    runner.output(&git(dir, args))
}

/// Run git, failing on non-zero exit; returns trimmed stdout
fn git_ok(runner: &dyn CommandRunner, dir: &Path, args: &[&str]) -> Result<String> {
    let output = run_git(runner, dir, args)?;
    if !output.success() {
        return Err(Error::Git(format!(
            "git {} failed: {}",
            args.join(" "),
            output.stderr.trim()
        )));
    }
    Ok(output.stdout.trim().to_string())
}

/// A git working copy (main checkout or linked worktree)
#[derive(Clone)]
pub struct GitWorkspace {
    root: PathBuf,
    remote: String,
    runner: Arc<dyn CommandRunner>,
}

impl fmt::Debug for GitWorkspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitWorkspace")
            .field("root", &self.root)
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

impl GitWorkspace {
    /// Open the working copy containing `path`
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_runner(path, Arc::new(ProcessRunner))
    }

    /// Open with a specific command runner
    pub fn open_with_runner(path: &Path, runner: Arc<dyn CommandRunner>) -> Result<Self> {
        if !path.is_dir() {
            return Err(Error::NotARepository(path.to_path_buf()));
        }
        let output = run_git(runner.as_ref(), path, &["rev-parse", "--show-toplevel"])?;
        if !output.success() {
            return Err(Error::NotARepository(path.to_path_buf()));
        }
        let root = PathBuf::from(output.stdout.trim());
        debug!(root = %root.display(), "opened git workspace");

        Ok(Self {
            root,
            remote: DEFAULT_REMOTE.to_string(),
            runner,
        })
    }

    /// Use `remote` for pulls, pushes and start points
    #[must_use]
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Top-level directory of this working copy
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remote used for pulls and pushes
    pub fn remote_name(&self) -> &str {
        &self.remote
    }

    fn branch_at(&self, name: &str, workdir: &Path) -> LocalBranch {
        LocalBranch {
            name: name.to_string(),
            workdir: workdir.to_path_buf(),
            remote: self.remote.clone(),
            runner: Arc::clone(&self.runner),
        }
    }

    /// Branch checked out here (`None` on detached HEAD)
    pub fn current_branch(&self) -> Result<Option<LocalBranch>> {
        let output = run_git(
            self.runner.as_ref(),
            &self.root,
            &["symbolic-ref", "--quiet", "--short", "HEAD"],
        )?;
        match output.code {
            Some(0) => Ok(Some(self.branch_at(output.stdout.trim(), &self.root))),
            Some(1) => Ok(None),
            _ => Err(Error::Git(format!(
                "could not read HEAD: {}",
                output.stderr.trim()
            ))),
        }
    }

    /// Whether tracked files have uncommitted changes (untracked files are ignored)
    pub fn has_uncommitted_changes(&self) -> Result<bool> {
        let status = git_ok(
            self.runner.as_ref(),
            &self.root,
            &["status", "--porcelain", "--untracked-files=no"],
        )?;
        Ok(!status.is_empty())
    }

    /// All worktrees of this repository
    pub fn worktrees(&self) -> Result<Vec<WorktreeEntry>> {
        let output = git_ok(
            self.runner.as_ref(),
            &self.root,
            &["worktree", "list", "--porcelain"],
        )?;
        Ok(parse_worktree_list(&output))
    }

    /// One [`LocalBranch`] per checked-out branch, first worktree wins
    ///
    /// Worktrees whose directory no longer exists are left out.
    pub fn local_branches(&self) -> Result<Vec<LocalBranch>> {
        let mut seen = HashSet::new();
        let branches = self
            .worktrees()?
            .into_iter()
            .filter(|wt| !wt.bare && !wt.prunable && wt.path.is_dir())
            .filter_map(|wt| wt.branch.map(|name| (name, wt.path)))
            .filter(|(name, _)| seen.insert(name.clone()))
            .map(|(name, path)| self.branch_at(&name, &path))
            .collect();
        Ok(branches)
    }

    /// Names of all local branch refs
    pub fn branch_names(&self) -> Result<Vec<String>> {
        let output = git_ok(
            self.runner.as_ref(),
            &self.root,
            &["for-each-ref", "--format=%(refname:short)", "refs/heads/"],
        )?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    /// Whether `refs/heads/<name>` exists
    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        let refname = format!("refs/heads/{name}");
        let output = run_git(
            self.runner.as_ref(),
            &self.root,
            &["show-ref", "--verify", "--quiet", &refname],
        )?;
        Ok(output.success())
    }

    /// Create `name` at the commit of `from` (local ref, else `<remote>/<from>`)
    ///
    /// The branch is not checked out anywhere, so the handle is a
    /// [`RemoteBranch`]; [`Self::create_worktree`] yields the local one.
    pub fn create_branch(&self, name: &str, from: &str) -> Result<RemoteBranch> {
        let start = if self.branch_exists(from)? {
            from.to_string()
        } else {
            format!("{}/{from}", self.remote)
        };
        debug!(name, start = %start, "creating branch");
        git_ok(self.runner.as_ref(), &self.root, &["branch", name, &start])?;
        Ok(RemoteBranch::new(name))
    }

    /// Check `branch` out into a new worktree at `path`
    pub fn create_worktree(&self, branch: &str, path: &Path) -> Result<LocalBranch> {
        let path_arg = path.to_string_lossy();
        debug!(branch, path = %path.display(), "creating worktree");
        git_ok(
            self.runner.as_ref(),
            &self.root,
            &["worktree", "add", path_arg.as_ref(), branch],
        )?;
        let workdir = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Ok(self.branch_at(branch, &workdir))
    }

    /// Configured remotes
    pub fn git_remotes(&self) -> Result<Vec<GitRemote>> {
        let names = git_ok(self.runner.as_ref(), &self.root, &["remote"])?;
        names
            .lines()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|name| {
                let url = git_ok(
                    self.runner.as_ref(),
                    &self.root,
                    &["remote", "get-url", name],
                )?;
                Ok(GitRemote {
                    name: name.to_string(),
                    url,
                })
            })
            .collect()
    }
}

/// Pick the remote to use.
///
/// An explicitly requested remote must exist; otherwise `origin` is
/// preferred, then the first remote.
pub fn select_remote(remotes: &[GitRemote], requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        return remotes
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.name.clone())
            .ok_or_else(|| Error::RemoteNotFound(name.to_string()));
    }

    remotes
        .iter()
        .find(|r| r.name == DEFAULT_REMOTE)
        .or_else(|| remotes.first())
        .map(|r| r.name.clone())
        .ok_or(Error::NoSupportedRemotes)
}

/// A branch checked out in a working directory
#[derive(Clone)]
pub struct LocalBranch {
    name: String,
    workdir: PathBuf,
    remote: String,
    runner: Arc<dyn CommandRunner>,
}

impl fmt::Debug for LocalBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBranch")
            .field("name", &self.name)
            .field("workdir", &self.workdir)
            .finish_non_exhaustive()
    }
}

impl LocalBranch {
    fn head(&self) -> Result<String> {
        git_ok(self.runner.as_ref(), &self.workdir, &["rev-parse", "HEAD"])
    }
}

impl Branch for LocalBranch {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_local(&self) -> bool {
        true
    }

    fn merge(&self, other: &dyn Branch) -> Result<bool> {
        debug!(branch = %self.name, other = other.name(), "merging");
        let output = run_git(
            self.runner.as_ref(),
            &self.workdir,
            &["merge", "--no-ff", "--no-edit", other.name()],
        )?;
        if output.success() {
            return Ok(true);
        }
        if self.has_merge_conflicts()? {
            debug!(branch = %self.name, "merge left conflicts");
            return Ok(false);
        }
        if output.stdout.contains("Already up to date") {
            return Ok(true);
        }
        Err(Error::Git(format!(
            "merge of '{}' into '{}' failed: {}",
            other.name(),
            self.name,
            output.stderr.trim()
        )))
    }

    fn pull(&self) -> Result<bool> {
        let before = self.head()?;
        let output = run_git(
            self.runner.as_ref(),
            &self.workdir,
            &["pull", "--no-rebase", "--no-edit", &self.remote, &self.name],
        )?;
        if !output.success() {
            debug!(branch = %self.name, stderr = %output.stderr.trim(), "pull failed");
            return Ok(false);
        }
        Ok(self.head()? != before)
    }

    fn push(&self) -> Result<bool> {
        let output = run_git(
            self.runner.as_ref(),
            &self.workdir,
            &["push", "--set-upstream", &self.remote, &self.name],
        )?;
        if !output.success() {
            debug!(branch = %self.name, stderr = %output.stderr.trim(), "push failed");
        }
        Ok(output.success())
    }

    fn has_merge_conflicts(&self) -> Result<bool> {
        let output = run_git(
            self.runner.as_ref(),
            &self.workdir,
            &["rev-parse", "-q", "--verify", "MERGE_HEAD"],
        )?;
        Ok(output.success())
    }

    fn abort_merge(&self) -> Result<()> {
        // Fails harmlessly when no merge is in progress
        let output = run_git(self.runner.as_ref(), &self.workdir, &["merge", "--abort"])?;
        if !output.success() {
            debug!(branch = %self.name, "no merge to abort");
        }
        Ok(())
    }

    fn working_dir(&self) -> Result<PathBuf> {
        Ok(self.workdir.clone())
    }
}
