//! Below planning - validation and the step list
//!
//! Nothing here mutates the repository; the plan doubles as the dry-run
//! result.

use crate::error::{Error, Result};
use crate::model::{BranchRef, PullRequestRef, Repository};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// What the operator asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BelowRequest {
    /// Name of the branch to insert
    pub new_branch: String,
    /// Title of the PR opened for it
    pub pr_title: String,
    /// Where its worktree goes
    pub worktree_path: PathBuf,
    /// Files copied from the current working directory into the new worktree
    pub copy_files: Vec<String>,
    /// Hook run inside the new worktree, if requested
    pub hook: Option<Vec<String>>,
}

/// A single step of a below operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BelowStep {
    /// Create the new branch at the original destination
    CreateBranch {
        /// New branch name
        name: String,
        /// Start point
        from: String,
    },
    /// Check the new branch out into a worktree
    CreateWorktree {
        /// Branch to check out
        branch: String,
        /// Worktree directory
        path: PathBuf,
    },
    /// Push the new branch
    PushBranch {
        /// Branch to push
        branch: String,
    },
    /// Open the new PR
    CreatePr {
        /// Head branch
        source: String,
        /// Base branch
        destination: String,
        /// PR title
        title: String,
    },
    /// Point the current PR at the new branch
    RetargetPr {
        /// PR number
        number: u64,
        /// Its source branch
        source: String,
        /// Old destination
        from: String,
        /// New destination
        to: String,
    },
    /// Copy files into the worktree
    CopyFiles {
        /// Paths relative to the working directory
        files: Vec<String>,
        /// Worktree directory
        to: PathBuf,
    },
    /// Run the hook inside the worktree
    RunHook {
        /// Hook argv joined for display
        command: String,
        /// Worktree directory
        dir: PathBuf,
    },
}

impl fmt::Display for BelowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateBranch { name, from } => {
                write!(f, "Create branch '{name}' from '{from}'")
            }
            Self::CreateWorktree { branch, path } => {
                write!(f, "Create worktree for '{branch}' at '{}'", path.display())
            }
            Self::PushBranch { branch } => write!(f, "Push '{branch}' to remote"),
            Self::CreatePr {
                source,
                destination,
                title,
            } => write!(f, "Create PR '{source}' -> '{destination}': \"{title}\""),
            Self::RetargetPr {
                number,
                source,
                from,
                to,
            } => write!(
                f,
                "Retarget PR #{number} ('{source}') from '{from}' to '{to}'"
            ),
            Self::CopyFiles { files, to } => {
                write!(f, "Copy {} into '{}'", files.join(", "), to.display())
            }
            Self::RunHook { command, dir } => {
                write!(f, "Run '{command}' in '{}'", dir.display())
            }
        }
    }
}

/// A validated below operation
///
/// Returned as-is for dry runs.
#[derive(Debug, Clone)]
pub struct BelowPlan {
    /// Branch checked out when planning
    pub current_branch_name: String,
    /// The PR whose source is the current branch
    pub current_pr: PullRequestRef,
    /// Destination of `current_pr` before the splice
    pub original_destination: BranchRef,
    /// Working directory files are copied from
    pub source_dir: PathBuf,
    /// Name of the branch to insert
    pub new_branch_name: String,
    /// Title of the new PR
    pub pr_title: String,
    /// Where the worktree goes
    pub worktree_path: PathBuf,
    /// Files to copy (empty for none)
    pub copy_files: Vec<String>,
    /// Hook argv, when requested
    pub hook: Option<Vec<String>>,
}

impl BelowPlan {
    /// Name of the original destination branch
    pub fn original_destination_name(&self) -> &str {
        self.original_destination.name()
    }

    /// Ordered steps; copy and hook steps appear only when requested
    pub fn steps(&self) -> Vec<BelowStep> {
        let original = self.original_destination_name().to_string();
        let mut steps = vec![
            BelowStep::CreateBranch {
                name: self.new_branch_name.clone(),
                from: original.clone(),
            },
            BelowStep::CreateWorktree {
                branch: self.new_branch_name.clone(),
                path: self.worktree_path.clone(),
            },
            BelowStep::PushBranch {
                branch: self.new_branch_name.clone(),
            },
            BelowStep::CreatePr {
                source: self.new_branch_name.clone(),
                destination: original.clone(),
                title: self.pr_title.clone(),
            },
            BelowStep::RetargetPr {
                number: self.current_pr.number(),
                source: self.current_branch_name.clone(),
                from: original,
                to: self.new_branch_name.clone(),
            },
        ];

        if !self.copy_files.is_empty() {
            steps.push(BelowStep::CopyFiles {
                files: self.copy_files.clone(),
                to: self.worktree_path.clone(),
            });
        }
        if let Some(hook) = &self.hook {
            steps.push(BelowStep::RunHook {
                command: hook.join(" "),
                dir: self.worktree_path.clone(),
            });
        }
        steps
    }
}

impl fmt::Display for BelowPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Insert '{}' below '{}' (PR #{}: \"{}\")",
            self.new_branch_name,
            self.current_branch_name,
            self.current_pr.number(),
            self.current_pr.title()
        )?;
        for (i, step) in self.steps().iter().enumerate() {
            writeln!(f, "  {}. {step}", i + 1)?;
        }
        Ok(())
    }
}

/// Validate a below request and build its plan
///
/// Checks run in order and the first failure wins: detached HEAD,
/// uncommitted changes, exactly one open PR for the current branch, new
/// branch name free, worktree path free, every file to copy present.
pub async fn plan_below(repository: &dyn Repository, request: &BelowRequest) -> Result<BelowPlan> {
    let current = repository.current_branch()?.ok_or(Error::DetachedHead)?;
    let current_name = current.name().to_string();

    if repository.has_uncommitted_changes()? {
        return Err(Error::UncommittedChanges);
    }

    let prs = repository.open_pull_requests().await?;
    let mut matching = prs
        .iter()
        .filter(|pr| pr.source_branch().name() == current_name);
    let current_pr = match (matching.next(), matching.next()) {
        (None, _) => return Err(Error::NoOpenPr(current_name)),
        (Some(_), Some(_)) => return Err(Error::MultipleOpenPrs(current_name)),
        (Some(pr), None) => PullRequestRef::clone(pr),
    };

    let branches = repository.branches().await?;
    if branches.iter().any(|b| b.name() == request.new_branch) {
        return Err(Error::BranchExists(request.new_branch.clone()));
    }

    if request.worktree_path.exists() {
        return Err(Error::PathExists(request.worktree_path.clone()));
    }

    let source_dir = repository.working_dir()?;
    if let Some(missing) = request
        .copy_files
        .iter()
        .find(|f| !source_dir.join(f).exists())
    {
        return Err(Error::CopyFileMissing(missing.clone()));
    }

    debug!(
        current = %current_name,
        pr_number = current_pr.number(),
        new_branch = %request.new_branch,
        "planned below"
    );

    Ok(BelowPlan {
        current_branch_name: current_name,
        original_destination: current_pr.destination_branch(),
        current_pr,
        source_dir,
        new_branch_name: request.new_branch.clone(),
        pr_title: request.pr_title.clone(),
        worktree_path: request.worktree_path.clone(),
        copy_files: request.copy_files.clone(),
        hook: request.hook.clone(),
    })
}
