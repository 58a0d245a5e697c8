//! In-memory branches, pull requests and repository for engine tests
//!
//! Every effectful call is appended to a shared [`EventLog`] so tests can
//! assert ordering across branches.

#![allow(dead_code)]

use async_trait::async_trait;
use prstack::error::{Error, Result};
use prstack::model::{Branch, BranchRef, PullRequest, PullRequestRef, Repository};
use prstack::progress::ProgressCallback;
use prstack::repo::{CommandOutput, CommandRunner, ExternalCommand};
use prstack::stack::{ConflictContext, ConflictResolver, Resolution, SyncState};
use prstack::types::RepoInfo;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Ordered record of effectful calls
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Events starting with `prefix`
    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }
}

/// A branch with scripted merge/push results
pub struct MockBranch {
    name: String,
    workdir: Option<PathBuf>,
    log: EventLog,
    merge_results: Mutex<VecDeque<bool>>,
    push_ok: Mutex<bool>,
    conflicted: Mutex<bool>,
}

impl fmt::Debug for MockBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockBranch")
            .field("name", &self.name)
            .field("workdir", &self.workdir)
            .finish_non_exhaustive()
    }
}

impl MockBranch {
    /// A branch checked out at `workdir`
    pub fn local(name: &str, workdir: impl Into<PathBuf>, log: &EventLog) -> Arc<Self> {
        Arc::new(Self::build(name, Some(workdir.into()), log))
    }

    /// A branch with no checkout
    pub fn remote(name: &str, log: &EventLog) -> Arc<Self> {
        Arc::new(Self::build(name, None, log))
    }

    fn build(name: &str, workdir: Option<PathBuf>, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            workdir,
            log: log.clone(),
            merge_results: Mutex::new(VecDeque::new()),
            push_ok: Mutex::new(true),
            conflicted: Mutex::new(false),
        }
    }

    /// Queue merge outcomes; once drained, merges succeed
    pub fn script_merges(&self, results: &[bool]) {
        self.merge_results.lock().unwrap().extend(results);
    }

    /// Make pushes fail (or succeed again)
    pub fn set_push_ok(&self, ok: bool) {
        *self.push_ok.lock().unwrap() = ok;
    }

    /// Simulate the operator committing a resolution
    pub fn mark_resolved(&self) {
        *self.conflicted.lock().unwrap() = false;
    }

    pub fn is_conflicted(&self) -> bool {
        *self.conflicted.lock().unwrap()
    }

    fn require_local(&self, operation: &'static str) -> Result<&Path> {
        self.workdir.as_deref().ok_or_else(|| Error::Unsupported {
            operation,
            branch: self.name.clone(),
        })
    }
}

impl Branch for MockBranch {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_local(&self) -> bool {
        self.workdir.is_some()
    }

    fn merge(&self, other: &dyn Branch) -> Result<bool> {
        self.require_local("merge")?;
        self.log.push(format!("merge {} -> {}", other.name(), self.name));
        let clean = self.merge_results.lock().unwrap().pop_front().unwrap_or(true);
        if !clean {
            *self.conflicted.lock().unwrap() = true;
        }
        Ok(clean)
    }

    fn pull(&self) -> Result<bool> {
        self.require_local("pull")?;
        self.log.push(format!("pull {}", self.name));
        Ok(false)
    }

    fn push(&self) -> Result<bool> {
        self.require_local("push")?;
        self.log.push(format!("push {}", self.name));
        Ok(*self.push_ok.lock().unwrap())
    }

    fn has_merge_conflicts(&self) -> Result<bool> {
        self.require_local("has_merge_conflicts")?;
        Ok(self.is_conflicted())
    }

    fn abort_merge(&self) -> Result<()> {
        self.require_local("abort_merge")?;
        self.log.push(format!("abort {}", self.name));
        *self.conflicted.lock().unwrap() = false;
        Ok(())
    }

    fn working_dir(&self) -> Result<PathBuf> {
        self.require_local("working_dir").map(Path::to_path_buf)
    }
}

/// A pull request that records retargeting
#[derive(Debug)]
pub struct MockPullRequest {
    number: u64,
    title: String,
    source: BranchRef,
    destination: Mutex<BranchRef>,
    log: EventLog,
}

impl MockPullRequest {
    pub fn new(
        number: u64,
        source: BranchRef,
        destination: BranchRef,
        title: &str,
        log: &EventLog,
    ) -> Arc<Self> {
        Arc::new(Self {
            number,
            title: title.to_string(),
            source,
            destination: Mutex::new(destination),
            log: log.clone(),
        })
    }
}

#[async_trait]
impl PullRequest for MockPullRequest {
    fn number(&self) -> u64 {
        self.number
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> Option<&str> {
        None
    }

    fn url(&self) -> &str {
        "https://github.com/test/repo/pulls"
    }

    fn source_branch(&self) -> BranchRef {
        Arc::clone(&self.source)
    }

    fn destination_branch(&self) -> BranchRef {
        Arc::clone(&self.destination.lock().unwrap())
    }

    async fn change_destination(&self, new_destination: BranchRef) -> Result<()> {
        self.log
            .push(format!("retarget #{} -> {}", self.number, new_destination.name()));
        *self.destination.lock().unwrap() = new_destination;
        Ok(())
    }
}

/// Shorthand for a PR between two mock branches
pub fn make_pr(
    number: u64,
    source: &Arc<MockBranch>,
    destination: &Arc<MockBranch>,
    title: &str,
    log: &EventLog,
) -> PullRequestRef {
    MockPullRequest::new(
        number,
        Arc::clone(source) as BranchRef,
        Arc::clone(destination) as BranchRef,
        title,
        log,
    )
}

/// An in-memory repository
///
/// `create_worktree` creates the directory on disk so file copies into it
/// work.
pub struct MockRepository {
    info: RepoInfo,
    workdir: PathBuf,
    log: EventLog,
    prs: Mutex<Vec<PullRequestRef>>,
    branch_names: Vec<String>,
    current: Option<BranchRef>,
    dirty: bool,
    next_number: AtomicU64,
    new_branch_push_ok: bool,
    created: Mutex<HashMap<String, Arc<MockBranch>>>,
}

impl MockRepository {
    pub fn new(workdir: impl Into<PathBuf>, log: &EventLog) -> Self {
        Self {
            info: RepoInfo {
                name: "repo".to_string(),
                full_name: "test/repo".to_string(),
                description: None,
                private: false,
                url: "https://github.com/test/repo".to_string(),
            },
            workdir: workdir.into(),
            log: log.clone(),
            prs: Mutex::new(Vec::new()),
            branch_names: Vec::new(),
            current: None,
            dirty: false,
            next_number: AtomicU64::new(100),
            new_branch_push_ok: true,
            created: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_prs(self, prs: Vec<PullRequestRef>) -> Self {
        *self.prs.lock().unwrap() = prs;
        self
    }

    #[must_use]
    pub fn with_branches(mut self, names: &[&str]) -> Self {
        self.branch_names = names.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_current(mut self, branch: &Arc<MockBranch>) -> Self {
        self.current = Some(Arc::clone(branch) as BranchRef);
        self
    }

    #[must_use]
    pub fn dirty(mut self) -> Self {
        self.dirty = true;
        self
    }

    #[must_use]
    pub fn failing_new_branch_push(mut self) -> Self {
        self.new_branch_push_ok = false;
        self
    }

    pub fn prs(&self) -> Vec<PullRequestRef> {
        self.prs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Repository for MockRepository {
    fn info(&self) -> &RepoInfo {
        &self.info
    }

    async fn open_pull_requests(&self) -> Result<Vec<PullRequestRef>> {
        Ok(self.prs())
    }

    async fn create_pr(
        &self,
        source: BranchRef,
        destination: BranchRef,
        title: &str,
    ) -> Result<PullRequestRef> {
        self.log
            .push(format!("create_pr {} -> {}", source.name(), destination.name()));
        let number = self.next_number.fetch_add(1, Ordering::SeqCst);
        let pr: PullRequestRef =
            MockPullRequest::new(number, source, destination, title, &self.log);
        self.prs.lock().unwrap().push(Arc::clone(&pr));
        Ok(pr)
    }

    async fn branches(&self) -> Result<Vec<BranchRef>> {
        Ok(self
            .branch_names
            .iter()
            .map(|name| MockBranch::remote(name, &self.log) as BranchRef)
            .collect())
    }

    fn local_branches(&self) -> Result<Vec<BranchRef>> {
        Ok(self.current.iter().cloned().collect())
    }

    fn current_branch(&self) -> Result<Option<BranchRef>> {
        Ok(self.current.clone())
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        Ok(self.dirty)
    }

    fn create_branch(&self, name: &str, from: &dyn Branch) -> Result<BranchRef> {
        self.log
            .push(format!("create_branch {name} from {}", from.name()));
        Ok(MockBranch::remote(name, &self.log))
    }

    fn create_worktree(&self, branch: &dyn Branch, path: &Path) -> Result<BranchRef> {
        self.log
            .push(format!("create_worktree {} at {}", branch.name(), path.display()));
        fs::create_dir_all(path)?;
        let local = MockBranch::local(branch.name(), path, &self.log);
        local.set_push_ok(self.new_branch_push_ok);
        self.created
            .lock()
            .unwrap()
            .insert(branch.name().to_string(), Arc::clone(&local));
        Ok(local)
    }

    fn working_dir(&self) -> Result<PathBuf> {
        Ok(self.workdir.clone())
    }
}

/// Records commands instead of running them
#[derive(Debug, Default)]
pub struct TrackingCommandRunner {
    commands: Mutex<Vec<ExternalCommand>>,
    exit_code: i32,
    not_found: bool,
}

impl TrackingCommandRunner {
    /// Every command exits with `code`
    pub fn exiting(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Self::default()
        }
    }

    /// Every command fails as if the program were not installed
    pub fn not_found() -> Self {
        Self {
            not_found: true,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<ExternalCommand> {
        self.commands.lock().unwrap().clone()
    }

    fn record(&self, command: &ExternalCommand) -> Result<i32> {
        self.commands.lock().unwrap().push(command.clone());
        if self.not_found {
            return Err(Error::CommandNotFound(command.program().to_string()));
        }
        Ok(self.exit_code)
    }
}

impl CommandRunner for TrackingCommandRunner {
    fn output(&self, command: &ExternalCommand) -> Result<CommandOutput> {
        let code = self.record(command)?;
        Ok(CommandOutput {
            code: Some(code),
            ..CommandOutput::default()
        })
    }

    fn interactive(&self, command: &ExternalCommand) -> Result<i32> {
        self.record(command)
    }
}

/// Answers conflicts from a script
///
/// A `Resolved` answer clears the conflict on branches registered with
/// [`fixing`](Self::fixing), simulating a committed resolution.
#[derive(Default)]
pub struct ScriptedResolver {
    answers: Mutex<VecDeque<Resolution>>,
    fixes: HashMap<String, Arc<MockBranch>>,
    contexts: Mutex<Vec<ConflictContext>>,
}

impl ScriptedResolver {
    pub fn new(answers: &[Resolution]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn fixing(mut self, branch: &Arc<MockBranch>) -> Self {
        self.fixes
            .insert(branch.name().to_string(), Arc::clone(branch));
        self
    }

    pub fn contexts(&self) -> Vec<ConflictContext> {
        self.contexts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConflictResolver for ScriptedResolver {
    async fn resolve(&self, context: &ConflictContext) -> Result<Resolution> {
        self.contexts.lock().unwrap().push(context.clone());
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Resolution::Aborted);
        if answer == Resolution::Resolved
            && let Some(branch) = self.fixes.get(&context.source_branch)
        {
            branch.mark_resolved();
        }
        Ok(answer)
    }
}

/// Collects progress output
#[derive(Debug, Default)]
pub struct RecordingProgress {
    messages: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
    states: Mutex<Vec<(String, SyncState)>>,
}

impl RecordingProgress {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<(String, SyncState)> {
        self.states.lock().unwrap().clone()
    }

    /// States recorded for one branch, in order
    pub fn states_of(&self, branch: &str) -> Vec<SyncState> {
        self.states()
            .into_iter()
            .filter(|(b, _)| b == branch)
            .map(|(_, s)| s)
            .collect()
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    async fn on_warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    async fn on_sync_state(&self, source_branch: &str, state: SyncState) {
        self.states
            .lock()
            .unwrap()
            .push((source_branch.to_string(), state));
    }
}
