//! Scoped execution of external commands
//!
//! Environment changes for a child process are expressed as an explicit
//! override map on [`ExternalCommand`] and applied to that child only. The
//! prstack process environment is never mutated.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// How a single environment variable differs for the child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvOverride {
    /// Set the variable to this value
    Set(String),
    /// Remove the variable
    Remove,
}

/// An external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: BTreeMap<String, EnvOverride>,
}

impl ExternalCommand {
    /// Start building a command for `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    /// Build a command from an argv slice; `None` if it is empty
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, rest) = argv.split_first()?;
        Some(Self::new(program.clone()).args(rest.iter().cloned()))
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in this directory
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set a variable for the child only
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), EnvOverride::Set(value.into()));
        self
    }

    /// Remove a variable for the child only
    #[must_use]
    pub fn env_remove(mut self, key: impl Into<String>) -> Self {
        self.env.insert(key.into(), EnvOverride::Remove);
        self
    }

    /// Program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments (excluding the program)
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Working directory, if set
    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Environment overrides
    pub const fn env_overrides(&self) -> &BTreeMap<String, EnvOverride> {
        &self.env
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            match value {
                EnvOverride::Set(v) => {
                    cmd.env(key, v);
                }
                EnvOverride::Remove => {
                    cmd.env_remove(key);
                }
            }
        }
        cmd
    }

    fn spawn_error(&self, e: io::Error) -> Error {
        if e.kind() != io::ErrorKind::NotFound {
            return Error::Io(e);
        }
        match &self.cwd {
            Some(dir) if !dir.is_dir() => Error::MissingWorkingDir(dir.clone()),
            _ => Error::CommandNotFound(self.program.clone()),
        }
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (`None` if terminated by a signal)
    pub code: Option<i32>,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the command exited with status 0
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Runs external commands
pub trait CommandRunner: Send + Sync + fmt::Debug {
    /// Run to completion, capturing output
    fn output(&self, command: &ExternalCommand) -> Result<CommandOutput>;

    /// Run attached to the terminal and return the exit code
    ///
    /// A child killed by a signal reports `-1`.
    fn interactive(&self, command: &ExternalCommand) -> Result<i32>;
}

/// [`CommandRunner`] backed by `std::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn output(&self, command: &ExternalCommand) -> Result<CommandOutput> {
        debug!(%command, cwd = ?command.working_dir(), "running command");
        let output = command
            .to_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| command.spawn_error(e))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn interactive(&self, command: &ExternalCommand) -> Result<i32> {
        debug!(%command, cwd = ?command.working_dir(), "running interactive command");
        let status = command
            .to_command()
            .status()
            .map_err(|e| command.spawn_error(e))?;
        Ok(status.code().unwrap_or(-1))
    }
}
