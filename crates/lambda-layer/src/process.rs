// Copyright (c) Contributors to the lambda-layer project.
// SPDX-License-Identifier: Apache-2.0

//! Running external commands and echoing their output.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use colored::Colorize;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use crate::DEFAULT_SHELL;
use crate::error::ProcessError;

#[cfg(test)]
#[path = "./process_test.rs"]
mod process_test;

/// An external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Execute `argv[0]` directly with the remaining arguments.
    Exec(Vec<String>),
    /// Hand the whole line to the runner's shell with `-c`.
    Shell(String),
}

impl Invocation {
    pub fn exec<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exec(args.into_iter().map(Into::into).collect())
    }

    pub fn shell<S: Into<String>>(line: S) -> Self {
        Self::Shell(line.into())
    }

    /// The command as it would be typed at a prompt.
    pub fn command_line(&self) -> String {
        match self {
            Self::Exec(args) => shell_words::join(args),
            Self::Shell(line) => line.clone(),
        }
    }
}

/// Captured result of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external commands with a shared shell, environment, timeout and
/// cancellation signal.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    shell: PathBuf,
    timeout: Option<Duration>,
    env: BTreeMap<String, String>,
    cancel: CancellationToken,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

impl ProcessRunner {
    pub fn new<P: Into<PathBuf>>(shell: P) -> Self {
        Self {
            shell: shell.into(),
            timeout: None,
            env: BTreeMap::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Kill any command that runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra environment variables for every command.
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Kill the running command as soon as `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run a command to completion and capture its output.
    ///
    /// Unless `silent`, the command line is echoed before it runs and its
    /// standard output afterwards. Standard output of a failed command and
    /// anything written to standard error are echoed regardless.
    pub async fn run(
        &self,
        invocation: &Invocation,
        silent: bool,
    ) -> Result<ProcessOutput, ProcessError> {
        let line = invocation.command_line();
        if self.cancel.is_cancelled() {
            return Err(ProcessError::Cancelled { command: line });
        }

        if !silent {
            eprintln!("{line}");
        }
        tracing::debug!(command = %line, "running external command");

        let mut command = self.command_for(invocation)?;
        command
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| ProcessError::Spawn {
            program: self.program_name(invocation),
            source,
        })?;

        let output = tokio::select! {
            _ = self.cancel.cancelled() => {
                return Err(ProcessError::Cancelled { command: line.clone() });
            }
            output = self.wait(child, &line) => output?,
        };

        let code = exit_code(&output.status);
        let result = ProcessOutput {
            exit_code: code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(command = %line, exit_code = result.exit_code, "external command finished");

        echo(&result, silent);

        if result.success() {
            Ok(result)
        } else {
            Err(ProcessError::Failed {
                command: line,
                code,
                stdout: result.stdout,
                stderr: result.stderr,
            })
        }
    }

    fn command_for(&self, invocation: &Invocation) -> Result<Command, ProcessError> {
        match invocation {
            Invocation::Exec(args) => {
                let (program, args) = args.split_first().ok_or(ProcessError::EmptyCommand)?;
                let mut command = Command::new(program);
                command.args(args);
                Ok(command)
            }
            Invocation::Shell(line) => {
                let mut command = Command::new(&self.shell);
                command.arg("-c").arg(line);
                Ok(command)
            }
        }
    }

    fn program_name(&self, invocation: &Invocation) -> String {
        match invocation {
            Invocation::Exec(args) => args.first().cloned().unwrap_or_default(),
            Invocation::Shell(_) => self.shell.display().to_string(),
        }
    }

    async fn wait(&self, child: Child, line: &str) -> Result<std::process::Output, ProcessError> {
        let waited = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| ProcessError::TimedOut {
                    command: line.to_string(),
                    timeout,
                })?,
            None => child.wait_with_output().await,
        };
        waited.map_err(|source| ProcessError::Wait {
            command: line.to_string(),
            source,
        })
    }
}

/// Exit code, or `128 + signal` for a process killed by a signal.
fn exit_code(status: &ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        status
            .code()
            .or_else(|| status.signal().map(|signal| 128 + signal))
            .unwrap_or(1)
    }
    #[cfg(not(unix))]
    {
        status.code().unwrap_or(1)
    }
}

fn echo(output: &ProcessOutput, silent: bool) {
    let success = output.success();
    if !success || !silent {
        for line in output.stdout.lines() {
            if success {
                eprintln!("{}", line.green());
            } else {
                eprintln!("{}", line.red());
            }
        }
    }

    for line in output.stderr.lines() {
        eprintln!("{}", line.red());
    }
}
