//! Running guarded command lines through the profile's shell.
//!
//! Only [`ShellLine`] values can be run, so every command has been through the
//! sanitizer or the builder. The runner never returns a guard error itself;
//! spawn failures and timeouts are reported as `anyhow` errors and a non-zero
//! exit status is part of [`CommandOutput`].

use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::process::Stdio;
use std::time::Duration;

use crate::command::ShellLine;
use crate::constants::DEFAULT_COMMAND_TIMEOUT_SECS;
use crate::path_security::ValidatedPath;
use crate::platform::{OsFamily, PlatformProfile};

/// Captured result of a finished command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    /// `None` when the process was ended by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ShellRunner<'a> {
    profile: &'a PlatformProfile,
    timeout: Duration,
}

impl<'a> ShellRunner<'a> {
    pub fn new(profile: &'a PlatformProfile) -> Self {
        Self {
            profile,
            timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the process without spawning it.
    pub fn command(
        &self,
        line: &impl ShellLine,
        working_dir: Option<&ValidatedPath>,
    ) -> tokio::process::Command {
        let shell = self.profile.shell();
        let mut cmd = tokio::process::Command::new(shell.interpreter);
        cmd.arg(shell.flag);

        // cmd.exe does its own parsing of the line; the usual argv quoting
        // would wrap it in another layer of quotes.
        #[cfg(windows)]
        cmd.raw_arg(line.as_shell_line());
        #[cfg(not(windows))]
        cmd.arg(line.as_shell_line());

        if let Some(dir) = working_dir {
            cmd.current_dir(dir.as_path());
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Spawn `line`, wait for it within the timeout and collect its output.
    pub async fn run(
        &self,
        line: &impl ShellLine,
        working_dir: Option<&ValidatedPath>,
    ) -> Result<CommandOutput> {
        let host = OsFamily::detect();
        if self.profile.family() != host {
            bail!(
                "Refusing to run a {} command line on a {} host",
                self.profile.name(),
                host
            );
        }

        let text = line.as_shell_line();
        tracing::debug!(
            "Running via {} {}: {}",
            self.profile.shell().interpreter,
            self.profile.shell().flag,
            text
        );

        let child = self
            .command(line, working_dir)
            .spawn()
            .with_context(|| format!("Failed to spawn '{}'", text))?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.with_context(|| format!("Failed to wait for '{}'", text))?,
            Err(_) => {
                tracing::warn!("Command timed out after {:?}: {}", self.timeout, text);
                bail!("Command timed out after {:?}: {}", self.timeout, text);
            }
        };

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!("Command exited with {:?}", result.exit_code);
        Ok(result)
    }
}
