//! Shared runner for external tool processes

use std::collections::VecDeque;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, trace};

/// Number of stderr lines kept for error reports
const STDERR_TAIL_LINES: usize = 20;

/// Outcome of a finished tool process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitInfo {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    /// Last lines written to stderr
    pub stderr_tail: String,
}

impl ExitInfo {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human readable failure summary for error details
    pub fn describe_failure(&self, tool: &str) -> String {
        let status = match self.code {
            Some(code) => format!("{} exited with code {}", tool, code),
            None => format!("{} was terminated by a signal", tool),
        };
        if self.stderr_tail.is_empty() {
            status
        } else {
            format!("{}: {}", status, self.stderr_tail)
        }
    }
}

/// A fully built command line for an external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Printable command line, used for start-of-command diagnostics
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Spawn the tool and wait for it to exit.
    ///
    /// Every stdout line is handed to `on_line`. Stdin is closed so the tool
    /// can never block on a prompt. The child is killed if this future is
    /// dropped before it completes.
    ///
    /// Returns an error only if the process could not be spawned or its
    /// pipes failed; a non-zero exit is reported through [`ExitInfo`].
    pub async fn run<F>(&self, mut on_line: F) -> std::io::Result<ExitInfo>
    where
        F: FnMut(&str) + Send,
    {
        debug!("Executing command: {}", self.command_line());

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("stderr was not captured"))?;

        let read_stdout = async {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                trace!("stdout: {}", line);
                on_line(&line);
            }
            Ok::<_, std::io::Error>(())
        };

        let read_stderr = async {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            let mut lines = BufReader::new(stderr).lines();
            while let Some(line) = lines.next_line().await? {
                trace!("stderr: {}", line);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Ok::<_, std::io::Error>(tail)
        };

        let ((), tail) = tokio::try_join!(read_stdout, read_stderr)?;
        let status = child.wait().await?;
        debug!("status: {}", status);

        Ok(ExitInfo {
            code: status.code(),
            stderr_tail: tail
                .into_iter()
                .filter(|l| !l.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
        })
    }
}

/// Run `<program> <version_arg>` and return the first line of its output
pub async fn tool_version(program: &Path, version_arg: &str) -> std::io::Result<String> {
    let mut first_line = None;
    let exit = ToolCommand::new(program)
        .arg(version_arg)
        .run(|line| {
            if first_line.is_none() && !line.trim().is_empty() {
                first_line = Some(line.trim().to_string());
            }
        })
        .await?;

    if !exit.success() {
        return Err(std::io::Error::other(
            exit.describe_failure(&program.display().to_string()),
        ));
    }

    first_line.ok_or_else(|| {
        std::io::Error::other(format!("{} printed no version", program.display()))
    })
}
