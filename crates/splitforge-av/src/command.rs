//! Builder for executing external tool commands with timeout support.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use splitforge_common::{Error, Result};
use tokio::process::Command;

/// Default command timeout: 10 minutes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Maximum number of trailing stderr characters carried in error messages.
pub const STDERR_TAIL_CHARS: usize = 2000;

/// Output captured from a successful tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use splitforge_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> splitforge_common::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffmpeg"))
///     .arg("-version")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    /// Short tool name used in error messages (`ffmpeg`, not `/usr/bin/ffmpeg`).
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// The child is killed if the timeout expires or the returned future is
    /// dropped before completion.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolNotFound`] if the executable does not exist.
    /// - [`Error::Timeout`] if the process outlives the configured timeout.
    /// - [`Error::Processing`] if the process exits with a non-zero status
    ///   (message carries the tail of stderr) or cannot be spawned or awaited.
    pub async fn execute(&self) -> Result<ToolOutput> {
        let tool = self.tool_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(tool = %tool, args = ?self.args, "spawning tool");

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found(tool.clone())
            } else {
                Error::processing(tool.clone(), format!("failed to spawn: {e}"))
            }
        })?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let tool_output = ToolOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                if !output.status.success() {
                    let tail = tail_chars(tool_output.stderr.trim(), STDERR_TAIL_CHARS);
                    return Err(Error::processing(
                        tool,
                        format!("exited with {}: {}", output.status, tail),
                    ));
                }

                Ok(tool_output)
            }
            Ok(Err(e)) => Err(Error::processing(
                tool,
                format!("I/O error waiting for process: {e}"),
            )),
            // The dropped wait future owned the child; kill_on_drop reaps it.
            Err(_elapsed) => Err(Error::Timeout {
                tool,
                after: self.timeout,
            }),
        }
    }
}

/// Runs a prepared [`ToolCommand`].
///
/// The splitter goes through this seam so tests can substitute a fake that
/// fabricates output files instead of spawning ffmpeg.
#[async_trait::async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput>;
}

/// Runner that spawns a real subprocess.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait::async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        command.execute().await
    }
}

/// Return at most the last `max` characters of `s`, on a char boundary.
///
/// # Examples
///
/// ```
/// use splitforge_av::tail_chars;
///
/// assert_eq!(tail_chars("abcdef", 3), "def");
/// assert_eq!(tail_chars("abc", 10), "abc");
/// ```
pub fn tail_chars(s: &str, max: usize) -> &str {
    let count = s.chars().count();
    if count <= max {
        return s;
    }
    let skip = count - max;
    let start = s
        .char_indices()
        .nth(skip)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[start..]
}
