//! External command execution
//!
//! Commands run to completion; stdout and stderr are drained concurrently line
//! by line so neither pipe can fill up and block the child. Each line is
//! handed to a callback as it arrives and also collected for the caller.

use crate::error::CommandError;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Output stream a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Callback receiving each output line as it is read
pub type LineCallback<'a> = &'a (dyn Fn(Stream, &str) + Send + Sync);

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, -1 when the process was terminated by a signal
    pub exit_code: i32,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// A successful result with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed result with the given exit code and stderr
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Returns true if the command exited with status 0
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Capability for running external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `argv` to completion, reporting each output line to `on_line`
    async fn run_streaming(
        &self,
        argv: &[String],
        on_line: LineCallback<'_>,
    ) -> Result<CommandOutput, CommandError>;

    /// Run `argv` to completion, only capturing its output
    async fn run(&self, argv: &[String]) -> Result<CommandOutput, CommandError> {
        self.run_streaming(argv, &|_, _| {}).await
    }
}

/// Runner that spawns real processes
#[derive(Debug, Default, Clone)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    /// Create a new system command runner
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run_streaming(
        &self,
        argv: &[String],
        on_line: LineCallback<'_>,
    ) -> Result<CommandOutput, CommandError> {
        let (program, args) = argv.split_first().ok_or(CommandError::Empty)?;
        let command = argv.join(" ");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CommandError::Spawn {
                command: command.clone(),
                source: e,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (stdout, stderr) = tokio::join!(
            drain(stdout, Stream::Stdout, on_line),
            drain(stderr, Stream::Stderr, on_line)
        );

        let status = child.wait().await.map_err(|e| CommandError::Wait {
            command: command.clone(),
            source: e,
        })?;

        let wrap = |source| CommandError::Wait {
            command: command.clone(),
            source,
        };

        Ok(CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: stdout.map_err(wrap)?,
            stderr: stderr.map_err(wrap)?,
        })
    }
}

/// Read `reader` to the end line by line
async fn drain<R>(
    reader: Option<R>,
    stream: Stream,
    on_line: LineCallback<'_>,
) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut collected = String::new();
    let Some(reader) = reader else {
        return Ok(collected);
    };

    let mut segments = BufReader::new(reader).split(b'\n');
    while let Some(segment) = segments.next_segment().await? {
        let line = String::from_utf8_lossy(&segment);
        let line = line.trim_end_matches('\r');
        on_line(stream, line);
        collected.push_str(line);
        collected.push('\n');
    }

    Ok(collected)
}

/// Build an argument vector from string slices
pub fn argv<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}
