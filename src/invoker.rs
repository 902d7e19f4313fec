//! External process invocation with live output streaming.
//!
//! [`ToolCommand`] spawns exactly one child process with both output
//! pipes redirected, drains each pipe line-by-line on its own reader
//! thread while the calling thread blocks on exit, and returns the
//! captured text plus exit code. Draining concurrently with the wait is
//! load-bearing: a child that fills an undrained pipe deadlocks.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::reporter::StatusReporter;
use crate::result::ProcessHandle;
use crate::{Error, Result};

/// Raw outcome of a single process run, before any operation-level
/// success judgement. The invoker records the exit code but does not
/// decide success: it does not know the operation's filesystem
/// expectations.
#[derive(Debug)]
pub struct RunOutput {
    /// Process exit code; -1 when terminated by a signal.
    pub exit_code: i32,
    /// Captured standard output, trimmed.
    pub stdout: String,
    /// Captured standard error, trimmed.
    pub stderr: String,
    /// Time from immediately before spawn to exit observed.
    pub duration: Duration,
    /// Handle to the (now exited) process.
    pub handle: ProcessHandle,
}

/// A builder for one external tool invocation.
///
/// Arguments are passed to the OS as a vector, never through a shell,
/// so paths with spaces or shell metacharacters need no quoting.
///
/// # Example
///
/// ```no_run
/// use reelsmith::{NullReporter, ToolCommand};
///
/// # fn example() -> reelsmith::Result<()> {
/// let run = ToolCommand::new("/usr/bin/ffmpeg")
///     .tag("cleanse")
///     .arg("-i")
///     .arg("/path/to/input.mp4")
///     .run(&NullReporter)?;
/// println!("exit code {}", run.exit_code);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    tag: String,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let tag = program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| program.to_string_lossy().to_string());
        Self {
            program,
            args: Vec::new(),
            tag,
        }
    }

    /// Set the source tag passed to the reporter with every line.
    /// Defaults to the program's file name.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<OsString>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Spawn the process without waiting for it.
    ///
    /// Use this instead of [`run`](ToolCommand::run) when a supervising
    /// thread needs the [`ProcessHandle`] while the process is still
    /// running, e.g. to enforce a timeout by racing the blocking
    /// [`wait`](RunningTool::wait) against a timer that calls
    /// [`ProcessHandle::kill`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Launch`] if the process cannot be started.
    pub fn spawn(&self) -> Result<RunningTool> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Make the child a process-group leader so kill() can take the
        // whole descendant tree down with one group signal.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        tracing::debug!(program = %self.program.display(), args = ?self.args, "spawning tool");

        let started = Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| Error::launch(&self.tag, e.to_string()))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        Ok(RunningTool {
            tag: self.tag.clone(),
            handle: ProcessHandle::new(child),
            stdout,
            stderr,
            started,
        })
    }

    /// Spawn the process and block until it exits, forwarding every
    /// output line to `reporter` as it arrives.
    pub fn run(&self, reporter: &dyn StatusReporter) -> Result<RunOutput> {
        self.spawn()?.wait(reporter)
    }

    /// Path of the program this command will execute.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

/// A spawned process that has not yet been waited on.
pub struct RunningTool {
    tag: String,
    handle: ProcessHandle,
    stdout: Option<std::process::ChildStdout>,
    stderr: Option<std::process::ChildStderr>,
    started: Instant,
}

impl RunningTool {
    /// Clone the handle for supervision from another thread.
    pub fn handle(&self) -> ProcessHandle {
        self.handle.clone()
    }

    /// Block until the process exits, draining both output pipes.
    ///
    /// Each pipe gets a dedicated reader thread that forwards completed
    /// lines to `reporter` in the order the child wrote them; no
    /// ordering is guaranteed between the two streams. Both readers are
    /// joined before this returns.
    pub fn wait(mut self, reporter: &dyn StatusReporter) -> Result<RunOutput> {
        let stdout_pipe = self.stdout.take();
        let stderr_pipe = self.stderr.take();
        let tag = self.tag.as_str();

        let (status, out, err) = std::thread::scope(|scope| {
            let out = scope.spawn(move || {
                drain(stdout_pipe, |line| reporter.update(tag, line))
            });
            let err = scope.spawn(move || {
                drain(stderr_pipe, |line| {
                    reporter.update(tag, &format!("[stderr] {line}"))
                })
            });
            let status = self.handle.wait();
            (status, out.join(), err.join())
        });

        let status = status?;
        let stdout = reader_text(out)?;
        let stderr = reader_text(err)?;
        let duration = self.started.elapsed();
        let exit_code = status.code().unwrap_or(-1);

        tracing::debug!(tag = %self.tag, exit_code, ?duration, "tool exited");

        Ok(RunOutput {
            exit_code,
            stdout,
            stderr,
            duration,
            handle: self.handle,
        })
    }
}

/// Read a pipe to completion, forwarding each complete line and
/// accumulating the full text.
///
/// Lines are read as raw bytes and converted lossily: ffmpeg freely
/// writes non-UTF-8 (e.g. latin-1 file names) into its diagnostics,
/// and a stray byte must not fail the run.
fn drain<R: Read>(
    pipe: Option<R>,
    mut forward: impl FnMut(&str),
) -> std::io::Result<String> {
    let Some(pipe) = pipe else {
        return Ok(String::new());
    };
    let mut reader = BufReader::new(pipe);
    let mut captured = String::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        let line = String::from_utf8_lossy(&buf);
        forward(&line);
        captured.push_str(&line);
        captured.push('\n');
    }
    Ok(captured.trim().to_string())
}

fn reader_text(joined: std::thread::Result<std::io::Result<String>>) -> Result<String> {
    match joined {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(Error::Io(e)),
        Err(_) => Err(Error::Io(std::io::Error::other("stream reader panicked"))),
    }
}
