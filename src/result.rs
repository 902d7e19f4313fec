//! Invocation outcome records.

use std::process::{Child, ExitStatus};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Handle to the OS process behind an invocation.
///
/// The handle is shared between the blocking wait inside the invoker and
/// any supervising thread that needs to abort the run: clone it from
/// [`RunningTool::handle`](crate::invoker::RunningTool::handle) before
/// waiting, and call [`kill`](ProcessHandle::kill) from a timer or
/// watchdog thread. Once the process has been reaped the handle is
/// inert and `kill` does nothing.
#[derive(Clone)]
pub struct ProcessHandle {
    child: Arc<Mutex<Option<Child>>>,
    pid: u32,
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle").field("pid", &self.pid).finish()
    }
}

impl ProcessHandle {
    pub(crate) fn new(child: Child) -> Self {
        let pid = child.id();
        Self {
            child: Arc::new(Mutex::new(Some(child))),
            pid,
        }
    }

    /// OS process id of the child at spawn time.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Whether the process has not yet been reaped by a wait.
    pub fn is_live(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Child>> {
        // A poisoned lock only means a reader thread panicked; the
        // child state itself is still usable.
        self.child.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Force-terminate the process and all of its descendants.
    ///
    /// The invoker spawns every child as its own process-group leader,
    /// so on unix the whole group receives SIGKILL. Calling this after
    /// the process has exited is a no-op. A concurrent blocking wait
    /// observes the termination and returns promptly.
    pub fn kill(&self) {
        let mut guard = self.lock();
        if let Some(child) = guard.as_mut() {
            #[cfg(unix)]
            {
                use nix::sys::signal::{killpg, Signal};
                use nix::unistd::Pid;
                let _ = killpg(Pid::from_raw(self.pid as i32), Signal::SIGKILL);
            }
            // Direct kill as well, in case the group signal was not
            // deliverable (already reaped group, non-unix platforms).
            let _ = child.kill();
        }
    }

    /// Block until the process exits, polling so that a concurrent
    /// [`kill`](ProcessHandle::kill) through a cloned handle is never
    /// locked out.
    pub(crate) fn wait(&self) -> std::io::Result<ExitStatus> {
        loop {
            {
                let mut guard = self.lock();
                match guard.as_mut() {
                    None => {
                        return Err(std::io::Error::other("process already reaped"));
                    }
                    Some(child) => {
                        if let Some(status) = child.try_wait()? {
                            *guard = None;
                            return Ok(status);
                        }
                    }
                }
            }
            std::thread::sleep(Duration::from_millis(25));
        }
    }
}

/// Outcome of one pipeline operation.
///
/// Filled by the invoking pipeline call while the process runs and
/// returned by value; the only state that can change afterwards is the
/// liveness of the process behind [`handle`](ExecutionResult::handle),
/// via [`kill`](ExecutionResult::kill).
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Name of the pipeline operation that produced this result.
    pub operation: String,
    /// Exit code of the final stage. Meaningful only when a process
    /// actually ran, i.e. when `handle` is set.
    pub exit_code: i32,
    /// Captured standard output of the final stage, trimmed.
    pub output_text: String,
    /// Captured standard error of the final stage, trimmed, or the
    /// orchestration failure's explanatory text.
    pub error_text: String,
    /// Wall-clock duration of the whole operation, including any
    /// cleanse stage.
    pub duration: Duration,
    /// Whether the operation succeeded: exit code 0 and, where the
    /// operation promises an output artifact, that artifact on disk.
    pub success: bool,
    /// Handle to the final stage's process, absent when no process was
    /// spawned (precondition or launch failure).
    pub handle: Option<ProcessHandle>,
}

impl ExecutionResult {
    /// Result for an operation that failed before any process ran.
    pub(crate) fn failed(
        operation: impl Into<String>,
        error_text: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            operation: operation.into(),
            exit_code: 0,
            output_text: String::new(),
            error_text: error_text.into(),
            duration,
            success: false,
            handle: None,
        }
    }

    /// Force-terminate the underlying process and its descendants.
    ///
    /// No-op when no process was spawned or it has already been reaped.
    pub fn kill(&self) {
        if let Some(handle) = &self.handle {
            handle.kill();
        }
    }
}
