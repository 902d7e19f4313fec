//! Progress and diagnostic reporting for tool invocations.
//!
//! External tools emit a live stream of diagnostic lines while they run.
//! Callers that want those lines supply a [`StatusReporter`]; callers
//! that do not use [`NullReporter`]. The invoker never special-cases
//! which one it was handed.

/// Sink for lines emitted by a running external process.
///
/// `source` identifies the operation that produced the line; `line` is
/// one complete line of tool output, with standard-error lines prefixed
/// `[stderr]`. Implementations must be cheap and non-blocking: the
/// reporter is called from the stream-reader threads while the process
/// is still running.
pub trait StatusReporter: Send + Sync {
    /// Receive one line of output from a running tool.
    fn update(&self, source: &str, line: &str);
}

/// Reporter that discards every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl StatusReporter for NullReporter {
    fn update(&self, _source: &str, _line: &str) {}
}

/// Reporter that forwards every line to the `tracing` subscriber at
/// debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn update(&self, source: &str, line: &str) {
        tracing::debug!(source, "{line}");
    }
}

/// Adapter that lets a closure act as a reporter.
///
/// ```
/// use reelsmith::{FnReporter, StatusReporter};
///
/// let reporter = FnReporter(|source: &str, line: &str| {
///     println!("[{source}] {line}");
/// });
/// reporter.update("cleanse", "frame=1");
/// ```
pub struct FnReporter<F>(pub F);

impl<F> StatusReporter for FnReporter<F>
where
    F: Fn(&str, &str) + Send + Sync,
{
    fn update(&self, source: &str, line: &str) {
        (self.0)(source, line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_closure_reporter() {
        let lines = Mutex::new(Vec::new());
        let reporter = FnReporter(|source: &str, line: &str| {
            lines.lock().unwrap().push(format!("{source}: {line}"));
        });
        reporter.update("cleanse", "frame=1");
        reporter.update("cleanse", "frame=2");
        assert_eq!(
            *lines.lock().unwrap(),
            vec!["cleanse: frame=1", "cleanse: frame=2"]
        );
    }

    #[test]
    fn test_null_reporter_is_object_safe() {
        let reporter: &dyn StatusReporter = &NullReporter;
        reporter.update("split", "chunk 1 written");
    }
}
