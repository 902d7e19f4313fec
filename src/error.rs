//! Error types for reelsmith.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while orchestrating an external tool.
///
/// None of these escape a [`VideoPipeline`](crate::VideoPipeline)
/// operation: the pipeline converts every failure into the returned
/// [`ExecutionResult`](crate::ExecutionResult)'s error text. They are
/// surfaced directly only by the lower-level invoker and tool-discovery
/// APIs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The executable could not be started (missing, not executable).
    #[error("failed to launch {tool}: {message}")]
    Launch { tool: String, message: String },

    /// A required input file or directory was absent before spawning.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The container-repair stage failed, so the dependent transform
    /// stage was skipped.
    #[error("cleanse stage failed: {0}")]
    CleanseFailed(String),

    /// The process reported success but the promised output is absent.
    #[error("expected output missing: {}", path.display())]
    MissingArtifact { path: PathBuf },

    /// An I/O error occurred during orchestration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a launch failure error.
    pub fn launch(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Launch {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a precondition failure error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Create a missing artifact error.
    pub fn missing_artifact(path: impl Into<PathBuf>) -> Self {
        Self::MissingArtifact { path: path.into() }
    }
}
