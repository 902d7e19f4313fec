//! # reelsmith
//!
//! FFmpeg orchestration library for a small fixed set of media
//! transforms: container repair ("cleanse"), still-frame extraction,
//! frame-sequence export, fixed-duration segmentation, and
//! image-sequence-to-video encoding.
//!
//! The crate does no codec work itself. Its job is the orchestration
//! layer: spawning the external tool with argument vectors, draining
//! its diagnostic stream line-by-line without deadlocking while the
//! caller blocks for completion, deriving success from exit code plus
//! filesystem side effects, and threading the mandatory cleanse step
//! through the operations that consume video containers.
//!
//! ## Example
//!
//! ```no_run
//! use reelsmith::{SplitSettings, TracingReporter, VideoPipeline};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn example() -> reelsmith::Result<()> {
//! let pipeline = VideoPipeline::discover()?.with_reporter(Arc::new(TracingReporter));
//!
//! let result = pipeline.split_video(
//!     Path::new("/videos/show.mp4"),
//!     Path::new("/videos/chunks"),
//!     &SplitSettings::default(),
//! );
//! assert!(result.success, "{}", result.error_text);
//! # Ok(())
//! # }
//! ```

pub mod args;
mod error;
pub mod invoker;
mod pipeline;
mod reporter;
mod result;
pub mod tools;

// Re-exports
pub use error::{Error, Result};
pub use invoker::{RunOutput, RunningTool, ToolCommand};
pub use pipeline::{EncodeSettings, SplitSettings, VideoPipeline};
pub use reporter::{FnReporter, NullReporter, StatusReporter, TracingReporter};
pub use result::{ExecutionResult, ProcessHandle};
pub use tools::{check_ffmpeg, resolve_ffmpeg, ToolInfo};
