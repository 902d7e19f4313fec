//! The five public media operations, each a short linear run of ffmpeg
//! stages.
//!
//! Three of the operations take a video container as input and may be
//! handed files whose index or metadata an upstream generator left
//! malformed. Seeking, frame decoding, and segmentation are intolerant
//! of that, so those operations first run a stream-copy remux
//! ("cleanse") into a scoped temp file and transform the repaired copy.
//! `create_mp4_from_images` takes still images, so there is no
//! container to repair.
//!
//! Operations never return `Err`: every failure is converted at the
//! operation boundary into an [`ExecutionResult`] with `success ==
//! false` and explanatory error text.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tempfile::TempDir;

use crate::invoker::{RunOutput, ToolCommand};
use crate::reporter::{NullReporter, StatusReporter};
use crate::result::ExecutionResult;
use crate::{args, tools, Error, Result};

const OP_CLEANSE: &str = "cleanse";
const OP_EXTRACT_LAST_FRAME: &str = "extract_last_frame";
const OP_IMAGE_SEQUENCE: &str = "convert_to_image_sequence";
const OP_SPLIT_VIDEO: &str = "split_video";
const OP_CREATE_MP4: &str = "create_mp4_from_images";

/// Settings for encoding an image sequence to video.
#[derive(Debug, Clone)]
pub struct EncodeSettings {
    /// Constant rate factor; lower is higher quality (default: 18).
    pub crf: u32,
    /// Input frame rate (default: 30).
    pub frame_rate: u32,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            crf: args::DEFAULT_CRF,
            frame_rate: args::DEFAULT_FRAME_RATE,
        }
    }
}

/// Settings for fixed-duration segmentation.
#[derive(Debug, Clone)]
pub struct SplitSettings {
    /// Chunk length in seconds (default: 15).
    pub chunk_seconds: u32,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            chunk_seconds: args::DEFAULT_CHUNK_SECONDS,
        }
    }
}

/// Orchestrates ffmpeg for the five media transforms.
///
/// Holds the ffmpeg executable path (injected, so tests and embedders
/// control resolution) and a status reporter that receives every
/// diagnostic line the tool emits while running.
///
/// # Example
///
/// ```no_run
/// use reelsmith::VideoPipeline;
/// use std::path::Path;
///
/// # fn example() -> reelsmith::Result<()> {
/// let pipeline = VideoPipeline::discover()?;
/// let result = pipeline.cleanse(Path::new("in.mp4"), Path::new("out.mp4"));
/// if !result.success {
///     eprintln!("cleanse failed: {}", result.error_text);
/// }
/// # Ok(())
/// # }
/// ```
pub struct VideoPipeline {
    ffmpeg: PathBuf,
    reporter: Arc<dyn StatusReporter>,
}

impl VideoPipeline {
    /// Create a pipeline around an explicit ffmpeg executable path.
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            reporter: Arc::new(NullReporter),
        }
    }

    /// Create a pipeline by locating ffmpeg on `PATH`.
    pub fn discover() -> Result<Self> {
        Ok(Self::new(tools::resolve_ffmpeg(None)?))
    }

    /// Attach a reporter that receives every diagnostic line as it
    /// arrives.
    pub fn with_reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Path of the ffmpeg executable this pipeline invokes.
    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    /// Repair a container by stream-copying all streams into a new
    /// file, rebuilding index and metadata without re-encoding.
    ///
    /// Success requires exit code 0 and `output` on disk.
    pub fn cleanse(&self, input: &Path, output: &Path) -> ExecutionResult {
        self.operation(OP_CLEANSE, |op, started| {
            self.preflight(input)?;
            let run = self.run_stage(op, args::remux(input, output))?;
            Ok(Self::finish(op, started, run, Some(output)))
        })
    }

    /// Extract the last frame of a video to a still image.
    ///
    /// Cleanses the input first; success requires the cleanse to pass,
    /// exit code 0, and `output` on disk.
    pub fn extract_last_frame(&self, input: &Path, output: &Path) -> ExecutionResult {
        self.operation(OP_EXTRACT_LAST_FRAME, |op, started| {
            self.preflight(input)?;
            let temp = RemuxTemp::new(input)?;
            self.run_cleanse_stage(op, input, temp.path())?;
            let run = self.run_stage(op, args::last_frame(temp.path(), output))?;
            Ok(Self::finish(op, started, run, Some(output)))
        })
    }

    /// Decode a video to numbered PNGs (`Image1.png`, `Image2.png`, ...)
    /// in `output_folder`, creating the folder if needed.
    ///
    /// Cleanses the input first; success requires the cleanse to pass
    /// and exit code 0.
    pub fn convert_to_image_sequence(
        &self,
        input: &Path,
        output_folder: &Path,
    ) -> ExecutionResult {
        self.operation(OP_IMAGE_SEQUENCE, |op, started| {
            self.preflight(input)?;
            std::fs::create_dir_all(output_folder)?;
            let temp = RemuxTemp::new(input)?;
            self.run_cleanse_stage(op, input, temp.path())?;
            let run = self.run_stage(op, args::image_sequence(temp.path(), output_folder))?;
            Ok(Self::finish(op, started, run, None))
        })
    }

    /// Split a video into fixed-duration chunks (`chunk_000.mp4`, ...)
    /// by stream copy, without re-encoding.
    ///
    /// `output_folder` must already exist. Cleanses the input first;
    /// success requires the cleanse to pass and exit code 0. The chunk
    /// count is whatever ffmpeg's segmenter produces and is not
    /// independently verified.
    pub fn split_video(
        &self,
        input: &Path,
        output_folder: &Path,
        settings: &SplitSettings,
    ) -> ExecutionResult {
        let chunk_seconds = settings.chunk_seconds;
        self.operation(OP_SPLIT_VIDEO, |op, started| {
            self.preflight(input)?;
            require_dir(output_folder)?;
            let temp = RemuxTemp::new(input)?;
            self.run_cleanse_stage(op, input, temp.path())?;
            self.reporter.update(
                op,
                &format!("splitting video into {chunk_seconds} second chunks"),
            );
            let run =
                self.run_stage(op, args::segment(temp.path(), output_folder, chunk_seconds))?;
            let status = if run.exit_code == 0 {
                "video split complete"
            } else {
                "video split failed"
            };
            self.reporter.update(op, status);
            Ok(Self::finish(op, started, run, None))
        })
    }

    /// Encode a numbered PNG sequence (`Image1.png`, `Image2.png`, ...)
    /// in `image_folder` into an H.264 MP4 at `output`.
    ///
    /// No cleanse stage: the input is still images, there is no
    /// container to repair. Success requires exit code 0 and `output`
    /// on disk.
    pub fn create_mp4_from_images(
        &self,
        image_folder: &Path,
        output: &Path,
        settings: &EncodeSettings,
    ) -> ExecutionResult {
        self.operation(OP_CREATE_MP4, |op, started| {
            self.require_executable()?;
            require_dir(image_folder)?;
            let run = self.run_stage(
                op,
                args::encode_images(image_folder, output, settings.crf, settings.frame_rate),
            )?;
            Ok(Self::finish(op, started, run, Some(output)))
        })
    }

    /// Run an operation body, converting any failure into a failed
    /// result instead of letting it escape.
    fn operation(
        &self,
        op: &'static str,
        body: impl FnOnce(&'static str, Instant) -> Result<ExecutionResult>,
    ) -> ExecutionResult {
        let started = Instant::now();
        tracing::info!(operation = op, "starting");
        let result = body(op, started).unwrap_or_else(|err| {
            tracing::warn!(operation = op, error = %err, "operation failed");
            ExecutionResult::failed(op, err.to_string(), started.elapsed())
        });
        tracing::info!(operation = op, success = result.success, "finished");
        result
    }

    /// Preconditions shared by the video-input operations, checked
    /// before any process is spawned.
    fn preflight(&self, input: &Path) -> Result<()> {
        self.require_executable()?;
        if !input.is_file() {
            return Err(Error::precondition(format!(
                "input file not found: {}",
                input.display()
            )));
        }
        Ok(())
    }

    fn require_executable(&self) -> Result<()> {
        if !self.ffmpeg.is_file() {
            return Err(Error::launch(
                "ffmpeg",
                format!("executable not found: {}", self.ffmpeg.display()),
            ));
        }
        Ok(())
    }

    fn run_stage(&self, op: &str, stage_args: Vec<std::ffi::OsString>) -> Result<RunOutput> {
        ToolCommand::new(&self.ffmpeg)
            .tag(op)
            .args(stage_args)
            .run(self.reporter.as_ref())
    }

    /// Run the remux precondition stage. Its exit code is never
    /// recorded in the returned result, only pass/fail plus diagnostics.
    fn run_cleanse_stage(&self, op: &str, input: &Path, output: &Path) -> Result<()> {
        tracing::debug!(operation = op, input = %input.display(), "cleanse stage");
        let run = self.run_stage(op, args::remux(input, output))?;
        if run.exit_code != 0 {
            let diagnostic = if run.stderr.is_empty() {
                "ffmpeg reported failure with no diagnostic output".to_string()
            } else {
                run.stderr
            };
            return Err(Error::CleanseFailed(diagnostic));
        }
        if !output.is_file() {
            return Err(Error::CleanseFailed(format!(
                "remuxed file was not produced: {}",
                output.display()
            )));
        }
        Ok(())
    }

    /// Derive the operation-level outcome from the final stage's run.
    fn finish(
        op: &str,
        started: Instant,
        run: RunOutput,
        artifact: Option<&Path>,
    ) -> ExecutionResult {
        let mut success = run.exit_code == 0;
        let mut error_text = run.stderr;
        if success {
            if let Some(path) = artifact {
                if !path.is_file() {
                    success = false;
                    error_text = Error::missing_artifact(path).to_string();
                }
            }
        }
        ExecutionResult {
            operation: op.to_string(),
            exit_code: run.exit_code,
            output_text: run.stdout,
            error_text,
            duration: started.elapsed(),
            success,
            handle: Some(run.handle),
        }
    }
}

fn require_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(Error::precondition(format!(
            "directory not found: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Cleansed copy of the input, scoped to the enclosing operation call.
///
/// Lives in its own temp directory so the remuxed file keeps the
/// input's file name (ffmpeg infers the muxer from the extension) and
/// is deleted on every exit path when the directory drops.
struct RemuxTemp {
    _dir: TempDir,
    path: PathBuf,
}

impl RemuxTemp {
    fn new(input: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("reelsmith-").tempdir()?;
        let name = input.file_name().ok_or_else(|| {
            Error::precondition(format!("input has no file name: {}", input.display()))
        })?;
        let path = dir.path().join(name);
        Ok(Self { _dir: dir, path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
