//! Argument templates for the ffmpeg invocations each operation runs.
//!
//! These are configuration data, kept in one place and returned as
//! argument vectors so they reach the OS without shell interpretation.

use std::ffi::OsString;
use std::path::Path;

/// Default segment length for [`segment`] in seconds.
pub const DEFAULT_CHUNK_SECONDS: u32 = 15;
/// Default constant rate factor for [`encode_images`].
pub const DEFAULT_CRF: u32 = 18;
/// Default frame rate for [`encode_images`].
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Numbered file pattern used for image sequences (`Image1.png`, ...).
pub const IMAGE_PATTERN: &str = "Image%d.png";
/// Numbered file pattern used for segments (`chunk_000.mp4`, ...).
pub const CHUNK_PATTERN: &str = "chunk_%03d.mp4";

/// Stream-copy remux that rebuilds container index and metadata.
pub fn remux(input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-i".into(),
        input.into(),
        "-map".into(),
        "0".into(),
        "-c".into(),
        "copy".into(),
        "-movflags".into(),
        "+faststart".into(),
        output.into(),
    ]
}

/// Seek to one second before end of stream and grab a single frame.
pub fn last_frame(input: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-sseof".into(),
        "-1".into(),
        "-i".into(),
        input.into(),
        "-update".into(),
        "1".into(),
        "-q:v".into(),
        "1".into(),
        output.into(),
    ]
}

/// Decode every frame to numbered PNGs in `output_folder`.
pub fn image_sequence(input: &Path, output_folder: &Path) -> Vec<OsString> {
    vec![
        "-i".into(),
        input.into(),
        output_folder.join(IMAGE_PATTERN).into(),
    ]
}

/// Stream-copy segmentation into fixed-duration chunks.
pub fn segment(input: &Path, output_folder: &Path, chunk_seconds: u32) -> Vec<OsString> {
    vec![
        "-i".into(),
        input.into(),
        "-c".into(),
        "copy".into(),
        "-map".into(),
        "0".into(),
        "-f".into(),
        "segment".into(),
        "-segment_time".into(),
        chunk_seconds.to_string().into(),
        output_folder.join(CHUNK_PATTERN).into(),
    ]
}

/// Encode a numbered PNG sequence to H.264 MP4.
pub fn encode_images(
    image_folder: &Path,
    output: &Path,
    crf: u32,
    frame_rate: u32,
) -> Vec<OsString> {
    vec![
        "-framerate".into(),
        frame_rate.to_string().into(),
        "-i".into(),
        image_folder.join(IMAGE_PATTERN).into(),
        "-c:v".into(),
        "libx264".into(),
        "-crf".into(),
        crf.to_string().into(),
        "-preset".into(),
        "slow".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-loglevel".into(),
        "error".into(),
        output.into(),
    ]
}
