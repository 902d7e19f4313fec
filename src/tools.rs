//! ffmpeg detection and resolution.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Information about the ffmpeg installation.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Whether ffmpeg is available.
    pub available: bool,
    /// First line of `ffmpeg -version` output if available.
    pub version: Option<String>,
    /// Path to the executable.
    pub path: Option<PathBuf>,
}

/// Check whether ffmpeg is runnable and report its version.
pub fn check_ffmpeg() -> ToolInfo {
    let result = Command::new("ffmpeg").arg("-version").output();

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                available: true,
                version,
                path: which::which("ffmpeg").ok(),
            }
        }
        _ => ToolInfo {
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Resolve the ffmpeg executable, preferring a configured path over a
/// `PATH` lookup.
///
/// # Errors
///
/// Returns [`Error::Launch`] if no usable executable is found.
pub fn resolve_ffmpeg(config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
    }

    which::which("ffmpeg").map_err(|_| Error::launch("ffmpeg", "not found on PATH"))
}
