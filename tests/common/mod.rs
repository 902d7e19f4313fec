//! Shared fixtures: fake tool scripts standing in for ffmpeg.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write an executable `sh` script into `dir` and return its path.
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = fs::metadata(&path).expect("stat script").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// Fake ffmpeg that appends each invocation's argument line to `log`
/// and creates the file named by its last argument (the output every
/// template ends with).
pub fn fake_ffmpeg(dir: &Path, log: &Path) -> PathBuf {
    fake_tool(
        dir,
        "ffmpeg",
        &format!(
            r#"echo "$*" >> "{log}"
for last; do :; done
touch "$last""#,
            log = log.display()
        ),
    )
}

/// Invocation argument lines recorded by [`fake_ffmpeg`].
pub fn logged_invocations(log: &Path) -> Vec<String> {
    match fs::read_to_string(log) {
        Ok(text) => text.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}
