// SPDX-License-Identifier: MPL-2.0

//! TIFF tag patching through an external program.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// TIFF tag 270, repurposed to record the geometry of the source frames.
pub const IMAGE_DESCRIPTION_TAG: u16 = 270;

/// Anything able to overwrite one ASCII tag of an existing TIFF file.
pub trait MetadataPatcher {
    fn patch_tag(&self, path: &Path, tag: u16, value: &str) -> Result<()>;
}

/// Value stored in the image description: the size of one source frame.
pub fn frame_geometry(width: usize, height: usize) -> String {
    format!("width = {}, height = {}", width, height)
}

/// Patcher running libtiff's `tiffset -s <tag> <value> <file>`.
#[derive(Debug, Clone)]
pub struct Tiffset {
    pub program: PathBuf,
    /// Longest time the program may run before being killed.
    pub timeout: Duration,
}

const POLL_INTERVAL: Duration = Duration::from_millis(10);

impl Tiffset {
    pub fn new<P: Into<PathBuf>>(program: P, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn error(&self, reason: String) -> Error {
        Error::MetadataPatch {
            program: self.program.display().to_string(),
            reason,
        }
    }
}

impl MetadataPatcher for Tiffset {
    fn patch_tag(&self, path: &Path, tag: u16, value: &str) -> Result<()> {
        log::debug!(
            "Running {} -s {} {:?} {}",
            self.program.display(),
            tag,
            value,
            path.display()
        );
        let mut child = Command::new(&self.program)
            .arg("-s")
            .arg(tag.to_string())
            .arg(value)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.error(format!("could not start: {}", e)))?;

        // Drained while waiting, a chatty tool would otherwise block on a full pipe.
        let stderr_pipe = child.stderr.take();
        let stderr_reader = std::thread::spawn(move || {
            let mut stderr = String::new();
            if let Some(mut pipe) = stderr_pipe {
                let _ = pipe.read_to_string(&mut stderr);
            }
            stderr
        });

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if start.elapsed() >= self.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(self.error(format!("timed out after {:?}", self.timeout)));
                }
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(self.error(format!("could not wait: {}", e))),
            }
        };

        if status.success() {
            log::info!("Set tag {} of {} to {:?}", tag, path.display(), value);
            Ok(())
        } else {
            let stderr = stderr_reader.join().unwrap_or_default();
            Err(self.error(format!("{} {}", status, stderr.trim())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_text() {
        assert_eq!(frame_geometry(2048, 1536), "width = 2048, height = 1536");
    }

    #[test]
    fn missing_program() {
        let patcher = Tiffset::new("/nonexistent/tiffset", Duration::from_secs(1));
        let err = patcher
            .patch_tag(Path::new("raw.tiff"), IMAGE_DESCRIPTION_TAG, "x")
            .unwrap_err();
        match err {
            Error::MetadataPatch { program, reason } => {
                assert_eq!(program, "/nonexistent/tiffset");
                assert!(reason.starts_with("could not start"), "{}", reason);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit() {
        let patcher = Tiffset::new("false", Duration::from_secs(5));
        let err = patcher
            .patch_tag(Path::new("raw.tiff"), IMAGE_DESCRIPTION_TAG, "x")
            .unwrap_err();
        assert!(matches!(err, Error::MetadataPatch { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn zero_exit() {
        let patcher = Tiffset::new("true", Duration::from_secs(5));
        patcher
            .patch_tag(Path::new("raw.tiff"), IMAGE_DESCRIPTION_TAG, "x")
            .unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_survives_a_flood_of_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("noisy-tiffset");
        std::fs::write(
            &script,
            "#!/bin/sh\nhead -c 200000 /dev/zero | tr '\\0' x >&2\necho bad tag >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let patcher = Tiffset::new(&script, Duration::from_secs(20));
        let err = patcher
            .patch_tag(Path::new("raw.tiff"), IMAGE_DESCRIPTION_TAG, "x")
            .unwrap_err();
        match err {
            Error::MetadataPatch { reason, .. } => {
                assert!(!reason.contains("timed out"), "{}", &reason[..80.min(reason.len())]);
                assert!(reason.ends_with("bad tag"), "{}", &reason[reason.len().saturating_sub(80)..]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
