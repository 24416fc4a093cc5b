//! Driving exiftool, the external metadata writer.
//!
//! GPS tags are never written directly; the pipeline hands exiftool the
//! tagging table and lets it burn the tags in. exiftool leaves a
//! `<name>_original` backup beside every file it modifies, which doubles
//! as the recovery mechanism when a run goes wrong and is cleaned up
//! afterwards with [`remove_backups`].

use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::error::{Result, UastagError};

const PROGRAM: &str = "exiftool";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Runs `exiftool -csv=<table> <image_dir>`, waiting up to `timeout`.
///
/// A nonzero exit, a failure to launch, or an expired timeout all fail
/// the run; image files then remain untouched or recoverable from the
/// tool's own backups.
pub fn write_tags(table: &Path, image_dir: &Path, timeout: Duration) -> Result<()> {
    let tool_err = |detail: String| UastagError::ExternalTool {
        program: PROGRAM.to_string(),
        detail,
    };

    info!("running {} -csv={} {}", PROGRAM, table.display(), image_dir.display());
    let mut child = Command::new(PROGRAM)
        .arg(format!("-csv={}", table.display()))
        .arg(image_dir)
        .spawn()
        .map_err(|e| tool_err(format!("failed to start: {}", e)))?;

    // std has no wait-with-timeout, so poll
    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if status.success() {
                    return Ok(());
                }
                return Err(tool_err(format!("exited with {}", status)));
            }
            Ok(None) => {}
            Err(e) => return Err(tool_err(format!("wait failed: {}", e))),
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(tool_err(format!(
                "timed out after {} s",
                timeout.as_secs()
            )));
        }
        std::thread::sleep(Duration::from_millis(200));
    }
}

/// Recursively deletes the `*_original` backups exiftool leaves behind,
/// returning the number removed. A file that cannot be deleted is
/// logged and skipped.
pub fn remove_backups(dir: &Path) -> Result<usize> {
    if !dir.is_dir() {
        return Err(UastagError::InputNotFound {
            path: dir.to_path_buf(),
        });
    }
    let mut deleted = 0usize;
    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let is_backup = entry
            .file_name()
            .to_str()
            .map_or(false, |name| name.ends_with("_original"));
        if !is_backup {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => {
                info!("deleted {}", entry.path().display());
                deleted += 1;
            }
            Err(e) => warn!("cannot delete {}: {}", entry.path().display(), e),
        }
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_backups_missing_dir() {
        let err = remove_backups(Path::new("/no/such/dir")).unwrap_err();
        assert!(matches!(err, UastagError::InputNotFound { .. }));
    }

    #[test]
    fn test_remove_backups_recurses_and_keeps_images() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.JPG_original"), b"x").unwrap();
        fs::write(dir.path().join("sub/b.DNG_original"), b"x").unwrap();
        fs::write(dir.path().join("c.JPG"), b"x").unwrap();
        let deleted = remove_backups(dir.path()).unwrap();
        assert_eq!(deleted, 2);
        assert!(!dir.path().join("a.JPG_original").exists());
        assert!(!dir.path().join("sub/b.DNG_original").exists());
        assert!(dir.path().join("c.JPG").exists());
    }
}
