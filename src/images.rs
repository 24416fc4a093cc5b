//! Image discovery and EXIF capture-time reading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use exif::{In, Tag, Value};
use log::warn;

use crate::error::{Result, UastagError};

/// One photograph to be geotagged.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub path: PathBuf,
    /// Capture time from EXIF, per the camera's internal clock.
    pub capture_time: NaiveDateTime,
    /// Capture time shifted by the configured camera-to-UTC offset; this
    /// is what gets matched against the track.
    pub adjusted_time: NaiveDateTime,
}

/// Lists image files under `dir` down to `depth` levels, restricted to
/// the case-sensitive extension allow-list, sorted by path.
pub fn scan_images(dir: &Path, exts: &[String], depth: usize) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(UastagError::InputNotFound {
            path: dir.to_path_buf(),
        });
    }
    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .max_depth(depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(std::ffi::OsStr::to_str)
                .map_or(false, |ext| exts.iter().any(|want| want == ext))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Reads the EXIF `DateTimeOriginal` field (`YYYY:MM:DD HH:MM:SS`,
/// second resolution). Any missing or unreadable field maps to
/// [`UastagError::MissingTimestamp`]; only a failure to open the file is
/// reported as I/O.
pub fn read_capture_time(path: &Path) -> Result<NaiveDateTime> {
    let missing = || UastagError::MissingTimestamp {
        path: path.to_path_buf(),
    };
    let file = fs::File::open(path).map_err(|e| UastagError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut bufreader = io::BufReader::new(&file);
    let exif = exif::Reader::new()
        .read_from_container(&mut bufreader)
        .map_err(|_| missing())?;
    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .ok_or_else(missing)?;
    let dt = match field.value {
        Value::Ascii(ref v) if !v.is_empty() => {
            exif::DateTime::from_ascii(&v[0]).map_err(|_| missing())?
        }
        _ => return Err(missing()),
    };
    NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())
        .and_then(|d| d.and_hms_opt(dt.hour.into(), dt.minute.into(), dt.second.into()))
        .ok_or_else(missing)
}

/// Scans `dir` and builds an [`ImageRecord`] per readable image.
///
/// Images without a usable capture time are skipped with a warning
/// rather than failing the batch; the second return value is the skip
/// count, reported in the run summary.
pub fn load_images(
    dir: &Path,
    exts: &[String],
    depth: usize,
    utc_offset_s: i64,
) -> Result<(Vec<ImageRecord>, usize)> {
    let mut records = Vec::new();
    let mut skipped = 0usize;
    for path in scan_images(dir, exts, depth)? {
        match read_capture_time(&path) {
            Ok(capture_time) => records.push(ImageRecord {
                adjusted_time: capture_time + Duration::seconds(utc_offset_s),
                capture_time,
                path,
            }),
            Err(UastagError::MissingTimestamp { path }) => {
                warn!("skipping {}: no EXIF capture time", path.display());
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok((records, skipped))
}
