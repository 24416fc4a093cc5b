//! Tagging table: the CSV handoff artifact consumed by exiftool.
//!
//! One row per discovered image, in path order. The position columns use
//! the tag names exiftool assigns from (`GPSLatitude` etc.); the time and
//! difference columns are audit information for the operator. Cells are
//! blank wherever a value is absent, so rejected images stay visible
//! without carrying a position.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, UastagError};
use crate::matcher::TagResult;

const TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

#[derive(Debug, Serialize)]
pub struct TagRow {
    #[serde(rename = "SourceFile")]
    pub source_file: String,
    #[serde(rename = "CaptureTime")]
    pub capture_time: String,
    #[serde(rename = "AdjustedTime")]
    pub adjusted_time: String,
    #[serde(rename = "TrackTime")]
    pub track_time: Option<String>,
    #[serde(rename = "TimeDiffSec")]
    pub time_diff_s: Option<i64>,
    #[serde(rename = "GPSLatitude")]
    pub lat: Option<f64>,
    #[serde(rename = "GPSLongitude")]
    pub lon: Option<f64>,
    #[serde(rename = "GPSAltitude")]
    pub ele: Option<f64>,
    #[serde(rename = "Heading")]
    pub heading: Option<f64>,
    #[serde(rename = "Roll")]
    pub roll: Option<f64>,
    #[serde(rename = "Pitch")]
    pub pitch: Option<f64>,
}

impl From<&TagResult> for TagRow {
    fn from(r: &TagResult) -> Self {
        TagRow {
            source_file: r.image.path.display().to_string(),
            capture_time: r.image.capture_time.format(TIME_FORMAT).to_string(),
            adjusted_time: r.image.adjusted_time.format(TIME_FORMAT).to_string(),
            track_time: r.track_time.map(|t| t.format(TIME_FORMAT).to_string()),
            time_diff_s: r.time_diff_s,
            lat: r.lat,
            lon: r.lon,
            ele: r.ele,
            heading: r.heading,
            roll: r.roll,
            pitch: r.pitch,
        }
    }
}

/// Renders the table to a CSV string. Output is byte-identical across
/// runs on identical input.
pub fn render_table(results: &[TagResult]) -> String {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for r in results {
        // serializing plain strings and numbers into a Vec cannot fail
        wtr.serialize(TagRow::from(r)).expect("csv serialize");
    }
    let bytes = wtr.into_inner().expect("csv flush");
    String::from_utf8(bytes).expect("csv output is utf-8")
}

/// Writes the table for `results` to `path`.
pub fn write_table(path: &Path, results: &[TagResult]) -> Result<()> {
    let mut out = render_table(results);
    if results.is_empty() {
        // serde never saw a row, so emit the header line by hand
        write!(
            out,
            "SourceFile,CaptureTime,AdjustedTime,TrackTime,TimeDiffSec,\
             GPSLatitude,GPSLongitude,GPSAltitude,Heading,Roll,Pitch\n"
        )
        .expect("write to string");
    }
    fs::write(path, out).map_err(|e| UastagError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
