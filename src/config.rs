//! Run configuration for the geotag pipeline, assembled once at startup
//! from defaults and command-line overrides.

use std::path::PathBuf;

pub const DEFAULT_MAX_SPREAD_M: f64 = 25.0;
pub const DEFAULT_MAX_OFFSET_S: i64 = 10;
pub const DEFAULT_IMAGE_EXTS: [&str; 2] = ["JPG", "DNG"];
pub const DEFAULT_SCAN_DEPTH: usize = 1;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the GPX track logs.
    pub track_dir: PathBuf,
    /// Directory holding the images to geotag.
    pub image_dir: PathBuf,
    /// Camera-to-UTC adjustment added to every capture time, in seconds.
    pub utc_offset_s: i64,
    /// Maximum same-second spatial divergence before the track set is
    /// considered untrustworthy, in meters.
    pub max_spread_m: f64,
    /// Maximum accepted image-to-track time offset, in seconds.
    pub max_offset_s: i64,
    /// Case-sensitive image extension allow-list.
    pub image_exts: Vec<String>,
    /// Recursion depth for the image directory scan.
    pub scan_depth: usize,
}

impl Config {
    pub fn new(track_dir: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            track_dir: track_dir.into(),
            image_dir: image_dir.into(),
            utc_offset_s: 0,
            max_spread_m: DEFAULT_MAX_SPREAD_M,
            max_offset_s: DEFAULT_MAX_OFFSET_S,
            image_exts: DEFAULT_IMAGE_EXTS.iter().map(|s| s.to_string()).collect(),
            scan_depth: DEFAULT_SCAN_DEPTH,
        }
    }
}
