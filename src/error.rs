//! Unified error handling for the uastag tools.
//!
//! Every fatal condition is a variant here; binaries print the error and
//! exit nonzero. Nothing is retried automatically, since all of these are
//! either input mistakes or data-quality problems that need a human.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;

#[derive(Debug)]
pub enum UastagError {
    /// A required input directory does not exist
    InputNotFound { path: PathBuf },
    /// A track file could not be parsed; a partial track set would
    /// silently change geotag results, so the whole run stops
    TrackParse { path: PathBuf, message: String },
    /// Samples sharing a second diverge further than the configured limit,
    /// the symptom of mixed or duplicated track logs
    OverlappingTrack {
        seconds: usize,
        worst: NaiveDateTime,
        spread_m: f64,
        threshold_m: f64,
    },
    /// An image has no usable EXIF capture time
    MissingTimestamp { path: PathBuf },
    /// The external metadata writer failed to run, exited nonzero, or
    /// timed out
    ExternalTool { program: String, detail: String },
    /// Underlying I/O failure
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for UastagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UastagError::InputNotFound { path } => {
                write!(f, "directory {} does not exist", path.display())
            }
            UastagError::TrackParse { path, message } => {
                write!(f, "cannot parse track file {}: {}", path.display(), message)
            }
            UastagError::OverlappingTrack {
                seconds,
                worst,
                spread_m,
                threshold_m,
            } => {
                write!(
                    f,
                    "overlapping track data: {} second(s) spread {:.1} m or more \
                     (worst at {}: {:.1} m); the track directory likely mixes logs \
                     from more than one source",
                    seconds, threshold_m, worst, spread_m
                )
            }
            UastagError::MissingTimestamp { path } => {
                write!(f, "no EXIF capture time in {}", path.display())
            }
            UastagError::ExternalTool { program, detail } => {
                write!(f, "{}: {}", program, detail)
            }
            UastagError::Io { path, source } => {
                write!(f, "{}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for UastagError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UastagError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for uastag operations.
pub type Result<T> = std::result::Result<T, UastagError>;
