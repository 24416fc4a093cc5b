//! Tools for a UAS imagery workflow: geotagging images against GPX track
//! logs, renaming by capture time, and cleaning up after the external
//! metadata writer.
//!
//! The geotagging core is a one-directional batch pipeline:
//! [`track::load_track_dir`] reads raw per-second GPS samples,
//! [`consolidate::consolidate`] validates and averages them to one fix per
//! second, and [`matcher::match_images`] pairs each image's adjusted
//! capture time with the nearest fix. The result is written as a CSV table
//! ([`table`]) and handed to exiftool ([`exiftool`]), which does the
//! actual tag writing.

pub mod config;
pub mod consolidate;
pub mod error;
pub mod exiftool;
pub mod geo;
pub mod images;
pub mod matcher;
pub mod table;
pub mod track;

pub use config::Config;
pub use consolidate::{consolidate, ConsolidatedFix};
pub use error::{Result, UastagError};
pub use images::ImageRecord;
pub use matcher::{match_images, TagResult};
pub use track::PositionSample;
