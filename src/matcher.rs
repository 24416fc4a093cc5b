//! Image-Track Matcher: nearest-in-time lookup with an acceptance window.

use chrono::NaiveDateTime;

use crate::consolidate::ConsolidatedFix;
use crate::images::ImageRecord;

/// Outcome of matching one image against the consolidated track.
///
/// Rejected images keep their match metadata (`track_time`,
/// `time_diff_s`) so the output shows how far off each one was, but the
/// position fields stay `None`. `track_time` is `None` only when the
/// track is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TagResult {
    pub image: ImageRecord,
    pub track_time: Option<NaiveDateTime>,
    pub time_diff_s: Option<i64>,
    pub accepted: bool,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub ele: Option<f64>,
    pub heading: Option<f64>,
    pub roll: Option<f64>,
    pub pitch: Option<f64>,
}

/// Matches each image to the fix nearest its adjusted capture time.
///
/// Ties on absolute time difference go to the earlier fix. A match is
/// accepted when the difference is at most `max_offset_s` (inclusive);
/// every image yields a result either way, in input order.
pub fn match_images(
    images: &[ImageRecord],
    track: &[ConsolidatedFix],
    max_offset_s: i64,
) -> Vec<TagResult> {
    images
        .iter()
        .map(|img| match_one(img, track, max_offset_s))
        .collect()
}

fn match_one(img: &ImageRecord, track: &[ConsolidatedFix], max_offset_s: i64) -> TagResult {
    let nearest = track
        .iter()
        .min_by_key(|f| ((img.adjusted_time - f.time).num_seconds().abs(), f.time));
    match nearest {
        Some(fix) => {
            let diff = (img.adjusted_time - fix.time).num_seconds().abs();
            let accepted = diff <= max_offset_s;
            TagResult {
                image: img.clone(),
                track_time: Some(fix.time),
                time_diff_s: Some(diff),
                accepted,
                lat: accepted.then_some(fix.lat),
                lon: accepted.then_some(fix.lon),
                ele: if accepted { fix.ele } else { None },
                heading: if accepted { fix.heading } else { None },
                roll: if accepted { fix.roll } else { None },
                pitch: if accepted { fix.pitch } else { None },
            }
        }
        None => TagResult {
            image: img.clone(),
            track_time: None,
            time_diff_s: None,
            accepted: false,
            lat: None,
            lon: None,
            ele: None,
            heading: None,
            roll: None,
            pitch: None,
        },
    }
}
