//! End-to-end pipeline tests over on-disk GPX fixtures.
//!
//! Images are synthesized as records rather than real JPEG files; the
//! EXIF reading path has its own unit tests.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;
use uastag::{consolidate, match_images, table, track, ImageRecord, UastagError};

fn t(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 11, 7)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn image(name: &str, adjusted: NaiveDateTime) -> ImageRecord {
    ImageRecord {
        path: PathBuf::from(name),
        capture_time: adjusted,
        adjusted_time: adjusted,
    }
}

fn write_gpx(dir: &Path, name: &str, points: &[(&str, f64, f64)]) {
    let mut body = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <gpx version=\"1.1\" creator=\"Mission Planner\" \
         xmlns=\"http://www.topografix.com/GPX/1/1\">\n <trk><trkseg>\n",
    );
    for (time, lat, lon) in points {
        body.push_str(&format!(
            "  <trkpt lat=\"{}\" lon=\"{}\"><ele>100.0</ele>\
             <time>2018-11-07T{}Z</time></trkpt>\n",
            lat, lon, time
        ));
    }
    body.push_str(" </trkseg></trk>\n</gpx>\n");
    fs::write(dir.join(name), body).unwrap();
}

#[test]
fn test_load_concatenates_gpx_files_and_ignores_others() {
    let dir = TempDir::new().unwrap();
    write_gpx(dir.path(), "a.gpx", &[("12:00:00", 45.0000, -122.0000)]);
    write_gpx(dir.path(), "b.gpx", &[("12:00:01", 45.0001, -122.0001)]);
    fs::write(dir.path().join("notes.txt"), "not a track").unwrap();

    let samples = track::load_track_dir(dir.path()).unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].time, t(12, 0, 0));
    assert_eq!(samples[1].time, t(12, 0, 1));
}

#[test]
fn test_missing_track_dir() {
    let err = track::load_track_dir(Path::new("/no/such/tracks")).unwrap_err();
    assert!(matches!(err, UastagError::InputNotFound { .. }));
}

#[test]
fn test_malformed_gpx_aborts_whole_load() {
    let dir = TempDir::new().unwrap();
    write_gpx(dir.path(), "a.gpx", &[("12:00:00", 45.0, -122.0)]);
    fs::write(
        dir.path().join("b.gpx"),
        "<gpx><trk><trkseg><trkpt lat=\"north\" lon=\"-122.0\">\
         <time>2018-11-07T12:00:01Z</time></trkpt></trkseg></trk></gpx>",
    )
    .unwrap();

    let err = track::load_track_dir(dir.path()).unwrap_err();
    match err {
        UastagError::TrackParse { path, .. } => {
            assert_eq!(path.file_name().unwrap(), "b.gpx");
        }
        other => panic!("expected TrackParse, got {:?}", other),
    }
}

#[test]
fn test_pipeline_matches_and_audits() {
    let dir = TempDir::new().unwrap();
    write_gpx(
        dir.path(),
        "flight.gpx",
        &[
            ("12:00:00", 45.0000, -122.0000),
            ("12:00:01", 45.0001, -122.0001),
        ],
    );

    let samples = track::load_track_dir(dir.path()).unwrap();
    let fixes = consolidate(&samples, 25.0).unwrap();
    assert_eq!(fixes.len(), 2);

    let records = vec![
        image("IMG_0001.JPG", t(12, 0, 5)),
        image("IMG_0002.JPG", t(12, 0, 20)),
    ];
    let results = match_images(&records, &fixes, 10);

    // 4 s away from the 12:00:01 fix: accepted with its position
    assert!(results[0].accepted);
    assert_eq!(results[0].track_time, Some(t(12, 0, 1)));
    assert_eq!(results[0].lat, Some(45.0001));
    assert_eq!(results[0].ele, Some(100.0));

    // 19 s away: rejected but still present in the output
    assert!(!results[1].accepted);
    assert_eq!(results[1].time_diff_s, Some(19));
    assert_eq!(results[1].lat, None);

    let csv = table::render_table(&results);
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("IMG_0002.JPG"));
}

#[test]
fn test_overlapping_tracks_abort_before_any_result() {
    let dir = TempDir::new().unwrap();
    // two fixes in the same second 0.001 deg of longitude apart, about
    // 79 m at 45 N, the signature of two logs merged into one directory
    write_gpx(dir.path(), "a.gpx", &[("12:00:03", 45.0, -122.000)]);
    write_gpx(dir.path(), "b.gpx", &[("12:00:03", 45.0, -122.001)]);

    let samples = track::load_track_dir(dir.path()).unwrap();
    let err = consolidate(&samples, 25.0).unwrap_err();
    match err {
        UastagError::OverlappingTrack {
            seconds, spread_m, ..
        } => {
            assert_eq!(seconds, 1);
            assert!(spread_m > 25.0);
        }
        other => panic!("expected OverlappingTrack, got {:?}", other),
    }
}

#[test]
fn test_written_table_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_gpx(
        dir.path(),
        "flight.gpx",
        &[
            ("12:00:00", 45.0000, -122.0000),
            ("12:00:01", 45.0001, -122.0001),
        ],
    );

    let run = || {
        let samples = track::load_track_dir(dir.path()).unwrap();
        let fixes = consolidate(&samples, 25.0).unwrap();
        let records = vec![
            image("IMG_0001.JPG", t(12, 0, 5)),
            image("IMG_0002.JPG", t(12, 0, 20)),
        ];
        let results = match_images(&records, &fixes, 10);
        let out = dir.path().join("geotag.csv");
        table::write_table(&out, &results).unwrap();
        fs::read(&out).unwrap()
    };

    assert_eq!(run(), run());
}
