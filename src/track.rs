//! Track Loader: GPX files to a flat sequence of timestamped samples.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Timelike};
use log::info;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, UastagError};

const TRACK_EXT: &str = "gpx";

/// One raw GPS fix from a track log. The source format has second
/// resolution and logs several samples per second, so many samples share
/// the same `time`.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSample {
    pub time: NaiveDateTime,
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
    pub heading: Option<f64>,
    pub roll: Option<f64>,
    pub pitch: Option<f64>,
}

/// Loads every `.gpx` file in `dir` (file-name order) into one sample
/// sequence, unsorted. Any malformed file aborts the run: skipping it
/// would silently shift the geotag results.
pub fn load_track_dir(dir: &Path) -> Result<Vec<PositionSample>> {
    if !dir.is_dir() {
        return Err(UastagError::InputNotFound {
            path: dir.to_path_buf(),
        });
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| UastagError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(std::ffi::OsStr::to_str) == Some(TRACK_EXT))
        .collect();
    files.sort();

    let mut samples = Vec::new();
    for file in &files {
        let s = fs::read_to_string(file).map_err(|e| UastagError::Io {
            path: file.clone(),
            source: e,
        })?;
        let points = parse_gpx_from_str(&s).map_err(|message| UastagError::TrackParse {
            path: file.clone(),
            message,
        })?;
        info!("loaded {} ({} points)", file.display(), points.len());
        samples.extend(points);
    }
    Ok(samples)
}

#[derive(Default)]
struct PendingPoint {
    lat: f64,
    lon: f64,
    time: Option<NaiveDateTime>,
    ele: Option<f64>,
    heading: Option<f64>,
    roll: Option<f64>,
    pitch: Option<f64>,
}

/// Parses one GPX document. Points need `lat`/`lon` attributes and a
/// `<time>` child; `<ele>`, `<course>` (or `<heading>`), `<roll>` and
/// `<pitch>` are optional.
pub fn parse_gpx_from_str(s: &str) -> std::result::Result<Vec<PositionSample>, String> {
    let mut reader = Reader::from_str(s);
    reader.config_mut().trim_text(true);

    let mut point: Option<PendingPoint> = None;
    let mut points: Vec<PositionSample> = Vec::new();

    loop {
        match reader.read_event() {
            Err(e) => return Err(format!("xml error at byte {}: {}", reader.buffer_position(), e)),
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    point = Some(start_point(&e)?);
                } else if let Some(p) = point.as_mut() {
                    let tag = e.local_name().as_ref().to_vec();
                    match tag.as_slice() {
                        b"time" => {
                            let txt = read_text(&mut reader, &e)?;
                            p.time = Some(
                                parse_time(txt.trim())
                                    .ok_or_else(|| format!("bad track point time {:?}", txt))?,
                            );
                        }
                        b"ele" => p.ele = Some(parse_num(&read_text(&mut reader, &e)?)?),
                        b"course" | b"heading" => {
                            p.heading = Some(parse_num(&read_text(&mut reader, &e)?)?)
                        }
                        b"roll" => p.roll = Some(parse_num(&read_text(&mut reader, &e)?)?),
                        b"pitch" => p.pitch = Some(parse_num(&read_text(&mut reader, &e)?)?),
                        _ => {}
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    // self-closing point has no <time> child
                    return Err("track point without <time>".to_string());
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    let p = point
                        .take()
                        .ok_or_else(|| "unexpected </trkpt>".to_string())?;
                    let time = p.time.ok_or_else(|| "track point without <time>".to_string())?;
                    points.push(PositionSample {
                        time,
                        lat: p.lat,
                        lon: p.lon,
                        ele: p.ele,
                        heading: p.heading,
                        roll: p.roll,
                        pitch: p.pitch,
                    });
                }
            }
            _ => {}
        }
    }
    Ok(points)
}

fn start_point(e: &BytesStart) -> std::result::Result<PendingPoint, String> {
    let mut lat = None;
    let mut lon = None;
    for a in e.attributes() {
        let a = a.map_err(|err| format!("bad trkpt attribute: {}", err))?;
        let value = std::str::from_utf8(&a.value).ok().and_then(|x| x.parse::<f64>().ok());
        if a.key.as_ref().ends_with(b"lat") {
            lat = value;
        } else if a.key.as_ref().ends_with(b"lon") {
            lon = value;
        }
    }
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(PendingPoint {
            lat,
            lon,
            ..PendingPoint::default()
        }),
        _ => Err("trkpt without numeric lat/lon attributes".to_string()),
    }
}

fn read_text(reader: &mut Reader<&[u8]>, e: &BytesStart) -> std::result::Result<String, String> {
    reader
        .read_text(e.name())
        .map(|t| t.into_owned())
        .map_err(|err| format!("xml error at byte {}: {}", reader.buffer_position(), err))
}

fn parse_num(txt: &str) -> std::result::Result<f64, String> {
    txt.trim()
        .parse::<f64>()
        .map_err(|_| format!("bad numeric value {:?} in track point", txt))
}

/// Accepts RFC 3339 or plain `%Y-%m-%dT%H:%M:%S` (with or without a
/// trailing `Z`), truncated to whole seconds.
fn parse_time(txt: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(txt) {
        return dt.naive_utc().with_nanosecond(0);
    }
    NaiveDateTime::parse_from_str(txt.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S").ok()
}
