//! Track Consolidator: raw samples to one fix per second.
//!
//! The track logs record several fixes per second with identical
//! timestamps. Before averaging them down to 1 Hz, the whole batch is
//! checked for same-second spatial divergence: samples far apart within
//! one second mean the directory mixes logs from more than one source,
//! and averaging those would geotag every image with a bogus midpoint.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::error::{Result, UastagError};
use crate::geo;
use crate::track::PositionSample;

/// One position representing a full second of track data.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedFix {
    pub time: NaiveDateTime,
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
    pub heading: Option<f64>,
    pub roll: Option<f64>,
    pub pitch: Option<f64>,
}

/// Collapses `samples` to one mean fix per distinct second, sorted by
/// time.
///
/// Fails with [`UastagError::OverlappingTrack`] if any second's samples
/// spread `max_spread_m` meters or more apart along either axis. The
/// check runs over the whole batch before any averaging, so a failure
/// produces no partial output.
pub fn consolidate(
    samples: &[PositionSample],
    max_spread_m: f64,
) -> Result<Vec<ConsolidatedFix>> {
    let mut groups: BTreeMap<NaiveDateTime, Vec<&PositionSample>> = BTreeMap::new();
    for s in samples {
        groups.entry(s.time).or_default().push(s);
    }

    let mut offending = 0usize;
    let mut worst: Option<(NaiveDateTime, f64)> = None;
    for (&time, group) in &groups {
        let spread = max_axis_spread_m(group);
        if spread >= max_spread_m {
            offending += 1;
            if worst.map_or(true, |(_, w)| spread > w) {
                worst = Some((time, spread));
            }
        }
    }
    if let Some((time, spread_m)) = worst {
        return Err(UastagError::OverlappingTrack {
            seconds: offending,
            worst: time,
            spread_m,
            threshold_m: max_spread_m,
        });
    }

    Ok(groups
        .iter()
        .map(|(&time, group)| ConsolidatedFix {
            time,
            lat: mean(group.iter().map(|s| s.lat)),
            lon: mean(group.iter().map(|s| s.lon)),
            ele: mean_present(group, |s| s.ele),
            heading: mean_present(group, |s| s.heading),
            roll: mean_present(group, |s| s.roll),
            pitch: mean_present(group, |s| s.pitch),
        })
        .collect())
}

/// Larger of the group's latitude and longitude spreads (max minus min),
/// in meters at the group's mean latitude.
fn max_axis_spread_m(group: &[&PositionSample]) -> f64 {
    let (mut lat_min, mut lat_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut lon_min, mut lon_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for s in group {
        lat_min = lat_min.min(s.lat);
        lat_max = lat_max.max(s.lat);
        lon_min = lon_min.min(s.lon);
        lon_max = lon_max.max(s.lon);
    }
    let mean_lat = mean(group.iter().map(|s| s.lat));
    let lat_m = (lat_max - lat_min) * geo::meters_per_degree_lat(mean_lat);
    let lon_m = (lon_max - lon_min) * geo::meters_per_degree_lon(mean_lat);
    lat_m.max(lon_m)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (mut sum, mut n) = (0.0, 0usize);
    for v in values {
        sum += v;
        n += 1;
    }
    sum / n as f64
}

/// Mean over the samples where the field is present; `None` when no
/// sample in the group carries it.
fn mean_present(
    group: &[&PositionSample],
    field: impl Fn(&PositionSample) -> Option<f64>,
) -> Option<f64> {
    let vals: Vec<f64> = group.iter().filter_map(|s| field(s)).collect();
    if vals.is_empty() {
        None
    } else {
        Some(vals.iter().sum::<f64>() / vals.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2018, 11, 7)
            .unwrap()
            .and_hms_opt(12, 0, s)
            .unwrap()
    }

    fn sample(s: u32, lat: f64, lon: f64) -> PositionSample {
        PositionSample {
            time: t(s),
            lat,
            lon,
            ele: None,
            heading: None,
            roll: None,
            pitch: None,
        }
    }

    #[test]
    fn test_singleton_groups_pass_through() {
        let samples = vec![sample(0, 45.0000, -122.0000), sample(1, 45.0001, -122.0001)];
        let fixes = consolidate(&samples, 25.0).unwrap();
        assert_eq!(fixes.len(), 2);
        assert_eq!(fixes[0].time, t(0));
        assert_eq!(fixes[0].lat, 45.0000);
        assert_eq!(fixes[0].lon, -122.0000);
        assert_eq!(fixes[1].lat, 45.0001);
        assert_eq!(fixes[1].lon, -122.0001);
    }

    #[test]
    fn test_same_second_samples_averaged() {
        let samples = vec![
            sample(3, 45.00000, -122.00000),
            sample(3, 45.00002, -122.00004),
        ];
        let fixes = consolidate(&samples, 25.0).unwrap();
        assert_eq!(fixes.len(), 1);
        assert!((fixes[0].lat - 45.00001).abs() < 1e-9);
        assert!((fixes[0].lon - -122.00002).abs() < 1e-9);
    }

    #[test]
    fn test_optional_fields_averaged_over_present_values() {
        let mut a = sample(5, 45.0, -122.0);
        a.ele = Some(100.0);
        a.heading = Some(180.0);
        let mut b = sample(5, 45.0, -122.0);
        b.ele = Some(102.0);
        let fixes = consolidate(&[a, b], 25.0).unwrap();
        assert_eq!(fixes[0].ele, Some(101.0));
        // only one sample carried a heading, so the mean is that value
        assert_eq!(fixes[0].heading, Some(180.0));
        assert_eq!(fixes[0].roll, None);
    }

    #[test]
    fn test_overlapping_longitudes_abort() {
        // 0.001 deg of longitude at 45 N is about 79 m, well past 25 m
        let samples = vec![
            sample(3, 45.0, -122.000),
            sample(3, 45.0, -122.001),
        ];
        let err = consolidate(&samples, 25.0).unwrap_err();
        match err {
            UastagError::OverlappingTrack {
                seconds,
                worst,
                spread_m,
                ..
            } => {
                assert_eq!(seconds, 1);
                assert_eq!(worst, t(3));
                assert!(spread_m > 78.0 && spread_m < 80.0);
            }
            other => panic!("expected OverlappingTrack, got {:?}", other),
        }
    }

    #[test]
    fn test_overlap_reports_worst_second() {
        let samples = vec![
            sample(3, 45.0, -122.000),
            sample(3, 45.0, -122.001),
            sample(7, 45.0, -122.000),
            sample(7, 45.0, -122.002),
        ];
        let err = consolidate(&samples, 25.0).unwrap_err();
        match err {
            UastagError::OverlappingTrack { seconds, worst, .. } => {
                assert_eq!(seconds, 2);
                assert_eq!(worst, t(7));
            }
            other => panic!("expected OverlappingTrack, got {:?}", other),
        }
    }

    #[test]
    fn test_spread_exactly_at_threshold_aborts() {
        let dlat = 25.0 / geo::meters_per_degree_lat(45.0);
        let samples = vec![sample(1, 45.0, -122.0), sample(1, 45.0 + dlat, -122.0)];
        assert!(consolidate(&samples, 25.0).is_err());
    }

    #[test]
    fn test_output_sorted_by_time() {
        let samples = vec![
            sample(9, 45.0, -122.0),
            sample(2, 45.0, -122.0),
            sample(5, 45.0, -122.0),
        ];
        let fixes = consolidate(&samples, 25.0).unwrap();
        let times: Vec<_> = fixes.iter().map(|f| f.time).collect();
        assert_eq!(times, vec![t(2), t(5), t(9)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(consolidate(&[], 25.0).unwrap().is_empty());
    }
}
