//! Latitude-dependent degree-to-meter conversion.
//!
//! Series approximations for the WGS84 ellipsoid
//! (http://www.esri.com/news/arcuser/0400/wdside.html). Accurate to well
//! under a meter per degree, which is far more than the spread check
//! needs.

/// Meters spanned by one degree of latitude at latitude `lat` (degrees).
///
/// Input must be a decimal degree in [-90, 90]; out-of-range values are
/// undefined.
pub fn meters_per_degree_lat(lat: f64) -> f64 {
    let phi = lat.to_radians();
    111_132.92 - 559.82 * (2.0 * phi).cos() + 1.175 * (4.0 * phi).cos()
        - 0.0023 * (6.0 * phi).cos()
}

/// Meters spanned by one degree of longitude at latitude `lat` (degrees).
///
/// Input must be a decimal degree in [-90, 90]; out-of-range values are
/// undefined.
pub fn meters_per_degree_lon(lat: f64) -> f64 {
    let phi = lat.to_radians();
    111_412.84 * phi.cos() - 93.5 * (3.0 * phi).cos() + 0.118 * (5.0 * phi).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator() {
        assert!((meters_per_degree_lat(0.0) - 110_574.3).abs() < 0.5);
        assert!((meters_per_degree_lon(0.0) - 111_319.5).abs() < 0.5);
    }

    #[test]
    fn test_mid_latitude() {
        assert!((meters_per_degree_lat(45.0) - 111_131.7).abs() < 0.5);
        assert!((meters_per_degree_lon(45.0) - 78_846.8).abs() < 0.5);
    }

    #[test]
    fn test_thousandth_degree_lon_at_45() {
        // The overlap check relies on this scale: 0.001 deg of longitude
        // at 45 N is roughly 79 m.
        let m = 0.001 * meters_per_degree_lon(45.0);
        assert!(m > 78.0 && m < 80.0);
    }

    #[test]
    fn test_lon_shrinks_toward_pole() {
        assert!(meters_per_degree_lon(60.0) < meters_per_degree_lon(30.0));
        assert!(meters_per_degree_lon(89.9) < 1000.0);
    }
}
