use geo::{Distance, Haversine, Point};

use crate::domain::GeoPoint;

fn to_point(p: GeoPoint) -> Point<f64> {
    Point::new(p.longitude, p.latitude)
}

/// Great-circle distance in meters
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    Haversine::distance(to_point(a), to_point(b))
}

/// Human-readable distance: meters below 1 km, else kilometers
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero() {
        let p = GeoPoint::new(47.5068, 19.0470);
        assert!(distance_m(p, p).abs() < 1e-6);
    }

    #[test]
    fn test_distance_one_millidegree_latitude() {
        // 0.009 degrees of latitude is roughly 1 km
        let d = distance_m(GeoPoint::new(47.50, 19.04), GeoPoint::new(47.509, 19.04));
        assert!((d - 1000.0).abs() < 10.0, "got {}", d);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(420.4), "420 m");
        assert_eq!(format_distance(1432.5), "1.4 km");
    }
}
