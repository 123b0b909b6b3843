use geo::{LineString, Simplify};

use crate::domain::{GeoPoint, RoutePath};

/// Meters per degree of latitude, used to express epsilon in degrees
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Simplify a route polyline with Ramer-Douglas-Peucker.
///
/// `epsilon_m` is the tolerance in meters, converted to degrees at the
/// equator's scale. Endpoints are always kept; short paths are returned as-is.
pub fn simplify_path(path: &RoutePath, epsilon_m: f64) -> RoutePath {
    if path.points.len() < 3 || epsilon_m <= 0.0 {
        return path.clone();
    }

    let line: LineString<f64> = path
        .points
        .iter()
        .map(|p| geo::coord! { x: p.longitude, y: p.latitude })
        .collect();

    let simplified = line.simplify(&(epsilon_m / METERS_PER_DEGREE));

    RoutePath {
        points: simplified
            .0
            .into_iter()
            .map(|c| GeoPoint::new(c.y, c.x))
            .collect(),
        ..path.clone()
    }
}
