use serde::Serialize;

use crate::domain::GeoPoint;

/// Span shown around a lone point, matching a city-block zoom level
pub const DEFAULT_DELTA: f64 = 0.05;

/// Padding factor applied around fitted points
const PADDING: f64 = 1.2;

/// Narrowest span on either axis, so collinear points stay visible
const MIN_DELTA: f64 = 0.005;

/// Visible map area: a center and its latitude/longitude span
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    pub center: GeoPoint,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    pub fn around(center: GeoPoint) -> Self {
        Self {
            center,
            latitude_delta: DEFAULT_DELTA,
            longitude_delta: DEFAULT_DELTA,
        }
    }

    /// Smallest padded region containing every point; `None` for no points
    pub fn fitting<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut south, mut north) = (first.latitude, first.latitude);
        let (mut west, mut east) = (first.longitude, first.longitude);

        for p in iter {
            south = south.min(p.latitude);
            north = north.max(p.latitude);
            west = west.min(p.longitude);
            east = east.max(p.longitude);
        }

        let center = GeoPoint::new((south + north) / 2.0, (west + east) / 2.0);
        if north - south == 0.0 && east - west == 0.0 {
            return Some(Self::around(center));
        }

        Some(Self {
            center,
            latitude_delta: ((north - south) * PADDING).max(MIN_DELTA),
            longitude_delta: ((east - west) * PADDING).max(MIN_DELTA),
        })
    }

    #[cfg(test)]
    fn contains(&self, point: GeoPoint) -> bool {
        (point.latitude - self.center.latitude).abs() <= self.latitude_delta / 2.0
            && (point.longitude - self.center.longitude).abs() <= self.longitude_delta / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fitting_empty() {
        assert_eq!(Region::fitting(Vec::new()), None);
    }

    #[test]
    fn test_fitting_single_point_uses_default_span() {
        let p = GeoPoint::new(47.5068428, 19.0469664);
        assert_eq!(Region::fitting([p]), Some(Region::around(p)));
    }

    #[test]
    fn test_fitting_contains_all_points() {
        let points = [
            GeoPoint::new(47.50, 19.04),
            GeoPoint::new(47.51, 19.05),
            GeoPoint::new(47.505, 19.03),
        ];
        let region = Region::fitting(points).unwrap();
        assert!(points.iter().all(|p| region.contains(*p)));
        assert!((region.center.latitude - 47.505).abs() < 1e-9);
    }

    #[test]
    fn test_fitting_collinear_points_keeps_minimum_span() {
        let region = Region::fitting([GeoPoint::new(47.5, 19.0), GeoPoint::new(47.5, 19.1)]).unwrap();
        assert_eq!(region.latitude_delta, MIN_DELTA);
        assert!((region.longitude_delta - 0.12).abs() < 1e-9);
    }
}
