use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84 coordinate as produced by a map tap.
///
/// Stored exactly as received; no rounding or range clamping happens here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Wire order used by GeoJSON and Mapbox: `[lon, lat]`.
    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self::new(pair[1], pair[0])
    }

    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat_dir = if self.latitude >= 0.0 { "N" } else { "S" };
        let lon_dir = if self.longitude >= 0.0 { "E" } else { "W" };
        write!(
            f,
            "{:.4}{} / {:.4}{}",
            self.latitude.abs(),
            lat_dir,
            self.longitude.abs(),
            lon_dir
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lon_lat_order_is_swapped() {
        let point = GeoPoint::from_lon_lat([19.04, 47.50]);
        assert_eq!(point.latitude, 47.50);
        assert_eq!(point.longitude, 19.04);
        assert_eq!(point.to_lon_lat(), [19.04, 47.50]);
    }

    #[test]
    fn test_display_hemispheres() {
        let point = GeoPoint::new(-33.8688, 151.2093);
        assert_eq!(point.to_string(), "33.8688S / 151.2093E");
    }
}
