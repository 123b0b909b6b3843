use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// Name shown for parking nodes that carry no `name` tag.
pub const UNNAMED_PARKING: &str = "Unnamed Parking";

/// A parking spot returned by one search batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingCandidate {
    /// Overpass element id, unique within a batch
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
}

impl ParkingCandidate {
    /// Build a candidate, falling back to [`UNNAMED_PARKING`] when `name` is absent.
    pub fn new(id: impl Into<String>, name: Option<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            name: name.unwrap_or_else(|| UNNAMED_PARKING.to_string()),
            latitude,
            longitude,
            capacity: None,
            fee: None,
            access: None,
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_name_uses_placeholder() {
        let spot = ParkingCandidate::new("1", None, 47.51, 19.05);
        assert_eq!(spot.name, "Unnamed Parking");
        assert_eq!(spot.location(), GeoPoint::new(47.51, 19.05));
    }
}
