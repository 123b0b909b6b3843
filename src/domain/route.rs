use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// A drawn route polyline from origin to destination
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutePath {
    pub points: Vec<GeoPoint>,
    /// Length reported by the directions service, in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    /// Travel time reported by the directions service, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<f64>,
}

impl RoutePath {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self {
            points,
            distance_m: None,
            duration_s: None,
        }
    }

    pub fn with_summary(mut self, distance_m: Option<f64>, duration_s: Option<f64>) -> Self {
        self.distance_m = distance_m;
        self.duration_s = duration_s;
        self
    }

    /// A path needs at least two points to be drawn as a line
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }
}
