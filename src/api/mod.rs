pub mod error;
pub mod mapbox;
pub mod nominatim;
pub mod overpass;

pub use error::ApiError;
pub use mapbox::MapboxClient;
pub use nominatim::NominatimClient;
pub use overpass::{OverpassClient, OverpassResponse};

use crate::domain::{GeoPoint, ParkingCandidate, RoutePath, TravelMode};

pub(crate) const USER_AGENT: &str = concat!("parkfinder/", env!("CARGO_PKG_VERSION"));

/// Point-of-interest search for parking around an origin
pub trait ParkingSearch {
    fn search(&self, origin: GeoPoint, radius_m: u32) -> Result<Vec<ParkingCandidate>, ApiError>;
}

/// Turn-by-turn geometry between two points
pub trait RouteProvider {
    fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Result<RoutePath, ApiError>;
}

/// Coordinate to human-readable place name
pub trait ReverseGeocoder {
    /// `Ok(None)` when the service knows no name for the point.
    fn reverse(&self, point: GeoPoint) -> Result<Option<String>, ApiError>;
}
