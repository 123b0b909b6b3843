pub mod mode;
pub mod parking;
pub mod point;
pub mod route;

pub use mode::TravelMode;
pub use parking::{ParkingCandidate, UNNAMED_PARKING};
pub use point::GeoPoint;
pub use route::RoutePath;
