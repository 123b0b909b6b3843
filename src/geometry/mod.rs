pub mod distance;
pub mod region;
pub mod simplify;

pub use distance::{distance_m, format_distance};
pub use region::Region;
pub use simplify::simplify_path;
