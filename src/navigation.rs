//! Deep links into an external navigation app.
//!
//! This routing variant hands the destination and a travel-mode hint to the
//! maps application and gets no geometry back.

use reqwest::Url;

use crate::domain::{GeoPoint, TravelMode};

const DIRECTIONS_LINK_BASE: &str = "https://www.google.com/maps/dir/";

fn coordinate_param(point: GeoPoint) -> String {
    format!("{},{}", point.latitude, point.longitude)
}

/// Universal maps directions link to `destination`, optionally from `origin`.
pub fn deep_link(origin: Option<GeoPoint>, destination: GeoPoint, mode: TravelMode) -> Url {
    let mut url = Url::parse(DIRECTIONS_LINK_BASE).expect("directions link base is a valid URL");
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("api", "1");
        if let Some(origin) = origin {
            query.append_pair("origin", &coordinate_param(origin));
        }
        query.append_pair("destination", &coordinate_param(destination));
        query.append_pair("travelmode", mode.link_hint());
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_link_with_origin() {
        let url = deep_link(
            Some(GeoPoint::new(47.50, 19.04)),
            GeoPoint::new(47.51, 19.05),
            TravelMode::Walking,
        );
        assert_eq!(
            url.as_str(),
            "https://www.google.com/maps/dir/?api=1&origin=47.5%2C19.04&destination=47.51%2C19.05&travelmode=walking"
        );
    }

    #[test]
    fn test_deep_link_destination_only() {
        let url = deep_link(None, GeoPoint::new(47.51, 19.05), TravelMode::Cycling);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("api".to_string(), "1".to_string()),
                ("destination".to_string(), "47.51,19.05".to_string()),
                ("travelmode".to_string(), "bicycling".to_string()),
            ]
        );
    }
}
