use crate::api::OverpassResponse;
use crate::api::overpass::Element;
use crate::domain::ParkingCandidate;

/// Parse an Overpass response into parking candidates
///
/// # Algorithm
/// For each element carrying coordinates:
/// - id becomes the decimal string of the OSM id
/// - name comes from the `name` tag, else the unnamed placeholder
/// - `capacity`, `fee` and `access` tags are carried when present
///
/// Response order is preserved. Elements without `lat`/`lon` (ways or
/// relations without a center) cannot be drawn as markers and are skipped.
pub fn parse_parking(response: &OverpassResponse) -> Vec<ParkingCandidate> {
    response.elements.iter().filter_map(to_candidate).collect()
}

fn to_candidate(element: &Element) -> Option<ParkingCandidate> {
    let lat = element.lat?;
    let lon = element.lon?;

    let tag = |key: &str| {
        element
            .tags
            .as_ref()
            .and_then(|tags| tags.get(key))
            .filter(|value| !value.is_empty())
            .cloned()
    };

    let mut candidate = ParkingCandidate::new(element.id.to_string(), tag("name"), lat, lon);
    candidate.capacity = tag("capacity");
    candidate.fee = tag("fee");
    candidate.access = tag("access");
    Some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::overpass::parse_response;
    use std::collections::HashMap;

    #[test]
    fn test_parse_single_unnamed_spot() {
        let response = parse_response(
            r#"{"elements": [{"type": "node", "id": 1, "tags": {}, "lat": 47.51, "lon": 19.05}]}"#,
        )
        .unwrap();

        let spots = parse_parking(&response);
        assert_eq!(spots, vec![ParkingCandidate::new("1", None, 47.51, 19.05)]);
        assert_eq!(spots[0].name, "Unnamed Parking");
    }

    #[test]
    fn test_parse_keeps_every_element_in_order() {
        let response = OverpassResponse {
            elements: (0..5)
                .map(|i| Element {
                    type_: "node".to_string(),
                    id: 100 + i,
                    tags: Some({
                        let mut m = HashMap::new();
                        m.insert("name".to_string(), format!("Lot {}", i));
                        m.insert("fee".to_string(), "yes".to_string());
                        m
                    }),
                    lat: Some(47.5 + i as f64 * 0.001),
                    lon: Some(19.04),
                })
                .collect(),
        };

        let spots = parse_parking(&response);
        assert_eq!(spots.len(), 5);
        for (i, spot) in spots.iter().enumerate() {
            assert_eq!(spot.id, (100 + i).to_string());
            assert_eq!(spot.name, format!("Lot {}", i));
            assert_eq!(spot.latitude, 47.5 + i as f64 * 0.001);
            assert_eq!(spot.fee.as_deref(), Some("yes"));
            assert_eq!(spot.capacity, None);
        }
    }

    #[test]
    fn test_parse_skips_elements_without_coordinates() {
        let response = parse_response(
            r#"{"elements": [
                {"type": "way", "id": 7, "tags": {"amenity": "parking"}},
                {"type": "node", "id": 8, "lat": 1.0, "lon": 2.0}
            ]}"#,
        )
        .unwrap();

        let spots = parse_parking(&response);
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].id, "8");
        assert_eq!(spots[0].name, "Unnamed Parking");
    }

    #[test]
    fn test_empty_name_tag_uses_placeholder() {
        let response = parse_response(
            r#"{"elements": [{"type": "node", "id": 3, "lat": 1.0, "lon": 2.0, "tags": {"name": ""}}]}"#,
        )
        .unwrap();
        assert_eq!(parse_parking(&response)[0].name, "Unnamed Parking");
    }
}
