use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::error::{ApiError, check_status, decode};
use super::{ParkingSearch, USER_AGENT};
use crate::config::OverpassConfig;
use crate::domain::{GeoPoint, ParkingCandidate};
use crate::osm::parse_parking;

const SERVICE: &str = "Overpass";

/// Raw Overpass API response
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

/// A single element from Overpass
#[derive(Debug, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: u64,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Overpass QL for parking amenity nodes within `radius_m` of `origin`
pub fn build_parking_query(origin: GeoPoint, radius_m: u32, timeout_secs: u64) -> String {
    format!(
        r#"[out:json][timeout:{timeout}];node["amenity"="parking"](around:{radius},{lat},{lon});out;"#,
        timeout = timeout_secs,
        radius = radius_m,
        lat = origin.latitude,
        lon = origin.longitude
    )
}

/// Decode an interpreter response body
pub fn parse_response(body: &str) -> Result<OverpassResponse, ApiError> {
    decode(SERVICE, body)
}

/// Blocking Overpass interpreter client
pub struct OverpassClient {
    client: reqwest::blocking::Client,
    url: String,
    timeout_secs: u64,
}

impl OverpassClient {
    pub fn new(config: &OverpassConfig) -> Result<Self, ApiError> {
        // Client timeout slightly above the server-side query timeout
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs + 5))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            url: config.url.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

impl ParkingSearch for OverpassClient {
    fn search(&self, origin: GeoPoint, radius_m: u32) -> Result<Vec<ParkingCandidate>, ApiError> {
        let query = build_parking_query(origin, radius_m, self.timeout_secs);
        tracing::debug!("Querying {} at {}: {}", SERVICE, self.url, query);

        let response = self
            .client
            .get(&self.url)
            .query(&[("data", query.as_str())])
            .send()
            .map_err(ApiError::transport(SERVICE))?;
        let body = check_status(SERVICE, response)?
            .text()
            .map_err(ApiError::transport(SERVICE))?;

        let candidates = parse_parking(&parse_response(&body)?);
        if candidates.is_empty() {
            tracing::warn!("No parking data found around {}", origin);
        } else {
            tracing::info!("Found {} parking spots around {}", candidates.len(), origin);
        }
        Ok(candidates)
    }
}
