use serde::Deserialize;
use std::cell::Cell;
use std::thread;
use std::time::{Duration, Instant};

use super::error::{ApiError, check_status, decode};
use super::{ReverseGeocoder, USER_AGENT};
use crate::config::NominatimConfig;
use crate::domain::GeoPoint;

const SERVICE: &str = "Nominatim";

/// Nominatim usage policy: at most one request per second
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct ReverseResult {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode a `/reverse?format=json` body into its display name, if any.
pub fn parse_reverse(body: &str) -> Result<Option<String>, ApiError> {
    let result: ReverseResult = decode(SERVICE, body)?;
    if let Some(error) = result.error {
        tracing::debug!("Nominatim could not geocode: {}", error);
    }
    Ok(result.display_name.filter(|name| !name.is_empty()))
}

/// Blocking reverse-geocoding client
pub struct NominatimClient {
    client: reqwest::blocking::Client,
    url: String,
    last_request: Cell<Option<Instant>>,
}

impl NominatimClient {
    pub fn new(config: &NominatimConfig) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            url: config.url.clone(),
            last_request: Cell::new(None),
        })
    }

    fn throttle(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                thread::sleep(MIN_REQUEST_INTERVAL - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }
}

impl ReverseGeocoder for NominatimClient {
    fn reverse(&self, point: GeoPoint) -> Result<Option<String>, ApiError> {
        self.throttle();

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", point.latitude.to_string()),
                ("lon", point.longitude.to_string()),
            ])
            .send()
            .map_err(ApiError::transport(SERVICE))?;
        let body = check_status(SERVICE, response)?
            .text()
            .map_err(ApiError::transport(SERVICE))?;

        parse_reverse(&body)
    }
}
