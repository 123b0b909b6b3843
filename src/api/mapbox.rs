use serde::Deserialize;
use std::time::Duration;

use super::error::{ApiError, check_status, decode};
use super::{RouteProvider, USER_AGENT};
use crate::config::MapboxConfig;
use crate::domain::{GeoPoint, RoutePath, TravelMode};

const SERVICE: &str = "Mapbox Directions";

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    geometry: LineGeometry,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
}

/// GeoJSON LineString; positions are `[lon, lat]` with optional extra ordinates
#[derive(Debug, Deserialize)]
struct LineGeometry {
    coordinates: Vec<Vec<f64>>,
}

/// Decode a Directions response into the first route's path.
///
/// Wire positions are `[lon, lat]`; the returned path is in `GeoPoint` order.
pub fn parse_route(body: &str) -> Result<RoutePath, ApiError> {
    let response: DirectionsResponse = decode(SERVICE, body)?;

    let code = response.code.unwrap_or_else(|| "Ok".to_string());
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(ApiError::NoRoute { code })?;

    let points = route
        .geometry
        .coordinates
        .iter()
        .filter(|position| position.len() >= 2)
        .map(|position| GeoPoint::from_lon_lat([position[0], position[1]]))
        .collect();

    Ok(RoutePath::new(points).with_summary(route.distance, route.duration))
}

/// `{base}/directions/v5/mapbox/{profile}/{lon},{lat};{lon},{lat}`
pub fn directions_url(
    base_url: &str,
    origin: GeoPoint,
    destination: GeoPoint,
    mode: TravelMode,
) -> String {
    let [from_lon, from_lat] = origin.to_lon_lat();
    let [to_lon, to_lat] = destination.to_lon_lat();
    format!(
        "{}/directions/v5/mapbox/{}/{},{};{},{}",
        base_url.trim_end_matches('/'),
        mode.mapbox_profile(),
        from_lon,
        from_lat,
        to_lon,
        to_lat
    )
}

/// Blocking Mapbox Directions client
pub struct MapboxClient {
    client: reqwest::blocking::Client,
    base_url: String,
    access_token: String,
}

impl MapboxClient {
    pub fn new(config: &MapboxConfig, access_token: String) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            access_token,
        })
    }
}

impl RouteProvider for MapboxClient {
    fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Result<RoutePath, ApiError> {
        let url = directions_url(&self.base_url, origin, destination, mode);
        tracing::debug!("Requesting directions: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("geometries", "geojson"),
                ("overview", "full"),
                ("alternatives", "false"),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .map_err(ApiError::transport(SERVICE))?;
        let body = check_status(SERVICE, response)?
            .text()
            .map_err(ApiError::transport(SERVICE))?;

        let path = parse_route(&body)?;
        tracing::info!(
            "Route {} -> {} has {} points",
            origin,
            destination,
            path.points.len()
        );
        Ok(path)
    }
}
