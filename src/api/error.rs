use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failure talking to one of the outbound map services
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned error status: {status}")]
    Status { service: &'static str, status: u16 },

    #[error("failed to parse {service} response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no route found ({code})")]
    NoRoute { code: String },
}

impl ApiError {
    /// Wrap a reqwest failure. The request URL is stripped: it can carry the
    /// Mapbox access token.
    pub(crate) fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> ApiError {
        move |source| ApiError::Transport {
            service,
            source: source.without_url(),
        }
    }
}

/// Decode a response body, tagging failures with the service name.
pub(crate) fn decode<T: DeserializeOwned>(service: &'static str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode { service, source })
}

/// Reject non-2xx responses before their body is read.
pub(crate) fn check_status(
    service: &'static str,
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        tracing::warn!("{} returned HTTP {}", service, status);
        return Err(ApiError::Status {
            service,
            status: status.as_u16(),
        });
    }
    Ok(response)
}
