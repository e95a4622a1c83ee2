use thiserror::Error;
use url::Url;

/// Fixed path of the event stream on the backend origin.
pub const STREAM_PATH: &str = "/ws";
/// Health endpoint polled by the backend probe.
pub const HEALTH_PATH: &str = "/api/v1/health";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("invalid origin {origin:?}: {message}")]
    InvalidOrigin { origin: String, message: String },
    #[error("unsupported origin scheme {0:?}; expected http or https")]
    UnsupportedScheme(String),
    #[error("origin {0:?} has no host")]
    MissingHost(String),
}

/// Stream endpoint for an origin: `https` maps to `wss`, `http` to `ws`, same host and port.
pub fn stream_endpoint(origin: &str) -> Result<Url, EndpointError> {
    let parsed = parse_origin(origin)?;
    let scheme = match parsed.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
    };
    rebuild(origin, &parsed, scheme, STREAM_PATH)
}

/// Health-check URL on the same origin.
pub fn health_endpoint(origin: &str) -> Result<Url, EndpointError> {
    let parsed = parse_origin(origin)?;
    let scheme = parsed.scheme().to_string();
    if scheme != "http" && scheme != "https" {
        return Err(EndpointError::UnsupportedScheme(scheme));
    }
    rebuild(origin, &parsed, &scheme, HEALTH_PATH)
}

fn parse_origin(origin: &str) -> Result<Url, EndpointError> {
    Url::parse(origin.trim()).map_err(|err| EndpointError::InvalidOrigin {
        origin: origin.to_string(),
        message: err.to_string(),
    })
}

fn rebuild(origin: &str, parsed: &Url, scheme: &str, path: &str) -> Result<Url, EndpointError> {
    let host = parsed
        .host_str()
        .ok_or_else(|| EndpointError::MissingHost(origin.to_string()))?;
    let authority = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    Url::parse(&format!("{scheme}://{authority}{path}")).map_err(|err| {
        EndpointError::InvalidOrigin {
            origin: origin.to_string(),
            message: err.to_string(),
        }
    })
}
