use jobwatch_engine::{health_endpoint, stream_endpoint, EndpointError};
use pretty_assertions::assert_eq;

#[test]
fn secure_origin_maps_to_wss() {
    let url = stream_endpoint("https://jobs.example.com").unwrap();
    assert_eq!(url.as_str(), "wss://jobs.example.com/ws");
}

#[test]
fn plain_origin_keeps_host_and_port() {
    let url = stream_endpoint("http://localhost:8000/some/page?q=1").unwrap();
    assert_eq!(url.as_str(), "ws://localhost:8000/ws");
}

#[test]
fn health_endpoint_uses_origin_scheme() {
    assert_eq!(
        health_endpoint("http://127.0.0.1:8000").unwrap().as_str(),
        "http://127.0.0.1:8000/api/v1/health"
    );
    assert_eq!(
        health_endpoint("https://jobs.example.com/").unwrap().as_str(),
        "https://jobs.example.com/api/v1/health"
    );
}

#[test]
fn rejects_unusable_origins() {
    assert!(matches!(
        stream_endpoint("ftp://files.example.com"),
        Err(EndpointError::UnsupportedScheme(scheme)) if scheme == "ftp"
    ));
    assert!(matches!(
        stream_endpoint("not a url"),
        Err(EndpointError::InvalidOrigin { .. })
    ));
}
