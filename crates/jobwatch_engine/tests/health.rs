use std::time::Duration;

use jobwatch_engine::{health_endpoint, HealthProbe, ProbeError};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn probe_for(server: &MockServer, timeout: Duration) -> HealthProbe {
    HealthProbe::new(health_endpoint(&server.uri()).unwrap(), timeout).unwrap()
}

#[tokio::test]
async fn success_status_means_reachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let probe = probe_for(&server, Duration::from_secs(2)).await;
    assert_eq!(probe.check().await, Ok(200));
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let probe = probe_for(&server, Duration::from_secs(2)).await;
    assert_eq!(probe.check().await, Err(ProbeError::HttpStatus(503)));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let probe = probe_for(&server, Duration::from_millis(100)).await;
    assert_eq!(probe.check().await, Err(ProbeError::Timeout));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let url = Url::parse("http://127.0.0.1:9/api/v1/health").unwrap();
    let probe = HealthProbe::new(url, Duration::from_secs(2)).unwrap();
    assert!(matches!(
        probe.check().await,
        Err(ProbeError::Network(_) | ProbeError::Timeout)
    ));
}
