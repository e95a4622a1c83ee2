use std::time::Duration;

use jobwatch_logging::watch_debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("health check timed out")]
    Timeout,
    #[error("health check returned HTTP {0}")]
    HttpStatus(u16),
    #[error("health check failed: {0}")]
    Network(String),
    #[error("http client unavailable: {0}")]
    Client(String),
}

/// Single GET against the backend health endpoint. Any 2xx counts as reachable.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: reqwest::Client,
    url: Url,
}

impl HealthProbe {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProbeError::Client(err.to_string()))?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn check(&self) -> Result<u16, ProbeError> {
        watch_debug!("Probing {}", self.url);
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(ProbeError::HttpStatus(status.as_u16()))
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ProbeError {
    if err.is_timeout() {
        ProbeError::Timeout
    } else {
        ProbeError::Network(err.to_string())
    }
}
