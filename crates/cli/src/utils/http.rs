//! Blocking HTTP client for remote schema refs

use crate::error::{CliError, CliResult};
use massdriver_compiler::{HttpClient, HttpResponse, TransportError};
use std::time::Duration;

/// `HttpClient` backed by `reqwest::blocking`.
pub struct ReqwestHttpClient {
    client: reqwest::blocking::Client,
}

impl ReqwestHttpClient {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> CliResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mass/", env!("MASS_VERSION")))
            .build()
            .map_err(|e| CliError::Message(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        tracing::debug!(url, status, bytes = body.len(), "fetched ref");

        Ok(HttpResponse { status, body })
    }
}
