//! reqwest-backed transport client.

use super::types::{HttpHeaders, HttpResponse, TransportClient, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// POSTs serialized messages over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpTransportClient {
    client: Client,
}

impl HttpTransportClient {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::request(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an already-configured client (custom TLS, proxies)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// Markers of a TLS or certificate failure in an error's source chain
const TLS_FAILURE_MARKERS: &[&str] = &[
    "certificate",
    "tls",
    "ssl",
    "handshake",
    "wrong version number",
    "corrupt message",
    "invalid peer",
];

/// The first cause under `err` that reads as a TLS or certificate failure
fn tls_failure(err: &reqwest::Error) -> Option<String> {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let display = cause.to_string();
        let text = format!("{display} {cause:?}").to_lowercase();
        if TLS_FAILURE_MARKERS.iter().any(|marker| text.contains(marker)) {
            return Some(display);
        }
        source = cause.source();
    }
    None
}

fn classify(err: reqwest::Error) -> TransportError {
    // Security failures are not transient
    if let Some(cause) = tls_failure(&err) {
        return TransportError::request(format!("TLS failure: {err}: {cause}"));
    }
    if err.is_timeout() {
        TransportError::timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::connection(err.to_string())
    } else if err.is_builder() {
        TransportError::request(err.to_string())
    } else if err.is_request() || err.is_body() {
        // Sent but interrupted mid-flight
        TransportError::connection(err.to_string())
    } else {
        TransportError::request(err.to_string())
    }
}

#[async_trait]
impl TransportClient for HttpTransportClient {
    async fn send(
        &self,
        url: &str,
        headers: &HttpHeaders,
        body: &str,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.post(url).body(body.to_string());
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(classify)?;
        let status = response.status();

        let mut response_headers = HttpHeaders::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                response_headers.insert(name.as_str().to_string(), value.to_string());
            }
        }
        let body = response.text().await.map_err(classify)?;

        debug!(url = %url, status = status.as_u16(), "Transport call returned");

        let response = HttpResponse {
            status: status.as_u16(),
            headers: response_headers,
            body,
        };
        if status.is_client_error() || status.is_server_error() {
            return Err(TransportError::http(response));
        }
        Ok(response)
    }
}
