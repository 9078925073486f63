//! Transport-level request/response types and the client contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// HTTP headers, ordered by name
pub type HttpHeaders = BTreeMap<String, String>;

/// A response received from the remote party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HttpHeaders::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

pub(crate) fn find_header<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Failures of a single transport call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request did not complete in time
    #[error("Request timed out: {message}")]
    Timeout { message: String },

    /// The connection could not be established or was dropped
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// The remote party answered with an error status
    #[error("HTTP {status} received from remote party")]
    Http {
        status: u16,
        response: Option<HttpResponse>,
    },

    /// The request could not be built or was refused locally (bad URL, TLS setup)
    #[error("Request error: {message}")]
    Request { message: String },
}

impl TransportError {
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Error status carrying the response it came with
    pub fn http(response: HttpResponse) -> Self {
        Self::Http {
            status: response.status,
            response: Some(response),
        }
    }

    /// Network-class failures are worth another attempt; a rejected request is not
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connection { .. })
    }

    /// The response attached to an error status, if any
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Http { response, .. } => response.as_ref(),
            _ => None,
        }
    }
}

/// Issues a single network call to the remote party
#[async_trait]
pub trait TransportClient: Send + Sync {
    async fn send(
        &self,
        url: &str,
        headers: &HttpHeaders,
        body: &str,
    ) -> Result<HttpResponse, TransportError>;
}
