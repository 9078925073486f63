//! # Outbound Transmission
//!
//! Sends a serialized message to its resolved endpoint, retrying network-class
//! failures with a fixed delay. Rejections by the remote party and local request
//! errors propagate after the first attempt.

use super::types::{HttpHeaders, HttpResponse, TransportClient, TransportError};
use crate::resilience::{RetryError, RetryPolicy};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Outcome of a transmission that did not produce a response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransmissionError {
    /// A single non-retriable failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Every attempt failed with a retriable error; `source` is the last one
    #[error("Maximum number of {attempts} transmission attempts exceeded")]
    MaxRetriesExceeded {
        attempts: u32,
        #[source]
        source: TransportError,
    },
}

impl TransmissionError {
    /// The response attached to the failure, if the remote party sent one
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Transport(err) => err.response(),
            Self::MaxRetriesExceeded { .. } => None,
        }
    }

    pub fn is_retries_exceeded(&self) -> bool {
        matches!(self, Self::MaxRetriesExceeded { .. })
    }
}

impl From<RetryError<TransportError>> for TransmissionError {
    fn from(err: RetryError<TransportError>) -> Self {
        match err {
            RetryError::NonRetriable(err) => Self::Transport(err),
            RetryError::Exhausted { attempts, source } => {
                Self::MaxRetriesExceeded { attempts, source }
            }
        }
    }
}

/// Transmission layer shared by the workflows
#[derive(Clone)]
pub struct OutboundTransmission {
    client: Arc<dyn TransportClient>,
    retry_policy: RetryPolicy,
}

impl OutboundTransmission {
    pub fn new(client: Arc<dyn TransportClient>, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            retry_policy,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Send with the configured retry policy
    pub async fn make_request(
        &self,
        url: &str,
        headers: &HttpHeaders,
        body: &str,
    ) -> Result<HttpResponse, TransmissionError> {
        self.make_request_with_policy(&self.retry_policy, url, headers, body)
            .await
    }

    /// Send with a caller-supplied retry policy, e.g. one resolved per interaction
    pub async fn make_request_with_policy(
        &self,
        policy: &RetryPolicy,
        url: &str,
        headers: &HttpHeaders,
        body: &str,
    ) -> Result<HttpResponse, TransmissionError> {
        info!(url = %url, max_attempts = policy.effective_attempts(), "Making outbound request");

        let client = &self.client;
        let response = policy
            .run("outbound request", TransportError::is_retriable, move || {
                client.send(url, headers, body)
            })
            .await
            .map_err(|err| {
                let err = TransmissionError::from(err);
                warn!(url = %url, error = %err, "Outbound request failed");
                err
            })?;

        info!(url = %url, status = response.status, "Outbound request completed");
        Ok(response)
    }
}
