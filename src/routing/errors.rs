//! # Routing Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// The interaction details do not name both a service and an action
    #[error("Interaction details do not contain a service and action to route on")]
    MissingServiceId,

    #[error("Route lookup request failed: {message}")]
    Request { message: String },

    #[error("Route lookup service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid route lookup response: {message}")]
    InvalidResponse { message: String },

    #[error("No endpoint registered for service {service_id}")]
    NoEndpoint { service_id: String },
}

impl RoutingError {
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn no_endpoint(service_id: impl Into<String>) -> Self {
        Self::NoEndpoint {
            service_id: service_id.into(),
        }
    }
}

pub type RoutingResult<T> = Result<T, RoutingError>;
