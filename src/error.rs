//! Crate-level error type, wrapping the per-component errors.

use crate::config::ConfigurationError;
use crate::messaging::{QueueError, SerializationError};
use crate::routing::RoutingError;
use crate::state_machine::StoreError;
use crate::transmission::{TransmissionError, TransportError};
use crate::workflow::WorkflowError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MhsError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Work description error: {0}")]
    Store(#[from] StoreError),

    #[error("Routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Transmission error: {0}")]
    Transmission(#[from] TransmissionError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),
}

pub type Result<T> = std::result::Result<T, MhsError>;
