#![allow(clippy::doc_markdown)] // Allow technical terms like ebXML, SOAPAction in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # MHS Workflow
//!
//! Message delivery workflows for a reliable-messaging healthcare interoperability
//! gateway.
//!
//! ## Overview
//!
//! For each outbound message the gateway resolves a delivery endpoint, serializes the
//! ebXML envelope, hands it to the transport with bounded retries and records the
//! outcome in a versioned work description. Inbound responses are handed to a
//! downstream queue under their own retry policy.
//!
//! ## Module Organization
//!
//! - [`workflow`] - Express and reliable orchestrators and the workflow registry
//! - [`state_machine`] - Work description, status axes and the persistence contract
//! - [`transmission`] - Transport client contract, HTTP client and retrying transmission
//! - [`routing`] - Endpoint and reliability resolution
//! - [`messaging`] - Interaction details, envelope serialization, fault interpretation, queue
//! - [`resilience`] - Fixed-delay, attempt-bounded retry policy
//! - [`audit`] - Audit log entries and sinks
//! - [`config`] - Layered configuration
//! - [`bootstrap`] - Wiring of the full message handling system
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mhs_workflow::bootstrap::{Collaborators, MessageHandlingSystem};
//! use mhs_workflow::config::ConfigManager;
//! use mhs_workflow::messaging::{
//!     EnvelopeSerializer, InMemoryQueue, InteractionDetails, SerializationError,
//!     SerializedMessage,
//! };
//! use std::sync::Arc;
//!
//! struct PassThrough;
//!
//! impl EnvelopeSerializer for PassThrough {
//!     fn serialize(&self, details: &InteractionDetails) -> Result<SerializedMessage, SerializationError> {
//!         Ok(SerializedMessage {
//!             message_id: details.get_str("message_id").unwrap_or_default().to_string(),
//!             headers: Default::default(),
//!             body: details.get_str("hl7_message").unwrap_or_default().to_string(),
//!         })
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (queue, _receiver) = InMemoryQueue::new("inbound");
//! let system = MessageHandlingSystem::bootstrap(
//!     ConfigManager::load()?,
//!     Collaborators::new(Arc::new(PassThrough), Arc::new(queue)),
//! )?;
//!
//! let details = InteractionDetails::new()
//!     .with("workflow", "async-express")
//!     .with("service", "urn:nhs:names:services:psis")
//!     .with("action", "MCCI_IN010000UK13");
//! let response = system
//!     .handle_outbound_message("msg-1", "conv-1", &details, "<hl7/>")
//!     .await;
//! println!("{} {}", response.status, response.message);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod resilience;
pub mod routing;
pub mod state_machine;
pub mod transmission;
pub mod workflow;

pub use audit::{AuditLogEntry, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use bootstrap::{Collaborators, MessageHandlingSystem};
pub use config::{ConfigManager, MhsConfig};
pub use error::{MhsError, Result};
pub use resilience::{RetryError, RetryPolicy};
pub use state_machine::{
    InboundStatus, MemoryStore, MessageStatus, OutboundStatus, PersistenceStore, StoreError,
    WorkDescription,
};
pub use transmission::{OutboundTransmission, TransmissionError, TransportError};
pub use workflow::{
    AsynchronousExpressWorkflow, AsynchronousReliableWorkflow, MessageRecord, Workflow,
    WorkflowError, WorkflowRegistry, WorkflowResponse, WorkflowType,
};
