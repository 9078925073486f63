//! # Message Workflows
//!
//! The orchestration layer: each workflow drives one outbound message through
//! routing, serialization, transmission and status tracking, or hands one inbound
//! message to the downstream queue.
//!
//! ## Architecture
//!
//! ```text
//! WorkflowRegistry
//! ├── AsynchronousExpressWorkflow   (no PREPARED milestone, express defaults)
//! └── AsynchronousReliableWorkflow  (PREPARED milestone, reliability lookup)
//!         └── CommonAsynchronousWorkflow (shared outbound/inbound algorithms)
//! ```
//!
//! Outbound handling always yields a [`WorkflowResponse`]; inbound handling raises
//! [`WorkflowError`] when the message could not be handed off.

pub mod common;
pub mod errors;
pub mod express;
pub mod registry;
pub mod reliable;

pub use common::{CommonAsynchronousWorkflow, InboundComponents, OutboundComponents, WorkflowProfile};
pub use errors::{WorkflowError, WorkflowResult};
pub use express::AsynchronousExpressWorkflow;
pub use registry::WorkflowRegistry;
pub use reliable::AsynchronousReliableWorkflow;

use crate::constants::{responses, workflows};
use crate::messaging::InteractionDetails;
use crate::state_machine::WorkDescription;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowType {
    #[serde(rename = "async-express")]
    AsyncExpress,
    #[serde(rename = "async-reliable")]
    AsyncReliable,
}

impl WorkflowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AsyncExpress => workflows::ASYNC_EXPRESS,
            Self::AsyncReliable => workflows::ASYNC_RELIABLE,
        }
    }
}

impl fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowType {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            workflows::ASYNC_EXPRESS => Ok(Self::AsyncExpress),
            workflows::ASYNC_RELIABLE => Ok(Self::AsyncReliable),
            other => Err(WorkflowError::unknown_workflow(other)),
        }
    }
}

/// Status code and message returned to an outbound caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowResponse {
    pub status: u16,
    pub message: String,
}

impl WorkflowResponse {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// `(202, "")`
    pub fn accepted() -> Self {
        Self::new(responses::ACCEPTED, "")
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(responses::INTERNAL_ERROR, message)
    }

    pub fn is_accepted(&self) -> bool {
        self.status == responses::ACCEPTED
    }
}

/// Whether an outbound message starts a new work description or continues one
#[derive(Debug)]
pub enum MessageRecord {
    /// Create and publish a work description for the message
    New,
    /// Compose status changes onto a caller-supplied work description
    Resumed(WorkDescription),
}

impl MessageRecord {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New)
    }
}

impl From<Option<WorkDescription>> for MessageRecord {
    fn from(work_description: Option<WorkDescription>) -> Self {
        work_description.map_or(Self::New, Self::Resumed)
    }
}

#[async_trait]
pub trait Workflow: Send + Sync {
    fn workflow_type(&self) -> WorkflowType;

    /// Deliver one outbound message, reporting the outcome as a response
    async fn handle_outbound_message(
        &self,
        message_id: &str,
        correlation_id: &str,
        interaction_details: &InteractionDetails,
        payload: &str,
        record: MessageRecord,
    ) -> WorkflowResponse;

    /// Hand one inbound message to the downstream queue
    async fn handle_inbound_message(
        &self,
        message_id: &str,
        correlation_id: &str,
        work_description: &mut WorkDescription,
        payload: &str,
    ) -> WorkflowResult<()>;
}
