//! # Workflow Error Types
//!
//! Outbound handling never fails past the workflow boundary; it reports through a
//! [`WorkflowResponse`](super::WorkflowResponse). These errors cover the inbound path
//! and workflow selection.

use crate::messaging::QueueError;
use crate::state_machine::StoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    /// The workflow was built without components for this direction
    #[error("Workflow {workflow} is not configured for {direction} messages")]
    NotConfigured {
        workflow: String,
        direction: &'static str,
    },

    /// Every attempt to put the message onto the inbound queue failed
    #[error("The max number of retries ({attempts}) to put a message onto the inbound queue has been exceeded")]
    InboundQueueRetriesExceeded {
        attempts: u32,
        #[source]
        source: QueueError,
    },

    #[error("Work description error: {0}")]
    Store(#[from] StoreError),

    #[error("Unknown workflow: {name}")]
    UnknownWorkflow { name: String },

    /// The interaction details carry no `workflow` key
    #[error("Interaction details do not name a workflow")]
    MissingWorkflow,
}

impl WorkflowError {
    pub fn not_configured(workflow: impl Into<String>, direction: &'static str) -> Self {
        Self::NotConfigured {
            workflow: workflow.into(),
            direction,
        }
    }

    pub fn unknown_workflow(name: impl Into<String>) -> Self {
        Self::UnknownWorkflow { name: name.into() }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
