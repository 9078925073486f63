//! Asynchronous express workflow.
//!
//! Acknowledgement is synchronous on the transport, so there are no persisted
//! headers to prepare and no PREPARED milestone. Routing only; the transmission
//! layer's own retry policy applies.

use super::common::{CommonAsynchronousWorkflow, InboundComponents, OutboundComponents, WorkflowProfile};
use super::errors::WorkflowResult;
use super::{MessageRecord, Workflow, WorkflowResponse, WorkflowType};
use crate::constants::interaction as keys;
use crate::messaging::InteractionDetails;
use crate::resilience::RetryPolicy;
use crate::state_machine::{PersistenceStore, WorkDescription};
use async_trait::async_trait;
use std::sync::Arc;

pub struct AsynchronousExpressWorkflow {
    common: CommonAsynchronousWorkflow,
}

impl AsynchronousExpressWorkflow {
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        store_retry_policy: RetryPolicy,
        outbound: Option<OutboundComponents>,
        inbound: Option<InboundComponents>,
    ) -> Self {
        let profile = WorkflowProfile {
            workflow_type: WorkflowType::AsyncExpress,
            defaults: Self::defaults(),
            resolve_reliability: false,
            record_prepared: false,
        };
        Self {
            common: CommonAsynchronousWorkflow::new(profile, store, store_retry_policy, outbound, inbound),
        }
    }

    pub fn defaults() -> InteractionDetails {
        InteractionDetails::new()
            .with(keys::DUPLICATE_ELIMINATION, false)
            .with(keys::ACK_REQUESTED, false)
            .with(keys::ACK_SOAP_ACTOR, keys::TO_PARTY_MSH_ACTOR)
            .with(keys::SYNC_REPLY, true)
    }
}

#[async_trait]
impl Workflow for AsynchronousExpressWorkflow {
    fn workflow_type(&self) -> WorkflowType {
        self.common.workflow_type()
    }

    async fn handle_outbound_message(
        &self,
        message_id: &str,
        correlation_id: &str,
        interaction_details: &InteractionDetails,
        payload: &str,
        record: MessageRecord,
    ) -> WorkflowResponse {
        self.common
            .handle_outbound_message(message_id, correlation_id, interaction_details, payload, record)
            .await
    }

    async fn handle_inbound_message(
        &self,
        message_id: &str,
        correlation_id: &str,
        work_description: &mut WorkDescription,
        payload: &str,
    ) -> WorkflowResult<()> {
        self.common
            .handle_inbound_message(message_id, correlation_id, work_description, payload)
            .await
    }
}
