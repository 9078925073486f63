//! Asynchronous reliable workflow.
//!
//! Requests duplicate elimination and an acknowledgement, records the PREPARED
//! milestone once the envelope is built, and transmits under the retry count and
//! interval the directory publishes for the interaction.

use super::common::{CommonAsynchronousWorkflow, InboundComponents, OutboundComponents, WorkflowProfile};
use super::errors::WorkflowResult;
use super::{MessageRecord, Workflow, WorkflowResponse, WorkflowType};
use crate::constants::interaction as keys;
use crate::messaging::InteractionDetails;
use crate::resilience::RetryPolicy;
use crate::state_machine::{PersistenceStore, WorkDescription};
use async_trait::async_trait;
use std::sync::Arc;

pub struct AsynchronousReliableWorkflow {
    common: CommonAsynchronousWorkflow,
}

impl AsynchronousReliableWorkflow {
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        store_retry_policy: RetryPolicy,
        outbound: Option<OutboundComponents>,
        inbound: Option<InboundComponents>,
    ) -> Self {
        let profile = WorkflowProfile {
            workflow_type: WorkflowType::AsyncReliable,
            defaults: Self::defaults(),
            resolve_reliability: true,
            record_prepared: true,
        };
        Self {
            common: CommonAsynchronousWorkflow::new(profile, store, store_retry_policy, outbound, inbound),
        }
    }

    pub fn defaults() -> InteractionDetails {
        InteractionDetails::new()
            .with(keys::DUPLICATE_ELIMINATION, true)
            .with(keys::ACK_REQUESTED, true)
            .with(keys::ACK_SOAP_ACTOR, keys::TO_PARTY_MSH_ACTOR)
            .with(keys::SYNC_REPLY, true)
    }
}

#[async_trait]
impl Workflow for AsynchronousReliableWorkflow {
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
