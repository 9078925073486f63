//! # Common Asynchronous Workflow
//!
//! The outbound and inbound algorithms shared by the express and reliable
//! workflows. The variants differ only in their [`WorkflowProfile`]: the defaults
//! merged into every interaction, whether reliability parameters are resolved, and
//! whether a PREPARED milestone is recorded.
//!
//! ## Outbound
//!
//! ```text
//! work description (create+publish | resumed)
//!   -> routing [-> reliability]        failure: TRANSMISSION_FAILED, 500
//!   -> serialize                       failure: PREPARATION_FAILED, 500
//!   [-> PREPARED]
//!   -> transmit
//!        202                           ACKD, audited, (202, "")
//!        other status                  NACKD, audited, 500
//!        fault with response           NACKD, audited, interpreted response
//!        no response / exhausted       TRANSMISSION_FAILED, not audited, 500
//! ```
//!
//! ## Inbound
//!
//! RECEIVED, then the queue handoff under its own retry policy, then
//! SUCCESSFULLY_PROCESSED or FAILED plus a raised exhaustion error.

use super::errors::{WorkflowError, WorkflowResult};
use super::{MessageRecord, WorkflowResponse, WorkflowType};
use crate::audit::{AuditLogEntry, AuditSink};
use crate::constants::{interaction as keys, responses};
use crate::logging::log_workflow_operation;
use crate::messaging::{
    EnvelopeSerializer, FaultInterpreter, InteractionDetails, MessageProperties, QueueAdaptor,
    QueueError,
};
use crate::resilience::{RetryError, RetryPolicy};
use crate::routing::{EndpointDetails, ReliabilityDetails, RoutingAndReliability, RoutingError};
use crate::state_machine::{
    InboundStatus, OutboundStatus, PersistenceStore, StatusUpdate, StoreError, WorkDescription,
};
use crate::transmission::{HttpResponse, OutboundTransmission, TransmissionError};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

/// What distinguishes one workflow variant from another
#[derive(Debug, Clone)]
pub struct WorkflowProfile {
    pub workflow_type: WorkflowType,
    /// Merged over the caller's interaction details
    pub defaults: InteractionDetails,
    pub resolve_reliability: bool,
    pub record_prepared: bool,
}

/// Collaborators needed to send outbound messages
#[derive(Clone)]
pub struct OutboundComponents {
    pub party_key: String,
    pub transmission: OutboundTransmission,
    pub serializer: Arc<dyn EnvelopeSerializer>,
    pub routing: Arc<dyn RoutingAndReliability>,
    pub fault_interpreter: Arc<dyn FaultInterpreter>,
    pub audit: Arc<dyn AuditSink>,
}

/// Collaborators needed to accept inbound messages
#[derive(Clone)]
pub struct InboundComponents {
    pub queue: Arc<dyn QueueAdaptor>,
    pub queue_retry_policy: RetryPolicy,
}

pub struct CommonAsynchronousWorkflow {
    profile: WorkflowProfile,
    store: Arc<dyn PersistenceStore>,
    store_retry_policy: RetryPolicy,
    outbound: Option<OutboundComponents>,
    inbound: Option<InboundComponents>,
}

struct Route {
    endpoint: EndpointDetails,
    reliability: Option<ReliabilityDetails>,
}

impl CommonAsynchronousWorkflow {
    pub fn new(
        profile: WorkflowProfile,
        store: Arc<dyn PersistenceStore>,
        store_retry_policy: RetryPolicy,
        outbound: Option<OutboundComponents>,
        inbound: Option<InboundComponents>,
    ) -> Self {
        Self {
            profile,
            store,
            store_retry_policy,
            outbound,
            inbound,
        }
    }

    pub fn workflow_type(&self) -> WorkflowType {
        self.profile.workflow_type
    }

    pub fn profile(&self) -> &WorkflowProfile {
        &self.profile
    }

    pub async fn handle_outbound_message(
        &self,
        message_id: &str,
        correlation_id: &str,
        interaction_details: &InteractionDetails,
        payload: &str,
        record: MessageRecord,
    ) -> WorkflowResponse {
        let workflow = self.profile.workflow_type;
        let Some(outbound) = &self.outbound else {
            error!(message_id = %message_id, workflow = %workflow, "Workflow has no outbound components");
            return WorkflowResponse::internal_error(responses::OUTBOUND_NOT_CONFIGURED);
        };

        info!(
            message_id = %message_id,
            correlation_id = %correlation_id,
            workflow = %workflow,
            "Entered workflow to handle outbound message"
        );

        let mut work_description = match self.open_work_description(message_id, record).await {
            Ok(work_description) => work_description,
            Err(err) => {
                error!(message_id = %message_id, error = %err, "Failed to create work description");
                return WorkflowResponse::internal_error(responses::ERROR_CREATING_WORK_DESCRIPTION);
            }
        };

        let route = match self.resolve_route(outbound, interaction_details).await {
            Ok(route) => route,
            Err(err) => {
                error!(message_id = %message_id, error = %err, "Error obtaining outbound URL");
                self.record_failure(&mut work_description, OutboundStatus::TransmissionFailed)
                    .await;
                return WorkflowResponse::internal_error(responses::ERROR_OBTAINING_URL);
            }
        };

        let details = self.envelope_details(
            outbound,
            message_id,
            correlation_id,
            interaction_details,
            payload,
            &route.endpoint,
        );
        let message = match outbound.serializer.serialize(&details) {
            Ok(message) => message,
            Err(err) => {
                error!(message_id = %message_id, error = %err, "Failed to serialise outbound message");
                self.record_failure(&mut work_description, OutboundStatus::PreparationFailed)
                    .await;
                return WorkflowResponse::internal_error(responses::ERROR_SERIALISING);
            }
        };

        if self.profile.record_prepared {
            if let Err(err) = self
                .update_status(&mut work_description, StatusUpdate::Outbound(OutboundStatus::Prepared))
                .await
            {
                error!(message_id = %message_id, error = %err, "Failed to record prepared message");
                return WorkflowResponse::internal_error(responses::ERROR_UPDATING_WORK_DESCRIPTION);
            }
        }

        let policy = route
            .reliability
            .map(|reliability| reliability.retry_policy())
            .unwrap_or_else(|| outbound.transmission.retry_policy());

        info!(
            message_id = %message_id,
            url = %route.endpoint.url,
            max_attempts = policy.effective_attempts(),
            "About to make outbound request"
        );
        let start_time = Utc::now();
        let result = outbound
            .transmission
            .make_request_with_policy(&policy, &route.endpoint.url, &message.headers, &message.body)
            .await;
        let end_time = Utc::now();

        let (response, acknowledgement) = match result {
            Ok(response) => self.handle_response(&mut work_description, response).await,
            Err(err) => match err.response().cloned() {
                Some(faulted) => {
                    warn!(
                        message_id = %message_id,
                        status = faulted.status,
                        "Received fault response from remote party"
                    );
                    let response = outbound.fault_interpreter.interpret(
                        faulted.status,
                        &faulted.headers,
                        &faulted.body,
                    );
                    self.record_failure(&mut work_description, OutboundStatus::Nackd)
                        .await;
                    (response, OutboundStatus::Nackd)
                }
                None => {
                    self.log_transmission_error(message_id, &err);
                    self.record_failure(&mut work_description, OutboundStatus::TransmissionFailed)
                        .await;
                    return WorkflowResponse::internal_error(responses::ERROR_MAKING_REQUEST);
                }
            },
        };

        outbound.audit.record(&AuditLogEntry {
            workflow,
            start_time,
            end_time,
            acknowledgement,
        });
        log_workflow_operation(
            "outbound",
            workflow.as_str(),
            message_id,
            acknowledgement.as_str(),
            Some(&response.message),
        );
        response
    }

    pub async fn handle_inbound_message(
        &self,
        message_id: &str,
        correlation_id: &str,
        work_description: &mut WorkDescription,
        payload: &str,
    ) -> WorkflowResult<()> {
        let workflow = self.profile.workflow_type;
        let Some(inbound) = &self.inbound else {
            return Err(WorkflowError::not_configured(workflow.as_str(), "inbound"));
        };

        info!(
            message_id = %message_id,
            correlation_id = %correlation_id,
            workflow = %workflow,
            "Entered workflow to handle inbound message"
        );

        self.update_status(
            work_description,
            StatusUpdate::Inbound(InboundStatus::Received),
        )
        .await?;

        let properties = MessageProperties::new(message_id, correlation_id);
        let queue = &inbound.queue;
        let properties_ref = &properties;
        let sent = inbound
            .queue_retry_policy
            .run("put message onto inbound queue", |_: &QueueError| true, move || {
                queue.send(payload, properties_ref)
            })
            .await;

        match sent {
            Ok(()) => {
                self.update_status(
                    work_description,
                    StatusUpdate::Inbound(InboundStatus::SuccessfullyProcessed),
                )
                .await?;
                log_workflow_operation(
                    "inbound",
                    workflow.as_str(),
                    message_id,
                    InboundStatus::SuccessfullyProcessed.as_str(),
                    None,
                );
                Ok(())
            }
            Err(gave_up) => {
                let (attempts, source) = match gave_up {
                    RetryError::Exhausted { attempts, source } => (attempts, source),
                    RetryError::NonRetriable(source) => (1, source),
                };
                error!(
                    message_id = %message_id,
                    attempts,
                    error = %source,
                    "Exceeded the maximum number of retries when putting message onto inbound queue"
                );
                if let Err(err) = self
                    .update_status(work_description, StatusUpdate::Inbound(InboundStatus::Failed))
                    .await
                {
                    error!(message_id = %message_id, error = %err, "Failed to record inbound failure");
                }
                Err(WorkflowError::InboundQueueRetriesExceeded { attempts, source })
            }
        }
    }

    async fn open_work_description(
        &self,
        message_id: &str,
        record: MessageRecord,
    ) -> Result<WorkDescription, StoreError> {
        match record {
            MessageRecord::Resumed(work_description) => Ok(work_description),
            MessageRecord::New => {
                let mut work_description = WorkDescription::create(
                    Arc::clone(&self.store),
                    message_id,
                    self.profile.workflow_type,
                    OutboundStatus::Received,
                );
                work_description
                    .publish_with_retries(&self.store_retry_policy)
                    .await?;
                Ok(work_description)
            }
        }
    }

    async fn resolve_route(
        &self,
        outbound: &OutboundComponents,
        interaction_details: &InteractionDetails,
    ) -> Result<Route, RoutingError> {
        let service_id = interaction_details
            .service_id()
            .ok_or(RoutingError::MissingServiceId)?;

        let endpoint = outbound.routing.get_end_point(&service_id).await?;
        let reliability = if self.profile.resolve_reliability {
            Some(outbound.routing.get_reliability(&service_id).await?)
        } else {
            None
        };
        Ok(Route {
            endpoint,
            reliability,
        })
    }

    fn envelope_details(
        &self,
        outbound: &OutboundComponents,
        message_id: &str,
        correlation_id: &str,
        interaction_details: &InteractionDetails,
        payload: &str,
        endpoint: &EndpointDetails,
    ) -> InteractionDetails {
        let mut details = interaction_details.clone();
        details.apply_defaults(&self.profile.defaults);
        details.insert(keys::MESSAGE_ID, message_id);
        details.insert(keys::CONVERSATION_ID, correlation_id);
        details.insert(keys::FROM_PARTY_ID, outbound.party_key.as_str());
        details.insert(keys::TO_PARTY_ID, endpoint.to_party_key.as_str());
        details.insert(keys::CPA_ID, endpoint.cpa_id.as_str());
        details.insert(keys::MESSAGE, payload);
        details
    }

    async fn handle_response(
        &self,
        work_description: &mut WorkDescription,
        response: HttpResponse,
    ) -> (WorkflowResponse, OutboundStatus) {
        let message_id = work_description.message_id().to_string();
        if response.status == responses::ACCEPTED {
            info!(message_id = %message_id, "Outbound message acknowledged");
            let result = match self
                .update_status(work_description, StatusUpdate::Outbound(OutboundStatus::Ackd))
                .await
            {
                Ok(()) => WorkflowResponse::accepted(),
                Err(err) => {
                    error!(message_id = %message_id, error = %err, "Failed to record acknowledgement");
                    WorkflowResponse::internal_error(responses::ERROR_UPDATING_WORK_DESCRIPTION)
                }
            };
            (result, OutboundStatus::Ackd)
        } else {
            warn!(
                message_id = %message_id,
                status = response.status,
                "Didn't get expected success response from remote party"
            );
            self.record_failure(work_description, OutboundStatus::Nackd)
                .await;
            (
                WorkflowResponse::internal_error(responses::UNEXPECTED_RESPONSE),
                OutboundStatus::Nackd,
            )
        }
    }

    async fn update_status(
        &self,
        work_description: &mut WorkDescription,
        update: StatusUpdate,
    ) -> Result<(), StoreError> {
        work_description
            .update_status_with_retries(update, &self.store_retry_policy)
            .await
    }

    /// Status writes on failure paths are logged; the failure response stands
    async fn record_failure(&self, work_description: &mut WorkDescription, status: OutboundStatus) {
        if let Err(err) = self
            .update_status(work_description, StatusUpdate::Outbound(status))
            .await
        {
            error!(
                message_id = %work_description.message_id(),
                status = %status,
                error = %err,
                "Failed to record outbound failure status"
            );
        }
    }

    fn log_transmission_error(&self, message_id: &str, err: &TransmissionError) {
        if err.is_retries_exceeded() {
            error!(
                message_id = %message_id,
                error = %err,
                cause = %std::error::Error::source(err).map(|e| e.to_string()).unwrap_or_default(),
                "Exhausted transmission attempts for outbound message"
            );
        } else {
            error!(message_id = %message_id, error = %err, "Error making outbound request");
        }
    }
}
