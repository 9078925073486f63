//! # Message Handling System Bootstrap
//!
//! Wires configuration, the HTTP transport, the route lookup client, the work
//! description store, the inbound queue and the audit sink into a registry holding
//! both workflows.
//!
//! Envelope serialization and the downstream queue have no built-in implementation
//! and must be supplied; every other collaborator falls back to the shipped one.

use crate::audit::{AuditSink, TracingAuditSink};
use crate::config::ConfigManager;
use crate::error::Result;
use crate::logging::init_structured_logging;
use crate::messaging::{
    EnvelopeSerializer, FaultInterpreter, InteractionDetails, QueueAdaptor, SpineFaultInterpreter,
};
use crate::routing::{RouteLookupClient, RoutingAndReliability};
use crate::state_machine::{MemoryStore, PersistenceStore, WorkDescription};
use crate::transmission::{HttpTransportClient, OutboundTransmission, TransportClient};
use crate::workflow::{
    AsynchronousExpressWorkflow, AsynchronousReliableWorkflow, InboundComponents, MessageRecord,
    OutboundComponents, WorkflowRegistry, WorkflowResponse,
};
use std::sync::Arc;
use tracing::{error, info};

/// Externally provided collaborators; unset optional ones use the defaults
pub struct Collaborators {
    pub serializer: Arc<dyn EnvelopeSerializer>,
    pub queue: Arc<dyn QueueAdaptor>,
    pub store: Option<Arc<dyn PersistenceStore>>,
    pub transport: Option<Arc<dyn TransportClient>>,
    pub routing: Option<Arc<dyn RoutingAndReliability>>,
    pub fault_interpreter: Option<Arc<dyn FaultInterpreter>>,
    pub audit: Option<Arc<dyn AuditSink>>,
}

impl Collaborators {
    pub fn new(serializer: Arc<dyn EnvelopeSerializer>, queue: Arc<dyn QueueAdaptor>) -> Self {
        Self {
            serializer,
            queue,
            store: None,
            transport: None,
            routing: None,
            fault_interpreter: None,
            audit: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn PersistenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn TransportClient>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_routing(mut self, routing: Arc<dyn RoutingAndReliability>) -> Self {
        self.routing = Some(routing);
        self
    }

    pub fn with_fault_interpreter(mut self, fault_interpreter: Arc<dyn FaultInterpreter>) -> Self {
        self.fault_interpreter = Some(fault_interpreter);
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }
}

pub struct MessageHandlingSystem {
    config_manager: Arc<ConfigManager>,
    store: Arc<dyn PersistenceStore>,
    registry: WorkflowRegistry,
}

impl MessageHandlingSystem {
    pub fn bootstrap(config_manager: Arc<ConfigManager>, collaborators: Collaborators) -> Result<Self> {
        let config = config_manager.config();
        init_structured_logging(&config.logging);

        let transport: Arc<dyn TransportClient> = match collaborators.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransportClient::new(
                config.transmission.connect_timeout(),
                config.transmission.request_timeout(),
            )?),
        };
        let routing: Arc<dyn RoutingAndReliability> = match collaborators.routing {
            Some(routing) => routing,
            None => Arc::new(RouteLookupClient::new(
                config.routing.base_url.clone(),
                config.routing.org_code.clone(),
                config.routing.timeout(),
            )?),
        };
        let store = collaborators
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));

        let outbound = OutboundComponents {
            party_key: config.workflow.party_key.clone(),
            transmission: OutboundTransmission::new(transport, config.transmission.retry_policy()),
            serializer: collaborators.serializer,
            routing,
            fault_interpreter: collaborators
                .fault_interpreter
                .unwrap_or_else(|| Arc::new(SpineFaultInterpreter::new())),
            audit: collaborators
                .audit
                .unwrap_or_else(|| Arc::new(TracingAuditSink)),
        };
        let inbound = InboundComponents {
            queue: collaborators.queue,
            queue_retry_policy: config.workflow.inbound_queue_retry_policy(),
        };
        let store_retry_policy = config.workflow.persistence_store_retry_policy();

        let mut registry = WorkflowRegistry::new();
        registry.register(Arc::new(AsynchronousExpressWorkflow::new(
            Arc::clone(&store),
            store_retry_policy,
            Some(outbound.clone()),
            Some(inbound.clone()),
        )));
        registry.register(Arc::new(AsynchronousReliableWorkflow::new(
            Arc::clone(&store),
            store_retry_policy,
            Some(outbound),
            Some(inbound),
        )));

        info!(
            environment = %config_manager.environment(),
            workflows = ?registry.workflow_types(),
            "Message handling system bootstrapped"
        );

        Ok(Self {
            config_manager,
            store,
            registry,
        })
    }

    pub fn config_manager(&self) -> &Arc<ConfigManager> {
        &self.config_manager
    }

    pub fn store(&self) -> &Arc<dyn PersistenceStore> {
        &self.store
    }

    pub fn registry(&self) -> &WorkflowRegistry {
        &self.registry
    }

    /// Send a new outbound message through the workflow its interaction names
    ///
    /// A missing or unknown `workflow` key is answered with a 500 response before
    /// any work description is written.
    pub async fn handle_outbound_message(
        &self,
        message_id: &str,
        correlation_id: &str,
        interaction_details: &InteractionDetails,
        payload: &str,
    ) -> WorkflowResponse {
        let workflow = match self.registry.for_interaction(interaction_details) {
            Ok(workflow) => workflow,
            Err(e) => {
                error!(message_id = %message_id, error = %e, "No workflow for outbound message");
                return WorkflowResponse::internal_error(e.to_string());
            }
        };
        workflow
            .handle_outbound_message(
                message_id,
                correlation_id,
                interaction_details,
                payload,
                MessageRecord::New,
            )
            .await
    }

    /// Accept an inbound response for a message this system sent
    ///
    /// The work description is loaded by message id and its workflow handles the
    /// queue handoff.
    pub async fn handle_inbound_message(
        &self,
        message_id: &str,
        correlation_id: &str,
        payload: &str,
    ) -> Result<()> {
        let mut work_description = WorkDescription::load(Arc::clone(&self.store), message_id).await?;
        let workflow = self.registry.get(work_description.workflow())?;
        workflow
            .handle_inbound_message(message_id, correlation_id, &mut work_description, payload)
            .await?;
        Ok(())
    }
}
