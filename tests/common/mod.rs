//! Mock collaborators for workflow integration tests
//!
//! Every mock records its calls behind `Arc<Mutex<State>>` and replays configured
//! outcomes, so tests can assert both what the workflow did and what it was told.

#![allow(dead_code)]

pub mod strategies;

use async_trait::async_trait;
use mhs_workflow::audit::MemoryAuditSink;
use mhs_workflow::messaging::{
    EnvelopeSerializer, FaultInterpreter, InteractionDetails, MessageProperties, QueueAdaptor,
    QueueError, SerializationError, SerializedMessage,
};
use mhs_workflow::resilience::RetryPolicy;
use mhs_workflow::routing::{EndpointDetails, ReliabilityDetails, RoutingAndReliability, RoutingError};
use mhs_workflow::state_machine::{
    MemoryStore, PersistenceStore, StoreError, StoreResult, WorkDescriptionRecord,
};
use mhs_workflow::transmission::{
    HttpHeaders, HttpResponse, OutboundTransmission, TransportClient, TransportError,
};
use mhs_workflow::workflow::{
    AsynchronousExpressWorkflow, AsynchronousReliableWorkflow, InboundComponents,
    OutboundComponents, WorkflowResponse,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const MESSAGE_ID: &str = "message-id-1";
pub const CORRELATION_ID: &str = "correlation-id-1";
pub const PAYLOAD: &str = "<hl7:MCCI_IN010000UK13/>";
pub const SERVICE: &str = "urn:nhs:names:services:psis";
pub const ACTION: &str = "MCCI_IN010000UK13";
pub const SERVICE_ID: &str = "urn:nhs:names:services:psis:MCCI_IN010000UK13";
pub const PARTY_KEY: &str = "A91424-9199121";

pub const URL: &str = "https://spine.example/reliablemessaging/reliablerequest";
pub const TO_PARTY_KEY: &str = "YES-0000806";
pub const CPA_ID: &str = "S20001A000182";
pub const SERIALIZED_BODY: &str = "<soap:Envelope>serialized</soap:Envelope>";

pub const TRANSMISSION_ATTEMPTS: u32 = 3;
pub const TRANSMISSION_DELAY: Duration = Duration::from_millis(250);
pub const QUEUE_ATTEMPTS: u32 = 3;
pub const QUEUE_DELAY: Duration = Duration::from_millis(100);
pub const STORE_ATTEMPTS: u32 = 3;
pub const STORE_DELAY: Duration = Duration::from_millis(10);

pub fn serialized_headers() -> HttpHeaders {
    HttpHeaders::from([
        ("SOAPAction".to_string(), format!("{SERVICE}/{ACTION}")),
        ("Content-Type".to_string(), "multipart/related".to_string()),
    ])
}

pub fn interaction_details(workflow: &str) -> InteractionDetails {
    InteractionDetails::new()
        .with("workflow", workflow)
        .with("service", SERVICE)
        .with("action", ACTION)
}

pub fn endpoint() -> EndpointDetails {
    EndpointDetails {
        url: URL.to_string(),
        to_party_key: TO_PARTY_KEY.to_string(),
        cpa_id: CPA_ID.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MockRoutingState {
    pub endpoint_calls: Vec<String>,
    pub reliability_calls: Vec<String>,
    pub endpoint: Result<EndpointDetails, RoutingError>,
    pub reliability: Result<ReliabilityDetails, RoutingError>,
}

#[derive(Clone)]
pub struct MockRouting {
    state: Arc<Mutex<MockRoutingState>>,
}

impl MockRouting {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockRoutingState {
                endpoint_calls: Vec::new(),
                reliability_calls: Vec::new(),
                endpoint: Ok(endpoint()),
                reliability: Ok(ReliabilityDetails::new(
                    TRANSMISSION_ATTEMPTS - 1,
                    TRANSMISSION_DELAY,
                )),
            })),
        }
    }

    pub fn fail_endpoint(&self, error: RoutingError) {
        self.state.lock().unwrap().endpoint = Err(error);
    }

    pub fn fail_reliability(&self, error: RoutingError) {
        self.state.lock().unwrap().reliability = Err(error);
    }

    pub fn set_reliability(&self, reliability: ReliabilityDetails) {
        self.state.lock().unwrap().reliability = Ok(reliability);
    }

    pub fn get_state(&self) -> MockRoutingState {
        self.state.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoutingAndReliability for MockRouting {
    async fn get_end_point(&self, service_id: &str) -> Result<EndpointDetails, RoutingError> {
        let mut state = self.state.lock().unwrap();
        state.endpoint_calls.push(service_id.to_string());
        state.endpoint.clone()
    }

    async fn get_reliability(&self, service_id: &str) -> Result<ReliabilityDetails, RoutingError> {
        let mut state = self.state.lock().unwrap();
        state.reliability_calls.push(service_id.to_string());
        state.reliability.clone()
    }
}

// ---------------------------------------------------------------------------
// Serializer
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct MockSerializerState {
    pub calls: Vec<InteractionDetails>,
    pub error: Option<SerializationError>,
}

#[derive(Clone, Default)]
pub struct MockSerializer {
    state: Arc<Mutex<MockSerializerState>>,
}

impl MockSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, error: SerializationError) {
        self.state.lock().unwrap().error = Some(error);
    }

    pub fn get_state(&self) -> MockSerializerState {
        self.state.lock().unwrap().clone()
    }
}

impl EnvelopeSerializer for MockSerializer {
    fn serialize(&self, details: &InteractionDetails) -> Result<SerializedMessage, SerializationError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(details.clone());
        if let Some(error) = &state.error {
            return Err(error.clone());
        }
        Ok(SerializedMessage {
            message_id: details.get_str("message_id").unwrap_or_default().to_string(),
            headers: serialized_headers(),
            body: SERIALIZED_BODY.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct MockTransportState {
    pub calls: Vec<(String, HttpHeaders, String)>,
    pub outcomes: VecDeque<Result<HttpResponse, TransportError>>,
}

#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockTransportState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next call
    pub fn respond(&self, outcome: Result<HttpResponse, TransportError>) -> &Self {
        self.state.lock().unwrap().outcomes.push_back(outcome);
        self
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn get_state(&self) -> MockTransportState {
        self.state.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransportClient for MockTransport {
    async fn send(
        &self,
        url: &str,
        headers: &HttpHeaders,
        body: &str,
    ) -> Result<HttpResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push((url.to_string(), headers.clone(), body.to_string()));
        state
            .outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(202)))
    }
}

// ---------------------------------------------------------------------------
// Fault interpreter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MockFaultInterpreterState {
    pub calls: Vec<(u16, HttpHeaders, String)>,
    pub response: WorkflowResponse,
}

#[derive(Clone)]
pub struct MockFaultInterpreter {
    state: Arc<Mutex<MockFaultInterpreterState>>,
}

impl MockFaultInterpreter {
    pub fn new(response: WorkflowResponse) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockFaultInterpreterState {
                calls: Vec::new(),
                response,
            })),
        }
    }

    pub fn get_state(&self) -> MockFaultInterpreterState {
        self.state.lock().unwrap().clone()
    }
}

impl FaultInterpreter for MockFaultInterpreter {
    fn interpret(&self, status: u16, headers: &HttpHeaders, body: &str) -> WorkflowResponse {
        let mut state = self.state.lock().unwrap();
        state.calls.push((status, headers.clone(), body.to_string()));
        state.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct MockQueueState {
    pub sends: Vec<(String, MessageProperties)>,
    /// Number of upcoming sends that fail
    pub failures_remaining: usize,
}

#[derive(Clone, Default)]
pub struct MockQueue {
    state: Arc<Mutex<MockQueueState>>,
}

impl MockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, count: usize) {
        self.state.lock().unwrap().failures_remaining = count;
    }

    pub fn send_count(&self) -> usize {
        self.state.lock().unwrap().sends.len()
    }

    pub fn get_state(&self) -> MockQueueState {
        self.state.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueueAdaptor for MockQueue {
    async fn send(&self, payload: &str, properties: &MessageProperties) -> Result<(), QueueError> {
        let mut state = self.state.lock().unwrap();
        state.sends.push((payload.to_string(), properties.clone()));
        if state.failures_remaining > 0 {
            state.failures_remaining -= 1;
            let attempt = state.sends.len();
            return Err(QueueError::send_failed("inbound", format!("broker unavailable #{attempt}")));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Memory store whose writes can be made to fail
#[derive(Clone, Default)]
pub struct FailingStore {
    inner: Arc<MemoryStore>,
    failing_puts: Arc<Mutex<usize>>,
    put_calls: Arc<Mutex<usize>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` writes with `Unavailable`
    pub fn fail_next_puts(&self, count: usize) {
        *self.failing_puts.lock().unwrap() = count;
    }

    pub fn put_calls(&self) -> usize {
        *self.put_calls.lock().unwrap()
    }
}

#[async_trait]
impl PersistenceStore for FailingStore {
    async fn get(&self, message_id: &str) -> StoreResult<Option<WorkDescriptionRecord>> {
        self.inner.get(message_id).await
    }

    async fn put(&self, record: &WorkDescriptionRecord, expected_version: Option<u64>) -> StoreResult<()> {
        *self.put_calls.lock().unwrap() += 1;
        {
            let mut failing = self.failing_puts.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(StoreError::unavailable("store offline"));
            }
        }
        self.inner.put(record, expected_version).await
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// All mocks plus workflow construction
pub struct TestHarness {
    pub routing: MockRouting,
    pub serializer: MockSerializer,
    pub transport: MockTransport,
    pub fault_interpreter: MockFaultInterpreter,
    pub queue: MockQueue,
    pub audit: Arc<MemoryAuditSink>,
    pub store: FailingStore,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            routing: MockRouting::new(),
            serializer: MockSerializer::new(),
            transport: MockTransport::new(),
            fault_interpreter: MockFaultInterpreter::new(WorkflowResponse::new(
                400,
                "interpreted fault",
            )),
            queue: MockQueue::new(),
            audit: Arc::new(MemoryAuditSink::new()),
            store: FailingStore::new(),
        }
    }

    pub fn store(&self) -> Arc<dyn PersistenceStore> {
        Arc::new(self.store.clone())
    }

    pub fn outbound_components(&self) -> OutboundComponents {
        OutboundComponents {
            party_key: PARTY_KEY.to_string(),
            transmission: OutboundTransmission::new(
                Arc::new(self.transport.clone()),
                RetryPolicy::new(TRANSMISSION_ATTEMPTS, TRANSMISSION_DELAY),
            ),
            serializer: Arc::new(self.serializer.clone()),
            routing: Arc::new(self.routing.clone()),
            fault_interpreter: Arc::new(self.fault_interpreter.clone()),
            audit: self.audit.clone(),
        }
    }

    pub fn inbound_components(&self) -> InboundComponents {
        InboundComponents {
            queue: Arc::new(self.queue.clone()),
            queue_retry_policy: RetryPolicy::new(QUEUE_ATTEMPTS, QUEUE_DELAY),
        }
    }

    pub fn store_retry_policy() -> RetryPolicy {
        RetryPolicy::new(STORE_ATTEMPTS, STORE_DELAY)
    }

    pub fn express(&self) -> AsynchronousExpressWorkflow {
        AsynchronousExpressWorkflow::new(
            self.store(),
            Self::store_retry_policy(),
            Some(self.outbound_components()),
            Some(self.inbound_components()),
        )
    }

    pub fn reliable(&self) -> AsynchronousReliableWorkflow {
        AsynchronousReliableWorkflow::new(
            self.store(),
            Self::store_retry_policy(),
            Some(self.outbound_components()),
            Some(self.inbound_components()),
        )
    }
}
