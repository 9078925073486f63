//! # Routing and Reliability
//!
//! Resolution of a `service:action` identifier to the endpoint, remote party and
//! agreement an interaction is delivered to, plus the retransmission parameters used
//! by reliable interactions. Lookups are made once per outbound attempt and are never
//! cached here.

pub mod client;
pub mod errors;
pub mod types;

pub use client::RouteLookupClient;
pub use errors::{RoutingError, RoutingResult};
pub use types::{parse_iso8601_duration, EndpointDetails, ReliabilityDetails};

use async_trait::async_trait;

#[async_trait]
pub trait RoutingAndReliability: Send + Sync {
    async fn get_end_point(&self, service_id: &str) -> RoutingResult<EndpointDetails>;

    async fn get_reliability(&self, service_id: &str) -> RoutingResult<ReliabilityDetails>;
}
