//! HTTP client for the route lookup service.

use super::errors::{RoutingError, RoutingResult};
use super::types::{EndpointDetails, ReliabilityDetails};
use super::RoutingAndReliability;
use crate::constants::routing as keys;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Looks up endpoint and reliability details for the configured organisation
#[derive(Debug, Clone)]
pub struct RouteLookupClient {
    client: Client,
    base_url: String,
    org_code: String,
}

impl RouteLookupClient {
    pub fn new(
        base_url: impl Into<String>,
        org_code: impl Into<String>,
        timeout: Duration,
    ) -> RoutingResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RoutingError::request(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            org_code: org_code.into(),
        })
    }

    async fn lookup<T: DeserializeOwned>(&self, resource: &str, service_id: &str) -> RoutingResult<T> {
        let url = format!("{}/{resource}", self.base_url);
        debug!(url = %url, service_id = %service_id, "Querying route lookup service");

        let response = self
            .client
            .get(&url)
            .query(&[
                (keys::ORG_CODE_PARAM, self.org_code.as_str()),
                (keys::SERVICE_ID_PARAM, service_id),
            ])
            .send()
            .await
            .map_err(|e| RoutingError::request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(RoutingError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RoutingError::invalid_response(e.to_string()))
    }
}

#[async_trait]
impl RoutingAndReliability for RouteLookupClient {
    async fn get_end_point(&self, service_id: &str) -> RoutingResult<EndpointDetails> {
        let details: EndpointDetails = self.lookup("routing", service_id).await?;
        info!(service_id = %service_id, url = %details.url, "Resolved endpoint");
        Ok(details)
    }

    async fn get_reliability(&self, service_id: &str) -> RoutingResult<ReliabilityDetails> {
        let details: ReliabilityDetails = self.lookup("reliability", service_id).await?;
        info!(
            service_id = %service_id,
            retries = details.retries,
            retry_interval = ?details.retry_interval,
            "Resolved reliability"
        );
        Ok(details)
    }
}
