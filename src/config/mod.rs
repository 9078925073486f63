//! # Gateway Configuration
//!
//! Layered configuration for the message handling workflows. Values come from
//! `config/mhs.toml`, an optional `config/mhs.<environment>.toml` override, and
//! `MHS__`-prefixed environment variables, in that order of precedence.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mhs_workflow::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//!
//! let retries = manager.config().workflow.inbound_queue_max_retries;
//! let policy = manager.config().transmission.retry_policy();
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::resilience::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring mhs.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MhsConfig {
    pub logging: LoggingConfig,
    pub workflow: WorkflowConfig,
    pub transmission: TransmissionConfig,
    pub routing: RoutingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive; the environment's default level when unset
    pub level: Option<String>,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Party key of this gateway, sent as the envelope's from-party id
    pub party_key: String,
    pub inbound_queue_max_retries: u32,
    pub inbound_queue_retry_delay_ms: u64,
    pub persistence_store_max_retries: u32,
    pub persistence_store_retry_delay_ms: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            party_key: String::new(),
            inbound_queue_max_retries: 3,
            inbound_queue_retry_delay_ms: 100,
            persistence_store_max_retries: 3,
            persistence_store_retry_delay_ms: 100,
        }
    }
}

impl WorkflowConfig {
    pub fn inbound_queue_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.inbound_queue_max_retries,
            Duration::from_millis(self.inbound_queue_retry_delay_ms),
        )
    }

    pub fn persistence_store_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.persistence_store_max_retries,
            Duration::from_millis(self.persistence_store_retry_delay_ms),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransmissionConfig {
    /// Total attempts per outbound request, including the first
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 100,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
        }
    }
}

impl TransmissionConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Route lookup service settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
    /// Organisation code sent with every lookup
    pub org_code: String,
    pub timeout_ms: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            org_code: String::new(),
            timeout_ms: 5_000,
        }
    }
}

impl RoutingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl MhsConfig {
    /// Validate configuration for consistency and required fields
    pub fn validate(&self) -> ConfigResult<()> {
        if self.workflow.party_key.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "workflow.party_key",
                "workflow configuration",
            ));
        }

        let attempt_counts = [
            (
                "workflow.inbound_queue_max_retries",
                self.workflow.inbound_queue_max_retries,
            ),
            (
                "workflow.persistence_store_max_retries",
                self.workflow.persistence_store_max_retries,
            ),
            ("transmission.max_retries", self.transmission.max_retries),
        ];
        for (field, value) in attempt_counts {
            if value == 0 {
                return Err(ConfigurationError::invalid_value(
                    field,
                    "0",
                    "at least one attempt is required",
                ));
            }
        }

        if self.routing.base_url.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "routing.base_url",
                "routing configuration",
            ));
        }

        if self.routing.org_code.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "routing.org_code",
                "routing configuration",
            ));
        }

        if self.transmission.request_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "transmission.request_timeout_ms",
                "0",
                "request timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}
