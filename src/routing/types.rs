//! # Routing Result Types
//!
//! Endpoint and reliability details as returned by the route lookup service. The
//! directory is not consistent about value types, so retries accept a number or a
//! numeric string and the retry interval accepts an ISO 8601 duration
//! (`PT1M30S`) or a number of seconds.

use super::errors::RoutingError;
use crate::constants::routing as keys;
use crate::resilience::RetryPolicy;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Where and to whom an interaction is delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDetails {
    /// First registered endpoint
    #[serde(rename = "nhsMHSEndPoint", deserialize_with = "deserialize_endpoint")]
    pub url: String,
    #[serde(rename = "nhsMHSPartyKey")]
    pub to_party_key: String,
    #[serde(rename = "nhsMhsCPAId")]
    pub cpa_id: String,
}

/// Retransmission parameters for reliable interactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ReliabilityDetails {
    #[serde(rename = "nhsMHSRetries", deserialize_with = "deserialize_retries")]
    pub retries: u32,
    #[serde(rename = "nhsMHSRetryInterval", deserialize_with = "deserialize_interval")]
    pub retry_interval: Duration,
}

impl ReliabilityDetails {
    pub fn new(retries: u32, retry_interval: Duration) -> Self {
        Self {
            retries,
            retry_interval,
        }
    }

    /// One initial attempt plus `retries` retransmissions
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries.saturating_add(1), self.retry_interval)
    }
}

fn deserialize_endpoint<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::String(url) => Ok(url),
        Value::Array(urls) => urls
            .into_iter()
            .find_map(|url| match url {
                Value::String(url) => Some(url),
                _ => None,
            })
            .ok_or_else(|| D::Error::custom(format!("{} contains no endpoint", keys::END_POINT))),
        _ => Err(D::Error::custom(format!(
            "{} must be a string or a list of strings",
            keys::END_POINT
        ))),
    }
}

fn deserialize_retries<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                D::Error::custom(format!("{} must be a non-negative integer", keys::RETRIES))
            }),
        Value::String(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|e| D::Error::custom(format!("Invalid {} value '{s}': {e}", keys::RETRIES))),
        _ => Err(D::Error::custom(format!(
            "{} must be an integer or a numeric string",
            keys::RETRIES
        ))),
    }
}

fn deserialize_interval<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    let value: Value = Deserialize::deserialize(deserializer)?;

    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(seconds_to_duration)
            .ok_or_else(|| {
                D::Error::custom(format!(
                    "{} must be a non-negative number of seconds within range, got {n}",
                    keys::RETRY_INTERVAL
                ))
            }),
        Value::String(s) => parse_iso8601_duration(&s)
            .map_err(|e| D::Error::custom(format!("{}: {e}", keys::RETRY_INTERVAL))),
        _ => Err(D::Error::custom(format!(
            "{} must be an ISO 8601 duration or a number of seconds",
            keys::RETRY_INTERVAL
        ))),
    }
}

/// Parse the time part of an ISO 8601 duration: `PT[nH][nM][n[.n]S]`.
///
/// A bare number is read as seconds.
pub fn parse_iso8601_duration(value: &str) -> Result<Duration, RoutingError> {
    let trimmed = value.trim();
    let invalid = || RoutingError::invalid_response(format!("Invalid retry interval '{value}'"));

    if let Ok(secs) = trimmed.parse::<f64>() {
        return seconds_to_duration(secs).ok_or_else(invalid);
    }

    let upper = trimmed.to_ascii_uppercase();
    let body = upper.strip_prefix("PT").ok_or_else(invalid)?;
    if body.is_empty() {
        return Err(invalid());
    }

    let mut total = 0.0_f64;
    let mut number = String::new();
    let mut last_unit_rank = 0;
    for c in body.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
            continue;
        }
        let (multiplier, rank) = match c {
            'H' => (3600.0, 1),
            'M' => (60.0, 2),
            'S' => (1.0, 3),
            _ => return Err(invalid()),
        };
        if rank <= last_unit_rank || number.is_empty() {
            return Err(invalid());
        }
        let amount: f64 = number.parse().map_err(|_| invalid())?;
        total += amount * multiplier;
        number.clear();
        last_unit_rank = rank;
    }
    if !number.is_empty() {
        return Err(invalid());
    }

    seconds_to_duration(total).ok_or_else(invalid)
}

/// `None` for negative, non-finite or out-of-range values
fn seconds_to_duration(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}
