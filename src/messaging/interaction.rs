//! # Interaction Details
//!
//! The configuration mapping that describes one outbound interaction: which workflow
//! carries it, the service/action pair used for routing, the workflow's default flags,
//! and the envelope fields the workflow adds before serialization.

use crate::constants::interaction as keys;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered, string-keyed interaction details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionDetails(Map<String, Value>);

impl InteractionDetails {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn workflow(&self) -> Option<&str> {
        self.get_str(keys::WORKFLOW)
    }

    pub fn service(&self) -> Option<&str> {
        self.get_str(keys::SERVICE)
    }

    pub fn action(&self) -> Option<&str> {
        self.get_str(keys::ACTION)
    }

    /// Routing key for the interaction, `service:action`
    pub fn service_id(&self) -> Option<String> {
        Some(format!("{}:{}", self.service()?, self.action()?))
    }

    /// Overlay a workflow's defaults; the workflow's values win over the caller's
    pub fn apply_defaults(&mut self, defaults: &InteractionDetails) {
        for (key, value) in &defaults.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for InteractionDetails {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for InteractionDetails {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
