//! # Inbound Queue Adaptor
//!
//! Hands inbound payloads to the downstream consumer queue together with their
//! message and correlation ids. [`InMemoryQueue`] backs tests and single-process
//! deployments with an unbounded tokio channel.

use super::errors::{QueueError, QueueResult};
use crate::constants::queue as props;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::debug;

/// Properties attached to every queued message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageProperties {
    pub message_id: String,
    pub correlation_id: String,
}

impl MessageProperties {
    pub fn new(message_id: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            correlation_id: correlation_id.into(),
        }
    }

    /// Wire form, keyed by queue property name
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (props::MESSAGE_ID_PROPERTY.to_string(), self.message_id.clone()),
            (
                props::CORRELATION_ID_PROPERTY.to_string(),
                self.correlation_id.clone(),
            ),
        ])
    }
}

#[async_trait]
pub trait QueueAdaptor: Send + Sync {
    async fn send(&self, payload: &str, properties: &MessageProperties) -> QueueResult<()>;
}

/// A message as delivered to the consumer side of an [`InMemoryQueue`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub payload: String,
    pub properties: BTreeMap<String, String>,
}

/// Channel-backed queue; the receiver half is handed to the consumer
#[derive(Debug, Clone)]
pub struct InMemoryQueue {
    name: String,
    sender: mpsc::UnboundedSender<QueuedMessage>,
}

impl InMemoryQueue {
    pub fn new(name: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<QueuedMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                name: name.into(),
                sender,
            },
            receiver,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl QueueAdaptor for InMemoryQueue {
    async fn send(&self, payload: &str, properties: &MessageProperties) -> QueueResult<()> {
        let message = QueuedMessage {
            payload: payload.to_string(),
            properties: properties.to_map(),
        };
        self.sender
            .send(message)
            .map_err(|_| QueueError::closed(&self.name))?;
        debug!(queue = %self.name, message_id = %properties.message_id, "Queued inbound message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_delivers_payload_and_properties() {
        let (queue, mut receiver) = InMemoryQueue::new("inbound");

        queue
            .send("payload", &MessageProperties::new("msg-1", "conv-1"))
            .await
            .unwrap();

        let message = receiver.recv().await.unwrap();
        assert_eq!(message.payload, "payload");
        assert_eq!(message.properties["message-id"], "msg-1");
        assert_eq!(message.properties["correlation-id"], "conv-1");
        assert_eq!(message.properties.len(), 2);
    }

    #[tokio::test]
    async fn test_send_after_consumer_dropped() {
        let (queue, receiver) = InMemoryQueue::new("inbound");
        drop(receiver);

        let err = queue
            .send("payload", &MessageProperties::new("msg-1", "conv-1"))
            .await
            .unwrap_err();
        assert_eq!(err, QueueError::closed("inbound"));
    }
}
