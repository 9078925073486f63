//! # Messaging Error Types
//!
//! Structured errors for envelope serialization and the inbound queue handoff,
//! using thiserror instead of `Box<dyn Error>` patterns.

use thiserror::Error;

/// Failures building an outbound envelope
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    #[error("Interaction details missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for interaction field {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Envelope serialization failed: {message}")]
    Envelope { message: String },
}

impl SerializationError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn envelope(message: impl Into<String>) -> Self {
        Self::Envelope {
            message: message.into(),
        }
    }
}

/// Failures handing a message to the downstream queue
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Failed to send message to queue {queue_name}: {message}")]
    SendFailed { queue_name: String, message: String },

    #[error("Queue {queue_name} is closed")]
    Closed { queue_name: String },
}

impl QueueError {
    pub fn send_failed(queue_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SendFailed {
            queue_name: queue_name.into(),
            message: message.into(),
        }
    }

    pub fn closed(queue_name: impl Into<String>) -> Self {
        Self::Closed {
            queue_name: queue_name.into(),
        }
    }
}

/// Result type alias for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SerializationError::missing_field("hl7_message");
        assert_eq!(
            err.to_string(),
            "Interaction details missing required field: hl7_message"
        );

        let err = QueueError::send_failed("inbound", "broker unreachable");
        let display_str = format!("{err}");
        assert!(display_str.contains("inbound"));
        assert!(display_str.contains("broker unreachable"));
    }
}
