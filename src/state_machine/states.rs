use serde::{Deserialize, Serialize};
use std::fmt;

/// Outbound delivery states of a message.
///
/// `Received` and `Prepared` are transitional, every other state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutboundStatus {
    /// The gateway accepted the message from the caller
    #[serde(rename = "OUTBOUND_MESSAGE_RECEIVED")]
    Received,
    /// The envelope was serialized and is ready for transmission
    #[serde(rename = "OUTBOUND_MESSAGE_PREPARED")]
    Prepared,
    /// The envelope could not be built
    #[serde(rename = "OUTBOUND_MESSAGE_PREPARATION_FAILED")]
    PreparationFailed,
    /// The remote party accepted the message
    #[serde(rename = "OUTBOUND_MESSAGE_ACKD")]
    Ackd,
    /// The remote party rejected the message or answered unexpectedly
    #[serde(rename = "OUTBOUND_MESSAGE_NACKD")]
    Nackd,
    /// The message could not be delivered to the remote party
    #[serde(rename = "OUTBOUND_MESSAGE_TRANSMISSION_FAILED")]
    TransmissionFailed,
}

impl OutboundStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Received | Self::Prepared)
    }

    /// Position in the outbound lifecycle; transitions only ever move forward
    fn rank(&self) -> u8 {
        match self {
            Self::Received => 0,
            Self::Prepared => 1,
            _ => 2,
        }
    }

    /// Whether a record currently at `from` may move to `self`.
    ///
    /// Writing the current status again is always allowed and is a no-op.
    pub fn can_follow(&self, from: Option<OutboundStatus>) -> bool {
        match from {
            None => true,
            Some(current) if current == *self => true,
            Some(current) if current.is_terminal() => false,
            Some(current) => self.rank() > current.rank(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "OUTBOUND_MESSAGE_RECEIVED",
            Self::Prepared => "OUTBOUND_MESSAGE_PREPARED",
            Self::PreparationFailed => "OUTBOUND_MESSAGE_PREPARATION_FAILED",
            Self::Ackd => "OUTBOUND_MESSAGE_ACKD",
            Self::Nackd => "OUTBOUND_MESSAGE_NACKD",
            Self::TransmissionFailed => "OUTBOUND_MESSAGE_TRANSMISSION_FAILED",
        }
    }
}

impl fmt::Display for OutboundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutboundStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OUTBOUND_MESSAGE_RECEIVED" => Ok(Self::Received),
            "OUTBOUND_MESSAGE_PREPARED" => Ok(Self::Prepared),
            "OUTBOUND_MESSAGE_PREPARATION_FAILED" => Ok(Self::PreparationFailed),
            "OUTBOUND_MESSAGE_ACKD" => Ok(Self::Ackd),
            "OUTBOUND_MESSAGE_NACKD" => Ok(Self::Nackd),
            "OUTBOUND_MESSAGE_TRANSMISSION_FAILED" => Ok(Self::TransmissionFailed),
            _ => Err(format!("Invalid outbound status: {s}")),
        }
    }
}

/// Inbound processing states of a message, independent of its outbound state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InboundStatus {
    /// A response or unsolicited message arrived from the remote party
    #[serde(rename = "INBOUND_RESPONSE_RECEIVED")]
    Received,
    /// The message was handed to the downstream queue
    #[serde(rename = "INBOUND_RESPONSE_SUCCESSFULLY_PROCESSED")]
    SuccessfullyProcessed,
    /// The downstream queue could not take the message
    #[serde(rename = "INBOUND_RESPONSE_FAILED")]
    Failed,
}

impl InboundStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Received)
    }

    /// Whether a record currently at `from` may move to `self`
    pub fn can_follow(&self, from: Option<InboundStatus>) -> bool {
        match from {
            None => true,
            Some(current) if current == *self => true,
            Some(current) => !current.is_terminal() && self.is_terminal(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "INBOUND_RESPONSE_RECEIVED",
            Self::SuccessfullyProcessed => "INBOUND_RESPONSE_SUCCESSFULLY_PROCESSED",
            Self::Failed => "INBOUND_RESPONSE_FAILED",
        }
    }
}

impl fmt::Display for InboundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InboundStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INBOUND_RESPONSE_RECEIVED" => Ok(Self::Received),
            "INBOUND_RESPONSE_SUCCESSFULLY_PROCESSED" => Ok(Self::SuccessfullyProcessed),
            "INBOUND_RESPONSE_FAILED" => Ok(Self::Failed),
            _ => Err(format!("Invalid inbound status: {s}")),
        }
    }
}

/// Either axis of a message's status, as written to logs and audit records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageStatus {
    Outbound(OutboundStatus),
    Inbound(InboundStatus),
}

impl From<OutboundStatus> for MessageStatus {
    fn from(status: OutboundStatus) -> Self {
        Self::Outbound(status)
    }
}

impl From<InboundStatus> for MessageStatus {
    fn from(status: InboundStatus) -> Self {
        Self::Inbound(status)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outbound(status) => status.fmt(f),
            Self::Inbound(status) => status.fmt(f),
        }
    }
}

impl std::str::FromStr for MessageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<OutboundStatus>()
            .map(Self::Outbound)
            .or_else(|_| s.parse::<InboundStatus>().map(Self::Inbound))
            .map_err(|_| format!("Invalid message status: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_terminal_check() {
        assert!(!OutboundStatus::Received.is_terminal());
        assert!(!OutboundStatus::Prepared.is_terminal());
        assert!(OutboundStatus::Ackd.is_terminal());
        assert!(OutboundStatus::Nackd.is_terminal());
        assert!(OutboundStatus::PreparationFailed.is_terminal());
        assert!(OutboundStatus::TransmissionFailed.is_terminal());
    }

    #[test]
    fn test_outbound_transitions_move_forward() {
        use OutboundStatus::*;

        assert!(Received.can_follow(None));
        assert!(Prepared.can_follow(Some(Received)));
        assert!(Ackd.can_follow(Some(Prepared)));
        // Express goes straight from received to an outcome
        assert!(Ackd.can_follow(Some(Received)));
        assert!(TransmissionFailed.can_follow(Some(Received)));
        assert!(Nackd.can_follow(Some(Prepared)));

        assert!(!Received.can_follow(Some(Prepared)));
        assert!(!Prepared.can_follow(Some(Ackd)));
        assert!(!Nackd.can_follow(Some(Ackd)));
        assert!(!TransmissionFailed.can_follow(Some(PreparationFailed)));
    }

    #[test]
    fn test_repeated_status_is_always_allowed() {
        use OutboundStatus::*;

        for status in [Received, Prepared, PreparationFailed, Ackd, Nackd, TransmissionFailed] {
            assert!(status.can_follow(Some(status)));
        }
        for status in [
            InboundStatus::Received,
            InboundStatus::SuccessfullyProcessed,
            InboundStatus::Failed,
        ] {
            assert!(status.can_follow(Some(status)));
        }
    }

    #[test]
    fn test_inbound_transitions() {
        use InboundStatus::*;

        assert!(Received.can_follow(None));
        assert!(SuccessfullyProcessed.can_follow(Some(Received)));
        assert!(Failed.can_follow(Some(Received)));
        assert!(!Received.can_follow(Some(Failed)));
        assert!(!Failed.can_follow(Some(SuccessfullyProcessed)));
    }

    #[test]
    fn test_status_string_conversion() {
        assert_eq!(OutboundStatus::Ackd.to_string(), "OUTBOUND_MESSAGE_ACKD");
        assert_eq!(
            "INBOUND_RESPONSE_FAILED".parse::<MessageStatus>().unwrap(),
            MessageStatus::Inbound(InboundStatus::Failed)
        );
        assert_eq!(
            "OUTBOUND_MESSAGE_PREPARED".parse::<MessageStatus>().unwrap(),
            MessageStatus::Outbound(OutboundStatus::Prepared)
        );
        assert!("OUTBOUND_MESSAGE_LOST".parse::<MessageStatus>().is_err());
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&OutboundStatus::TransmissionFailed).unwrap();
        assert_eq!(json, "\"OUTBOUND_MESSAGE_TRANSMISSION_FAILED\"");

        let parsed: MessageStatus =
            serde_json::from_str("\"INBOUND_RESPONSE_SUCCESSFULLY_PROCESSED\"").unwrap();
        assert_eq!(
            parsed,
            MessageStatus::Inbound(InboundStatus::SuccessfullyProcessed)
        );
    }
}
