//! Envelope serialization contract.

use super::errors::SerializationError;
use super::interaction::InteractionDetails;
use crate::transmission::HttpHeaders;
use serde::{Deserialize, Serialize};

/// A message ready to send: the id assigned to it, transport headers, and body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedMessage {
    pub message_id: String,
    pub headers: HttpHeaders,
    pub body: String,
}

/// Turns interaction details into a wire-format message
///
/// Implementations read the envelope fields the workflow populated
/// (`from_party_id`, `to_party_id`, `cpa_id`, `hl7_message`, ...) and fail with
/// [`SerializationError`] if anything required is absent.
pub trait EnvelopeSerializer: Send + Sync {
    fn serialize(&self, details: &InteractionDetails) -> Result<SerializedMessage, SerializationError>;
}
