//! # Gateway Constants
//!
//! Wire names, interaction detail keys and caller-visible responses shared by the
//! workflows, the routing client and the transmission layer.

/// Workflow identifiers as they appear in an interaction's `workflow` key
pub mod workflows {
    pub const ASYNC_EXPRESS: &str = "async-express";
    pub const ASYNC_RELIABLE: &str = "async-reliable";
}

/// Keys understood in an interaction details mapping
pub mod interaction {
    pub const WORKFLOW: &str = "workflow";
    pub const SERVICE: &str = "service";
    pub const ACTION: &str = "action";

    // Workflow-specific defaults
    pub const DUPLICATE_ELIMINATION: &str = "duplicate_elimination";
    pub const ACK_REQUESTED: &str = "ack_requested";
    pub const ACK_SOAP_ACTOR: &str = "ack_soap_actor";
    pub const SYNC_REPLY: &str = "sync_reply";

    // Envelope fields added by the workflow before serialization
    pub const MESSAGE_ID: &str = "message_id";
    pub const CONVERSATION_ID: &str = "conversation_id";
    pub const FROM_PARTY_ID: &str = "from_party_id";
    pub const TO_PARTY_ID: &str = "to_party_id";
    pub const CPA_ID: &str = "cpa_id";
    pub const MESSAGE: &str = "hl7_message";

    /// Acknowledgement actor for the receiving message handler
    pub const TO_PARTY_MSH_ACTOR: &str = "urn:oasis:names:tc:ebxml-msg:actor:toPartyMSH";
}

/// Keys returned by the route lookup service
pub mod routing {
    pub const END_POINT: &str = "nhsMHSEndPoint";
    pub const RETRIES: &str = "nhsMHSRetries";
    pub const RETRY_INTERVAL: &str = "nhsMHSRetryInterval";

    pub const ORG_CODE_PARAM: &str = "org-code";
    pub const SERVICE_ID_PARAM: &str = "service-id";
}

/// Inbound queue message property names
pub mod queue {
    pub const MESSAGE_ID_PROPERTY: &str = "message-id";
    pub const CORRELATION_ID_PROPERTY: &str = "correlation-id";
}

/// Status codes and messages returned to outbound callers
pub mod responses {
    /// Transport-level "accepted" code expected from the remote party
    pub const ACCEPTED: u16 = 202;
    pub const INTERNAL_ERROR: u16 = 500;

    pub const ERROR_OBTAINING_URL: &str = "Error obtaining outbound URL";
    pub const ERROR_SERIALISING: &str = "Error serialising outbound message";
    pub const ERROR_MAKING_REQUEST: &str = "Error making outbound request";
    pub const UNEXPECTED_RESPONSE: &str = "Didn't get expected success response from Spine";
    pub const ERROR_CREATING_WORK_DESCRIPTION: &str = "Error creating work description";
    pub const ERROR_UPDATING_WORK_DESCRIPTION: &str = "Error updating work description";
    pub const OUTBOUND_NOT_CONFIGURED: &str = "Workflow is not configured for outbound messages";
    pub const SPINE_FAULT: &str = "Error(s) received from Spine. Contact system administrator.";
}
