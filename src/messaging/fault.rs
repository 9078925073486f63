//! # Fault Interpretation
//!
//! Converts an error response from the remote party into the response handed back
//! to the caller. SOAP faults are recognised by a 500 status with an XML body and
//! reported with the fault string they carry.

use crate::constants::responses;
use crate::transmission::types::{find_header, HttpHeaders};
use crate::workflow::WorkflowResponse;
use tracing::warn;

/// Maps a remote error response to a caller-facing response
pub trait FaultInterpreter: Send + Sync {
    fn interpret(&self, status: u16, headers: &HttpHeaders, body: &str) -> WorkflowResponse;
}

/// Interpreter for ebXML SOAP faults returned by the spine
#[derive(Debug, Clone, Copy, Default)]
pub struct SpineFaultInterpreter;

impl SpineFaultInterpreter {
    pub fn new() -> Self {
        Self
    }

    fn is_soap_fault(status: u16, headers: &HttpHeaders) -> bool {
        status == responses::INTERNAL_ERROR
            && find_header(headers, "content-type")
                .map(|value| value.to_ascii_lowercase().contains("text/xml"))
                .unwrap_or(false)
    }
}

/// Text of the first `faultstring` element, namespace prefix ignored
fn extract_fault_string(body: &str) -> Option<&str> {
    let mut rest = body;
    while let Some(open) = rest.find('<') {
        let tag_start = &rest[open + 1..];
        let close = tag_start.find('>')?;
        let tag = &tag_start[..close];
        let local_name = tag
            .split_whitespace()
            .next()
            .map(|name| name.rsplit(':').next().unwrap_or(name))
            .unwrap_or("");
        rest = &tag_start[close + 1..];
        if local_name == "faultstring" {
            let end = rest.find("</")?;
            return Some(rest[..end].trim());
        }
    }
    None
}

impl FaultInterpreter for SpineFaultInterpreter {
    fn interpret(&self, status: u16, headers: &HttpHeaders, body: &str) -> WorkflowResponse {
        if !Self::is_soap_fault(status, headers) {
            return WorkflowResponse::new(status, body);
        }

        let fault = extract_fault_string(body).unwrap_or("");
        warn!(status, fault_string = %fault, "SOAP fault received from spine");

        let message = if fault.is_empty() {
            responses::SPINE_FAULT.to_string()
        } else {
            format!("{} {fault}", responses::SPINE_FAULT)
        };
        WorkflowResponse::new(responses::INTERNAL_ERROR, message)
    }
}
