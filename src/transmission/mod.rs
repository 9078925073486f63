// Outbound transmission to the remote messaging endpoint
//
// A single-call transport contract, its reqwest implementation, and the
// retrying transmission layer the workflows send through.

pub mod http_client;
pub mod outbound;
pub mod types;

pub use http_client::HttpTransportClient;
pub use outbound::{OutboundTransmission, TransmissionError};
pub use types::{HttpHeaders, HttpResponse, TransportClient, TransportError};
