// Message-level collaborators of the workflows
//
// Interaction details, envelope serialization, fault interpretation and the
// inbound queue handoff.

pub mod envelope;
pub mod errors;
pub mod fault;
pub mod interaction;
pub mod queue;

pub use envelope::{EnvelopeSerializer, SerializedMessage};
pub use errors::{QueueError, QueueResult, SerializationError};
pub use fault::{FaultInterpreter, SpineFaultInterpreter};
pub use interaction::InteractionDetails;
pub use queue::{InMemoryQueue, MessageProperties, QueueAdaptor, QueuedMessage};
