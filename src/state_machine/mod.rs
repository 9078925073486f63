// Work description state tracking
//
// Closed status enums for the outbound and inbound axes, the persisted work
// description that validates transitions between them, and the store contract
// it writes through.

pub mod errors;
pub mod persistence;
pub mod states;
pub mod work_description;

// Re-export main types for convenient access
pub use errors::{StoreError, StoreResult};
pub use persistence::{MemoryStore, PersistenceStore};
pub use states::{InboundStatus, MessageStatus, OutboundStatus};
pub use work_description::{StatusUpdate, WorkDescription, WorkDescriptionRecord};
