use super::errors::{StoreError, StoreResult};
use super::work_description::WorkDescriptionRecord;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

/// Key-value persistence for work descriptions, keyed by message id.
///
/// Writes are conditional on the version the caller last saw, which gives
/// work descriptions optimistic concurrency without holding locks across awaits.
///
/// ```rust
/// use mhs_workflow::state_machine::{MemoryStore, OutboundStatus, PersistenceStore, WorkDescription};
/// use mhs_workflow::workflow::WorkflowType;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let store: Arc<dyn PersistenceStore> = Arc::new(MemoryStore::new());
/// let mut work_description = WorkDescription::create(
///     Arc::clone(&store),
///     "message-1",
///     WorkflowType::AsyncExpress,
///     OutboundStatus::Received,
/// );
/// work_description.publish().await.unwrap();
///
/// let stored = store.get("message-1").await.unwrap().unwrap();
/// assert_eq!(stored.version, 1);
/// # });
/// ```
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Fetch the current record for a message, if one exists
    async fn get(&self, message_id: &str) -> StoreResult<Option<WorkDescriptionRecord>>;

    /// Write a record.
    ///
    /// `expected_version` is `None` for a first write, which fails with
    /// [`StoreError::AlreadyExists`] if the key is taken. Otherwise the stored version
    /// must equal `expected_version` or the write fails with
    /// [`StoreError::VersionConflict`].
    async fn put(
        &self,
        record: &WorkDescriptionRecord,
        expected_version: Option<u64>,
    ) -> StoreResult<()>;
}

#[derive(Debug, Clone)]
struct StoredRecord {
    version: u64,
    document: Value,
}

/// In-process store holding records as JSON documents
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, StoredRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl PersistenceStore for MemoryStore {
    async fn get(&self, message_id: &str) -> StoreResult<Option<WorkDescriptionRecord>> {
        match self.records.get(message_id) {
            Some(stored) => Ok(Some(serde_json::from_value(stored.document.clone())?)),
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        record: &WorkDescriptionRecord,
        expected_version: Option<u64>,
    ) -> StoreResult<()> {
        let document = serde_json::to_value(record)?;

        // The entry guard holds the shard lock only for this synchronous block
        match (self.records.entry(record.message_id.clone()), expected_version) {
            (Entry::Vacant(vacant), None) => {
                vacant.insert(StoredRecord {
                    version: record.version,
                    document,
                });
            }
            (Entry::Occupied(_), None) => {
                return Err(StoreError::AlreadyExists {
                    message_id: record.message_id.clone(),
                });
            }
            (Entry::Vacant(_), Some(_)) => {
                return Err(StoreError::not_found(&record.message_id));
            }
            (Entry::Occupied(mut occupied), Some(expected)) => {
                let actual = occupied.get().version;
                if actual != expected {
                    return Err(StoreError::VersionConflict {
                        message_id: record.message_id.clone(),
                        expected,
                        actual,
                    });
                }
                occupied.insert(StoredRecord {
                    version: record.version,
                    document,
                });
            }
        }

        debug!(
            message_id = %record.message_id,
            version = record.version,
            "Persisted work description"
        );
        Ok(())
    }
}
