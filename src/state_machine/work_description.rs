//! # Work Description
//!
//! The persisted delivery lifecycle of one message. A work description tracks the
//! outbound and inbound status axes separately, validates every transition at the
//! setter, and writes itself back with an optimistic version check on each change.
//!
//! Exactly one record exists per message id: [`WorkDescription::publish`] performs the
//! first write and fails if the key is already taken.

use super::errors::{StoreError, StoreResult};
use super::persistence::PersistenceStore;
use super::states::{InboundStatus, OutboundStatus};
use crate::resilience::{RetryError, RetryPolicy};
use crate::workflow::WorkflowType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The stored form of a work description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDescriptionRecord {
    pub message_id: String,
    pub workflow: WorkflowType,
    pub outbound_status: Option<OutboundStatus>,
    pub inbound_status: Option<InboundStatus>,
    /// Incremented on every successful write
    pub version: u64,
    pub created_timestamp: DateTime<Utc>,
    pub last_modified_timestamp: DateTime<Utc>,
}

impl WorkDescriptionRecord {
    pub fn new(
        message_id: impl Into<String>,
        workflow: WorkflowType,
        outbound_status: Option<OutboundStatus>,
    ) -> Self {
        let now = Utc::now();
        Self {
            message_id: message_id.into(),
            workflow,
            outbound_status,
            inbound_status: None,
            version: 0,
            created_timestamp: now,
            last_modified_timestamp: now,
        }
    }
}

/// A status change for either axis of a work description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    Outbound(OutboundStatus),
    Inbound(InboundStatus),
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outbound(status) => write!(f, "outbound {status}"),
            Self::Inbound(status) => write!(f, "inbound {status}"),
        }
    }
}

/// A message's work description bound to the store it persists to
pub struct WorkDescription {
    store: Arc<dyn PersistenceStore>,
    record: WorkDescriptionRecord,
    /// Version last written to or read from the store; `None` until published
    persisted_version: Option<u64>,
}

impl fmt::Debug for WorkDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkDescription")
            .field("record", &self.record)
            .field("persisted_version", &self.persisted_version)
            .finish()
    }
}

impl WorkDescription {
    /// Create a new, unpublished work description
    pub fn create(
        store: Arc<dyn PersistenceStore>,
        message_id: impl Into<String>,
        workflow: WorkflowType,
        initial_status: OutboundStatus,
    ) -> Self {
        Self {
            store,
            record: WorkDescriptionRecord::new(message_id, workflow, Some(initial_status)),
            persisted_version: None,
        }
    }

    /// Load the stored work description for a message
    pub async fn load(store: Arc<dyn PersistenceStore>, message_id: &str) -> StoreResult<Self> {
        let record = store
            .get(message_id)
            .await?
            .ok_or_else(|| StoreError::not_found(message_id))?;
        let persisted_version = Some(record.version);
        Ok(Self {
            store,
            record,
            persisted_version,
        })
    }

    pub fn message_id(&self) -> &str {
        &self.record.message_id
    }

    pub fn workflow(&self) -> WorkflowType {
        self.record.workflow
    }

    pub fn outbound_status(&self) -> Option<OutboundStatus> {
        self.record.outbound_status
    }

    pub fn inbound_status(&self) -> Option<InboundStatus> {
        self.record.inbound_status
    }

    pub fn version(&self) -> u64 {
        self.record.version
    }

    pub fn record(&self) -> &WorkDescriptionRecord {
        &self.record
    }

    pub fn is_published(&self) -> bool {
        self.persisted_version.is_some()
    }

    /// First write of a newly created work description
    pub async fn publish(&mut self) -> StoreResult<()> {
        if self.is_published() {
            return Err(StoreError::AlreadyExists {
                message_id: self.record.message_id.clone(),
            });
        }
        self.write(|_| {}).await?;
        info!(
            message_id = %self.record.message_id,
            workflow = %self.record.workflow,
            "Published work description"
        );
        Ok(())
    }

    /// [`publish`](Self::publish), repeated while the store reports a transient failure
    pub async fn publish_with_retries(&mut self, policy: &RetryPolicy) -> StoreResult<()> {
        let mut retry = policy.start("publish work description");
        loop {
            let err = match self.publish().await {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            let retriable = matches!(err, StoreError::Unavailable { .. });
            if let Err(gave_up) = retry.record_failure(err, retriable).await {
                return Err(self.retries_exceeded(gave_up));
            }
        }
    }

    /// Replace the in-memory record with the stored one
    pub async fn refresh(&mut self) -> StoreResult<()> {
        let record = self
            .store
            .get(&self.record.message_id)
            .await?
            .ok_or_else(|| StoreError::not_found(&self.record.message_id))?;
        debug!(
            message_id = %record.message_id,
            local_version = self.record.version,
            stored_version = record.version,
            "Refreshed work description from store"
        );
        self.persisted_version = Some(record.version);
        self.record = record;
        Ok(())
    }

    /// Move the outbound axis to `status` and persist the change.
    ///
    /// Writing the current status again does nothing.
    pub async fn set_outbound_status(&mut self, status: OutboundStatus) -> StoreResult<()> {
        let current = self.record.outbound_status;
        if current == Some(status) && self.is_published() {
            return Ok(());
        }
        if !status.can_follow(current) {
            return Err(StoreError::InvalidTransition {
                message_id: self.record.message_id.clone(),
                direction: "outbound",
                from: describe(current),
                to: status.to_string(),
            });
        }
        self.write(|record| record.outbound_status = Some(status))
            .await?;
        debug!(message_id = %self.record.message_id, status = %status, "Outbound status updated");
        Ok(())
    }

    /// Move the inbound axis to `status` and persist the change.
    ///
    /// Writing the current status again does nothing.
    pub async fn set_inbound_status(&mut self, status: InboundStatus) -> StoreResult<()> {
        let current = self.record.inbound_status;
        if current == Some(status) && self.is_published() {
            return Ok(());
        }
        if !status.can_follow(current) {
            return Err(StoreError::InvalidTransition {
                message_id: self.record.message_id.clone(),
                direction: "inbound",
                from: describe(current),
                to: status.to_string(),
            });
        }
        self.write(|record| record.inbound_status = Some(status))
            .await?;
        debug!(message_id = %self.record.message_id, status = %status, "Inbound status updated");
        Ok(())
    }

    /// Apply a status update, refreshing from the store and trying again after a
    /// version conflict or an unavailable store, up to the policy's attempt budget.
    pub async fn update_status_with_retries(
        &mut self,
        update: StatusUpdate,
        policy: &RetryPolicy,
    ) -> StoreResult<()> {
        let mut retry = policy.start(format!("update {update} status"));
        loop {
            let result = match update {
                StatusUpdate::Outbound(status) => self.set_outbound_status(status).await,
                StatusUpdate::Inbound(status) => self.set_inbound_status(status).await,
            };
            let err = match result {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };

            let conflict = matches!(err, StoreError::VersionConflict { .. });
            let retriable = err.is_retriable();
            if let Err(gave_up) = retry.record_failure(err, retriable).await {
                return Err(self.retries_exceeded(gave_up));
            }
            if conflict {
                warn!(
                    message_id = %self.record.message_id,
                    update = %update,
                    "Work description out of date, refreshing before retry"
                );
                self.refresh().await?;
            }
        }
    }

    async fn write(&mut self, change: impl FnOnce(&mut WorkDescriptionRecord)) -> StoreResult<()> {
        let mut next = self.record.clone();
        change(&mut next);
        next.version = self.record.version + 1;
        next.last_modified_timestamp = Utc::now();

        self.store.put(&next, self.persisted_version).await?;

        self.persisted_version = Some(next.version);
        self.record = next;
        Ok(())
    }

    fn retries_exceeded(&self, gave_up: RetryError<StoreError>) -> StoreError {
        match gave_up {
            RetryError::NonRetriable(err) => err,
            RetryError::Exhausted { attempts, source } => StoreError::RetriesExceeded {
                message_id: self.record.message_id.clone(),
                attempts,
                last_error: Box::new(source),
            },
        }
    }
}

fn describe<S: fmt::Display>(status: Option<S>) -> String {
    status.map_or_else(|| "NONE".to_string(), |s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::persistence::MemoryStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    fn memory_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    async fn published(store: Arc<MemoryStore>) -> WorkDescription {
        let mut wd = WorkDescription::create(
            store,
            "msg-1",
            WorkflowType::AsyncReliable,
            OutboundStatus::Received,
        );
        wd.publish().await.unwrap();
        wd
    }

    #[tokio::test]
    async fn test_publish_writes_first_version() {
        let store = memory_store();
        let wd = published(store.clone()).await;

        assert_eq!(wd.version(), 1);
        let stored = store.get("msg-1").await.unwrap().unwrap();
        assert_eq!(stored.outbound_status, Some(OutboundStatus::Received));
        assert_eq!(stored.inbound_status, None);
        assert_eq!(stored.workflow, WorkflowType::AsyncReliable);
    }

    #[tokio::test]
    async fn test_publish_twice_fails() {
        let store = memory_store();
        let mut wd = published(store.clone()).await;
        assert!(matches!(
            wd.publish().await,
            Err(StoreError::AlreadyExists { .. })
        ));

        let mut duplicate = WorkDescription::create(
            store,
            "msg-1",
            WorkflowType::AsyncExpress,
            OutboundStatus::Received,
        );
        assert!(matches!(
            duplicate.publish().await,
            Err(StoreError::AlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_setting_same_status_twice_is_idempotent() {
        let store = memory_store();
        let mut wd = published(store.clone()).await;

        wd.set_outbound_status(OutboundStatus::Ackd).await.unwrap();
        let once = store.get("msg-1").await.unwrap().unwrap();

        wd.set_outbound_status(OutboundStatus::Ackd).await.unwrap();
        let twice = store.get("msg-1").await.unwrap().unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.version, 2);
    }

    #[tokio::test]
    async fn test_backwards_transition_is_rejected() {
        let store = memory_store();
        let mut wd = published(store.clone()).await;
        wd.set_outbound_status(OutboundStatus::Prepared).await.unwrap();

        let err = wd
            .set_outbound_status(OutboundStatus::Received)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));
        assert_eq!(wd.outbound_status(), Some(OutboundStatus::Prepared));
        assert_eq!(
            store.get("msg-1").await.unwrap().unwrap().outbound_status,
            Some(OutboundStatus::Prepared)
        );
    }

    #[tokio::test]
    async fn test_inbound_status_is_independent_of_outbound() {
        let store = memory_store();
        let mut wd = published(store.clone()).await;

        wd.set_inbound_status(InboundStatus::Received).await.unwrap();
        wd.set_inbound_status(InboundStatus::SuccessfullyProcessed)
            .await
            .unwrap();

        let stored = store.get("msg-1").await.unwrap().unwrap();
        assert_eq!(stored.outbound_status, Some(OutboundStatus::Received));
        assert_eq!(
            stored.inbound_status,
            Some(InboundStatus::SuccessfullyProcessed)
        );
    }

    #[tokio::test]
    async fn test_stale_copy_gets_version_conflict() {
        let store = memory_store();
        let mut first = published(store.clone()).await;
        let mut second = WorkDescription::load(store.clone(), "msg-1").await.unwrap();

        first
            .set_inbound_status(InboundStatus::Received)
            .await
            .unwrap();
        let err = second
            .set_outbound_status(OutboundStatus::Prepared)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_with_retries_refreshes_after_conflict() {
        let store = memory_store();
        let mut first = published(store.clone()).await;
        let mut second = WorkDescription::load(store.clone(), "msg-1").await.unwrap();
        first
            .set_inbound_status(InboundStatus::Received)
            .await
            .unwrap();

        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        second
            .update_status_with_retries(StatusUpdate::Outbound(OutboundStatus::Ackd), &policy)
            .await
            .unwrap();

        let stored = store.get("msg-1").await.unwrap().unwrap();
        assert_eq!(stored.outbound_status, Some(OutboundStatus::Ackd));
        assert_eq!(stored.inbound_status, Some(InboundStatus::Received));
        assert_eq!(stored.version, 3);
    }

    /// Store whose writes fail while `failing` is set
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: Mutex<bool>,
    }

    #[async_trait]
    impl PersistenceStore for FlakyStore {
        async fn get(&self, message_id: &str) -> StoreResult<Option<WorkDescriptionRecord>> {
            self.inner.get(message_id).await
        }

        async fn put(
            &self,
            record: &WorkDescriptionRecord,
            expected_version: Option<u64>,
        ) -> StoreResult<()> {
            if *self.failing.lock() {
                return Err(StoreError::unavailable("store offline"));
            }
            self.inner.put(record, expected_version).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_with_retries_gives_up_after_budget() {
        let store = Arc::new(FlakyStore::default());
        let mut wd = WorkDescription::create(
            store.clone(),
            "msg-1",
            WorkflowType::AsyncExpress,
            OutboundStatus::Received,
        );
        wd.publish().await.unwrap();
        *store.failing.lock() = true;

        let policy = RetryPolicy::new(2, Duration::from_millis(10));
        let err = wd
            .update_status_with_retries(StatusUpdate::Outbound(OutboundStatus::Ackd), &policy)
            .await
            .unwrap_err();

        match err {
            StoreError::RetriesExceeded {
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last_error, StoreError::Unavailable { .. }));
            }
            other => panic!("expected RetriesExceeded, got {other:?}"),
        }
        assert_eq!(wd.outbound_status(), Some(OutboundStatus::Received));
    }

    #[tokio::test]
    async fn test_load_missing_record() {
        let store = memory_store();
        let err = WorkDescription::load(store, "missing").await.unwrap_err();
        assert_eq!(err, StoreError::not_found("missing"));
    }
}
