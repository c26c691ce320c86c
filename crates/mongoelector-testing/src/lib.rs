//! Deterministic in-memory [`DocumentStore`] for tests.
//!
//! Mirrors the behavior of the production MongoDB adapter without network
//! I/O: shared `HashMap` state, a controllable store clock, and transport
//! fault injection. The clock progresses with real time but can be skewed or
//! advanced arbitrarily, which lets expiry and clock-paranoia scenarios run
//! without wall sleeps.
//!
//! # Example
//!
//! ```ignore
//! let store = DeterministicDocumentStore::new();
//! store.advance_clock(Duration::from_secs(3)); // expire outstanding leases
//! store.fail_next_ops(2);                      // inject transport faults
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use mongoelector_core::CreateOutcome;
use mongoelector_core::DeleteOutcome;
use mongoelector_core::DocumentStore;
use mongoelector_core::LockDocument;
use mongoelector_core::NodeStatus;
use mongoelector_core::OwnerId;
use mongoelector_core::StoreError;
use mongoelector_core::UpdateOutcome;
use mongoelector_core::local_now_ms;
use tokio::sync::Mutex;

/// `(collection, key)` addressing for lock documents.
type LockKey = (String, String);

/// `(collection, election_key, owner_id)` addressing for status documents.
type StatusKey = (String, String, OwnerId);

/// In-memory deterministic implementation of [`DocumentStore`].
///
/// Cloning shares the underlying state, so several lock or elector instances
/// constructed from clones contend against the same "store", exactly as
/// separate processes would against one MongoDB deployment.
pub struct DeterministicDocumentStore {
    locks: Arc<Mutex<HashMap<LockKey, LockDocument>>>,
    statuses: Arc<Mutex<HashMap<StatusKey, NodeStatus>>>,
    /// Signed skew applied on top of the wall clock.
    clock_offset_ms: Arc<AtomicI64>,
    /// Remaining operations to fail with a transport error.
    fail_ops: Arc<AtomicU32>,
}

impl Clone for DeterministicDocumentStore {
    fn clone(&self) -> Self {
        Self {
            locks: Arc::clone(&self.locks),
            statuses: Arc::clone(&self.statuses),
            clock_offset_ms: Arc::clone(&self.clock_offset_ms),
            fail_ops: Arc::clone(&self.fail_ops),
        }
    }
}

impl Default for DeterministicDocumentStore {
    fn default() -> Self {
        Self {
            locks: Arc::new(Mutex::new(HashMap::new())),
            statuses: Arc::new(Mutex::new(HashMap::new())),
            clock_offset_ms: Arc::new(AtomicI64::new(0)),
            fail_ops: Arc::new(AtomicU32::new(0)),
        }
    }
}

impl DeterministicDocumentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Current store clock: wall clock plus the configured skew.
    pub fn now_ms(&self) -> u64 {
        let skewed = local_now_ms() as i64 + self.clock_offset_ms.load(Ordering::SeqCst);
        skewed.max(0) as u64
    }

    /// Jump the store clock forward. Leases whose expiry falls inside the
    /// jump become vacant immediately.
    pub fn advance_clock(&self, delta: Duration) {
        self.clock_offset_ms.fetch_add(delta.as_millis() as i64, Ordering::SeqCst);
    }

    /// Set an absolute skew between the store clock and the wall clock.
    /// Negative values put the store behind the host.
    pub fn set_clock_offset_ms(&self, offset_ms: i64) {
        self.clock_offset_ms.store(offset_ms, Ordering::SeqCst);
    }

    /// Fail the next `n` store operations with a transport error.
    pub fn fail_next_ops(&self, n: u32) {
        self.fail_ops.store(n, Ordering::SeqCst);
    }

    /// Read a lock document without going through the trait, expired or not.
    pub async fn raw_lock(&self, collection: &str, key: &str) -> Option<LockDocument> {
        self.locks.lock().await.get(&(collection.to_string(), key.to_string())).cloned()
    }

    fn gate(&self, op: &str) -> Result<(), StoreError> {
        let remaining = self.fail_ops.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_ops.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::transport(format!("injected fault during {op}")));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for DeterministicDocumentStore {
    async fn create_if_absent(&self, collection: &str, doc: &LockDocument) -> Result<CreateOutcome, StoreError> {
        self.gate("create_if_absent")?;
        let mut locks = self.locks.lock().await;
        let addr = (collection.to_string(), doc.key.clone());
        if locks.contains_key(&addr) {
            return Ok(CreateOutcome::AlreadyExists);
        }
        locks.insert(addr, doc.clone());
        Ok(CreateOutcome::Created)
    }

    async fn update_if_match(
        &self,
        collection: &str,
        key: &str,
        owner_id: &OwnerId,
        new_expire_ms: u64,
    ) -> Result<UpdateOutcome, StoreError> {
        self.gate("update_if_match")?;
        let now = self.now_ms();
        let mut locks = self.locks.lock().await;
        let addr = (collection.to_string(), key.to_string());
        match locks.get_mut(&addr) {
            Some(doc) if doc.owner_id == *owner_id && !doc.is_expired_at(now) => {
                doc.ts_expire_ms = new_expire_ms;
                Ok(UpdateOutcome::Updated {
                    ts_expire_ms: new_expire_ms,
                })
            }
            _ => Ok(UpdateOutcome::Mismatch),
        }
    }

    async fn delete_if_match(
        &self,
        collection: &str,
        key: &str,
        owner_id: &OwnerId,
    ) -> Result<DeleteOutcome, StoreError> {
        self.gate("delete_if_match")?;
        let mut locks = self.locks.lock().await;
        let addr = (collection.to_string(), key.to_string());
        match locks.get(&addr) {
            Some(doc) if doc.owner_id == *owner_id => {
                locks.remove(&addr);
                Ok(DeleteOutcome::Deleted)
            }
            _ => Ok(DeleteOutcome::Mismatch),
        }
    }

    async fn delete_any(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.gate("delete_any")?;
        self.locks.lock().await.remove(&(collection.to_string(), key.to_string()));
        Ok(())
    }

    async fn find(&self, collection: &str, key: &str) -> Result<Option<LockDocument>, StoreError> {
        self.gate("find")?;
        Ok(self.locks.lock().await.get(&(collection.to_string(), key.to_string())).cloned())
    }

    async fn server_now_ms(&self) -> Result<u64, StoreError> {
        self.gate("server_now_ms")?;
        Ok(self.now_ms())
    }

    async fn upsert_status(&self, collection: &str, status: &NodeStatus) -> Result<(), StoreError> {
        self.gate("upsert_status")?;
        let addr = (collection.to_string(), status.election_key.clone(), status.owner_id);
        self.statuses.lock().await.insert(addr, status.clone());
        Ok(())
    }

    async fn delete_status(
        &self,
        collection: &str,
        election_key: &str,
        owner_id: &OwnerId,
    ) -> Result<(), StoreError> {
        self.gate("delete_status")?;
        let addr = (collection.to_string(), election_key.to_string(), *owner_id);
        self.statuses.lock().await.remove(&addr);
        Ok(())
    }

    async fn list_statuses(&self, collection: &str, election_key: &str) -> Result<Vec<NodeStatus>, StoreError> {
        self.gate("list_statuses")?;
        let statuses = self.statuses.lock().await;
        Ok(statuses
            .iter()
            .filter(|((coll, ekey, _), _)| coll == collection && ekey == election_key)
            .map(|(_, status)| status.clone())
            .collect())
    }

    async fn ensure_indexes(&self, _lock_collection: &str, _status_collection: &str) -> Result<(), StoreError> {
        // Uniqueness is structural in the HashMap representation.
        Ok(())
    }
}
