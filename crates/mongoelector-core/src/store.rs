//! The document store capability trait.
//!
//! [`DocumentStore`] is the narrow surface the coordination primitives are
//! written against. Every conditional operation must be atomic at the store
//! (single-document level), and precondition failures are expressed as
//! ordinary outcome values, never as errors.

use async_trait::async_trait;

use crate::LockDocument;
use crate::NodeStatus;
use crate::OwnerId;
use crate::StoreError;

/// Result of a conditional create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The document was installed; the caller now owns the lease.
    Created,
    /// A document with the same key already exists (expired or not).
    AlreadyExists,
}

/// Result of a conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The lease was renewed to the given expiry.
    Updated {
        /// New absolute expiry (store clock, Unix ms).
        ts_expire_ms: u64,
    },
    /// No live document matched the expected owner.
    Mismatch,
}

/// Result of a conditional delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The matching document was removed.
    Deleted,
    /// No document matched the expected owner.
    Mismatch,
}

/// Narrow capability over a MongoDB-compatible document store.
///
/// Implementations hide the concrete driver. Races on `create_if_absent`
/// must collapse to a single winner (in MongoDB this is structural: the lock
/// key is the `_id`). The store's clock is the authority for every expiry
/// comparison; `server_now_ms` reads it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Install a lock document unless one with the same key already exists.
    async fn create_if_absent(&self, collection: &str, doc: &LockDocument) -> Result<CreateOutcome, StoreError>;

    /// Renew a lease: set `ts_expire_ms` on the document for `key`, provided
    /// it is owned by `owner_id` and unexpired at store time.
    ///
    /// The unexpired requirement means an expired lease can never be revived
    /// out from under a contender that is mid-steal.
    async fn update_if_match(
        &self,
        collection: &str,
        key: &str,
        owner_id: &OwnerId,
        new_expire_ms: u64,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Delete the document for `key` if it is owned by `owner_id`.
    async fn delete_if_match(&self, collection: &str, key: &str, owner_id: &OwnerId)
    -> Result<DeleteOutcome, StoreError>;

    /// Delete the document for `key` unconditionally. Administrative
    /// override used by forced acquire/release paths.
    async fn delete_any(&self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// Point-read the raw lock document, expired or not.
    async fn find(&self, collection: &str, key: &str) -> Result<Option<LockDocument>, StoreError>;

    /// Read the store's clock (Unix ms).
    async fn server_now_ms(&self) -> Result<u64, StoreError>;

    /// Create or refresh the status document for `(election_key, owner_id)`.
    ///
    /// Fields unknown to this library must be preserved across refreshes.
    async fn upsert_status(&self, collection: &str, status: &NodeStatus) -> Result<(), StoreError>;

    /// Remove the status document for `(election_key, owner_id)`. Removing
    /// an absent document is not an error.
    async fn delete_status(&self, collection: &str, election_key: &str, owner_id: &OwnerId)
    -> Result<(), StoreError>;

    /// List every status document sharing `election_key`.
    async fn list_statuses(&self, collection: &str, election_key: &str) -> Result<Vec<NodeStatus>, StoreError>;

    /// Install the indexes the collections rely on: server-side garbage
    /// collection of expired locks and the unique `(election_key, owner_id)`
    /// status constraint. Idempotent; in-memory implementations may no-op.
    async fn ensure_indexes(&self, lock_collection: &str, status_collection: &str) -> Result<(), StoreError>;
}

// Blanket implementation for Arc<T>
#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<T> {
    async fn create_if_absent(&self, collection: &str, doc: &LockDocument) -> Result<CreateOutcome, StoreError> {
        (**self).create_if_absent(collection, doc).await
    }

    async fn update_if_match(
        &self,
        collection: &str,
        key: &str,
        owner_id: &OwnerId,
        new_expire_ms: u64,
    ) -> Result<UpdateOutcome, StoreError> {
        (**self).update_if_match(collection, key, owner_id, new_expire_ms).await
    }

    async fn delete_if_match(
        &self,
        collection: &str,
        key: &str,
        owner_id: &OwnerId,
    ) -> Result<DeleteOutcome, StoreError> {
        (**self).delete_if_match(collection, key, owner_id).await
    }

    async fn delete_any(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        (**self).delete_any(collection, key).await
    }

    async fn find(&self, collection: &str, key: &str) -> Result<Option<LockDocument>, StoreError> {
        (**self).find(collection, key).await
    }

    async fn server_now_ms(&self) -> Result<u64, StoreError> {
        (**self).server_now_ms().await
    }

    async fn upsert_status(&self, collection: &str, status: &NodeStatus) -> Result<(), StoreError> {
        (**self).upsert_status(collection, status).await
    }

    async fn delete_status(
        &self,
        collection: &str,
        election_key: &str,
        owner_id: &OwnerId,
    ) -> Result<(), StoreError> {
        (**self).delete_status(collection, election_key, owner_id).await
    }

    async fn list_statuses(&self, collection: &str, election_key: &str) -> Result<Vec<NodeStatus>, StoreError> {
        (**self).list_statuses(collection, election_key).await
    }

    async fn ensure_indexes(&self, lock_collection: &str, status_collection: &str) -> Result<(), StoreError> {
        (**self).ensure_indexes(lock_collection, status_collection).await
    }
}
