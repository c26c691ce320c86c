//! Scoped lock acquisition.

use std::sync::Arc;
use std::sync::Mutex;

use mongoelector_core::DocumentStore;
use mongoelector_core::OwnerId;
use tracing::debug;
use tracing::warn;

use crate::Lease;
use crate::LockError;

/// A held lease that releases itself on every exit path.
///
/// Obtained from [`DistLock::acquire_guard`]. Prefer the explicit
/// [`release`](Self::release) so failures are observable; dropping the guard
/// falls back to a best-effort background delete of the lease document.
/// Either way the originating lock's in-memory record is cleared, so its
/// subsequent `touch` reports loss instead of renewing a ghost.
///
/// [`DistLock::acquire_guard`]: crate::DistLock::acquire_guard
pub struct LockGuard<S: DocumentStore + ?Sized + 'static> {
    store: Arc<S>,
    collection: String,
    key: String,
    lease: Lease,
    lease_slot: Arc<Mutex<Option<Lease>>>,
    released: bool,
}

impl<S: DocumentStore + ?Sized + 'static> LockGuard<S> {
    pub(crate) fn new(
        store: Arc<S>,
        collection: String,
        key: String,
        lease: Lease,
        lease_slot: Arc<Mutex<Option<Lease>>>,
    ) -> Self {
        Self {
            store,
            collection,
            key,
            lease,
            lease_slot,
            released: false,
        }
    }

    /// The lease this guard protects.
    pub fn lease(&self) -> Lease {
        self.lease
    }

    /// The owner fingerprint minted for this acquisition.
    pub fn owner_id(&self) -> OwnerId {
        self.lease.owner_id
    }

    fn clear_slot(&self) {
        let mut slot = self.lease_slot.lock().expect("lease mutex poisoned");
        if slot.map(|l| l.owner_id) == Some(self.lease.owner_id) {
            *slot = None;
        }
    }

    /// Release the lease explicitly.
    ///
    /// A lease already taken over by another contender is a no-op, matching
    /// plain [`DistLock::release`] semantics.
    ///
    /// [`DistLock::release`]: crate::DistLock::release
    pub async fn release(mut self) -> Result<(), LockError> {
        self.released = true;
        self.clear_slot();
        self.store
            .delete_if_match(&self.collection, &self.key, &self.lease.owner_id)
            .await?;
        debug!(key = %self.key, owner = %self.lease.owner_id, "guard released lock");
        Ok(())
    }
}

impl<S: DocumentStore + ?Sized + 'static> Drop for LockGuard<S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.clear_slot();
        let store = Arc::clone(&self.store);
        let collection = std::mem::take(&mut self.collection);
        let key = std::mem::take(&mut self.key);
        let owner_id = self.lease.owner_id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = store.delete_if_match(&collection, &key, &owner_id).await {
                        warn!(key = %key, error = %err, "best-effort guard release failed; lease left to expire");
                    }
                });
            }
            Err(_) => {
                warn!(key = %key, "guard dropped outside a runtime; lease left to expire");
            }
        }
    }
}
