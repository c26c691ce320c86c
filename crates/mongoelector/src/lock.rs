//! Distributed lock over a named key.
//!
//! A [`DistLock`] installs a lease document in the store and renews or
//! releases it conditionally on its owner fingerprint. Expiry comparisons
//! always use the store clock; the local clock only feeds the optional
//! clock-offset sanity check.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use mongoelector_core::CreateOutcome;
use mongoelector_core::DEFAULT_LOCK_COLLECTION;
use mongoelector_core::DeleteOutcome;
use mongoelector_core::DocumentStore;
use mongoelector_core::LockDocument;
use mongoelector_core::OwnerId;
use mongoelector_core::UpdateOutcome;
use mongoelector_core::local_now_ms;
use tracing::debug;
use tracing::warn;

use crate::LockError;
use crate::guard::LockGuard;

/// Configuration for a [`DistLock`].
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Collection holding lock documents.
    pub collection: String,
    /// Lease length in seconds. Must be at least 1.
    pub ttl_secs: u32,
    /// Verify the host clock against the store clock before acquiring.
    pub time_paranoid: bool,
    /// Maximum tolerated host/store clock offset for the paranoia check.
    pub max_offset: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_LOCK_COLLECTION.to_string(),
            ttl_secs: 600,
            time_paranoid: true,
            max_offset: Duration::from_millis(500),
        }
    }
}

/// Options for a single acquire attempt.
#[derive(Debug, Clone)]
pub struct AcquireOptions {
    /// Poll until acquired (default) instead of failing on first collision.
    pub blocking: bool,
    /// Give up after this long. Only meaningful with `blocking`.
    pub timeout: Option<Duration>,
    /// Delay between acquire attempts.
    pub step: Duration,
    /// Forcibly take ownership, deleting any existing lease first.
    pub force: bool,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self {
            blocking: true,
            timeout: None,
            step: Duration::from_millis(250),
            force: false,
        }
    }
}

/// The in-memory record of a held lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lease {
    /// Fingerprint minted for this acquisition.
    pub owner_id: OwnerId,
    /// When the lease was created (store clock, Unix ms).
    pub ts_created_ms: u64,
    /// Current absolute expiry (store clock, Unix ms).
    pub ts_expire_ms: u64,
}

/// Result of a lease renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    /// The lease was extended to the given expiry.
    Renewed {
        /// New absolute expiry (store clock, Unix ms).
        ts_expire_ms: u64,
    },
    /// The lease is no longer ours. A normal outcome, not an error.
    Lost,
}

/// Introspection snapshot of a lock instance, see [`DistLock::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockStatus {
    /// The lock key.
    pub key: String,
    /// Declared lease length in seconds.
    pub ttl_secs: u32,
    /// This instance's hostname.
    pub host: String,
    /// This instance's process id.
    pub pid: u32,
    /// Fingerprint of our current lease, if we believe we hold one.
    pub owner_id: Option<OwnerId>,
    /// Whether the store confirms we own the live lease.
    pub lock_owned: bool,
    /// Lease creation time; only populated while owned, to avoid reporting
    /// another holder's details across a race.
    pub lock_created_ms: Option<u64>,
    /// Lease expiry; only populated while owned.
    pub lock_expires_ms: Option<u64>,
    /// Store clock at the time of the snapshot (Unix ms).
    pub timestamp_ms: u64,
}

/// Distributed lock object backed by a document store.
///
/// Intended to mimic a standard library mutex as far as is reasonable for a
/// networked lease. Used by `LeaderElector`, but perfectly happy standalone.
///
/// The instance is stateless between calls except for the record of its
/// last-owned lease; a fresh owner fingerprint is minted on every successful
/// acquisition so a stale document can never be mistaken for ours.
pub struct DistLock<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    key: String,
    config: LockConfig,
    host: String,
    pid: u32,
    lease: Arc<Mutex<Option<Lease>>>,
    /// Consecutive transport failures observed by `touch`.
    touch_failures: AtomicU32,
}

impl<S: DocumentStore + ?Sized> std::fmt::Debug for DistLock<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistLock")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Best-effort hostname for informational document fields.
pub(crate) fn local_host() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown-host".to_string())
}

impl<S: DocumentStore + ?Sized> DistLock<S> {
    /// Create a new lock instance for `key`.
    ///
    /// Rejects a zero TTL or an empty key with
    /// [`LockError::InvalidConfiguration`]; nothing else fails at
    /// construction time.
    pub fn new(store: Arc<S>, key: impl Into<String>, config: LockConfig) -> Result<Self, LockError> {
        let key = key.into();
        if key.is_empty() {
            return Err(LockError::InvalidConfiguration {
                reason: "lock key must be non-empty".to_string(),
            });
        }
        if config.ttl_secs < 1 {
            return Err(LockError::InvalidConfiguration {
                reason: "ttl must be at least 1 second".to_string(),
            });
        }
        Ok(Self {
            store,
            key,
            config,
            host: local_host(),
            pid: std::process::id(),
            lease: Arc::new(Mutex::new(None)),
            touch_failures: AtomicU32::new(0),
        })
    }

    /// The lock key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Declared lease length in seconds.
    pub fn ttl_secs(&self) -> u32 {
        self.config.ttl_secs
    }

    /// The lease we believe we hold, if any. Purely the in-memory record;
    /// for an authoritative answer use [`owned`](Self::owned).
    pub fn lease(&self) -> Option<Lease> {
        *self.lease.lock().expect("lease mutex poisoned")
    }

    fn ttl_ms(&self) -> u64 {
        u64::from(self.config.ttl_secs) * 1_000
    }

    fn set_lease(&self, lease: Lease) {
        *self.lease.lock().expect("lease mutex poisoned") = Some(lease);
    }

    fn clear_lease_if(&self, owner_id: OwnerId) {
        let mut slot = self.lease.lock().expect("lease mutex poisoned");
        if slot.map(|l| l.owner_id) == Some(owner_id) {
            *slot = None;
        }
    }

    /// Attempt to acquire the lock.
    ///
    /// Blocks and retries indefinitely by default; see [`AcquireOptions`]
    /// for non-blocking, deadline, and forced variants. Each retry mints a
    /// fresh owner fingerprint. An existing lease whose expiry has passed at
    /// the store clock is stolen.
    pub async fn acquire(&self, options: AcquireOptions) -> Result<Lease, LockError> {
        if !options.blocking && options.timeout.is_some() {
            return Err(LockError::InvalidConfiguration {
                reason: "timeout requires a blocking acquire".to_string(),
            });
        }
        if self.config.time_paranoid {
            self.verify_clock_offset().await?;
        }
        let started = Instant::now();
        loop {
            if options.force {
                self.store.delete_any(&self.config.collection, &self.key).await?;
            }
            if let Some(lease) = self.try_install().await? {
                return Ok(lease);
            }

            let existing = self.store.find(&self.config.collection, &self.key).await?;
            let now_ms = self.store.server_now_ms().await?;
            if let Some(existing_doc) = &existing {
                if existing_doc.is_expired_at(now_ms) {
                    let stolen = self
                        .store
                        .delete_if_match(&self.config.collection, &self.key, &existing_doc.owner_id)
                        .await?;
                    if stolen == DeleteOutcome::Deleted {
                        debug!(key = %self.key, previous_owner = %existing_doc.owner_id, "stole expired lease");
                        if let Some(lease) = self.try_install().await? {
                            return Ok(lease);
                        }
                    }
                    // Lost the steal race; keep polling.
                }
            }

            if !options.blocking {
                let (holder, expires_in_ms) = match &existing {
                    Some(doc) => (format!("{} (pid {})", doc.host, doc.pid), doc.remaining_ms(now_ms)),
                    None => ("unknown".to_string(), 0),
                };
                return Err(LockError::Exists {
                    key: self.key.clone(),
                    holder,
                    expires_in_ms,
                });
            }
            if let Some(timeout) = options.timeout {
                if started.elapsed() >= timeout {
                    return Err(LockError::AcquireTimeout {
                        waited_ms: started.elapsed().as_millis() as u64,
                    });
                }
            }
            tokio::time::sleep(options.step).await;
        }
    }

    /// Non-blocking acquire: fail with [`LockError::Exists`] on collision.
    pub async fn try_acquire(&self) -> Result<Lease, LockError> {
        self.acquire(AcquireOptions {
            blocking: false,
            ..AcquireOptions::default()
        })
        .await
    }

    /// Acquire and wrap the lease in a [`LockGuard`] that releases on every
    /// exit path, including drop.
    pub async fn acquire_guard(&self, options: AcquireOptions) -> Result<LockGuard<S>, LockError>
    where
        S: 'static,
    {
        let lease = self.acquire(options).await?;
        Ok(LockGuard::new(
            Arc::clone(&self.store),
            self.config.collection.clone(),
            self.key.clone(),
            lease,
            Arc::clone(&self.lease),
        ))
    }

    /// Release the lock if owned by this instance.
    ///
    /// Releasing a lease we do not hold is a no-op unless `force` is set, in
    /// which case the document is deleted regardless of owner
    /// (administrative override). The in-memory record is cleared either way.
    pub async fn release(&self, force: bool) -> Result<(), LockError> {
        let current = self.lease.lock().expect("lease mutex poisoned").take();
        self.touch_failures.store(0, Ordering::SeqCst);
        match current {
            Some(lease) => {
                let outcome = self
                    .store
                    .delete_if_match(&self.config.collection, &self.key, &lease.owner_id)
                    .await?;
                if outcome == DeleteOutcome::Mismatch && force {
                    self.store.delete_any(&self.config.collection, &self.key).await?;
                }
            }
            None if force => {
                self.store.delete_any(&self.config.collection, &self.key).await?;
            }
            None => {}
        }
        Ok(())
    }

    /// Renew the lease expiry to `server_now + ttl`.
    ///
    /// Returns [`TouchOutcome::Lost`] without raising when the lease is no
    /// longer ours, and immediately (without store interaction) when this
    /// instance never acquired the lock. A single transport failure keeps
    /// the lease and surfaces the error; a second consecutive one clears the
    /// record and reports loss, so a lone network blip cannot flap a leader.
    pub async fn touch(&self) -> Result<TouchOutcome, LockError> {
        let Some(current) = self.lease() else {
            return Ok(TouchOutcome::Lost);
        };
        let renewed = self.renew(&current).await;
        match renewed {
            Ok(UpdateOutcome::Updated { ts_expire_ms }) => {
                self.touch_failures.store(0, Ordering::SeqCst);
                let mut slot = self.lease.lock().expect("lease mutex poisoned");
                if let Some(lease) = slot.as_mut() {
                    if lease.owner_id == current.owner_id {
                        lease.ts_expire_ms = ts_expire_ms;
                    }
                }
                Ok(TouchOutcome::Renewed { ts_expire_ms })
            }
            Ok(UpdateOutcome::Mismatch) => {
                self.touch_failures.store(0, Ordering::SeqCst);
                self.clear_lease_if(current.owner_id);
                Ok(TouchOutcome::Lost)
            }
            Err(err) if err.is_transport() => {
                let failures = self.touch_failures.fetch_add(1, Ordering::SeqCst) + 1;
                if failures >= 2 {
                    warn!(key = %self.key, error = %err, "second consecutive touch transport failure, lease treated as lost");
                    self.touch_failures.store(0, Ordering::SeqCst);
                    self.clear_lease_if(current.owner_id);
                    Ok(TouchOutcome::Lost)
                } else {
                    Err(LockError::Store(err))
                }
            }
            Err(err) => Err(LockError::Store(err)),
        }
    }

    async fn renew(&self, current: &Lease) -> Result<UpdateOutcome, mongoelector_core::StoreError> {
        let now_ms = self.store.server_now_ms().await?;
        self.store
            .update_if_match(&self.config.collection, &self.key, &current.owner_id, now_ms + self.ttl_ms())
            .await
    }

    /// Whether a live (unexpired) lease exists for the key, held by anyone.
    pub async fn locked(&self) -> Result<bool, LockError> {
        let Some(doc) = self.store.find(&self.config.collection, &self.key).await? else {
            return Ok(false);
        };
        let now_ms = self.store.server_now_ms().await?;
        Ok(!doc.is_expired_at(now_ms))
    }

    /// Whether the store confirms this instance owns the live lease.
    ///
    /// Always re-reads the store; the in-memory fingerprint is only the
    /// comparator.
    pub async fn owned(&self) -> Result<bool, LockError> {
        let Some(mine) = self.lease() else {
            return Ok(false);
        };
        let Some(doc) = self.store.find(&self.config.collection, &self.key).await? else {
            return Ok(false);
        };
        let now_ms = self.store.server_now_ms().await?;
        Ok(doc.owner_id == mine.owner_id && !doc.is_expired_at(now_ms))
    }

    /// The raw lock document, regardless of owner or expiry.
    pub async fn get_current(&self) -> Result<Option<LockDocument>, LockError> {
        Ok(self.store.find(&self.config.collection, &self.key).await?)
    }

    /// Introspection snapshot of this instance and its lease.
    pub async fn status(&self) -> Result<LockStatus, LockError> {
        let current = self.get_current().await?;
        let now_ms = self.store.server_now_ms().await?;
        let mine = self.lease();
        let owned = match (&current, &mine) {
            (Some(doc), Some(lease)) => doc.owner_id == lease.owner_id && !doc.is_expired_at(now_ms),
            _ => false,
        };
        let (created, expires) = match &current {
            Some(doc) if owned => (Some(doc.ts_created_ms), Some(doc.ts_expire_ms)),
            _ => (None, None),
        };
        Ok(LockStatus {
            key: self.key.clone(),
            ttl_secs: self.config.ttl_secs,
            host: self.host.clone(),
            pid: self.pid,
            owner_id: mine.map(|l| l.owner_id),
            lock_owned: owned,
            lock_created_ms: created,
            lock_expires_ms: expires,
            timestamp_ms: now_ms,
        })
    }

    async fn verify_clock_offset(&self) -> Result<(), LockError> {
        let server_ms = self.store.server_now_ms().await?;
        let local_ms = local_now_ms();
        let offset_ms = server_ms.abs_diff(local_ms);
        let max_offset_ms = self.config.max_offset.as_millis() as u64;
        if offset_ms > max_offset_ms {
            return Err(LockError::ClockOffset {
                offset_ms,
                max_offset_ms,
            });
        }
        Ok(())
    }

    /// One create attempt with a freshly minted fingerprint.
    async fn try_install(&self) -> Result<Option<Lease>, LockError> {
        let now_ms = self.store.server_now_ms().await?;
        let owner_id = OwnerId::mint();
        let doc = LockDocument {
            key: self.key.clone(),
            owner_id,
            host: self.host.clone(),
            pid: self.pid,
            ts_created_ms: now_ms,
            ts_expire_ms: now_ms + self.ttl_ms(),
            ttl_secs: self.config.ttl_secs,
        };
        match self.store.create_if_absent(&self.config.collection, &doc).await? {
            CreateOutcome::Created => {
                let lease = Lease {
                    owner_id,
                    ts_created_ms: doc.ts_created_ms,
                    ts_expire_ms: doc.ts_expire_ms,
                };
                self.set_lease(lease);
                self.touch_failures.store(0, Ordering::SeqCst);
                debug!(key = %self.key, owner = %owner_id, expires_ms = lease.ts_expire_ms, "lock acquired");
                Ok(Some(lease))
            }
            CreateOutcome::AlreadyExists => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mongoelector_testing::DeterministicDocumentStore;

    use super::*;

    fn test_config(ttl_secs: u32) -> LockConfig {
        LockConfig {
            collection: "locks".to_string(),
            ttl_secs,
            time_paranoid: false,
            ..LockConfig::default()
        }
    }

    fn lock(store: &std::sync::Arc<DeterministicDocumentStore>, key: &str, ttl_secs: u32) -> DistLock<DeterministicDocumentStore> {
        DistLock::new(std::sync::Arc::clone(store), key, test_config(ttl_secs)).unwrap()
    }

    #[test]
    fn zero_ttl_is_rejected_at_construction() {
        let store = DeterministicDocumentStore::new();
        let err = DistLock::new(store, "k", test_config(0)).unwrap_err();
        assert!(matches!(err, LockError::InvalidConfiguration { .. }));
    }

    #[test]
    fn empty_key_is_rejected_at_construction() {
        let store = DeterministicDocumentStore::new();
        let err = DistLock::new(store, "", test_config(5)).unwrap_err();
        assert!(matches!(err, LockError::InvalidConfiguration { .. }));
    }

    #[tokio::test]
    async fn non_blocking_acquire_with_timeout_is_rejected() {
        let store = DeterministicDocumentStore::new();
        let l = lock(&store, "k", 5);
        let err = l
            .acquire(AcquireOptions {
                blocking: false,
                timeout: Some(Duration::from_secs(1)),
                ..AcquireOptions::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LockError::InvalidConfiguration { .. }));
    }

    #[tokio::test]
    async fn acquire_release_cycle() {
        let store = DeterministicDocumentStore::new();
        let l = lock(&store, "k", 5);

        assert!(!l.locked().await.unwrap());
        l.acquire(AcquireOptions::default()).await.unwrap();
        assert!(l.locked().await.unwrap());
        assert!(l.owned().await.unwrap());

        l.release(false).await.unwrap();
        assert!(!l.locked().await.unwrap());
        assert!(!l.owned().await.unwrap());

        // Idempotent resource reuse.
        l.acquire(AcquireOptions::default()).await.unwrap();
        l.release(false).await.unwrap();
        assert!(!l.locked().await.unwrap());
    }

    #[tokio::test]
    async fn owner_fingerprint_changes_across_acquisitions() {
        let store = DeterministicDocumentStore::new();
        let l = lock(&store, "k", 5);

        let first = l.acquire(AcquireOptions::default()).await.unwrap();
        l.release(false).await.unwrap();
        let second = l.acquire(AcquireOptions::default()).await.unwrap();
        assert_ne!(first.owner_id, second.owner_id);
    }

    #[tokio::test]
    async fn contention_yields_exists_with_holder_details() {
        let store = DeterministicDocumentStore::new();
        let a = lock(&store, "k", 30);
        let b = lock(&store, "k", 30);

        a.acquire(AcquireOptions::default()).await.unwrap();
        let err = b.try_acquire().await.unwrap_err();
        match err {
            LockError::Exists { key, expires_in_ms, .. } => {
                assert_eq!(key, "k");
                assert!(expires_in_ms > 0);
            }
            other => panic!("expected Exists, got {other:?}"),
        }
        assert!(!b.owned().await.unwrap());
        assert!(a.owned().await.unwrap());
    }

    #[tokio::test]
    async fn blocking_acquire_times_out() {
        let store = DeterministicDocumentStore::new();
        let a = lock(&store, "k", 30);
        let b = lock(&store, "k", 30);

        a.acquire(AcquireOptions::default()).await.unwrap();
        let err = b
            .acquire(AcquireOptions {
                timeout: Some(Duration::from_millis(300)),
                step: Duration::from_millis(50),
                ..AcquireOptions::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LockError::AcquireTimeout { .. }));
    }

    #[tokio::test]
    async fn blocking_acquire_succeeds_after_release() {
        let store = DeterministicDocumentStore::new();
        let a = std::sync::Arc::new(lock(&store, "k", 30));
        let b = lock(&store, "k", 30);

        a.acquire(AcquireOptions::default()).await.unwrap();

        let releaser = std::sync::Arc::clone(&a);
        let release_task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            releaser.release(false).await.unwrap();
        });

        b.acquire(AcquireOptions {
            timeout: Some(Duration::from_secs(5)),
            step: Duration::from_millis(25),
            ..AcquireOptions::default()
        })
        .await
        .unwrap();
        assert!(b.owned().await.unwrap());
        release_task.await.unwrap();
    }

    #[tokio::test]
    async fn expired_lease_is_stolen() {
        let store = DeterministicDocumentStore::new();
        let a = lock(&store, "k", 2);
        let b = lock(&store, "k", 2);

        a.acquire(AcquireOptions::default()).await.unwrap();
        store.advance_clock(Duration::from_secs(3));

        b.try_acquire().await.unwrap();
        assert!(b.owned().await.unwrap());
        assert_eq!(a.touch().await.unwrap(), TouchOutcome::Lost);
        assert!(!a.owned().await.unwrap());
    }

    #[tokio::test]
    async fn force_acquire_takes_over_a_live_lease() {
        let store = DeterministicDocumentStore::new();
        let a = lock(&store, "k", 30);
        let b = lock(&store, "k", 30);

        a.acquire(AcquireOptions::default()).await.unwrap();
        assert!(a.owned().await.unwrap());

        b.acquire(AcquireOptions {
            force: true,
            ..AcquireOptions::default()
        })
        .await
        .unwrap();
        assert!(b.owned().await.unwrap());
        assert!(!a.owned().await.unwrap());
    }

    #[tokio::test]
    async fn force_release_clears_a_foreign_lease() {
        let store = DeterministicDocumentStore::new();
        let a = lock(&store, "k", 30);
        let b = lock(&store, "k", 30);

        a.acquire(AcquireOptions::default()).await.unwrap();

        // Plain release by a non-owner is a no-op.
        b.release(false).await.unwrap();
        assert!(a.owned().await.unwrap());

        b.release(true).await.unwrap();
        assert!(!a.locked().await.unwrap());
        assert!(!a.owned().await.unwrap());
    }

    #[tokio::test]
    async fn touch_extends_expiry() {
        let store = DeterministicDocumentStore::new();
        let l = lock(&store, "k", 5);

        let lease = l.acquire(AcquireOptions::default()).await.unwrap();
        store.advance_clock(Duration::from_secs(2));
        match l.touch().await.unwrap() {
            TouchOutcome::Renewed { ts_expire_ms } => {
                assert!(ts_expire_ms > lease.ts_expire_ms);
            }
            TouchOutcome::Lost => panic!("lease should have been renewed"),
        }
    }

    #[tokio::test]
    async fn touch_without_acquisition_reports_loss_without_store_io() {
        let store = DeterministicDocumentStore::new();
        let l = lock(&store, "k", 5);
        // Every store op would fail; touch must not issue any.
        store.fail_next_ops(u32::MAX);
        assert_eq!(l.touch().await.unwrap(), TouchOutcome::Lost);
    }

    #[tokio::test]
    async fn single_touch_transport_failure_keeps_the_lease() {
        let store = DeterministicDocumentStore::new();
        let l = lock(&store, "k", 30);
        l.acquire(AcquireOptions::default()).await.unwrap();

        store.fail_next_ops(1);
        let err = l.touch().await.unwrap_err();
        assert!(matches!(err, LockError::Store(_)));
        assert!(l.lease().is_some(), "one blip must not clear the lease");

        // Recovery resets the failure streak.
        assert!(matches!(l.touch().await.unwrap(), TouchOutcome::Renewed { .. }));
    }

    #[tokio::test]
    async fn two_consecutive_touch_transport_failures_surface_as_loss() {
        let store = DeterministicDocumentStore::new();
        let l = lock(&store, "k", 30);
        l.acquire(AcquireOptions::default()).await.unwrap();

        store.fail_next_ops(2);
        assert!(l.touch().await.is_err());
        assert_eq!(l.touch().await.unwrap(), TouchOutcome::Lost);
        assert!(l.lease().is_none());
    }

    #[tokio::test]
    async fn clock_paranoia_rejects_skew_and_can_be_disabled() {
        let store = DeterministicDocumentStore::new();
        store.set_clock_offset_ms(1_000);

        let paranoid = DistLock::new(
            std::sync::Arc::clone(&store),
            "k",
            LockConfig {
                collection: "locks".to_string(),
                ttl_secs: 5,
                time_paranoid: true,
                max_offset: Duration::from_millis(100),
            },
        )
        .unwrap();
        let err = paranoid.acquire(AcquireOptions::default()).await.unwrap_err();
        assert!(matches!(err, LockError::ClockOffset { .. }));

        let relaxed = lock(&store, "k", 5);
        relaxed.acquire(AcquireOptions::default()).await.unwrap();
        assert!(relaxed.owned().await.unwrap());
    }

    #[tokio::test]
    async fn status_hides_lease_details_unless_owned() {
        let store = DeterministicDocumentStore::new();
        let a = lock(&store, "k", 30);
        let b = lock(&store, "k", 30);

        a.acquire(AcquireOptions::default()).await.unwrap();

        let theirs = b.status().await.unwrap();
        assert!(!theirs.lock_owned);
        assert_eq!(theirs.lock_created_ms, None);
        assert_eq!(theirs.lock_expires_ms, None);

        let ours = a.status().await.unwrap();
        assert!(ours.lock_owned);
        assert!(ours.lock_created_ms.is_some());
        assert!(ours.lock_expires_ms.is_some());
        assert_eq!(ours.key, "k");
    }

    #[tokio::test]
    async fn get_current_returns_raw_document_even_when_expired() {
        let store = DeterministicDocumentStore::new();
        let l = lock(&store, "k", 1);
        l.acquire(AcquireOptions::default()).await.unwrap();
        store.advance_clock(Duration::from_secs(5));

        assert!(!l.locked().await.unwrap());
        assert!(l.get_current().await.unwrap().is_some(), "raw read ignores expiry");
    }
}
