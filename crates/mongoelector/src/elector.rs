//! Leader election built on [`DistLock`].
//!
//! A [`LeaderElector`] owns one background worker that periodically attempts
//! acquisition or renewal of the election lock, drives the election state
//! machine, fires user callbacks, and publishes per-node status documents.
//!
//! State machine: `Starting → Follower ⇄ Leader → Stopping → Stopped`.
//! `on_leader` fires exactly once per acquisition and `on_leader_loss`
//! exactly once per loss (including the stopping path); `on_loop` fires at
//! the end of every poll cycle. Callbacks run serialized on the worker and
//! the published state always reflects a callback that has already returned.

use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use mongoelector_core::DEFAULT_LOCK_COLLECTION;
use mongoelector_core::DEFAULT_STATUS_COLLECTION;
use mongoelector_core::DocumentStore;
use mongoelector_core::ElectorState;
use mongoelector_core::NodeStatus;
use mongoelector_core::OwnerId;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::DistLock;
use crate::ElectorError;
use crate::LockConfig;
use crate::LockError;
use crate::TouchOutcome;
use crate::lock::local_host;

/// Zero-argument user callback.
type Callback = Arc<dyn Fn() + Send + Sync + 'static>;

#[derive(Default, Clone)]
struct Callbacks {
    on_leader: Option<Callback>,
    on_leader_loss: Option<Callback>,
    on_loop: Option<Callback>,
}

/// Builder for [`LeaderElector`]. Callbacks and configuration are fixed at
/// construction; nothing can be rewired on a running elector.
pub struct ElectorBuilder<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    key: String,
    ttl_secs: u32,
    lock_collection: String,
    status_collection: String,
    report_status: bool,
    app_version: Option<String>,
    callbacks: Callbacks,
}

impl<S: DocumentStore + ?Sized + 'static> ElectorBuilder<S> {
    fn new(store: Arc<S>, key: String) -> Self {
        Self {
            store,
            key,
            ttl_secs: 15,
            lock_collection: DEFAULT_LOCK_COLLECTION.to_string(),
            status_collection: DEFAULT_STATUS_COLLECTION.to_string(),
            report_status: true,
            app_version: None,
            callbacks: Callbacks::default(),
        }
    }

    /// Leadership lease length in seconds (default 15, minimum 2).
    ///
    /// If the leader fails silently, this much time passes before another
    /// node takes over.
    pub fn ttl_secs(mut self, ttl_secs: u32) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Collection holding the election lock (default `mongolocker`).
    pub fn lock_collection(mut self, collection: impl Into<String>) -> Self {
        self.lock_collection = collection.into();
        self
    }

    /// Collection holding node status documents
    /// (default `mongoelector_status`).
    pub fn status_collection(mut self, collection: impl Into<String>) -> Self {
        self.status_collection = collection.into();
        self
    }

    /// Whether to publish a status document every poll (default true).
    pub fn report_status(mut self, report: bool) -> Self {
        self.report_status = report;
        self
    }

    /// Application version string carried in the status document.
    pub fn app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = Some(version.into());
        self
    }

    /// Run every time this instance is elected leader.
    pub fn on_leader(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks.on_leader = Some(Arc::new(callback));
        self
    }

    /// Run every time this instance loses leadership.
    pub fn on_leader_loss(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks.on_leader_loss = Some(Arc::new(callback));
        self
    }

    /// Run at the end of every poll cycle, regardless of state.
    pub fn on_loop(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.callbacks.on_loop = Some(Arc::new(callback));
        self
    }

    /// Validate the configuration and construct the elector.
    pub fn build(self) -> Result<LeaderElector<S>, ElectorError> {
        if self.ttl_secs < 2 {
            return Err(ElectorError::InvalidConfiguration {
                reason: "election ttl must be at least 2 seconds".to_string(),
            });
        }
        let lock = DistLock::new(Arc::clone(&self.store), self.key.clone(), LockConfig {
            collection: self.lock_collection.clone(),
            ttl_secs: self.ttl_secs,
            ..LockConfig::default()
        })
        .map_err(|err| ElectorError::InvalidConfiguration { reason: err.to_string() })?;

        // A single missed poll must never cost the lease; one third of the
        // TTL leaves room for a transient transport hiccup on top.
        let poll_interval = Duration::from_secs(u64::from((self.ttl_secs / 3).max(1)));

        let (state_tx, _state_rx) = watch::channel(ElectorState::Starting);
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);

        Ok(LeaderElector {
            inner: Arc::new(ElectorInner {
                key: self.key,
                status_collection: self.status_collection,
                lock_collection: self.lock_collection,
                report_status: self.report_status,
                app_version: self.app_version,
                poll_interval,
                instance_id: OwnerId::mint(),
                host: local_host(),
                pid: std::process::id(),
                store: self.store,
                lock,
                callbacks: self.callbacks,
                shutdown_tx,
                state_tx,
                was_leader: AtomicBool::new(false),
                poll_gate: tokio::sync::Mutex::new(()),
                cluster: Mutex::new(Vec::new()),
                last_status: Mutex::new(None),
                worker: Mutex::new(None),
                worker_active: AtomicBool::new(false),
            }),
        })
    }
}

struct ElectorInner<S: DocumentStore + ?Sized> {
    key: String,
    status_collection: String,
    lock_collection: String,
    report_status: bool,
    app_version: Option<String>,
    poll_interval: Duration,
    /// Stable identity of this elector instance; the lock mints its own
    /// per-acquisition fingerprints.
    instance_id: OwnerId,
    host: String,
    pid: u32,
    store: Arc<S>,
    lock: DistLock<S>,
    callbacks: Callbacks,
    shutdown_tx: watch::Sender<bool>,
    state_tx: watch::Sender<ElectorState>,
    was_leader: AtomicBool,
    /// Serializes poll cycles against manual polls, `release`, and the
    /// shutdown sequence.
    poll_gate: tokio::sync::Mutex<()>,
    cluster: Mutex<Vec<NodeStatus>>,
    last_status: Mutex<Option<NodeStatus>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_active: AtomicBool,
}

impl<S: DocumentStore + ?Sized + 'static> ElectorInner<S> {
    fn current_state(&self) -> ElectorState {
        *self.state_tx.borrow()
    }

    fn publish_state(&self, next: ElectorState) {
        let prev = self.current_state();
        if prev != next {
            debug!(key = %self.key, from = %prev, to = %next, "election state change");
        }
        self.state_tx.send_replace(next);
    }

    /// Invoke a user callback, containing panics so a throwing callback can
    /// never cause a spurious state transition.
    fn fire(&self, callback: &Option<Callback>, name: &str) {
        if let Some(callback) = callback {
            let callback = Arc::clone(callback);
            if catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
                warn!(key = %self.key, callback = name, "user callback panicked; election state unchanged");
            }
        }
    }

    /// If leadership was held, fire `on_leader_loss` exactly once.
    fn demote_if_leader(&self, publish_follower: bool) {
        if self.was_leader.swap(false, Ordering::SeqCst) {
            self.fire(&self.callbacks.on_leader_loss, "on_leader_loss");
            if publish_follower {
                self.publish_state(ElectorState::Follower);
            }
        }
    }

    fn build_status(&self, heartbeat_ms: u64) -> NodeStatus {
        NodeStatus {
            election_key: self.key.clone(),
            owner_id: self.instance_id,
            host: self.host.clone(),
            pid: self.pid,
            app_version: self.app_version.clone(),
            is_leader: self.was_leader.load(Ordering::SeqCst),
            ts_heartbeat_ms: heartbeat_ms,
            state: self.current_state(),
        }
    }

    /// One poll cycle: lock maintenance, then status publication, then the
    /// loop callback. Shared verbatim by the worker and the manual
    /// [`LeaderElector::poll`] hook.
    async fn poll_cycle(&self) {
        let _gate = self.poll_gate.lock().await;
        if self.current_state() == ElectorState::Stopped {
            return;
        }
        if self.current_state() == ElectorState::Starting {
            self.publish_state(ElectorState::Follower);
        }
        let shutting_down = *self.shutdown_tx.borrow();

        if self.was_leader.load(Ordering::SeqCst) {
            match self.lock.touch().await {
                Ok(TouchOutcome::Renewed { ts_expire_ms }) => {
                    debug!(key = %self.key, expires_ms = ts_expire_ms, "leadership lease renewed");
                }
                Ok(TouchOutcome::Lost) => {
                    warn!(key = %self.key, "leadership lost to another candidate");
                    self.demote_if_leader(true);
                }
                Err(err) => {
                    // One tolerated blip; the lock clears itself on the next
                    // consecutive failure.
                    warn!(key = %self.key, error = %err, "leadership renewal failed, retrying next poll");
                }
            }
        } else if !shutting_down {
            match self.lock.try_acquire().await {
                Ok(lease) => {
                    info!(key = %self.key, owner = %lease.owner_id, "elected leader");
                    self.was_leader.store(true, Ordering::SeqCst);
                    self.fire(&self.callbacks.on_leader, "on_leader");
                    self.publish_state(ElectorState::Leader);
                }
                Err(LockError::Exists { .. }) => {}
                Err(err) => {
                    debug!(key = %self.key, error = %err, "leadership bid failed");
                }
            }
        }

        self.refresh_status().await;
        self.fire(&self.callbacks.on_loop, "on_loop");
    }

    /// Rebuild the node status snapshot and, when reporting is on, publish
    /// it and refresh the cluster view. Failures are logged, never fatal.
    async fn refresh_status(&self) {
        let heartbeat = match self.store.server_now_ms().await {
            Ok(now_ms) => Some(now_ms),
            Err(err) => {
                debug!(key = %self.key, error = %err, "store clock unavailable, heartbeat skipped");
                None
            }
        };
        let previous_heartbeat = self
            .last_status
            .lock()
            .expect("status mutex poisoned")
            .as_ref()
            .map(|s| s.ts_heartbeat_ms)
            .unwrap_or(0);
        let status = self.build_status(heartbeat.unwrap_or(previous_heartbeat));
        *self.last_status.lock().expect("status mutex poisoned") = Some(status.clone());

        if !self.report_status || heartbeat.is_none() {
            return;
        }
        if let Err(err) = self.store.upsert_status(&self.status_collection, &status).await {
            warn!(key = %self.key, error = %err, "status publication failed");
            return;
        }
        match self.store.list_statuses(&self.status_collection, &self.key).await {
            Ok(listing) => *self.cluster.lock().expect("cluster mutex poisoned") = listing,
            Err(err) => warn!(key = %self.key, error = %err, "cluster listing failed"),
        }
    }

    /// Wind down: release held leadership (bounded), drop the status
    /// document, and reach the terminal state.
    async fn shutdown_sequence(&self) {
        let _gate = self.poll_gate.lock().await;
        if self.current_state() == ElectorState::Stopped {
            return;
        }
        self.publish_state(ElectorState::Stopping);

        if self.was_leader.load(Ordering::SeqCst) {
            // Bounded best effort; past the deadline the lease simply
            // expires on its own.
            let deadline = 2 * self.poll_interval;
            match tokio::time::timeout(deadline, self.lock.release(false)).await {
                Ok(Ok(())) => debug!(key = %self.key, "leadership released at stop"),
                Ok(Err(err)) => warn!(key = %self.key, error = %err, "leadership release failed at stop"),
                Err(_) => warn!(key = %self.key, "leadership release timed out, lease left to expire"),
            }
            self.demote_if_leader(false);
        }

        if self.report_status {
            if let Err(err) = self
                .store
                .delete_status(&self.status_collection, &self.key, &self.instance_id)
                .await
            {
                warn!(key = %self.key, error = %err, "status document cleanup failed at stop");
            }
        }
        self.publish_state(ElectorState::Stopped);
    }

    async fn worker_loop(self: Arc<Self>) {
        if let Err(err) = self.store.ensure_indexes(&self.lock_collection, &self.status_collection).await {
            warn!(key = %self.key, error = %err, "index bootstrap failed, continuing");
        }
        self.publish_state(ElectorState::Follower);

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        loop {
            if *shutdown_rx.borrow() {
                break;
            }
            self.poll_cycle().await;
            if *shutdown_rx.borrow() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown_rx.changed() => {}
            }
        }
        self.shutdown_sequence().await;
        self.worker_active.store(false, Ordering::SeqCst);
    }
}

/// Single-leader election coordinator.
///
/// Cheap to clone; clones share the same election instance.
///
/// # Example
///
/// ```ignore
/// let elector = LeaderElector::builder(store, "scheduler")
///     .ttl_secs(15)
///     .on_leader(|| println!("promoted"))
///     .on_leader_loss(|| println!("demoted"))
///     .build()?;
///
/// elector.start().await;
/// // ...
/// elector.stop().await;
/// ```
pub struct LeaderElector<S: DocumentStore + ?Sized + 'static> {
    inner: Arc<ElectorInner<S>>,
}

impl<S: DocumentStore + ?Sized + 'static> std::fmt::Debug for LeaderElector<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaderElector")
            .field("key", &self.inner.key)
            .finish_non_exhaustive()
    }
}

impl<S: DocumentStore + ?Sized + 'static> Clone for LeaderElector<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DocumentStore + ?Sized + 'static> LeaderElector<S> {
    /// Start building an elector for `key` against the given store.
    pub fn builder(store: Arc<S>, key: impl Into<String>) -> ElectorBuilder<S> {
        ElectorBuilder::new(store, key.into())
    }

    /// Launch the background worker and return.
    ///
    /// Idempotent: starting a running elector is a no-op, and a stopped
    /// elector is terminal and will not relaunch.
    pub async fn start(&self) {
        if *self.inner.shutdown_tx.borrow() {
            return;
        }
        if self
            .inner
            .worker_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        let worker = tokio::spawn(Arc::clone(&self.inner).worker_loop());
        *self.inner.worker.lock().expect("worker mutex poisoned") = Some(worker);
    }

    /// Start the worker and only return once the elector has fully stopped,
    /// i.e. after [`stop`](Self::stop) is invoked from another task or a
    /// callback has scheduled one.
    pub async fn run(&self) {
        self.start().await;
        self.wait_stopped().await;
    }

    /// Request termination and block until the worker reaches `Stopped`.
    ///
    /// If leadership is held it is released with a deadline of twice the
    /// poll interval; the status document is removed best-effort. Callbacks
    /// must not call this synchronously and wait on it (that would deadlock
    /// the worker) but may schedule it on another task.
    pub async fn stop(&self) {
        self.inner.shutdown_tx.send_replace(true);
        let worker = self.inner.worker.lock().expect("worker mutex poisoned").take();
        match worker {
            Some(handle) => {
                let _ = handle.await;
            }
            None if self.inner.worker_active.load(Ordering::SeqCst) => {
                // Another stop() owns the join handle; wait it out.
                self.wait_stopped().await;
            }
            None => {
                // Never started, or driven by manual polls: wind down inline.
                self.inner.shutdown_sequence().await;
            }
        }
    }

    /// Execute one poll cycle synchronously, firing the same callbacks and
    /// transitions as the background worker. Intended for tests; rejected
    /// while the worker is running.
    pub async fn poll(&self) -> Result<(), ElectorError> {
        if self.inner.worker_active.load(Ordering::SeqCst) {
            return Err(ElectorError::WorkerRunning);
        }
        self.inner.poll_cycle().await;
        Ok(())
    }

    /// Relinquish leadership without stopping.
    ///
    /// Fires `on_leader_loss` if leadership was held. The elector keeps
    /// running and will typically regain leadership on the next poll unless
    /// a contender wins first.
    pub async fn release(&self) {
        let _gate = self.inner.poll_gate.lock().await;
        if let Err(err) = self.inner.lock.release(false).await {
            warn!(key = %self.inner.key, error = %err, "leadership release failed");
        }
        self.inner.demote_if_leader(true);
    }

    /// Whether this instance currently believes it is the leader.
    ///
    /// Guaranteed to only read `true` after `on_leader` has returned.
    pub fn is_leader(&self) -> bool {
        self.inner.current_state() == ElectorState::Leader
    }

    /// Current state of the election state machine.
    pub fn state(&self) -> ElectorState {
        self.inner.current_state()
    }

    /// Whether the background worker is running.
    pub fn running(&self) -> bool {
        self.inner.worker_active.load(Ordering::SeqCst)
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ElectorState> {
        self.inner.state_tx.subscribe()
    }

    /// Whether a live leadership lease exists, held by anyone.
    pub async fn leader_exists(&self) -> Result<bool, LockError> {
        self.inner.lock.locked().await
    }

    /// Snapshot of this node's status document.
    pub fn node_status(&self) -> NodeStatus {
        if let Some(status) = self.inner.last_status.lock().expect("status mutex poisoned").clone() {
            return status;
        }
        self.inner.build_status(0)
    }

    /// Snapshot of every node contending for this election key, as of the
    /// last completed poll.
    pub fn cluster_detail(&self) -> Vec<NodeStatus> {
        self.inner.cluster.lock().expect("cluster mutex poisoned").clone()
    }

    async fn wait_stopped(&self) {
        let mut rx = self.inner.state_tx.subscribe();
        let _ = rx.wait_for(|state| *state == ElectorState::Stopped).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use mongoelector_testing::DeterministicDocumentStore;

    use super::*;

    fn counting_elector(
        store: Arc<DeterministicDocumentStore>,
        key: &str,
    ) -> (LeaderElector<DeterministicDocumentStore>, Arc<AtomicUsize>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let elected = Arc::new(AtomicUsize::new(0));
        let lost = Arc::new(AtomicUsize::new(0));
        let loops = Arc::new(AtomicUsize::new(0));
        let (e, l, lp) = (Arc::clone(&elected), Arc::clone(&lost), Arc::clone(&loops));
        let elector = LeaderElector::builder(store, key)
            .ttl_secs(4)
            .on_leader(move || {
                e.fetch_add(1, Ordering::SeqCst);
            })
            .on_leader_loss(move || {
                l.fetch_add(1, Ordering::SeqCst);
            })
            .on_loop(move || {
                lp.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();
        (elector, elected, lost, loops)
    }

    #[test]
    fn short_ttl_is_rejected() {
        let store = DeterministicDocumentStore::new();
        let err = LeaderElector::builder(store, "svc").ttl_secs(1).build().unwrap_err();
        assert!(matches!(err, ElectorError::InvalidConfiguration { .. }));
    }

    #[test]
    fn poll_interval_derivation_has_a_floor() {
        // ttl 4 -> 4/3 floors to 1s; ttl 15 -> 5s. Exercised indirectly via
        // build(); the derivation itself lives in the builder.
        let store = DeterministicDocumentStore::new();
        let elector = LeaderElector::builder(Arc::clone(&store), "svc").ttl_secs(4).build().unwrap();
        assert_eq!(elector.inner.poll_interval, Duration::from_secs(1));
        let elector = LeaderElector::builder(store, "svc").ttl_secs(15).build().unwrap();
        assert_eq!(elector.inner.poll_interval, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn manual_poll_elects_and_fires_callbacks_in_order() {
        let store = DeterministicDocumentStore::new();
        let (elector, elected, lost, loops) = counting_elector(store, "svc");

        assert_eq!(elector.state(), ElectorState::Starting);
        assert!(!elector.is_leader());

        elector.poll().await.unwrap();
        assert!(elector.is_leader());
        assert_eq!(elected.load(Ordering::SeqCst), 1);
        assert_eq!(lost.load(Ordering::SeqCst), 0);
        assert_eq!(loops.load(Ordering::SeqCst), 1);

        // Further polls renew without re-firing on_leader.
        elector.poll().await.unwrap();
        assert_eq!(elected.load(Ordering::SeqCst), 1);
        assert_eq!(loops.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn losing_the_lease_demotes_and_fires_loss() {
        let store = DeterministicDocumentStore::new();
        let (elector, elected, lost, _) = counting_elector(Arc::clone(&store), "svc");

        elector.poll().await.unwrap();
        assert!(elector.is_leader());

        // A rival wipes the lock document out from under us.
        store.delete_any("mongolocker", "svc").await.unwrap();

        elector.poll().await.unwrap();
        assert!(!elector.is_leader());
        assert_eq!(elector.state(), ElectorState::Follower);
        assert_eq!(elected.load(Ordering::SeqCst), 1, "demotion and re-election never share a poll");
        assert_eq!(lost.load(Ordering::SeqCst), 1);

        elector.poll().await.unwrap();
        assert!(elector.is_leader());
        assert_eq!(elected.load(Ordering::SeqCst), 2);
        assert_eq!(lost.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn release_relinquishes_but_keeps_running() {
        let store = DeterministicDocumentStore::new();
        let (elector, elected, lost, _) = counting_elector(store, "svc");

        elector.poll().await.unwrap();
        assert!(elector.is_leader());

        elector.release().await;
        assert!(!elector.is_leader());
        assert_eq!(lost.load(Ordering::SeqCst), 1);

        // Regains leadership on the next poll.
        elector.poll().await.unwrap();
        assert!(elector.is_leader());
        assert_eq!(elected.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn stop_without_worker_reaches_terminal_state() {
        let store = DeterministicDocumentStore::new();
        let (elector, _, lost, _) = counting_elector(Arc::clone(&store), "svc");

        elector.poll().await.unwrap();
        assert!(elector.is_leader());

        elector.stop().await;
        assert_eq!(elector.state(), ElectorState::Stopped);
        assert_eq!(lost.load(Ordering::SeqCst), 1);
        // Lease and status document are gone.
        assert!(store.find("mongolocker", "svc").await.unwrap().is_none());
        assert!(store.list_statuses("mongoelector_status", "svc").await.unwrap().is_empty());

        // Stopped is terminal and stop() is idempotent.
        elector.stop().await;
        assert_eq!(elector.state(), ElectorState::Stopped);
        elector.poll().await.unwrap();
        assert_eq!(elector.state(), ElectorState::Stopped);
    }

    #[tokio::test]
    async fn panicking_callback_does_not_alter_state() {
        let store = DeterministicDocumentStore::new();
        let elector = LeaderElector::builder(store, "svc")
            .ttl_secs(4)
            .on_leader(|| panic!("boom"))
            .build()
            .unwrap();

        elector.poll().await.unwrap();
        assert!(elector.is_leader(), "a throwing callback must not block promotion");
    }

    #[tokio::test]
    async fn status_reporting_can_be_disabled() {
        let store = DeterministicDocumentStore::new();
        let elector = LeaderElector::builder(Arc::clone(&store), "svc")
            .ttl_secs(4)
            .report_status(false)
            .build()
            .unwrap();

        elector.poll().await.unwrap();
        assert!(store.list_statuses("mongoelector_status", "svc").await.unwrap().is_empty());
        // The local snapshot still reflects reality.
        assert!(elector.node_status().is_leader);
    }

    #[tokio::test]
    async fn node_status_carries_identity_and_state() {
        let store = DeterministicDocumentStore::new();
        let elector = LeaderElector::builder(store, "svc")
            .ttl_secs(4)
            .app_version("9.9.9")
            .build()
            .unwrap();

        elector.poll().await.unwrap();
        let status = elector.node_status();
        assert_eq!(status.election_key, "svc");
        assert_eq!(status.app_version.as_deref(), Some("9.9.9"));
        assert!(status.is_leader);
        assert_eq!(status.state, ElectorState::Leader);
        assert!(status.ts_heartbeat_ms > 0);
    }
}
