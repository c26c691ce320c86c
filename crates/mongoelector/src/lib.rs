//! Distributed locking and leader election backed by a MongoDB-compatible
//! document store.
//!
//! Two layered primitives:
//!
//! - [`DistLock`] - a mutually-exclusive lease over a named key, held by at
//!   most one process in a cluster and expiring automatically if the holder
//!   becomes unresponsive.
//! - [`LeaderElector`] - single-leader election among peers contending for
//!   the same key, built on [`DistLock`], with background renewal,
//!   callback-driven state transitions, and cluster observability.
//!
//! Both are written against the [`DocumentStore`] capability from
//! `mongoelector-core`; plug in `mongoelector-mongodb` for production or
//! `mongoelector-testing` for deterministic tests.
//!
//! ## Lock example
//!
//! ```ignore
//! use mongoelector::{AcquireOptions, DistLock, LockConfig};
//!
//! let lock = DistLock::new(store, "nightly-compaction", LockConfig::default())?;
//! let guard = lock.acquire_guard(AcquireOptions::default()).await?;
//! // Critical section; the lease is released on every exit path.
//! guard.release().await?;
//! ```
//!
//! ## Election example
//!
//! ```ignore
//! use mongoelector::LeaderElector;
//!
//! let elector = LeaderElector::builder(store, "scheduler")
//!     .ttl_secs(15)
//!     .on_leader(|| start_scheduling())
//!     .on_leader_loss(|| pause_scheduling())
//!     .build()?;
//! elector.start().await;
//! ```

mod elector;
mod error;
mod guard;
mod lock;

pub use elector::ElectorBuilder;
pub use elector::LeaderElector;
pub use error::ElectorError;
pub use error::LockError;
pub use guard::LockGuard;
pub use lock::AcquireOptions;
pub use lock::DistLock;
pub use lock::Lease;
pub use lock::LockConfig;
pub use lock::LockStatus;
pub use lock::TouchOutcome;
// Re-export the core vocabulary so embedders need a single dependency.
pub use mongoelector_core::DEFAULT_LOCK_COLLECTION;
pub use mongoelector_core::DEFAULT_STATUS_COLLECTION;
pub use mongoelector_core::DocumentStore;
pub use mongoelector_core::ElectorState;
pub use mongoelector_core::LockDocument;
pub use mongoelector_core::NodeStatus;
pub use mongoelector_core::OwnerId;
pub use mongoelector_core::StoreError;
