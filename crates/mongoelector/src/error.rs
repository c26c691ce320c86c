//! Error types for locking and election.

use mongoelector_core::StoreError;
use thiserror::Error;

/// Errors surfaced by [`DistLock`] operations.
///
/// Routine lease loss is *not* an error: `touch` reports it through
/// [`TouchOutcome::Lost`] and `release` on a non-owned lease is a no-op.
///
/// [`DistLock`]: crate::DistLock
/// [`TouchOutcome::Lost`]: crate::TouchOutcome::Lost
#[derive(Debug, Error)]
pub enum LockError {
    /// A non-blocking acquire collided with a live lease. Never retried
    /// internally.
    #[error("lock '{key}' is held by {holder}, expires in {expires_in_ms}ms")]
    Exists {
        /// The contended lock key.
        key: String,
        /// Informational description of the current holder.
        holder: String,
        /// Remaining lease time at the store clock, in milliseconds.
        expires_in_ms: u64,
    },

    /// A blocking acquire exhausted its deadline.
    #[error("timeout reached after {waited_ms}ms, lock not acquired")]
    AcquireTimeout {
        /// How long the acquire polled before giving up.
        waited_ms: u64,
    },

    /// The host clock diverges from the store clock beyond the configured
    /// tolerance. Not retried automatically.
    #[error("host clock is {offset_ms}ms away from the store clock (max allowed {max_offset_ms}ms)")]
    ClockOffset {
        /// Observed absolute offset in milliseconds.
        offset_ms: u64,
        /// Configured tolerance in milliseconds.
        max_offset_ms: u64,
    },

    /// Bad construction arguments. Raised at construction, never later.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong with the arguments.
        reason: String,
    },

    /// The store was unreachable or returned malformed data.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors surfaced by [`LeaderElector`] entry points.
///
/// The background worker never raises; these only come from construction and
/// the manual-poll test hook.
///
/// [`LeaderElector`]: crate::LeaderElector
#[derive(Debug, Error)]
pub enum ElectorError {
    /// Bad construction arguments. Raised from `build()`, never later.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong with the arguments.
        reason: String,
    },

    /// `poll()` was called while the background worker owns the poll loop.
    #[error("manual poll rejected while the background worker is running")]
    WorkerRunning,
}
