//! Core abstractions for mongoelector coordination primitives.
//!
//! This crate defines the narrow capability surface over a MongoDB-compatible
//! document store ([`DocumentStore`]), the persisted document shapes
//! ([`LockDocument`], [`NodeStatus`]), and the store-level error type
//! ([`StoreError`]).
//!
//! Higher-level primitives (`DistLock`, `LeaderElector`) live in the
//! `mongoelector` crate and are written purely against these types, so a
//! deployment can swap the production MongoDB adapter for the deterministic
//! in-memory store in tests without touching coordination logic.

mod clock;
mod documents;
mod error;
mod store;

pub use clock::local_now_ms;
pub use documents::ElectorState;
pub use documents::LockDocument;
pub use documents::NodeStatus;
pub use documents::OwnerId;
pub use error::StoreError;
pub use store::CreateOutcome;
pub use store::DeleteOutcome;
pub use store::DocumentStore;
pub use store::UpdateOutcome;

/// Default collection name for lock documents.
pub const DEFAULT_LOCK_COLLECTION: &str = "mongolocker";

/// Default collection name for node status documents.
pub const DEFAULT_STATUS_COLLECTION: &str = "mongoelector_status";
