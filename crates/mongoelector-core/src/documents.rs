//! Persisted document shapes.
//!
//! Two document kinds live in the store: [`LockDocument`] (one per lock key)
//! and [`NodeStatus`] (one per elector instance). Timestamps are store-clock
//! Unix milliseconds; the store's notion of time is authoritative for every
//! expiry comparison.

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Opaque 128-bit owner fingerprint.
///
/// A fresh id is minted for every successful lock acquisition, so a stale
/// document left behind by an earlier incarnation of the same process can
/// never be mistaken for the current lease. Elector instances also mint one
/// id at construction as their stable identity in status documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// Mint a fresh random owner id.
    pub fn mint() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OwnerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse::<Uuid>()?))
    }
}

/// Lock document stored under a unique key.
///
/// At most one document per `key` exists at any store-observed instant; a
/// document whose `ts_expire_ms` is at or before the store clock is
/// semantically vacant and may be replaced by any contender.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockDocument {
    /// Lock name, unique within the collection.
    pub key: String,
    /// Fingerprint of the current owner, regenerated on each acquisition.
    pub owner_id: OwnerId,
    /// Informational hostname of the owner.
    pub host: String,
    /// Informational process id of the owner.
    pub pid: u32,
    /// When the lease was created (store clock, Unix ms).
    pub ts_created_ms: u64,
    /// Absolute expiry (store clock, Unix ms).
    pub ts_expire_ms: u64,
    /// Declared lease length in seconds, for introspection.
    pub ttl_secs: u32,
}

impl LockDocument {
    /// Check whether the lease is expired at the given store time.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        self.ts_expire_ms <= now_ms
    }

    /// Remaining lease time at the given store time (0 if expired).
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.ts_expire_ms.saturating_sub(now_ms)
    }
}

/// Election state of a single elector instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectorState {
    /// Constructed, worker not yet launched.
    Starting,
    /// Contending for leadership each poll.
    Follower,
    /// Holding the leadership lease.
    Leader,
    /// Termination requested, winding down.
    Stopping,
    /// Terminal.
    Stopped,
}

impl ElectorState {
    /// String form, matching the persisted representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Follower => "follower",
            Self::Leader => "leader",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for ElectorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-node status document, keyed by `(election_key, owner_id)`.
///
/// Created on elector start, refreshed every poll cycle, deleted on clean
/// stop. A process that dies abandons its document; consumers treat stale
/// heartbeats as dead nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeStatus {
    /// Name shared by all electors contending for the same leadership.
    pub election_key: String,
    /// Stable identity of this elector instance.
    pub owner_id: OwnerId,
    /// Informational hostname.
    pub host: String,
    /// Informational process id.
    pub pid: u32,
    /// Application version string, if the embedding app supplied one.
    pub app_version: Option<String>,
    /// Last observed leadership state of this node.
    pub is_leader: bool,
    /// Last heartbeat (store clock, Unix ms).
    pub ts_heartbeat_ms: u64,
    /// Election state at the last heartbeat.
    pub state: ElectorState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(expire_ms: u64) -> LockDocument {
        LockDocument {
            key: "k".to_string(),
            owner_id: OwnerId::mint(),
            host: "h".to_string(),
            pid: 42,
            ts_created_ms: 1_000,
            ts_expire_ms: expire_ms,
            ttl_secs: 5,
        }
    }

    #[test]
    fn owner_ids_are_unique() {
        assert_ne!(OwnerId::mint(), OwnerId::mint());
    }

    #[test]
    fn owner_id_serializes_as_plain_string() {
        let id = OwnerId::mint();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: OwnerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn owner_id_round_trips_through_display() {
        let id = OwnerId::mint();
        let parsed: OwnerId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<OwnerId>().is_err());
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let d = doc(5_000);
        assert!(!d.is_expired_at(4_999));
        assert!(d.is_expired_at(5_000), "a lease expiring exactly now is vacant");
        assert!(d.is_expired_at(5_001));
    }

    #[test]
    fn remaining_ms_saturates_at_zero() {
        let d = doc(5_000);
        assert_eq!(d.remaining_ms(3_000), 2_000);
        assert_eq!(d.remaining_ms(9_000), 0);
    }

    #[test]
    fn elector_state_serializes_lowercase() {
        let json = serde_json::to_string(&ElectorState::Follower).unwrap();
        assert_eq!(json, "\"follower\"");
        let back: ElectorState = serde_json::from_str("\"stopping\"").unwrap();
        assert_eq!(back, ElectorState::Stopping);
    }

    #[test]
    fn elector_state_display_matches_wire_form() {
        for state in [
            ElectorState::Starting,
            ElectorState::Follower,
            ElectorState::Leader,
            ElectorState::Stopping,
            ElectorState::Stopped,
        ] {
            assert_eq!(serde_json::to_string(&state).unwrap(), format!("\"{state}\""));
        }
    }
}
