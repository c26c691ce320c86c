//! BSON wire representations.
//!
//! The store-facing shapes differ from the core types in two ways: the lock
//! key doubles as the `_id` (making key uniqueness structural), and
//! timestamps are real BSON dates so the server-side TTL monitor can reap
//! abandoned locks.

use mongodb::bson::DateTime;
use mongoelector_core::ElectorState;
use mongoelector_core::LockDocument;
use mongoelector_core::NodeStatus;
use mongoelector_core::OwnerId;
use mongoelector_core::StoreError;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct LockRecord {
    #[serde(rename = "_id")]
    pub key: String,
    /// Hyphenated UUID string; conditional filters match on this exact
    /// representation, so it never rides the `uuid` serde impl (whose BSON
    /// form is format-dependent).
    pub owner_id: String,
    pub host: String,
    pub pid: i64,
    pub ts_created: DateTime,
    pub ts_expire: DateTime,
    pub ttl: i64,
}

impl From<&LockDocument> for LockRecord {
    fn from(doc: &LockDocument) -> Self {
        Self {
            key: doc.key.clone(),
            owner_id: doc.owner_id.to_string(),
            host: doc.host.clone(),
            pid: i64::from(doc.pid),
            ts_created: DateTime::from_millis(doc.ts_created_ms as i64),
            ts_expire: DateTime::from_millis(doc.ts_expire_ms as i64),
            ttl: i64::from(doc.ttl_secs),
        }
    }
}

impl TryFrom<LockRecord> for LockDocument {
    type Error = StoreError;

    fn try_from(record: LockRecord) -> Result<Self, StoreError> {
        Ok(Self {
            key: record.key,
            owner_id: parse_owner(&record.owner_id)?,
            host: record.host,
            pid: to_u32(record.pid, "pid")?,
            ts_created_ms: to_millis(record.ts_created, "ts_created")?,
            ts_expire_ms: to_millis(record.ts_expire, "ts_expire")?,
            ttl_secs: to_u32(record.ttl, "ttl")?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StatusRecord {
    /// Composite identity; the unique `(election_key, owner_id)` index is
    /// installed on the split fields for querying.
    #[serde(rename = "_id")]
    pub id: String,
    pub election_key: String,
    pub owner_id: String,
    pub host: String,
    pub pid: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    pub is_leader: bool,
    pub ts_heartbeat: DateTime,
    pub state: ElectorState,
}

pub(crate) fn status_id(election_key: &str, owner_id: &OwnerId) -> String {
    format!("{election_key}:{owner_id}")
}

impl From<&NodeStatus> for StatusRecord {
    fn from(status: &NodeStatus) -> Self {
        Self {
            id: status_id(&status.election_key, &status.owner_id),
            election_key: status.election_key.clone(),
            owner_id: status.owner_id.to_string(),
            host: status.host.clone(),
            pid: i64::from(status.pid),
            app_version: status.app_version.clone(),
            is_leader: status.is_leader,
            ts_heartbeat: DateTime::from_millis(status.ts_heartbeat_ms as i64),
            state: status.state,
        }
    }
}

impl TryFrom<StatusRecord> for NodeStatus {
    type Error = StoreError;

    fn try_from(record: StatusRecord) -> Result<Self, StoreError> {
        Ok(Self {
            election_key: record.election_key,
            owner_id: parse_owner(&record.owner_id)?,
            host: record.host,
            pid: to_u32(record.pid, "pid")?,
            app_version: record.app_version,
            is_leader: record.is_leader,
            ts_heartbeat_ms: to_millis(record.ts_heartbeat, "ts_heartbeat")?,
            state: record.state,
        })
    }
}

fn parse_owner(value: &str) -> Result<OwnerId, StoreError> {
    value.parse().map_err(|_| StoreError::codec(format!("owner_id is not a uuid: {value}")))
}

fn to_millis(value: DateTime, field: &str) -> Result<u64, StoreError> {
    u64::try_from(value.timestamp_millis())
        .map_err(|_| StoreError::codec(format!("{field} predates the Unix epoch")))
}

fn to_u32(value: i64, field: &str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::codec(format!("{field} out of range: {value}")))
}
