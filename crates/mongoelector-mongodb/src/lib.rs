//! MongoDB adapter for the mongoelector [`DocumentStore`] capability.
//!
//! Maps each store operation onto a single atomic driver call: conditional
//! creates ride the unique `_id` index, conditional updates and deletes
//! filter on the owner fingerprint, and the store clock comes from the
//! server's `hello` response. Connection management, retries, and TLS are
//! the driver's concern, configured through the usual connection string.
//!
//! # Example
//!
//! ```ignore
//! let store = MongoDocumentStore::connect("mongodb://localhost:27017", "coordination").await?;
//! let store = Arc::new(store);
//! let lock = DistLock::new(store, "nightly-compaction", LockConfig::default())?;
//! ```

mod wire;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::Client;
use mongodb::Collection;
use mongodb::Database;
use mongodb::IndexModel;
use mongodb::bson::DateTime;
use mongodb::bson::doc;
use mongodb::error::ErrorKind;
use mongodb::error::WriteFailure;
use mongodb::options::IndexOptions;
use mongodb::options::ReturnDocument;
use mongoelector_core::CreateOutcome;
use mongoelector_core::DeleteOutcome;
use mongoelector_core::DocumentStore;
use mongoelector_core::LockDocument;
use mongoelector_core::NodeStatus;
use mongoelector_core::OwnerId;
use mongoelector_core::StoreError;
use mongoelector_core::UpdateOutcome;

use crate::wire::LockRecord;
use crate::wire::StatusRecord;
use crate::wire::status_id;

/// [`DocumentStore`] implementation over a [`mongodb::Database`].
#[derive(Clone)]
pub struct MongoDocumentStore {
    db: Database,
}

impl MongoDocumentStore {
    /// Wrap an existing database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Connect to a deployment and select the database to coordinate in.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await.map_err(transport)?;
        Ok(Self::new(client.database(db_name)))
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    fn locks(&self, collection: &str) -> Collection<LockRecord> {
        self.db.collection(collection)
    }

    fn statuses(&self, collection: &str) -> Collection<StatusRecord> {
        self.db.collection(collection)
    }
}

fn transport(err: mongodb::error::Error) -> StoreError {
    StoreError::transport(err.to_string())
}

/// E11000: the unique index rejected a second document for the same `_id`.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => write_error.code == 11000,
        _ => false,
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn create_if_absent(&self, collection: &str, doc: &LockDocument) -> Result<CreateOutcome, StoreError> {
        let record = LockRecord::from(doc);
        match self.locks(collection).insert_one(&record).await {
            Ok(_) => Ok(CreateOutcome::Created),
            Err(err) if is_duplicate_key(&err) => Ok(CreateOutcome::AlreadyExists),
            Err(err) => Err(transport(err)),
        }
    }

    async fn update_if_match(
        &self,
        collection: &str,
        key: &str,
        owner_id: &OwnerId,
        new_expire_ms: u64,
    ) -> Result<UpdateOutcome, StoreError> {
        // The `$$NOW` guard keeps an expired lease from being revived out
        // from under a contender that is mid-steal.
        let filter = doc! {
            "_id": key,
            "owner_id": owner_id.to_string(),
            "$expr": { "$gt": ["$ts_expire", "$$NOW"] },
        };
        let update = doc! {
            "$set": { "ts_expire": DateTime::from_millis(new_expire_ms as i64) },
        };
        let updated = self
            .locks(collection)
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(transport)?;
        match updated {
            Some(record) => {
                let doc = LockDocument::try_from(record)?;
                Ok(UpdateOutcome::Updated {
                    ts_expire_ms: doc.ts_expire_ms,
                })
            }
            None => Ok(UpdateOutcome::Mismatch),
        }
    }

    async fn delete_if_match(
        &self,
        collection: &str,
        key: &str,
        owner_id: &OwnerId,
    ) -> Result<DeleteOutcome, StoreError> {
        let filter = doc! { "_id": key, "owner_id": owner_id.to_string() };
        let result = self.locks(collection).delete_one(filter).await.map_err(transport)?;
        if result.deleted_count > 0 {
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::Mismatch)
        }
    }

    async fn delete_any(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.locks(collection).delete_one(doc! { "_id": key }).await.map_err(transport)?;
        Ok(())
    }

    async fn find(&self, collection: &str, key: &str) -> Result<Option<LockDocument>, StoreError> {
        let record = self.locks(collection).find_one(doc! { "_id": key }).await.map_err(transport)?;
        record.map(LockDocument::try_from).transpose()
    }

    async fn server_now_ms(&self) -> Result<u64, StoreError> {
        let reply = self.db.run_command(doc! { "hello": 1 }).await.map_err(transport)?;
        let local_time = reply
            .get_datetime("localTime")
            .map_err(|err| StoreError::codec(format!("hello reply missing localTime: {err}")))?;
        u64::try_from(local_time.timestamp_millis())
            .map_err(|_| StoreError::codec("server localTime predates the Unix epoch"))
    }

    async fn upsert_status(&self, collection: &str, status: &NodeStatus) -> Result<(), StoreError> {
        let record = StatusRecord::from(status);
        let mut fields = mongodb::bson::to_document(&record)
            .map_err(|err| StoreError::codec(format!("status encode failed: {err}")))?;
        // `$set` on everything but the immutable identity preserves fields
        // written by other tools on the same document.
        fields.remove("_id");
        self.statuses(collection)
            .update_one(doc! { "_id": &record.id }, doc! { "$set": fields })
            .upsert(true)
            .await
            .map_err(transport)?;
        Ok(())
    }

    async fn delete_status(
        &self,
        collection: &str,
        election_key: &str,
        owner_id: &OwnerId,
    ) -> Result<(), StoreError> {
        self.statuses(collection)
            .delete_one(doc! { "_id": status_id(election_key, owner_id) })
            .await
            .map_err(transport)?;
        Ok(())
    }

    async fn list_statuses(&self, collection: &str, election_key: &str) -> Result<Vec<NodeStatus>, StoreError> {
        let cursor = self
            .statuses(collection)
            .find(doc! { "election_key": election_key })
            .await
            .map_err(transport)?;
        let records: Vec<StatusRecord> = cursor.try_collect().await.map_err(transport)?;
        records.into_iter().map(NodeStatus::try_from).collect()
    }

    async fn ensure_indexes(&self, lock_collection: &str, status_collection: &str) -> Result<(), StoreError> {
        // Server-side garbage collection of abandoned locks; expiry
        // semantics still rest solely on timestamp comparison.
        let ttl_index = IndexModel::builder()
            .keys(doc! { "ts_expire": 1 })
            .options(
                IndexOptions::builder()
                    .expire_after(std::time::Duration::from_secs(0))
                    .build(),
            )
            .build();
        let locks = self.locks(lock_collection);
        if locks.create_index(ttl_index.clone()).await.is_err() {
            // An index with the same keys but different options survives
            // from older deployments; rebuild from scratch once.
            locks.drop_indexes().await.map_err(transport)?;
            locks.create_index(ttl_index).await.map_err(transport)?;
        }

        let identity_index = IndexModel::builder()
            .keys(doc! { "election_key": 1, "owner_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.statuses(status_collection)
            .create_index(identity_index)
            .await
            .map_err(transport)?;
        Ok(())
    }
}
