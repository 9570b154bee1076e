//! Record stores
//!
//! The guard never owns record state. It talks to whatever implements
//! [`RecordStore`] and only after a gate has allowed the call.

use crate::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Opaque identifier of a record held by an external store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Persistence subsystem the delete gate delegates to
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Remove a record. Absent records yield [`StoreError::NotFound`].
    async fn delete(&self, record_id: &RecordId) -> StoreResult<()>;

    async fn contains(&self, record_id: &RecordId) -> StoreResult<bool>;

    /// All record identifiers, in ascending order
    async fn list(&self) -> StoreResult<Vec<RecordId>>;
}

/// Process-local store, also used as a test double
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeSet<RecordId>>,
    delete_calls: AtomicUsize,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<I, R>(records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RecordId>,
    {
        Self {
            records: RwLock::new(records.into_iter().map(Into::into).collect()),
            delete_calls: AtomicUsize::new(0),
        }
    }

    pub async fn insert(&self, record_id: impl Into<RecordId>) {
        self.records.write().await.insert(record_id.into());
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Number of times `delete` has been invoked, successful or not
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn delete(&self, record_id: &RecordId) -> StoreResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if self.records.write().await.remove(record_id) {
            debug!(record_id = %record_id, "Deleted record from memory");
            Ok(())
        } else {
            Err(StoreError::not_found(record_id))
        }
    }

    async fn contains(&self, record_id: &RecordId) -> StoreResult<bool> {
        Ok(self.records.read().await.contains(record_id))
    }

    async fn list(&self) -> StoreResult<Vec<RecordId>> {
        Ok(self.records.read().await.iter().cloned().collect())
    }
}

/// Store backed by a JSON array of identifiers on disk.
///
/// A missing file reads as an empty store. Every delete rewrites the whole
/// file through a sibling temp file, so readers see either the old or the new
/// contents.
pub struct JsonFileRecordStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileRecordStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create or overwrite the backing file with `records`
    pub async fn initialize<I, R>(path: impl AsRef<Path>, records: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<RecordId>,
    {
        let store = Self::new(path);
        let records: BTreeSet<RecordId> = records.into_iter().map(Into::into).collect();
        store.save(&records).await?;
        info!(
            path = %store.path.display(),
            records = records.len(),
            "Initialized record file"
        );
        Ok(store)
    }

    async fn load(&self) -> StoreResult<BTreeSet<RecordId>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeSet::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeSet::new()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn save(&self, records: &BTreeSet<RecordId>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(records)?;
        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "records.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RecordStore for JsonFileRecordStore {
    async fn delete(&self, record_id: &RecordId) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load().await?;
        if !records.remove(record_id) {
            return Err(StoreError::not_found(record_id));
        }
        self.save(&records).await?;

        debug!(
            record_id = %record_id,
            path = %self.path.display(),
            "Deleted record from file"
        );
        Ok(())
    }

    async fn contains(&self, record_id: &RecordId) -> StoreResult<bool> {
        Ok(self.load().await?.contains(record_id))
    }

    async fn list(&self) -> StoreResult<Vec<RecordId>> {
        Ok(self.load().await?.into_iter().collect())
    }
}
