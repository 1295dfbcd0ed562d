use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("storage tier is unavailable: {0}")]
    Unavailable(String),

    #[error("quota exceeded: {used} of {quota} bytes")]
    QuotaExceeded { used: usize, quota: usize },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The two storage backends offered by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageTier {
    /// Small quota, replicated across the reader's browsers.
    Synced,
    /// Larger quota, this browser only.
    Local,
}

impl StorageTier {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageTier::Synced => "synced",
            StorageTier::Local => "local",
        }
    }
}

impl fmt::Display for StorageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Byte quota of the synced tier on the host platform.
pub const SYNC_QUOTA_BYTES: usize = 102_400;

/// Untyped key-value storage for JSON-encoded strings.
///
/// Implementations do not validate values and do not retry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the write.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Every stored entry, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn entries(&self) -> Result<Vec<(String, String)>, StorageError>;
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
    quota: Option<usize>,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once keys plus values exceed `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(BTreeMap::new())),
            quota: Some(quota),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if let Some(quota) = self.quota {
            let used: usize = guard
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum::<usize>()
                + key.len()
                + value.len();
            if used > quota {
                return Err(StorageError::QuotaExceeded { used, quota });
            }
        }
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<(String, String)>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// Aggregates one store per tier behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub synced: Arc<dyn KeyValueStore>,
    pub local: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn new(synced: Arc<dyn KeyValueStore>, local: Arc<dyn KeyValueStore>) -> Self {
        Self { synced, local }
    }

    /// In-memory tiers; the synced tier enforces the platform quota.
    #[must_use]
    pub fn in_memory() -> Self {
        let synced: Arc<dyn KeyValueStore> =
            Arc::new(InMemoryKeyValueStore::with_quota(SYNC_QUOTA_BYTES));
        let local: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
        Self { synced, local }
    }

    #[must_use]
    pub fn tier(&self, tier: StorageTier) -> &dyn KeyValueStore {
        match tier {
            StorageTier::Synced => self.synced.as_ref(),
            StorageTier::Local => self.local.as_ref(),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the tier cannot be read.
    pub async fn get(&self, tier: StorageTier, key: &str) -> Result<Option<String>, StorageError> {
        self.tier(tier).get(key).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the tier rejects the write.
    pub async fn set(&self, tier: StorageTier, key: &str, value: &str) -> Result<(), StorageError> {
        self.tier(tier).set(key, value).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the tier cannot be read.
    pub async fn entries(&self, tier: StorageTier) -> Result<Vec<(String, String)>, StorageError> {
        self.tier(tier).entries().await
    }
}
