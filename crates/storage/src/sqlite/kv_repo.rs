use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{KeyValueStore, StorageError, StorageTier};

use super::SqliteRepository;

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// One tier of the `kv_entries` table.
#[derive(Clone)]
pub struct SqliteKeyValueStore {
    repo: SqliteRepository,
    tier: StorageTier,
}

impl SqliteKeyValueStore {
    #[must_use]
    pub fn new(repo: SqliteRepository, tier: StorageTier) -> Self {
        Self { repo, tier }
    }

    #[must_use]
    pub fn tier(&self) -> StorageTier {
        self.tier
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT value
            FROM kv_entries
            WHERE tier = ?1 AND key = ?2
            ",
        )
        .bind(self.tier.as_str())
        .bind(key)
        .fetch_optional(self.repo.pool())
        .await
        .map_err(conn)?;

        row.map(|row| row.try_get::<String, _>("value").map_err(ser))
            .transpose()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO kv_entries (tier, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(tier, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(self.tier.as_str())
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(self.repo.pool())
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn entries(&self) -> Result<Vec<(String, String)>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT key, value
            FROM kv_entries
            WHERE tier = ?1
            ORDER BY key
            ",
        )
        .bind(self.tier.as_str())
        .fetch_all(self.repo.pool())
        .await
        .map_err(conn)?;

        rows.iter()
            .map(|row| {
                Ok((
                    row.try_get::<String, _>("key").map_err(ser)?,
                    row.try_get::<String, _>("value").map_err(ser)?,
                ))
            })
            .collect()
    }
}
