use storage::documents::{LegacySyncedShape, StoredShape, UNIFIED_KEY, UnifiedDocument};
use storage::repository::{Storage, StorageTier};

use marks_core::model::ProgressState;

use crate::error::MigrationError;

/// State written by a migration run.
#[derive(Debug, Clone, PartialEq)]
pub struct Migrated {
    pub state: ProgressState,
    /// `false` when no legacy data was found and defaults were written.
    pub from_legacy: bool,
}

/// Folds legacy synced-tier data into the unified local-tier record.
///
/// The synced tier is only ever read, so runs can repeat without damage.
#[derive(Clone)]
pub struct SchemaMigrator {
    storage: Storage,
}

impl SchemaMigrator {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Migrate unless a unified record already exists.
    ///
    /// Returns `None` when nothing had to be done.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError` if a tier cannot be read or written.
    pub async fn migrate_if_needed(&self) -> Result<Option<Migrated>, MigrationError> {
        let existing = self
            .storage
            .get(StorageTier::Local, UNIFIED_KEY)
            .await
            .map_err(|source| MigrationError::Storage {
                tier: StorageTier::Local,
                source,
            })?;
        if existing.is_some() {
            tracing::debug!("unified record present, skipping migration");
            return Ok(None);
        }
        self.run().await.map(Some)
    }

    /// Build a record from the synced tier and write it to the local tier.
    ///
    /// Malformed legacy blobs are ignored in favour of a default record.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError` if a tier cannot be read or written.
    pub async fn run(&self) -> Result<Migrated, MigrationError> {
        let entries = self
            .storage
            .entries(StorageTier::Synced)
            .await
            .map_err(|source| MigrationError::Storage {
                tier: StorageTier::Synced,
                source,
            })?;

        let shape = match LegacySyncedShape::detect(&entries) {
            Ok(Some(legacy)) => StoredShape::Legacy(legacy),
            Ok(None) => StoredShape::Absent,
            Err(err) => {
                tracing::warn!(error = %err, "legacy synced data is malformed, seeding defaults");
                StoredShape::Absent
            }
        };
        let from_legacy = matches!(shape, StoredShape::Legacy(_));
        let mut state = shape.into_state();
        let clamped = state.clamp_assignments();

        let encoded = UnifiedDocument::from_state(&state).encode()?;
        self.storage
            .set(StorageTier::Local, UNIFIED_KEY, &encoded)
            .await
            .map_err(|source| MigrationError::Storage {
                tier: StorageTier::Local,
                source,
            })?;
        state.mark_clean();

        tracing::info!(
            from_legacy,
            marks = state.catalogue().len(),
            assignments = state.assignments().len(),
            lessons = state.lessons().len(),
            clamped,
            "wrote unified progress record"
        );

        Ok(Migrated { state, from_legacy })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marks_core::model::MarkId;
    use storage::documents::{LEGACY_MARKS_KEY, LEGACY_OPTIONS_KEY};

    async fn seed_legacy(storage: &Storage) {
        let synced = [
            (LEGACY_MARKS_KEY, r#"["S","?","!","✓"]"#),
            (
                LEGACY_OPTIONS_KEY,
                r#"{"pallete":["a","b","c","d"],"desc":["Choose","Unclear","Important","Learned"]}"#,
            ),
            ("parent_2", "\"3\""),
            ("parent_10", "\"1\""),
            ("parent_0", "\"2\""),
        ];
        for (key, value) in synced {
            storage.set(StorageTier::Synced, key, value).await.unwrap();
        }
    }

    #[tokio::test]
    async fn legacy_mark_ids_follow_lesson_index() {
        let storage = Storage::in_memory();
        seed_legacy(&storage).await;

        let migrated = SchemaMigrator::new(storage.clone()).run().await.unwrap();
        assert!(migrated.from_legacy);
        let state = migrated.state;
        let mut expected = vec![MarkId::UNSET; 11];
        expected[0] = MarkId::new(2);
        expected[2] = MarkId::new(3);
        expected[10] = MarkId::new(1);
        assert_eq!(state.assignments(), expected.as_slice());
        assert_eq!(state.catalogue().len(), 4);
    }

    #[tokio::test]
    async fn migration_never_touches_the_synced_tier() {
        let storage = Storage::in_memory();
        seed_legacy(&storage).await;
        let before = storage.entries(StorageTier::Synced).await.unwrap();

        SchemaMigrator::new(storage.clone()).run().await.unwrap();
        assert_eq!(storage.entries(StorageTier::Synced).await.unwrap(), before);
    }

    #[tokio::test]
    async fn stale_ids_are_reset_during_migration() {
        let storage = Storage::in_memory();
        seed_legacy(&storage).await;
        storage
            .set(StorageTier::Synced, "parent_1", "\"9\"")
            .await
            .unwrap();

        let migrated = SchemaMigrator::new(storage).run().await.unwrap();
        assert!(migrated.from_legacy);
        assert_eq!(migrated.state.mark_for(1), MarkId::UNSET);
    }

    #[tokio::test]
    async fn timestamp_like_keys_do_not_become_lessons() {
        let storage = Storage::in_memory();
        seed_legacy(&storage).await;
        for key in ["lastSync_20000000", "cache_18446744073709551615"] {
            storage.set(StorageTier::Synced, key, "0").await.unwrap();
        }

        let migrated = SchemaMigrator::new(storage.clone()).run().await.unwrap();
        assert_eq!(migrated.state.assignments().len(), 11);
        let stored = storage
            .get(StorageTier::Local, UNIFIED_KEY)
            .await
            .unwrap()
            .unwrap();
        let decoded = UnifiedDocument::decode(&stored).unwrap().into_state();
        assert_eq!(decoded.assignments().len(), 11);
    }

    #[tokio::test]
    async fn second_check_is_a_no_op() {
        let storage = Storage::in_memory();
        seed_legacy(&storage).await;
        let migrator = SchemaMigrator::new(storage.clone());

        assert!(migrator.migrate_if_needed().await.unwrap().is_some());
        let first = storage.get(StorageTier::Local, UNIFIED_KEY).await.unwrap();
        assert!(migrator.migrate_if_needed().await.unwrap().is_none());
        assert_eq!(storage.get(StorageTier::Local, UNIFIED_KEY).await.unwrap(), first);
    }

    #[tokio::test]
    async fn malformed_legacy_data_seeds_defaults() {
        let storage = Storage::in_memory();
        storage
            .set(StorageTier::Synced, LEGACY_MARKS_KEY, "[\"S\"")
            .await
            .unwrap();
        storage
            .set(StorageTier::Synced, LEGACY_OPTIONS_KEY, "{}")
            .await
            .unwrap();

        let migrated = SchemaMigrator::new(storage).run().await.unwrap();
        assert!(!migrated.from_legacy);
        assert_eq!(migrated.state.catalogue().len(), 5);
    }
}
