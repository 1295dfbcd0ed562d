use storage::documents::{StoredShape, UNIFIED_KEY, UnifiedDocument};
use storage::repository::{Storage, StorageTier};

use marks_core::model::ProgressState;

use crate::error::ProgressStoreError;
use crate::migrator::SchemaMigrator;

/// Loads and saves the unified progress record in the local tier.
///
/// Saving always rewrites the whole record. There is no version check, so
/// when two tabs save concurrently the last write wins.
#[derive(Clone)]
pub struct ProgressStore {
    storage: Storage,
    migrator: SchemaMigrator,
}

impl ProgressStore {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        let migrator = SchemaMigrator::new(storage.clone());
        Self { storage, migrator }
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Load the unified record, migrating legacy data on first run.
    ///
    /// Assignments pointing outside the catalogue are reset to the unset mark
    /// and the state is left dirty so the next save corrects them.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::CorruptState` if the stored record cannot
    /// be decoded, or a storage/migration error if a tier fails.
    pub async fn load_or_init(&self) -> Result<ProgressState, ProgressStoreError> {
        let mut state = match self.migrator.migrate_if_needed().await? {
            Some(migrated) => migrated.state,
            None => self.load_unified().await?,
        };

        let clamped = state.clamp_assignments();
        if clamped > 0 {
            tracing::warn!(clamped, "reset mark assignments outside the catalogue");
        }
        tracing::debug!(
            lessons = state.lessons().len(),
            marks = state.catalogue().len(),
            "loaded progress"
        );
        Ok(state)
    }

    async fn load_unified(&self) -> Result<ProgressState, ProgressStoreError> {
        let Some(raw) = self.storage.get(StorageTier::Local, UNIFIED_KEY).await? else {
            tracing::warn!("unified record disappeared after the migration check");
            return Ok(ProgressState::seeded());
        };
        let document = UnifiedDocument::decode(&raw).map_err(ProgressStoreError::CorruptState)?;
        Ok(StoredShape::Unified(document).into_state())
    }

    /// Write the whole state to the local tier and mark it clean.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError` if encoding or the write fails.
    pub async fn persist(&self, state: &mut ProgressState) -> Result<(), ProgressStoreError> {
        let encoded = UnifiedDocument::from_state(state)
            .encode()
            .map_err(ProgressStoreError::CorruptState)?;
        if let Err(err) = self
            .storage
            .set(StorageTier::Local, UNIFIED_KEY, &encoded)
            .await
        {
            tracing::error!(error = %err, "failed to persist progress");
            return Err(err.into());
        }
        state.mark_clean();
        tracing::debug!(bytes = encoded.len(), "persisted progress");
        Ok(())
    }
}
