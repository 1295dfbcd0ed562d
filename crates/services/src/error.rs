//! Shared error types for the services crate.

use thiserror::Error;

use marks_core::model::CatalogueError;
use storage::documents::DocumentError;
use storage::repository::{StorageError, StorageTier};

/// Errors emitted by `SchemaMigrator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MigrationError {
    #[error("{tier} storage failed during migration: {source}")]
    Storage {
        tier: StorageTier,
        #[source]
        source: StorageError,
    },
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Errors emitted by `ProgressStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressStoreError {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
    #[error("stored progress is corrupt: {0}")]
    CorruptState(#[source] DocumentError),
    #[error(transparent)]
    Migration(MigrationError),
}

impl From<MigrationError> for ProgressStoreError {
    fn from(err: MigrationError) -> Self {
        match err {
            MigrationError::Storage { source, .. } => ProgressStoreError::StorageUnavailable(source),
            other => ProgressStoreError::Migration(other),
        }
    }
}

impl ProgressStoreError {
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, ProgressStoreError::CorruptState(_))
    }
}

/// Errors emitted by `CatalogueService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogueServiceError {
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
    #[error(transparent)]
    Store(#[from] ProgressStoreError),
}

/// Errors emitted by page sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] ProgressStoreError),
}
