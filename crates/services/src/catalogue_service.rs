use marks_core::model::{MarkCatalogue, MarkDraft, MarkId, palette_style};

use crate::error::CatalogueServiceError;
use crate::progress_store::ProgressStore;

/// Manages the set of available marks on behalf of the popup.
#[derive(Clone)]
pub struct CatalogueService {
    store: ProgressStore,
}

impl CatalogueService {
    #[must_use]
    pub fn new(store: ProgressStore) -> Self {
        Self { store }
    }

    /// Current catalogue.
    ///
    /// # Errors
    ///
    /// Returns `CatalogueServiceError` if the progress record cannot be loaded.
    pub async fn list(&self) -> Result<MarkCatalogue, CatalogueServiceError> {
        let state = self.store.load_or_init().await?;
        Ok(state.catalogue().clone())
    }

    /// Add a mark from the popup's `"<symbol> - <description>"` input.
    ///
    /// # Errors
    ///
    /// Returns `CatalogueServiceError` if the input is rejected or storage fails.
    pub async fn add_mark(
        &self,
        input: &str,
        color: &str,
        background: &str,
    ) -> Result<MarkId, CatalogueServiceError> {
        let draft = MarkDraft::parse(input, palette_style(color, background))?;
        let mut state = self.store.load_or_init().await?;
        let id = state.add_mark(draft)?;
        self.store.persist(&mut state).await?;
        tracing::info!(mark = %id, "added mark");
        Ok(id)
    }

    /// Remove a mark by symbol. Lessons that pointed past the new end of the
    /// catalogue fall back to the unset mark.
    ///
    /// # Errors
    ///
    /// Returns `CatalogueServiceError` if the symbol is rejected or storage fails.
    pub async fn remove_mark(&self, symbol: &str) -> Result<MarkId, CatalogueServiceError> {
        let mut state = self.store.load_or_init().await?;
        let id = state.remove_mark(symbol)?;
        self.store.persist(&mut state).await?;
        tracing::info!(mark = %id, symbol, "removed mark");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marks_core::model::CatalogueError;
    use storage::repository::Storage;

    fn service() -> CatalogueService {
        CatalogueService::new(ProgressStore::new(Storage::in_memory()))
    }

    #[tokio::test]
    async fn added_marks_are_persisted() {
        let service = service();
        let id = service
            .add_mark("# - Revisit Soon", "#ffffff", "#9c27b0")
            .await
            .unwrap();
        assert_eq!(id, MarkId::new(5));

        let catalogue = service.list().await.unwrap();
        assert_eq!(catalogue.len(), 6);
        assert_eq!(catalogue.description(id), Some("revisit soon"));
        assert_eq!(
            catalogue.styles()[5],
            "color: #ffffff; background-color: #9c27b0"
        );
    }

    #[tokio::test]
    async fn rejected_input_leaves_catalogue_alone() {
        let service = service();
        let err = service.add_mark("#", "#fff", "#000").await.unwrap_err();
        assert!(matches!(
            err,
            CatalogueServiceError::Catalogue(CatalogueError::InvalidMarkInput)
        ));
        assert_eq!(service.list().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn removed_marks_are_persisted() {
        let service = service();
        assert_eq!(service.remove_mark("\u{2605}").await.unwrap(), MarkId::new(4));
        assert_eq!(service.list().await.unwrap().len(), 4);
    }
}
