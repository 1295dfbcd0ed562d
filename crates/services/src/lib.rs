#![forbid(unsafe_code)]

pub mod catalogue_service;
pub mod config;
pub mod error;
pub mod migrator;
pub mod progress_store;
pub mod sessions;

pub use marks_core::Clock;
pub use sessions as session;

pub use catalogue_service::CatalogueService;
pub use config::SessionConfig;
pub use error::{CatalogueServiceError, MigrationError, ProgressStoreError, SessionError};
pub use migrator::{Migrated, SchemaMigrator};
pub use progress_store::ProgressStore;

pub use sessions::{
    ArticleEvent, ArticleSession, LessonLink, MapEvent, MapSession, MapView, MarkControl,
    PageContext, PageKind, Session, SessionController,
};
