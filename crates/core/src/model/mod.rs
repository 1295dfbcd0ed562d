mod catalogue;
mod ids;
mod lesson;
mod progress;

pub use catalogue::{
    CatalogueError, MarkCatalogue, MarkDraft, MarkEntry, NEUTRAL_STYLE, palette_style,
};
pub use ids::MarkId;
pub use lesson::{ArticleGeometry, LessonRecord, LessonRecordParts, LessonUrl, ScrollTarget};
pub use progress::ProgressState;
