mod article;
mod controller;
mod map;
mod page;

// Public API of the page-session subsystem.
pub use crate::error::SessionError;
pub use article::{ArticleEvent, ArticleSession};
pub use controller::{Session, SessionController};
pub use map::{MapEvent, MapSession};
pub use page::{
    ESCAPE_KEY_CODE, LessonLink, MapView, MarkControl, MarkOption, PageContext, PageKind,
};
