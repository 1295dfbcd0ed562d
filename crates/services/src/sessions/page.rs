use url::Url;

use marks_core::evaluator::ProgressSummary;
use marks_core::model::{ArticleGeometry, MarkId};

use crate::config::SessionConfig;

/// Key code the host reports for the Escape key.
pub const ESCAPE_KEY_CODE: u32 = 27;

/// A lesson link as listed on the map, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonLink {
    pub href: String,
}

impl LessonLink {
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// What the host page looks like when a session starts.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContext {
    pub url: Url,
    pub lessons: Vec<LessonLink>,
    pub article: Option<ArticleGeometry>,
}

impl PageContext {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            lessons: Vec::new(),
            article: None,
        }
    }

    #[must_use]
    pub fn with_lessons(mut self, lessons: Vec<LessonLink>) -> Self {
        self.lessons = lessons;
        self
    }

    #[must_use]
    pub fn with_article(mut self, geometry: ArticleGeometry) -> Self {
        self.article = Some(geometry);
        self
    }
}

/// Which behaviour a page gets. Decided once per page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Map,
    Article,
    Other,
}

impl PageKind {
    /// Map when lessons are listed, the path is the map path, or the map query
    /// flag is set; otherwise article when an article container exists.
    #[must_use]
    pub fn detect(page: &PageContext, config: &SessionConfig) -> Self {
        let flagged = config
            .map_query_flag
            .as_deref()
            .is_some_and(|flag| page.url.query_pairs().any(|(key, _)| key == flag));
        if !page.lessons.is_empty() || page.url.path() == config.map_path || flagged {
            PageKind::Map
        } else if page.article.is_some() {
            PageKind::Article
        } else {
            PageKind::Other
        }
    }
}

/// One selectable mark inside a lesson control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkOption {
    pub id: MarkId,
    pub symbol: String,
}

/// Everything the host needs to draw the mark selector of one lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkControl {
    /// Position on the map.
    pub lesson: usize,
    pub options: Vec<MarkOption>,
    pub selected: MarkId,
    pub style: String,
    pub tooltip: String,
    /// Completion mark to preselect for a learned lesson with no mark.
    /// Display only; it does not count toward the aggregate until chosen.
    pub suggested: Option<MarkId>,
}

/// Rendering surface of the map page, implemented by the host.
pub trait MapView {
    fn render_controls(&mut self, controls: &[MarkControl]);

    fn update_control(&mut self, control: &MarkControl);

    fn render_progress(&mut self, summary: &ProgressSummary);
}
