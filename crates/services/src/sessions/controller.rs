use marks_core::model::ProgressState;
use marks_core::{Clock, SessionClock};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::progress_store::ProgressStore;

use super::article::ArticleSession;
use super::map::MapSession;
use super::page::{MapView, PageContext, PageKind};

/// The behaviour a page was bound to. Never changes for the page's lifetime.
pub enum Session {
    Map(MapSession),
    Article(ArticleSession),
    /// Nothing to track: neither a map nor a known lesson.
    Inactive,
}

impl Session {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Session::Inactive)
    }
}

/// Entry point for a page load: picks the page kind, loads progress and hands
/// back the session that owns it.
#[derive(Clone)]
pub struct SessionController {
    store: ProgressStore,
    config: SessionConfig,
    clock: Clock,
}

impl SessionController {
    #[must_use]
    pub fn new(store: ProgressStore, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            clock: Clock::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start the session for `page`.
    ///
    /// The reading clock starts before storage is touched, so load time counts
    /// as reading time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if storage is unavailable or the first save on the
    /// map page fails. A corrupt record is not an error: the session starts
    /// from defaults and overwrites it on the next save.
    pub async fn start(
        &self,
        page: &PageContext,
        view: &mut dyn MapView,
    ) -> Result<Session, SessionError> {
        let kind = PageKind::detect(page, &self.config);
        if kind == PageKind::Other {
            tracing::debug!(url = %page.url, "page is neither map nor article");
            return Ok(Session::Inactive);
        }

        let session_clock = SessionClock::start(self.clock.now());
        let state = self.load_state().await?;

        match kind {
            PageKind::Map => MapSession::start(
                self.store.clone(),
                state,
                &page.url,
                &page.lessons,
                &self.config,
                self.clock,
                session_clock,
                view,
            )
            .await
            .map(Session::Map),
            PageKind::Article => {
                let geometry = page.article.unwrap_or_default();
                Ok(ArticleSession::start(
                    self.store.clone(),
                    state,
                    &page.url,
                    &geometry,
                    self.clock,
                    session_clock,
                )
                .map_or(Session::Inactive, Session::Article))
            }
            PageKind::Other => Ok(Session::Inactive),
        }
    }

    async fn load_state(&self) -> Result<ProgressState, SessionError> {
        match self.store.load_or_init().await {
            Ok(state) => Ok(state),
            Err(err) if err.is_corrupt() => {
                tracing::warn!(error = %err, "discarding corrupt progress, starting from defaults");
                Ok(ProgressState::seeded())
            }
            Err(err) => {
                tracing::error!(error = %err, "progress unavailable for this page");
                Err(err.into())
            }
        }
    }
}
