use url::Url;

use marks_core::model::{ArticleGeometry, LessonRecord, LessonUrl, ProgressState, ScrollTarget};
use marks_core::{Clock, SessionClock};

use crate::error::SessionError;
use crate::progress_store::ProgressStore;

use super::page::ESCAPE_KEY_CODE;

/// Signals from a lesson's article page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArticleEvent {
    Resize(ArticleGeometry),
    Scroll { offset: f64 },
    MapButtonClicked,
    CloseClicked,
    KeyUp { key_code: u32 },
    BeforeUnload,
}

/// Article page tracking reading progress for one lesson.
pub struct ArticleSession {
    store: ProgressStore,
    state: ProgressState,
    position: usize,
    clock: Clock,
    session_clock: SessionClock,
}

impl ArticleSession {
    /// Bind to the record of the lesson at `page_url`.
    ///
    /// Returns `None` when the lesson has never been listed on the map.
    pub(crate) fn start(
        store: ProgressStore,
        mut state: ProgressState,
        page_url: &Url,
        geometry: &ArticleGeometry,
        clock: Clock,
        session_clock: SessionClock,
    ) -> Option<Self> {
        let url = LessonUrl::from_page(page_url);
        let Some(position) = state.find_lesson_index_by_url(&url) else {
            tracing::warn!(url = %url, "article has no progress record");
            return None;
        };
        let target = ScrollTarget::from_geometry(geometry);
        if let Some(record) = state.lesson_mut(position) {
            record.set_scroll_target(target);
        }
        tracing::debug!(url = %url, position, distance = target.distance, "article session started");
        Some(Self {
            store,
            state,
            position,
            clock,
            session_clock,
        })
    }

    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn record(&self) -> Option<&LessonRecord> {
        self.state.lesson(self.position)
    }

    #[must_use]
    pub fn session_clock(&self) -> SessionClock {
        self.session_clock
    }

    /// Mutable access to the session's clock, for hosts driving a fixed clock.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    /// Apply one article-page signal.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if persisting after a checkpoint fails.
    pub async fn handle(&mut self, event: ArticleEvent) -> Result<(), SessionError> {
        match event {
            ArticleEvent::Resize(geometry) => {
                if let Some(record) = self.state.lesson_mut(self.position) {
                    record.set_scroll_target(ScrollTarget::from_geometry(&geometry));
                }
            }
            ArticleEvent::Scroll { offset } => {
                if let Some(record) = self.state.lesson_mut(self.position) {
                    record.record_scroll(offset);
                }
            }
            ArticleEvent::MapButtonClicked | ArticleEvent::BeforeUnload => {
                self.checkpoint().await?;
            }
            ArticleEvent::CloseClicked => self.reset(),
            ArticleEvent::KeyUp { key_code } if key_code == ESCAPE_KEY_CODE => self.reset(),
            ArticleEvent::KeyUp { .. } => {}
        }
        Ok(())
    }

    /// Add the time since the session clock's reference, re-evaluate and save.
    ///
    /// The reference is not moved, so every checkpoint adds the full time
    /// since the page was opened (or last reset).
    async fn checkpoint(&mut self) -> Result<(), SessionError> {
        let elapsed = self.session_clock.elapsed_ms(self.clock.now());
        let Some(record) = self.state.lesson_mut(self.position) else {
            return Ok(());
        };
        record.accrue_time(elapsed);
        let learned = record.evaluate();
        let time_spent = record.time_spent();
        self.store.persist(&mut self.state).await?;
        tracing::debug!(elapsed, time_spent, learned, "article checkpoint");
        Ok(())
    }

    fn reset(&mut self) {
        self.state.reset_count();
        self.session_clock.restart(self.clock.now());
        tracing::debug!("article session reset");
    }
}
