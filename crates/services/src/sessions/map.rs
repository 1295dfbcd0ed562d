use url::Url;

use marks_core::evaluator::{self, ProgressSummary};
use marks_core::model::{LessonUrl, MarkId, ProgressState};
use marks_core::{Clock, SessionClock};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::progress_store::ProgressStore;

use super::page::{ESCAPE_KEY_CODE, LessonLink, MapView, MarkControl, MarkOption};

/// Interactions on the map page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    MarkChanged { lesson: usize, mark: MarkId },
    CloseClicked,
    KeyUp { key_code: u32 },
}

/// Map page bound to the reader's progress.
pub struct MapSession {
    store: ProgressStore,
    state: ProgressState,
    /// Record position for each lesson, in map order.
    positions: Vec<usize>,
    clock: Clock,
    session_clock: SessionClock,
    total_lessons: usize,
}

impl MapSession {
    /// Attach records to the listed lessons, render the controls and the
    /// progress bar, then persist.
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn start(
        store: ProgressStore,
        mut state: ProgressState,
        page_url: &Url,
        lessons: &[LessonLink],
        config: &SessionConfig,
        clock: Clock,
        session_clock: SessionClock,
        view: &mut dyn MapView,
    ) -> Result<Self, SessionError> {
        let thresholds = config.threshold_table();
        let positions = lessons
            .iter()
            .enumerate()
            .map(|(index, link)| {
                let url = LessonUrl::from_link(&link.href, Some(page_url));
                state.ensure_lesson_record(index, url, thresholds.threshold_for(index))
            })
            .collect();
        state.clamp_assignments();

        let mut session = Self {
            store,
            state,
            positions,
            clock,
            session_clock,
            total_lessons: config.total_lessons,
        };
        view.render_controls(&session.controls());
        let learned = session.refresh_progress(view);
        session.store.persist(&mut session.state).await?;

        tracing::info!(lessons = session.positions.len(), learned, "map session started");
        Ok(session)
    }

    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary::new(self.state.count_learned(), self.total_lessons)
    }

    #[must_use]
    pub fn session_clock(&self) -> SessionClock {
        self.session_clock
    }

    /// Mutable access to the session's clock, for hosts driving a fixed clock.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn controls(&self) -> Vec<MarkControl> {
        self.positions
            .iter()
            .enumerate()
            .map(|(lesson, position)| self.control_for(lesson, *position))
            .collect()
    }

    fn control_for(&self, lesson: usize, position: usize) -> MarkControl {
        let catalogue = self.state.catalogue();
        let selected = self.state.mark_for(position);
        let learned = self.state.lesson(position).is_some_and(|r| r.learned());
        let suggested = if selected.is_unset() && learned {
            evaluator::completion_mark_index(catalogue)
        } else {
            None
        };
        let shown = suggested.unwrap_or(selected);
        MarkControl {
            lesson,
            options: catalogue
                .entries()
                .map(|entry| MarkOption {
                    id: entry.id,
                    symbol: entry.symbol.to_owned(),
                })
                .collect(),
            selected,
            style: catalogue.style_or_neutral(shown).to_owned(),
            tooltip: catalogue.description(selected).unwrap_or_default().to_owned(),
            suggested,
        }
    }

    fn refresh_progress(&mut self, view: &mut dyn MapView) -> usize {
        let learned = self.state.recompute_aggregate();
        view.render_progress(&self.summary());
        learned
    }

    /// Apply one map interaction.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if persisting a mark change fails.
    pub async fn handle(
        &mut self,
        event: MapEvent,
        view: &mut dyn MapView,
    ) -> Result<(), SessionError> {
        match event {
            MapEvent::MarkChanged { lesson, mark } => {
                let Some(&position) = self.positions.get(lesson) else {
                    tracing::warn!(lesson, "mark changed on a lesson that is not listed");
                    return Ok(());
                };
                let stored = self.state.set_mark_id(position, mark);
                if stored != mark {
                    tracing::warn!(lesson, %mark, "mark outside the catalogue, reset to unset");
                }
                self.store.persist(&mut self.state).await?;
                view.update_control(&self.control_for(lesson, position));
                self.refresh_progress(view);
            }
            MapEvent::CloseClicked => self.reset(),
            MapEvent::KeyUp { key_code } if key_code == ESCAPE_KEY_CODE => self.reset(),
            MapEvent::KeyUp { .. } => {}
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state.reset_count();
        self.session_clock.restart(self.clock.now());
        tracing::debug!("map session reset");
    }
}
