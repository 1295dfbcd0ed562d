use crate::evaluator;
use crate::model::catalogue::{CatalogueError, MarkCatalogue, MarkDraft};
use crate::model::ids::MarkId;
use crate::model::lesson::{LessonRecord, LessonUrl};

/// Everything the extension knows about the reader's progress.
///
/// `assignments[i]` is the mark chosen for `lessons[i]`; both sequences are
/// kept in the order lessons were first listed on the map. Records are never
/// removed, only appended or corrected in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    catalogue: MarkCatalogue,
    lessons: Vec<LessonRecord>,
    assignments: Vec<MarkId>,
    count_learned: usize,
    dirty: bool,
}

impl ProgressState {
    #[must_use]
    pub fn new(
        catalogue: MarkCatalogue,
        lessons: Vec<LessonRecord>,
        assignments: Vec<MarkId>,
    ) -> Self {
        Self {
            catalogue,
            lessons,
            assignments,
            count_learned: 0,
            dirty: false,
        }
    }

    /// Fresh state seeded with the built-in catalogue and no lessons.
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(MarkCatalogue::builtin(), Vec::new(), Vec::new())
    }

    #[must_use]
    pub fn catalogue(&self) -> &MarkCatalogue {
        &self.catalogue
    }

    #[must_use]
    pub fn lessons(&self) -> &[LessonRecord] {
        &self.lessons
    }

    #[must_use]
    pub fn lesson(&self, position: usize) -> Option<&LessonRecord> {
        self.lessons.get(position)
    }

    /// Mutable access to one record. Marks the state dirty.
    pub fn lesson_mut(&mut self, position: usize) -> Option<&mut LessonRecord> {
        let record = self.lessons.get_mut(position)?;
        self.dirty = true;
        Some(record)
    }

    #[must_use]
    pub fn assignments(&self) -> &[MarkId] {
        &self.assignments
    }

    /// The mark chosen for a lesson; lessons never assigned read as unset.
    #[must_use]
    pub fn mark_for(&self, position: usize) -> MarkId {
        self.assignments
            .get(position)
            .copied()
            .unwrap_or(MarkId::UNSET)
    }

    #[must_use]
    pub fn count_learned(&self) -> usize {
        self.count_learned
    }

    /// Recount learned lessons and cache the result.
    pub fn recompute_aggregate(&mut self) -> usize {
        self.count_learned = evaluator::recompute_aggregate(self);
        self.count_learned
    }

    pub fn reset_count(&mut self) {
        self.count_learned = 0;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    #[must_use]
    pub fn find_lesson_index_by_url(&self, url: &LessonUrl) -> Option<usize> {
        self.lessons.iter().position(|record| record.url() == url)
    }

    /// Make sure a record exists for the lesson listed at `index` on the map.
    ///
    /// `index` is only a hint: the record at that position is used when its
    /// URL matches, otherwise the record is looked up by URL, and a new one is
    /// appended when none exists. An empty URL only ever matches its hint. An existing record only gets its reading
    /// threshold backfilled when it has none. Returns the record's position.
    pub fn ensure_lesson_record(
        &mut self,
        index: usize,
        url: LessonUrl,
        default_threshold: u64,
    ) -> usize {
        let position = match self.lessons.get(index) {
            Some(record) if record.url() == &url => Some(index),
            // Links without a path cannot be told apart by URL.
            _ if url.is_empty() => None,
            _ => self.find_lesson_index_by_url(&url),
        };
        match position {
            Some(position) => {
                if self.lessons[position].backfill_threshold(default_threshold) {
                    self.dirty = true;
                }
                position
            }
            None => {
                self.lessons.push(LessonRecord::new(url, default_threshold));
                self.dirty = true;
                self.lessons.len() - 1
            }
        }
    }

    /// Assign a mark to the lesson at `position`.
    ///
    /// An id outside the catalogue is replaced by the unset mark. Returns the
    /// id actually stored.
    pub fn set_mark_id(&mut self, position: usize, mark: MarkId) -> MarkId {
        let mark = if self.catalogue.contains(mark) {
            mark
        } else {
            MarkId::UNSET
        };
        if self.assignments.len() <= position {
            self.assignments.resize(position + 1, MarkId::UNSET);
        }
        self.assignments[position] = mark;
        self.dirty = true;
        mark
    }

    /// Reset every assignment that no longer names a catalogue entry.
    ///
    /// Returns how many were reset.
    pub fn clamp_assignments(&mut self) -> usize {
        let mut clamped = 0;
        for mark in &mut self.assignments {
            if !self.catalogue.contains(*mark) {
                *mark = MarkId::UNSET;
                clamped += 1;
            }
        }
        if clamped > 0 {
            self.dirty = true;
        }
        clamped
    }

    /// Add a mark to the catalogue.
    ///
    /// # Errors
    ///
    /// Returns `CatalogueError` if the draft is rejected by the catalogue.
    pub fn add_mark(&mut self, draft: MarkDraft) -> Result<MarkId, CatalogueError> {
        let id = self.catalogue.add_mark(draft)?;
        self.dirty = true;
        Ok(id)
    }

    /// Remove a mark from the catalogue and reset assignments left dangling.
    ///
    /// # Errors
    ///
    /// Returns `CatalogueError` if the symbol is unknown or is the unset mark.
    pub fn remove_mark(&mut self, symbol: &str) -> Result<MarkId, CatalogueError> {
        let removed = self.catalogue.remove_mark(symbol)?;
        self.clamp_assignments();
        self.dirty = true;
        Ok(removed)
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> LessonUrl {
        LessonUrl::new(path)
    }

    #[test]
    fn ensure_appends_new_lessons_in_order() {
        let mut state = ProgressState::seeded();
        assert_eq!(state.ensure_lesson_record(0, url("intro"), 300_000), 0);
        assert_eq!(state.ensure_lesson_record(1, url("types"), 60_000), 1);
        assert_eq!(state.lessons().len(), 2);
        assert_eq!(state.lessons()[0].time_must_spend(), 300_000);
        assert!(state.is_dirty());
    }

    #[test]
    fn ensure_backfills_without_touching_progress() {
        let mut state = ProgressState::seeded();
        state.ensure_lesson_record(0, url("intro"), 0);
        state.lesson_mut(0).unwrap().record_scroll(450.0);
        state.mark_clean();

        assert_eq!(state.ensure_lesson_record(0, url("intro"), 60_000), 0);
        let record = state.lesson(0).unwrap();
        assert_eq!(record.time_must_spend(), 60_000);
        assert!((record.scrolled() - 450.0).abs() < f64::EPSILON);
        assert!(state.is_dirty());

        state.mark_clean();
        state.ensure_lesson_record(0, url("intro"), 1);
        assert!(!state.is_dirty());
        assert_eq!(state.lesson(0).unwrap().time_must_spend(), 60_000);
    }

    #[test]
    fn ensure_falls_back_to_url_lookup() {
        let mut state = ProgressState::seeded();
        state.ensure_lesson_record(0, url("intro"), 0);
        state.ensure_lesson_record(1, url("types"), 0);

        // the map now lists "types" first
        assert_eq!(state.ensure_lesson_record(0, url("types"), 0), 1);
        assert_eq!(state.ensure_lesson_record(1, url("intro"), 0), 0);
        assert_eq!(state.lessons().len(), 2);
    }

    #[test]
    fn links_without_a_path_keep_separate_records() {
        let mut state = ProgressState::seeded();
        assert_eq!(state.ensure_lesson_record(0, url(""), 0), 0);
        assert_eq!(state.ensure_lesson_record(1, url("intro"), 0), 1);
        assert_eq!(state.ensure_lesson_record(2, url(""), 0), 2);
        state.set_mark_id(0, MarkId::new(2));
        state.set_mark_id(2, MarkId::new(3));

        // reloading the same map reuses each row's own record
        assert_eq!(state.ensure_lesson_record(0, url(""), 0), 0);
        assert_eq!(state.ensure_lesson_record(2, url(""), 0), 2);
        assert_eq!(state.lessons().len(), 3);
        assert_eq!(state.mark_for(0), MarkId::new(2));
        assert_eq!(state.mark_for(2), MarkId::new(3));
    }

    #[test]
    fn out_of_range_mark_clamps_to_unset() {
        let mut state = ProgressState::seeded();
        assert_eq!(state.set_mark_id(3, MarkId::new(42)), MarkId::UNSET);
        assert_eq!(state.assignments().len(), 4);
        assert_eq!(state.mark_for(3), MarkId::UNSET);
        assert_eq!(state.mark_for(10), MarkId::UNSET);
    }

    #[test]
    fn removing_a_mark_resets_dangling_assignments() {
        let mut state = ProgressState::seeded();
        state.set_mark_id(0, MarkId::new(4));
        state.set_mark_id(1, MarkId::new(1));
        state.remove_mark("!").unwrap();

        assert_eq!(state.catalogue().len(), 4);
        assert_eq!(state.mark_for(0), MarkId::UNSET);
        assert_eq!(state.mark_for(1), MarkId::new(1));
    }
}
