//! Learned-state rules: when a lesson counts as read, which marks mean
//! "done", and how many lessons are complete.

use crate::model::{LessonRecord, MarkCatalogue, MarkId, ProgressState};

/// Descriptions that mean a lesson is complete.
pub const COMPLETION_WORDS: [&str; 6] = [
    "learned",
    "studied",
    "done",
    "усвоено",
    "изучено",
    "выполнено",
];

/// Descriptions that also count as complete when chosen explicitly.
pub const EMPHASIS_WORDS: [&str; 2] = ["important", "важно"];

/// Number of lessons in the tutorial, used for the percentage.
pub const DEFAULT_TOTAL_LESSONS: usize = 217;

/// Both thresholds reached; equality satisfies.
#[must_use]
pub fn is_learned(record: &LessonRecord) -> bool {
    record.scrolled() >= record.must_scroll().distance
        && record.time_spent() >= record.time_must_spend()
}

/// Whether `mark` denotes a completed lesson.
///
/// The unset mark never does, whatever its description says.
#[must_use]
pub fn is_completion_mark(catalogue: &MarkCatalogue, mark: MarkId) -> bool {
    if mark.is_unset() {
        return false;
    }
    let Some(description) = catalogue.description(mark) else {
        return false;
    };
    let description = description.trim().to_lowercase();
    COMPLETION_WORDS
        .iter()
        .chain(EMPHASIS_WORDS.iter())
        .any(|word| *word == description)
}

/// First catalogue entry whose description is a completion word, trying the
/// words in order. Used to suggest a selection for learned, unmarked lessons.
#[must_use]
pub fn completion_mark_index(catalogue: &MarkCatalogue) -> Option<MarkId> {
    let descriptions: Vec<String> = catalogue
        .descriptions()
        .iter()
        .map(|d| d.trim().to_lowercase())
        .collect();
    COMPLETION_WORDS.iter().find_map(|word| {
        descriptions
            .iter()
            .position(|d| d == word)
            .map(MarkId::new)
    })
}

/// Lessons that are learned and carry a completion mark.
#[must_use]
pub fn recompute_aggregate(state: &ProgressState) -> usize {
    state
        .lessons()
        .iter()
        .enumerate()
        .filter(|(position, record)| {
            record.learned() && is_completion_mark(state.catalogue(), state.mark_for(*position))
        })
        .count()
}

/// Aggregate progress as shown next to the map title.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSummary {
    pub learned: usize,
    pub total: usize,
    pub percent: f64,
}

impl ProgressSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(learned: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            learned as f64 / total as f64 * 100.0
        };
        Self {
            learned,
            total,
            percent,
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "Lessons learned: {} Progress: {:.2}%",
            self.learned, self.percent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LessonUrl, ScrollTarget};
    use proptest::prelude::*;

    fn catalogue(descriptions: &[&str]) -> MarkCatalogue {
        let symbols = ["S", "?", "!", "\u{2713}", "\u{2605}"];
        MarkCatalogue::from_parts(
            symbols[..descriptions.len()]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            descriptions.iter().map(|s| (*s).to_owned()).collect(),
            Vec::new(),
        )
    }

    fn record(scrolled: f64, target: f64, spent: u64, must_spend: u64) -> LessonRecord {
        let mut record = LessonRecord::new(LessonUrl::new("lesson"), must_spend);
        record.set_scroll_target(ScrollTarget::new(target, 1024.0));
        record.record_scroll(scrolled);
        record.accrue_time(spent);
        record
    }

    #[test]
    fn boundary_values_count_as_learned() {
        assert!(is_learned(&record(500.0, 500.0, 60_000, 60_000)));
        assert!(!is_learned(&record(499.0, 500.0, 60_000, 60_000)));
        assert!(!is_learned(&record(500.0, 500.0, 59_999, 60_000)));
    }

    #[test]
    fn important_only_counts_for_chosen_marks() {
        let catalogue = catalogue(&["Important", "Unclear", "Important", "Learned"]);
        assert!(!is_completion_mark(&catalogue, MarkId::new(0)));
        assert!(!is_completion_mark(&catalogue, MarkId::new(1)));
        assert!(is_completion_mark(&catalogue, MarkId::new(2)));
        assert!(is_completion_mark(&catalogue, MarkId::new(3)));
        assert!(!is_completion_mark(&catalogue, MarkId::new(9)));
    }

    #[test]
    fn legacy_russian_descriptions_are_recognised() {
        let catalogue = catalogue(&["Выбрать", "Не все ясно", "Важно", "Усвоено", "Прочитано"]);
        assert!(is_completion_mark(&catalogue, MarkId::new(2)));
        assert!(is_completion_mark(&catalogue, MarkId::new(3)));
        assert!(!is_completion_mark(&catalogue, MarkId::new(4)));
        assert_eq!(completion_mark_index(&catalogue), Some(MarkId::new(3)));
    }

    #[test]
    fn suggestion_ignores_emphasis_words() {
        let catalogue = catalogue(&["Choose", "Important"]);
        assert_eq!(completion_mark_index(&catalogue), None);
    }

    #[test]
    fn completion_mark_on_learned_lesson_counts_once() {
        let mut state = ProgressState::new(
            catalogue(&["Choose", "Unclear", "Important", "Learned"]),
            vec![record(10.0, 0.0, 0, 0)],
            vec![MarkId::new(3)],
        );
        state.lesson_mut(0).unwrap().evaluate();
        assert_eq!(state.recompute_aggregate(), 1);
    }

    #[test]
    fn unset_mark_on_learned_lesson_does_not_count() {
        let mut learned = record(10.0, 0.0, 0, 0);
        learned.evaluate();
        let mut other = record(10.0, 0.0, 0, 0);
        other.evaluate();
        let mut state = ProgressState::new(
            catalogue(&["Choose", "Unclear", "Important", "Learned"]),
            vec![learned, other],
            vec![MarkId::UNSET, MarkId::new(3)],
        );
        assert_eq!(state.recompute_aggregate(), 1);
    }

    #[test]
    fn summary_label_shows_two_decimals() {
        let summary = ProgressSummary::new(31, DEFAULT_TOTAL_LESSONS);
        assert_eq!(summary.label(), "Lessons learned: 31 Progress: 14.29%");
        assert!(ProgressSummary::new(3, 0).percent.abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn scrolled_never_decreases(offsets in proptest::collection::vec(-1_000.0f64..10_000.0, 0..64)) {
            let mut record = LessonRecord::new(LessonUrl::new("lesson"), 0);
            let mut previous = record.scrolled();
            for offset in offsets {
                record.record_scroll(offset);
                prop_assert!(record.scrolled() >= previous);
                previous = record.scrolled();
            }
        }

        #[test]
        fn aggregate_matches_enumeration(
            lessons in proptest::collection::vec((any::<bool>(), 0usize..7), 0..40),
        ) {
            let mut state = ProgressState::seeded();
            for (i, (learned, mark)) in lessons.iter().enumerate() {
                let position = state.ensure_lesson_record(i, LessonUrl::new(format!("l{i}")), 0);
                if *learned {
                    state.lesson_mut(position).unwrap().evaluate();
                }
                state.set_mark_id(position, MarkId::new(*mark));
            }

            let expected = lessons
                .iter()
                .filter(|(learned, mark)| *learned && matches!(*mark, 2 | 3))
                .count();
            prop_assert_eq!(state.recompute_aggregate(), expected);
            prop_assert_eq!(state.recompute_aggregate(), expected);
        }
    }
}
