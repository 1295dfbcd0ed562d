//! Persisted JSON shapes and their conversion into [`ProgressState`].
//!
//! Two historical layouts exist. Older releases kept everything in the synced
//! tier: a symbol array, an options object and one flat key per lesson. The
//! current layout is a single document in the local tier. Both are decoded
//! here and converted once; nothing above this module sees the raw shapes.

use std::collections::BTreeMap;

use marks_core::model::{
    LessonRecord, LessonRecordParts, LessonUrl, MarkCatalogue, MarkId, ProgressState, ScrollTarget,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Local-tier key of the unified document.
pub const UNIFIED_KEY: &str = "learnjavascriptmarks";

/// Synced-tier key of the legacy symbol array.
pub const LEGACY_MARKS_KEY: &str = "learnjavascriptmarks";

/// Synced-tier key of the legacy options object.
pub const LEGACY_OPTIONS_KEY: &str = "learnjavascriptoptions";

/// Flat keys whose digits read as an index at or above this are not lesson
/// keys (timestamps, cache ids).
pub const MAX_LEGACY_LESSONS: usize = 1024;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),
}

/// A mark id as older writers stored it: a number, a numeric string or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum RawMarkId {
    Number(i64),
    Text(String),
}

impl RawMarkId {
    fn into_mark_id(raw: Option<Self>) -> MarkId {
        match raw {
            Some(RawMarkId::Number(n)) => usize::try_from(n).map_or(MarkId::UNSET, MarkId::new),
            Some(RawMarkId::Text(s)) => s.trim().parse::<usize>().map_or(MarkId::UNSET, MarkId::new),
            None => MarkId::UNSET,
        }
    }

    fn from_mark_id(mark: MarkId) -> Option<Self> {
        Some(RawMarkId::Number(i64::try_from(mark.value()).unwrap_or(0)))
    }
}

/// One entry of the `progress` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonDocument {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub learned: bool,
    #[serde(default)]
    pub scrolled: f64,
    #[serde(default)]
    pub must_scroll: Vec<f64>,
    #[serde(default)]
    pub time_spent: u64,
    #[serde(default)]
    pub time_must_spend: Option<u64>,
}

impl LessonDocument {
    fn from_record(record: &LessonRecord) -> Self {
        let target = record.must_scroll();
        Self {
            url: record.url().as_str().to_owned(),
            learned: record.learned(),
            scrolled: record.scrolled(),
            must_scroll: vec![target.distance, target.viewport_width],
            time_spent: record.time_spent(),
            time_must_spend: Some(record.time_must_spend()),
        }
    }

    fn into_record(self) -> LessonRecord {
        let distance = self.must_scroll.first().copied().unwrap_or(0.0);
        let width = self.must_scroll.get(1).copied().unwrap_or(0.0);
        LessonRecord::from_parts(LessonRecordParts {
            url: LessonUrl::new(self.url),
            learned: self.learned,
            scrolled: self.scrolled,
            must_scroll: ScrollTarget::new(distance, width),
            time_spent: self.time_spent,
            time_must_spend: self.time_must_spend.unwrap_or(0),
        })
    }
}

/// The single local-tier document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedDocument {
    marks: Vec<String>,
    #[serde(default)]
    pallete: Vec<String>,
    #[serde(default)]
    desc: Vec<String>,
    #[serde(default)]
    mark_id: Vec<Option<RawMarkId>>,
    #[serde(default)]
    progress: Vec<LessonDocument>,
}

impl UnifiedDocument {
    #[must_use]
    pub fn from_state(state: &ProgressState) -> Self {
        let catalogue = state.catalogue();
        Self {
            marks: catalogue.symbols().to_vec(),
            pallete: catalogue.styles().to_vec(),
            desc: catalogue.descriptions().to_vec(),
            mark_id: state
                .assignments()
                .iter()
                .copied()
                .map(RawMarkId::from_mark_id)
                .collect(),
            progress: state.lessons().iter().map(LessonDocument::from_record).collect(),
        }
    }

    #[must_use]
    pub fn into_state(self) -> ProgressState {
        let catalogue = MarkCatalogue::from_parts(self.marks, self.desc, self.pallete);
        let assignments = self
            .mark_id
            .into_iter()
            .map(RawMarkId::into_mark_id)
            .collect();
        let lessons = self
            .progress
            .into_iter()
            .map(LessonDocument::into_record)
            .collect();
        ProgressState::new(catalogue, lessons, assignments)
    }

    /// # Errors
    ///
    /// Returns `DocumentError` if `raw` is not a document of the expected shape.
    pub fn decode(raw: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// # Errors
    ///
    /// Returns `DocumentError` if serialization fails.
    pub fn encode(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The legacy options object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LegacyOptions {
    #[serde(default)]
    pub pallete: Vec<String>,
    #[serde(default)]
    pub desc: Vec<String>,
    #[serde(default)]
    pub progress: Vec<LessonDocument>,
}

/// Everything the synced tier held before the unified document existed.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacySyncedShape {
    pub marks: Vec<String>,
    pub options: LegacyOptions,
    /// Mark id per lesson index, taken from the flat per-lesson keys.
    pub flat_marks: BTreeMap<usize, MarkId>,
}

impl LegacySyncedShape {
    /// Recognise the legacy layout among all synced-tier entries.
    ///
    /// Returns `Ok(None)` unless both the symbol array and the options object
    /// are present.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if either legacy blob is present but malformed.
    pub fn detect(entries: &[(String, String)]) -> Result<Option<Self>, DocumentError> {
        let lookup = |key: &str| {
            entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        let (Some(marks), Some(options)) = (lookup(LEGACY_MARKS_KEY), lookup(LEGACY_OPTIONS_KEY))
        else {
            return Ok(None);
        };
        let marks: Vec<String> = serde_json::from_str(marks)?;
        let options: LegacyOptions = serde_json::from_str(options)?;

        let flat_marks = entries
            .iter()
            .filter(|(key, _)| key != LEGACY_MARKS_KEY && key != LEGACY_OPTIONS_KEY)
            .filter_map(|(key, value)| Some((lesson_index_from_key(key)?, parse_flat_mark(value))))
            .collect();

        Ok(Some(Self {
            marks,
            options,
            flat_marks,
        }))
    }

    /// Fold the legacy pieces into one state.
    ///
    /// Flat ids are placed at their lesson index, so the order never depends
    /// on how the tier enumerated its keys. Indexes with no key read as unset.
    #[must_use]
    pub fn into_state(self) -> ProgressState {
        let catalogue = MarkCatalogue::from_parts(self.marks, self.options.desc, self.options.pallete);
        let flat_marks: BTreeMap<usize, MarkId> = self
            .flat_marks
            .into_iter()
            .filter(|(index, _)| *index < MAX_LEGACY_LESSONS)
            .collect();
        let len = flat_marks
            .keys()
            .next_back()
            .and_then(|last| last.checked_add(1))
            .unwrap_or(0);
        let mut assignments = vec![MarkId::UNSET; len];
        for (index, mark) in flat_marks {
            assignments[index] = mark;
        }
        let lessons = self
            .options
            .progress
            .into_iter()
            .map(LessonDocument::into_record)
            .collect();
        ProgressState::new(catalogue, lessons, assignments)
    }
}

/// What a page finds in storage before it can build a [`ProgressState`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoredShape {
    /// The current local-tier document.
    Unified(UnifiedDocument),
    /// Pre-unification synced-tier data.
    Legacy(LegacySyncedShape),
    /// Nothing usable; first install.
    Absent,
}

impl StoredShape {
    #[must_use]
    pub fn into_state(self) -> ProgressState {
        match self {
            StoredShape::Unified(doc) => doc.into_state(),
            StoredShape::Legacy(legacy) => legacy.into_state(),
            StoredShape::Absent => ProgressState::seeded(),
        }
    }
}

/// Digits of a flat key, e.g. `parent_12` -> 12. Keys without digits, or
/// whose digits name an index past [`MAX_LEGACY_LESSONS`], are not lesson keys.
fn lesson_index_from_key(key: &str) -> Option<usize> {
    let digits: String = key.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let index = digits.parse::<usize>().ok().filter(|i| *i < MAX_LEGACY_LESSONS);
    if index.is_none() {
        tracing::debug!(key, "ignoring synced key that is not a lesson key");
    }
    index
}

fn parse_flat_mark(value: &str) -> MarkId {
    match serde_json::from_str::<Option<RawMarkId>>(value) {
        Ok(raw) => RawMarkId::into_mark_id(raw),
        Err(_) => value.trim().parse::<usize>().map_or(MarkId::UNSET, MarkId::new),
    }
}
