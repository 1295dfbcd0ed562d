use serde::Deserialize;

use marks_core::ThresholdTable;
use marks_core::evaluator::DEFAULT_TOTAL_LESSONS;
use marks_core::thresholds::DEFAULT_THRESHOLDS_MS;

/// Site-specific settings for page sessions. Hosts deserialize it from
/// their own configuration; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path of the lesson-list page.
    pub map_path: String,
    /// Query flag that opens the map on any page, e.g. `?map`.
    pub map_query_flag: Option<String>,
    /// Reading time per map position, in milliseconds.
    pub thresholds_ms: Vec<u64>,
    /// Reading time for positions past `thresholds_ms`.
    pub fallback_threshold_ms: u64,
    /// Lesson count the progress percentage is measured against.
    pub total_lessons: usize,
}

impl SessionConfig {
    #[must_use]
    pub fn threshold_table(&self) -> ThresholdTable {
        ThresholdTable::new(self.thresholds_ms.clone(), self.fallback_threshold_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            map_path: "/".to_owned(),
            map_query_flag: Some("map".to_owned()),
            thresholds_ms: DEFAULT_THRESHOLDS_MS.to_vec(),
            fallback_threshold_ms: 0,
            total_lessons: DEFAULT_TOTAL_LESSONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = serde_json::from_str::<SessionConfig>(r#"{"total_lessons": 120}"#).unwrap();
        assert_eq!(config.total_lessons, 120);
        assert_eq!(config.map_path, "/");
        assert_eq!(config.threshold_table().threshold_for(0), 300_000);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(serde_json::from_str::<SessionConfig>(r#"{"total_lessons": "many"}"#).is_err());
    }
}
