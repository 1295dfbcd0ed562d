/// Reading time required per lesson, by position on the map.
///
/// Lessons past the end of the table use the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdTable {
    per_position: Vec<u64>,
    fallback: u64,
}

/// Built-in thresholds in milliseconds: five minutes for the first lesson,
/// one minute for the next three.
pub const DEFAULT_THRESHOLDS_MS: [u64; 4] = [300_000, 60_000, 60_000, 60_000];

impl ThresholdTable {
    #[must_use]
    pub fn new(per_position: Vec<u64>, fallback: u64) -> Self {
        Self {
            per_position,
            fallback,
        }
    }

    #[must_use]
    pub fn threshold_for(&self, position: usize) -> u64 {
        self.per_position
            .get(position)
            .copied()
            .unwrap_or(self.fallback)
    }

    #[must_use]
    pub fn fallback(&self) -> u64 {
        self.fallback
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLDS_MS.to_vec(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_past_the_table_use_the_fallback() {
        let table = ThresholdTable::default();
        assert_eq!(table.threshold_for(0), 300_000);
        assert_eq!(table.threshold_for(3), 60_000);
        assert_eq!(table.threshold_for(4), 0);

        let table = ThresholdTable::new(vec![1], 90_000);
        assert_eq!(table.threshold_for(7), 90_000);
    }
}
