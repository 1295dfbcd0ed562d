use chrono::{DateTime, Duration, Utc};

/// A simple clock abstraction for deterministic time in sessions and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Reference point for accruing reading time on an article page.
///
/// The reference is taken once when the page session starts. Reading the
/// elapsed time does not move it; only [`SessionClock::restart`] does, so
/// repeated reads keep measuring from the first start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    started_at: DateTime<Utc>,
}

impl SessionClock {
    #[must_use]
    pub fn start(at: DateTime<Utc>) -> Self {
        Self { started_at: at }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Milliseconds between the reference and `now`, zero if `now` is earlier.
    #[must_use]
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = now.signed_duration_since(self.started_at).num_milliseconds();
        u64::try_from(elapsed).unwrap_or(0)
    }

    pub fn restart(&mut self, at: DateTime<Utc>) {
        self.started_at = at;
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
