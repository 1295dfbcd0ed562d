#![forbid(unsafe_code)]

pub mod evaluator;
pub mod model;
pub mod thresholds;
pub mod time;

pub use evaluator::ProgressSummary;
pub use thresholds::ThresholdTable;
pub use time::{Clock, SessionClock};
