//! Testability port for injecting time.

use chrono::{DateTime, Utc};

/// Source of "now" for every time comparison in the engine.
#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
