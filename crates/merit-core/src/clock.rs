//! # Clock Collaborator
//!
//! The core never reads the wall clock. Every operation that stamps
//! `updated_at` receives its timestamp from a `Clock`, which keeps the
//! engine deterministic and lets tests pin time exactly.

use crate::types::Timestamp;

/// Source of the current time, in whole epoch seconds.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// A clock pinned to a fixed instant. Test double, also useful for replay.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl FixedClock {
    /// Pin the clock to the given epoch-seconds instant.
    #[must_use]
    pub const fn at(secs: i64) -> Self {
        Self(Timestamp::new(secs))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
