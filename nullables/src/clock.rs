//! Test clock for exercising lock lifecycles.
//!
//! Candidates, orphan votes, and rate-limit epochs all age against an
//! explicit `now`. Tests hold one of these, feed `now()` into the engine's
//! entry points, and jump it forward to cross the timeout and failure
//! windows (or a maintenance interval) without sleeping.

use directsend_types::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};

/// A hand-driven clock. Starts at `initial_secs` and moves only on
/// [`NullClock::advance`].
pub struct NullClock {
    current: AtomicU64,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: AtomicU64::new(initial_secs),
        }
    }

    /// The instant to hand to the engine's next call.
    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.load(Ordering::Relaxed))
    }

    /// Age every tracked entry by `secs` — stepping past
    /// `LOCK_TIMEOUT_SECONDS` or `FAILED_TIMEOUT_SECONDS` is how tests
    /// trigger the reaping paths.
    pub fn advance(&self, secs: u64) {
        self.current.fetch_add(secs, Ordering::Relaxed);
    }
}
