//! Wall-clock time for lock lifecycles.
//!
//! Candidates, orphan votes, and rate-limit epochs all age against Unix
//! wall time. Every check takes an explicit `now` so tests can drive the
//! lifecycle with a fake clock instead of sleeping.

use serde::{Deserialize, Serialize};
use std::time::UNIX_EPOCH;

/// A Unix timestamp in whole seconds (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Time zero; also the floor for rate-limit epoch averaging.
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// The system clock, pinned to zero if it reads before the epoch.
    pub fn now() -> Self {
        Self(UNIX_EPOCH.elapsed().map_or(0, |d| d.as_secs()))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// This instant shifted forward, for epoch and deadline bookkeeping.
    pub fn saturating_add_secs(&self, secs: u64) -> Timestamp {
        Self(self.0.saturating_add(secs))
    }

    /// Whether more than `window_secs` have passed since this instant.
    ///
    /// Timeout and failure checks are strictly-greater: an entry created
    /// exactly `window_secs` ago is still live.
    pub fn age_exceeds(&self, now: Timestamp, window_secs: u64) -> bool {
        now.0.saturating_sub(self.0) > window_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_window_is_strictly_greater() {
        let created = Timestamp::new(100);
        assert!(!created.age_exceeds(Timestamp::new(115), 15));
        assert!(created.age_exceeds(Timestamp::new(116), 15));
    }

    #[test]
    fn future_instants_have_no_age() {
        let created = Timestamp::new(200);
        assert!(!created.age_exceeds(Timestamp::new(100), 0));
    }

    #[test]
    fn saturating_add_caps_at_max() {
        let t = Timestamp::new(u64::MAX - 1);
        assert_eq!(t.saturating_add_secs(100).as_secs(), u64::MAX);
    }
}
