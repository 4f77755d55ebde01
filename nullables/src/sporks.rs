//! Nullable feature-flag oracle.

use directsend_engine::adapters::{Spork, SporkOracle};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub struct NullSporks {
    active: Mutex<HashSet<Spork>>,
    max_lock_value: AtomicU64,
}

impl NullSporks {
    /// All flags start inactive; the value ceiling starts unlimited.
    pub fn new() -> Self {
        Self {
            active: Mutex::new(HashSet::new()),
            max_lock_value: AtomicU64::new(u64::MAX),
        }
    }

    /// Both locking flags on, unlimited value — the usual test setup.
    pub fn all_active() -> Self {
        let sporks = Self::new();
        sporks.set_active(Spork::DirectsendEnabled, true);
        sporks.set_active(Spork::BlockFiltering, true);
        sporks
    }

    pub fn set_active(&self, spork: Spork, active: bool) {
        let mut set = self.active.lock().unwrap();
        if active {
            set.insert(spork);
        } else {
            set.remove(&spork);
        }
    }

    pub fn set_max_lock_value(&self, value: u64) {
        self.max_lock_value.store(value, Ordering::Relaxed);
    }
}

impl Default for NullSporks {
    fn default() -> Self {
        Self::new()
    }
}

impl SporkOracle for NullSporks {
    fn is_active(&self, spork: Spork) -> bool {
        self.active.lock().unwrap().contains(&spork)
    }

    fn max_lock_value(&self) -> u64 {
        self.max_lock_value.load(Ordering::Relaxed)
    }
}
