//! Nullable wallet sink — records notifications instead of updating a UI.

use directsend_engine::adapters::WalletSink;
use directsend_types::{HashedTransaction, TxHash};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub struct NullWallet {
    /// Whether `transaction_updated` reports the tx as tracked.
    tracks_transactions: AtomicBool,
    updated: Mutex<Vec<TxHash>>,
    lock_notifications: Mutex<Vec<TxHash>>,
}

impl NullWallet {
    pub fn new() -> Self {
        Self {
            tracks_transactions: AtomicBool::new(true),
            updated: Mutex::new(Vec::new()),
            lock_notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn set_tracks_transactions(&self, tracks: bool) {
        self.tracks_transactions.store(tracks, Ordering::Relaxed);
    }

    /// Transactions reported as updated (for assertions).
    pub fn updated(&self) -> Vec<TxHash> {
        self.updated.lock().unwrap().clone()
    }

    /// Lock notifications received (for assertions).
    pub fn lock_notifications(&self) -> Vec<TxHash> {
        self.lock_notifications.lock().unwrap().clone()
    }
}

impl Default for NullWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletSink for NullWallet {
    fn transaction_updated(&self, hash: &TxHash) -> bool {
        self.updated.lock().unwrap().push(*hash);
        self.tracks_transactions.load(Ordering::Relaxed)
    }

    fn notify_lock(&self, req: &HashedTransaction) {
        self.lock_notifications.lock().unwrap().push(req.hash);
    }
}
