//! Nullable chain and mempool view.

use directsend_engine::adapters::ChainView;
use directsend_types::{BlockHash, OutPoint, Transaction, TxHash};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

pub struct NullChain {
    height: AtomicU32,
    fork_warning: AtomicBool,
    transactions: Mutex<HashMap<TxHash, (Transaction, BlockHash)>>,
    spenders: Mutex<HashMap<OutPoint, TxHash>>,
}

impl NullChain {
    pub fn new() -> Self {
        Self {
            height: AtomicU32::new(0),
            fork_warning: AtomicBool::new(false),
            transactions: Mutex::new(HashMap::new()),
            spenders: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_height(&self, height: u32) {
        self.height.store(height, Ordering::Relaxed);
    }

    pub fn set_fork_warning(&self, warning: bool) {
        self.fork_warning.store(warning, Ordering::Relaxed);
    }

    /// Make a transaction visible, optionally inside a block.
    pub fn add_transaction(&self, hash: TxHash, tx: Transaction, block: BlockHash) {
        self.transactions.lock().unwrap().insert(hash, (tx, block));
    }

    /// Simulate a mempool transaction spending an outpoint.
    pub fn add_mempool_spender(&self, outpoint: OutPoint, spender: TxHash) {
        self.spenders.lock().unwrap().insert(outpoint, spender);
    }

    pub fn clear_mempool(&self) {
        self.spenders.lock().unwrap().clear();
    }
}

impl Default for NullChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainView for NullChain {
    fn height(&self) -> u32 {
        self.height.load(Ordering::Relaxed)
    }

    fn is_fork_warning(&self) -> bool {
        self.fork_warning.load(Ordering::Relaxed)
    }

    fn get_transaction(&self, hash: &TxHash) -> Option<(Transaction, BlockHash)> {
        self.transactions.lock().unwrap().get(hash).cloned()
    }

    fn mempool_spender(&self, outpoint: &OutPoint) -> Option<TxHash> {
        self.spenders.lock().unwrap().get(outpoint).copied()
    }
}
