//! Nullable transport — records relays instead of gossiping them.

use directsend_engine::adapters::Transport;
use directsend_messages::Inv;
use directsend_types::{HashedTransaction, TxHash};
use std::sync::Mutex;

pub struct NullTransport {
    inventories: Mutex<Vec<Inv>>,
    transactions: Mutex<Vec<TxHash>>,
}

impl NullTransport {
    pub fn new() -> Self {
        Self {
            inventories: Mutex::new(Vec::new()),
            transactions: Mutex::new(Vec::new()),
        }
    }

    /// Every inventory relayed so far (for assertions).
    pub fn relayed_inventories(&self) -> Vec<Inv> {
        self.inventories.lock().unwrap().clone()
    }

    /// Every transaction relayed so far (for assertions).
    pub fn relayed_transactions(&self) -> Vec<TxHash> {
        self.transactions.lock().unwrap().clone()
    }

    pub fn reset(&self) {
        self.inventories.lock().unwrap().clear();
        self.transactions.lock().unwrap().clear();
    }
}

impl Default for NullTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for NullTransport {
    fn relay_inventory(&self, inv: Inv) {
        self.inventories.lock().unwrap().push(inv);
    }

    fn relay_transaction(&self, req: &HashedTransaction) {
        self.transactions.lock().unwrap().push(req.hash);
    }
}
