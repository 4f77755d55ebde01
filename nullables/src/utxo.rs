//! Nullable UTXO set — an in-memory map under test control.

use directsend_engine::adapters::{Utxo, UtxoView};
use directsend_types::OutPoint;
use std::collections::HashMap;
use std::sync::Mutex;

/// A UTXO view backed by a plain map. Insert and remove entries to
/// simulate coins being created and spent.
pub struct NullUtxoView {
    utxos: Mutex<HashMap<OutPoint, Utxo>>,
}

impl NullUtxoView {
    pub fn new() -> Self {
        Self {
            utxos: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, outpoint: OutPoint, utxo: Utxo) {
        self.utxos.lock().unwrap().insert(outpoint, utxo);
    }

    /// Simulate the output being spent by a mined transaction.
    pub fn remove(&self, outpoint: &OutPoint) {
        self.utxos.lock().unwrap().remove(outpoint);
    }
}

impl Default for NullUtxoView {
    fn default() -> Self {
        Self::new()
    }
}

impl UtxoView for NullUtxoView {
    fn get_utxo(&self, outpoint: &OutPoint) -> Option<Utxo> {
        self.utxos.lock().unwrap().get(outpoint).cloned()
    }
}
