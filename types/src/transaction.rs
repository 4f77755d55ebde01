//! Minimal UTXO transaction model.
//!
//! Only the shape the locking subsystem needs: inputs referencing prior
//! outpoints, outputs carrying a value and a coarse script classification.
//! Script execution and full consensus validation happen upstream.

use crate::hash::TxHash;
use crate::outpoint::OutPoint;
use serde::{Deserialize, Serialize};

/// Coarse classification of an output script.
///
/// Lock requests only admit normal payment scripts and unspendable data
/// carriers; anything else is non-standard for locking purposes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Script {
    /// Standard pay-to-pubkey-hash / pay-to-script-hash payment.
    NormalPayment,
    /// Provably unspendable data output (OP_RETURN style).
    Unspendable,
    /// Anything else.
    NonStandard,
}

impl Script {
    pub fn is_normal_payment(&self) -> bool {
        matches!(self, Script::NormalPayment)
    }

    pub fn is_unspendable(&self) -> bool {
        matches!(self, Script::Unspendable)
    }
}

/// A transaction input spending a prior output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    pub prevout: OutPoint,
}

impl TxIn {
    pub fn new(prevout: OutPoint) -> Self {
        Self { prevout }
    }
}

/// A transaction output: a value (in duffs) and its script class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub value: u64,
    pub script: Script,
}

impl TxOut {
    pub fn new(value: u64, script: Script) -> Self {
        Self { value, script }
    }
}

/// A transaction submitted for locking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    /// Earliest block height at which the transaction is final (0 = always).
    pub lock_time: u32,
}

impl Transaction {
    pub fn new(inputs: Vec<TxIn>, outputs: Vec<TxOut>) -> Self {
        Self {
            inputs,
            outputs,
            lock_time: 0,
        }
    }

    /// Whether the transaction is final at the given chain height.
    pub fn is_final_at(&self, height: u32) -> bool {
        self.lock_time == 0 || self.lock_time <= height
    }

    /// Total output value.
    pub fn value_out(&self) -> u64 {
        self.outputs.iter().map(|o| o.value).sum()
    }
}

/// Cached pairing of a transaction with its hash.
///
/// The hash is computed once by `directsend_crypto::hash_transaction` at
/// construction sites; carrying it avoids re-serializing on every index
/// lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedTransaction {
    pub tx: Transaction,
    pub hash: TxHash,
}

impl HashedTransaction {
    pub fn new(tx: Transaction, hash: TxHash) -> Self {
        Self { tx, hash }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hash(byte: u8) -> TxHash {
        TxHash::new([byte; 32])
    }

    fn simple_tx() -> Transaction {
        Transaction::new(
            vec![TxIn::new(OutPoint::new(make_hash(1), 0))],
            vec![TxOut::new(500, Script::NormalPayment)],
        )
    }

    #[test]
    fn value_out_sums_outputs() {
        let mut tx = simple_tx();
        tx.outputs.push(TxOut::new(250, Script::Unspendable));
        assert_eq!(tx.value_out(), 750);
    }

    #[test]
    fn zero_lock_time_is_always_final() {
        let tx = simple_tx();
        assert!(tx.is_final_at(0));
        assert!(tx.is_final_at(1_000_000));
    }

    #[test]
    fn lock_time_gates_finality() {
        let mut tx = simple_tx();
        tx.lock_time = 100;
        assert!(!tx.is_final_at(99));
        assert!(tx.is_final_at(100));
    }

    #[test]
    fn script_classification() {
        assert!(Script::NormalPayment.is_normal_payment());
        assert!(!Script::NormalPayment.is_unspendable());
        assert!(Script::Unspendable.is_unspendable());
        assert!(!Script::NonStandard.is_normal_payment());
        assert!(!Script::NonStandard.is_unspendable());
    }
}
