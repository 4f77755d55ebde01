//! Outpoint and voter identity types.
//!
//! An outpoint references a specific output of a prior transaction. Voters
//! (masternodes) are themselves identified by their funding outpoint, so the
//! same 36-byte shape serves both roles.

use crate::hash::TxHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to a specific output of a prior transaction.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    /// Hash of the transaction holding the output.
    pub txid: TxHash,
    /// Index of the output within that transaction.
    pub index: u32,
}

impl OutPoint {
    pub fn new(txid: TxHash, index: u32) -> Self {
        Self { txid, index }
    }

    /// Short textual form: `hex(txid):dec(index)`.
    ///
    /// This exact rendering is part of the signed vote message, so it must
    /// stay stable across versions.
    pub fn short(&self) -> String {
        format!("{}:{}", self.txid, self.index)
    }
}

impl fmt::Debug for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutPoint({:?}:{})", self.txid, self.index)
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

/// A voter (masternode) identity — the outpoint funding its collateral.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoterId(pub OutPoint);

impl VoterId {
    pub fn new(outpoint: OutPoint) -> Self {
        Self(outpoint)
    }

    pub fn as_outpoint(&self) -> &OutPoint {
        &self.0
    }

    pub fn short(&self) -> String {
        self.0.short()
    }
}

impl fmt::Debug for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VoterId({:?}:{})", self.0.txid, self.0.index)
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hash(byte: u8) -> TxHash {
        TxHash::new([byte; 32])
    }

    #[test]
    fn short_form_is_hex_colon_index() {
        let op = OutPoint::new(make_hash(0xab), 7);
        let s = op.short();
        assert!(s.starts_with("abab"));
        assert!(s.ends_with(":7"));
    }

    #[test]
    fn outpoints_order_by_txid_then_index() {
        let a = OutPoint::new(make_hash(1), 5);
        let b = OutPoint::new(make_hash(1), 6);
        let c = OutPoint::new(make_hash(2), 0);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn voter_id_short_matches_outpoint() {
        let op = OutPoint::new(make_hash(3), 1);
        assert_eq!(VoterId::new(op).short(), op.short());
    }
}
