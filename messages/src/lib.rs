//! Network message types for Directsend node-to-node gossip.
//!
//! Two messages matter to the locking subsystem: the lock request (a full
//! transaction) and the lock vote. Both are advertised by hash through
//! inventory messages; the vote gets its own inventory kind so peers can
//! request individual votes by vote-hash.

use directsend_types::{OutPoint, Signature, Timestamp, TxHash, VoterId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wire protocol version stamped into every header and into vote hashes.
pub const PROTOCOL_VERSION: u32 = 70208;

/// Minimum peer protocol version whose lock votes we evaluate.
pub const MIN_LOCK_PROTO_VERSION: u32 = 70206;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Inventory kind codes. Lock votes get a distinct code so peers can
/// request them by vote-hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum InvKind {
    Tx = 1,
    Block = 2,
    TxLockRequest = 30,
    TxLockVote = 31,
}

/// An inventory advertisement: kind + 32-byte hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inv {
    pub kind: InvKind,
    pub hash: [u8; 32],
}

impl Inv {
    pub fn lock_vote(hash: TxHash) -> Self {
        Self {
            kind: InvKind::TxLockVote,
            hash: *hash.as_bytes(),
        }
    }

    pub fn lock_request(hash: TxHash) -> Self {
        Self {
            kind: InvKind::TxLockRequest,
            hash: *hash.as_bytes(),
        }
    }
}

/// Header present on every network message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MessageHeader {
    pub protocol_version: u32,
    pub timestamp: Timestamp,
}

/// A lock request: the full transaction submitted for accelerated settlement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LockRequestMessage {
    pub header: MessageHeader,
    pub transaction: directsend_types::Transaction,
}

/// A lock vote: one voter's signed attestation that one input of one
/// transaction should be locked.
///
/// Wire layout (bincode): tx-hash (32B) ‖ outpoint (36B) ‖ voter-id (36B) ‖
/// signature (64B). Peers advertise it by the identity hash of the first
/// three fields (`directsend_crypto::hash_vote_identity`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LockVoteMessage {
    pub tx_hash: TxHash,
    pub outpoint: OutPoint,
    pub voter: VoterId,
    pub signature: Signature,
}

/// Serialize a message for the wire.
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(msg).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Deserialize a message from the wire.
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, CodecError> {
    bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use directsend_types::{Script, Transaction, TxIn, TxOut};

    fn make_hash(byte: u8) -> TxHash {
        TxHash::new([byte; 32])
    }

    fn make_outpoint(byte: u8, index: u32) -> OutPoint {
        OutPoint::new(make_hash(byte), index)
    }

    #[test]
    fn lock_vote_roundtrip() {
        let msg = LockVoteMessage {
            tx_hash: make_hash(1),
            outpoint: make_outpoint(2, 0),
            voter: VoterId::new(make_outpoint(3, 1)),
            signature: Signature::from_bytes([0xAB; 64]),
        };

        let bytes = encode(&msg).unwrap();
        let back: LockVoteMessage = decode(&bytes).unwrap();

        assert_eq!(back.tx_hash, msg.tx_hash);
        assert_eq!(back.outpoint, msg.outpoint);
        assert_eq!(back.voter, msg.voter);
        assert_eq!(back.signature, msg.signature);
    }

    #[test]
    fn lock_request_roundtrip() {
        let tx = Transaction::new(
            vec![TxIn::new(make_outpoint(1, 0))],
            vec![TxOut::new(100, Script::NormalPayment)],
        );
        let msg = LockRequestMessage {
            header: MessageHeader {
                protocol_version: PROTOCOL_VERSION,
                timestamp: Timestamp::new(1000),
            },
            transaction: tx.clone(),
        };

        let bytes = encode(&msg).unwrap();
        let back: LockRequestMessage = decode(&bytes).unwrap();
        assert_eq!(back.transaction, tx);
        assert_eq!(back.header.protocol_version, PROTOCOL_VERSION);
    }

    #[test]
    fn inv_kinds_are_distinct() {
        let vote_inv = Inv::lock_vote(make_hash(9));
        let req_inv = Inv::lock_request(make_hash(9));
        assert_ne!(vote_inv.kind, req_inv.kind);
        assert_eq!(vote_inv.hash, req_inv.hash);
    }

    #[test]
    fn decode_garbage_fails() {
        let result: Result<LockVoteMessage, _> = decode(&[0xFF, 0x01]);
        assert!(result.is_err());
    }
}
