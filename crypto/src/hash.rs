//! Hashing for transaction and vote identities.
//!
//! Both identities are 256-bit Blake2b digests over bincode
//! serializations: a transaction hashes its full canonical form, a vote
//! hashes the `(tx-hash, outpoint, voter)` triple that uniquely names it
//! for dedup and inventory requests.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use directsend_types::{OutPoint, Transaction, TxHash, VoterId};

type Blake2b256 = Blake2b<U32>;

fn digest_parts(parts: &[&[u8]]) -> TxHash {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    TxHash::new(out)
}

/// Hash a transaction's canonical serialization to produce its `TxHash`.
pub fn hash_transaction(tx: &Transaction) -> TxHash {
    let bytes = bincode::serialize(tx).expect("transaction serialization is infallible");
    digest_parts(&[&bytes])
}

/// A vote's identity: `H(tx_hash ‖ outpoint ‖ voter)` under the wire
/// serialization, so every node derives the same hash for the same vote.
pub fn hash_vote_identity(tx_hash: &TxHash, outpoint: &OutPoint, voter: &VoterId) -> TxHash {
    let tx = bincode::serialize(tx_hash).expect("hash serialization is infallible");
    let op = bincode::serialize(outpoint).expect("outpoint serialization is infallible");
    let vt = bincode::serialize(voter).expect("voter serialization is infallible");
    digest_parts(&[&tx, &op, &vt])
}
