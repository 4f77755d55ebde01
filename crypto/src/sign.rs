//! Vote signing and verification.
//!
//! The signed message is the textual form `hex(tx_hash)` immediately
//! followed by the outpoint's `txid:index` rendering — the exact string
//! every node reconstructs when validating a relayed vote, so it must
//! never change shape.

use directsend_types::{OutPoint, PublicKey, SecretKey, Signature, TxHash};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

/// The canonical text a voter signs for `(tx_hash, outpoint)`.
pub fn vote_message(tx_hash: &TxHash, outpoint: &OutPoint) -> String {
    format!("{}{}", tx_hash, outpoint.short())
}

/// Sign a vote on `(tx_hash, outpoint)` with the local voter's seed.
pub fn sign_vote(tx_hash: &TxHash, outpoint: &OutPoint, secret: &SecretKey) -> Signature {
    let signing = SigningKey::from_bytes(secret.as_bytes());
    let sig = signing.sign(vote_message(tx_hash, outpoint).as_bytes());
    Signature::from_bytes(sig.to_bytes())
}

/// Verify a vote signature against the claimed voter's published key.
///
/// Rejects malformed keys and non-canonical signatures (malleability
/// protection).
pub fn verify_vote(
    tx_hash: &TxHash,
    outpoint: &OutPoint,
    signature: &Signature,
    pubkey: &PublicKey,
) -> bool {
    let Ok(verifying) = VerifyingKey::from_bytes(pubkey.as_bytes()) else {
        return false;
    };
    let sig = ed25519_dalek::Signature::from_bytes(&signature.to_bytes());
    verifying
        .verify(vote_message(tx_hash, outpoint).as_bytes(), &sig)
        .is_ok()
}
