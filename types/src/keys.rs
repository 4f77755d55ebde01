//! Key material for masternode vote signing.
//!
//! Voters prove vote authorship with Ed25519. The registry publishes each
//! masternode's verifying key; the signing half exists only on the voter's
//! own node, derived from the seed in its config.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A masternode's 32-byte Ed25519 verifying key, as carried in the
/// registry record that other nodes validate votes against.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// The local voter's 32-byte signing seed.
///
/// Deliberately not `Clone`, `Debug`, or serde-visible; the bytes are
/// zeroized on drop. Only vote signing ever reads them.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// An Ed25519 vote signature, carried as its curve point `r` and scalar
/// `s` halves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Self { r, s }
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }
}

/// A voter's full key material: the published verifying key plus the
/// local signing seed.
///
/// Built by `directsend_crypto::voter_keys_from_seed()` when masternode
/// config is loaded; this struct is intentionally just data.
pub struct VoterKeys {
    pub public: PublicKey,
    pub secret: SecretKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_halves_roundtrip() {
        let mut bytes = [0u8; 64];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        let sig = Signature::from_bytes(bytes);
        assert_eq!(sig.to_bytes(), bytes);
    }

    #[test]
    fn signature_halves_split_at_32() {
        let mut bytes = [0u8; 64];
        bytes[0] = 0xAA;
        bytes[63] = 0xBB;
        let sig = Signature::from_bytes(bytes);
        let other = Signature::from_bytes({
            let mut flipped = bytes;
            flipped[32] = 0xCC;
            flipped
        });
        assert_ne!(sig, other);
    }

    #[test]
    fn secret_key_exposes_only_bytes() {
        let secret = SecretKey::new([7u8; 32]);
        assert_eq!(secret.as_bytes(), &[7u8; 32]);
    }
}
