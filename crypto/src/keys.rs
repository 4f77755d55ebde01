//! Voter key derivation.

use directsend_types::{PublicKey, SecretKey, VoterKeys};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

/// Generate fresh voter key material from the OS random source.
pub fn generate_voter_keys() -> VoterKeys {
    voter_keys_from_signing(SigningKey::generate(&mut OsRng))
}

/// Derive voter key material deterministically from a 32-byte seed, the
/// way masternode config loading does.
pub fn voter_keys_from_seed(seed: &[u8; 32]) -> VoterKeys {
    voter_keys_from_signing(SigningKey::from_bytes(seed))
}

/// The verifying key a signing seed corresponds to. Used by the voter
/// role to self-check freshly signed votes before relaying them.
pub fn public_from_secret(secret: &SecretKey) -> PublicKey {
    PublicKey::new(
        SigningKey::from_bytes(secret.as_bytes())
            .verifying_key()
            .to_bytes(),
    )
}

fn voter_keys_from_signing(signing: SigningKey) -> VoterKeys {
    VoterKeys {
        public: PublicKey::new(signing.verifying_key().to_bytes()),
        secret: SecretKey::new(signing.to_bytes()),
    }
}
