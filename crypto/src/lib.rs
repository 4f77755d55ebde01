//! Cryptographic operations for the Directsend protocol.
//!
//! - **Ed25519** vote signing over the canonical
//!   `hex(tx_hash) ‖ txid:index` message
//! - **Blake2b** identity hashing for transactions and votes
//! - Voter key derivation from config seeds

pub mod hash;
pub mod keys;
pub mod sign;

pub use hash::{hash_transaction, hash_vote_identity};
pub use keys::{generate_voter_keys, public_from_secret, voter_keys_from_seed};
pub use sign::{sign_vote, verify_vote, vote_message};
