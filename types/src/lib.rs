//! Fundamental types for the Directsend protocol.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: hashes, outpoints, transactions, keys, timestamps, and
//! consensus parameters.

pub mod hash;
pub mod keys;
pub mod outpoint;
pub mod params;
pub mod time;
pub mod transaction;

pub use hash::{BlockHash, TxHash};
pub use keys::{PublicKey, SecretKey, Signature, VoterKeys};
pub use outpoint::{OutPoint, VoterId};
pub use params::ConsensusParams;
pub use time::Timestamp;
pub use transaction::{HashedTransaction, Script, Transaction, TxIn, TxOut};
