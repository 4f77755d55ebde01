//! Error types for the locking engine.
//!
//! Everything here is recoverable: rejections are absorbed at the ingress
//! boundary (logged, sometimes counted) and never propagate into block
//! validation.

use directsend_types::{OutPoint, VoterId};
use thiserror::Error;

/// Why a lock vote was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoteRejection {
    /// The voter is not in the masternode set. The origin peer is asked for
    /// the missing record; the vote may become verifiable later.
    #[error("unknown voter {0}")]
    UnknownVoter(VoterId),

    /// The voted outpoint's UTXO cannot be found.
    #[error("missing UTXO {0}")]
    MissingUtxo(OutPoint),

    /// The voter's rank could not be computed for the quorum height.
    #[error("no rank for voter {0}")]
    NoRank(VoterId),

    /// The voter is ranked outside the quorum for this outpoint.
    #[error("voter {voter} outside top {total} (rank {rank})")]
    OutOfQuorum {
        voter: VoterId,
        rank: u32,
        total: u32,
    },

    /// Signature verification failed.
    #[error("invalid signature")]
    InvalidSignature,

    /// The vote carries no signature at all.
    #[error("unsigned vote")]
    Unsigned,
}

/// Why a lock request failed structural validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestRejection {
    #[error("transaction has no inputs")]
    NoInputs,

    #[error("transaction has no outputs")]
    NoOutputs,

    #[error("non-standard output script")]
    NonStandardOutput,

    #[error("transaction is not final")]
    NotFinal,

    #[error("missing UTXO {0}")]
    MissingUtxo(OutPoint),

    #[error("input {outpoint} too new: {age} < {required} confirmations")]
    InputTooYoung {
        outpoint: OutPoint,
        age: u32,
        required: u32,
    },

    #[error("transaction value too high: {value} > {max}")]
    ValueTooHigh { value: u64, max: u64 },

    #[error("fee too low: {fee} < {required}")]
    FeeTooLow { fee: u64, required: u64 },
}
