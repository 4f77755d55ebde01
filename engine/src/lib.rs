//! Directsend — instant transaction locking via per-input masternode quorums.
//!
//! A submitted transaction is promoted to a "locked" state ahead of block
//! confirmation by collecting threshold-signed votes from the top-ranked
//! masternodes elected per spent outpoint. Once every input gathers its
//! quorum, the wallet treats the inputs as spent with settlement-grade
//! finality.
//!
//! ## Module overview
//!
//! - [`vote`] — A single voter's signed lock vote, with validity and expiry.
//! - [`outpoint_lock`] — Per-input tally (one vote per voter, attacked latch).
//! - [`candidate`] — Per-transaction aggregation of outpoint tallies.
//! - [`request`] — Lock request validation (scripts, age, value, fee).
//! - [`engine`] — The singleton owning all indices: ingress, voting, orphan
//!   reconciliation, finalization, conflict resolution, and GC.
//! - [`adapters`] — Trait seams onto the UTXO set, masternode registry,
//!   transport, feature flags, chain, and wallet.
//! - [`service`] — Shared-engine wrapper with the periodic maintenance task.
//! - [`config`] — TOML-backed runtime configuration.
//! - [`notify`] — Best-effort external shell notification.
//! - [`logging`] — Tracing subscriber setup.
//! - [`error`] — Rejection taxonomies for votes and requests.

pub mod adapters;
pub mod candidate;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod notify;
pub mod outpoint_lock;
pub mod request;
pub mod service;
pub mod vote;

pub use adapters::{
    ChainView, MasternodeInfo, MasternodeRegistry, PeerId, Spork, SporkOracle, Transport, Utxo,
    UtxoView, WalletSink,
};
pub use candidate::TxLockCandidate;
pub use config::{ConfigError, DirectsendConfig, LocalVoter, MasternodeConfig};
pub use engine::{DirectsendEngine, EngineDeps, EngineSummary};
pub use error::{RequestRejection, VoteRejection};
pub use logging::{init_logging, LogFormat};
pub use outpoint_lock::{OutPointLock, SIGNATURES_REQUIRED, SIGNATURES_TOTAL};
pub use request::{TxLockRequest, WARN_MANY_INPUTS};
pub use service::DirectsendService;
pub use vote::{
    TxLockVote, FAILED_TIMEOUT_SECONDS, HEIGHT_UNCONFIRMED, LOCK_TIMEOUT_SECONDS,
    QUORUM_HEIGHT_OFFSET,
};
