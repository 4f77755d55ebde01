//! Trait seams onto the rest of the node.
//!
//! The engine never talks to the chain, the masternode list, the wallet, or
//! the wire directly — it goes through these adapters. Implementations do
//! their own internal locking; the required acquisition order is
//! chain → wallet → engine → mempool, which the engine preserves by only
//! querying the mempool spend index from inside conflict resolution and the
//! wallet sink from finalization. Adapter implementations must not call back
//! into the engine.

use directsend_messages::Inv;
use directsend_types::{
    BlockHash, HashedTransaction, OutPoint, PublicKey, Script, Transaction, TxHash, VoterId,
};

/// Opaque peer handle, used only to ask a specific peer for missing records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PeerId(pub u64);

/// An unspent transaction output as seen by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Utxo {
    /// Height of the block holding the output.
    pub height: u32,
    pub value: u64,
    pub script: Script,
}

/// UTXO set lookup.
pub trait UtxoView: Send + Sync {
    fn get_utxo(&self, outpoint: &OutPoint) -> Option<Utxo>;
}

/// A masternode record, as much of it as voting needs.
#[derive(Clone, Debug)]
pub struct MasternodeInfo {
    pub pubkey: PublicKey,
}

/// The masternode set and its deterministic rank oracle.
pub trait MasternodeRegistry: Send + Sync {
    fn has(&self, voter: &VoterId) -> bool;

    fn info(&self, voter: &VoterId) -> Option<MasternodeInfo>;

    /// Ask a peer (or the network at large when `origin` is `None`) for a
    /// masternode record we don't have.
    fn ask_for(&self, origin: Option<PeerId>, voter: &VoterId);

    /// Apply the maximum misbehavior penalty to a voter.
    fn ban(&self, voter: &VoterId);

    /// Rank of `voter` among all masternodes at `height`, counting only
    /// peers speaking at least `min_protocol`. `None` when the rank cannot
    /// be computed (unknown voter, unknown height).
    fn rank(&self, voter: &VoterId, height: u32, min_protocol: u32) -> Option<u32>;

    /// Whether the masternode list has finished syncing. Until it has,
    /// votes cannot be evaluated and GC must not run.
    fn is_synced(&self) -> bool;
}

/// Outbound gossip.
pub trait Transport: Send + Sync {
    fn relay_inventory(&self, inv: Inv);
    fn relay_transaction(&self, req: &HashedTransaction);
}

/// Feature flags carried by signed network messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Spork {
    /// Master switch for the locking subsystem.
    DirectsendEnabled,
    /// Whether locked transactions are treated as settled by the rest of
    /// the node (drives `is_locked`).
    BlockFiltering,
}

/// Feature-flag oracle.
pub trait SporkOracle: Send + Sync {
    fn is_active(&self, spork: Spork) -> bool;

    /// Maximum transaction input value (in duffs) eligible for locking.
    fn max_lock_value(&self) -> u64;
}

/// Chain and mempool state.
pub trait ChainView: Send + Sync {
    fn height(&self) -> u32;

    /// True while a large-work fork or invalid chain warning is in effect;
    /// lock status is not trustworthy during such episodes.
    fn is_fork_warning(&self) -> bool;

    /// Look up a transaction; the block hash is zero while unconfirmed.
    fn get_transaction(&self, hash: &TxHash) -> Option<(Transaction, BlockHash)>;

    /// The mempool spend index: which mempool transaction (if any) spends
    /// this outpoint.
    fn mempool_spender(&self, outpoint: &OutPoint) -> Option<TxHash>;
}

/// Wallet / UI notification sink.
pub trait WalletSink: Send + Sync {
    /// Tell the wallet a transaction's status changed. Returns whether the
    /// wallet actually tracks this transaction.
    fn transaction_updated(&self, hash: &TxHash) -> bool;

    /// Broadcast the lock to every registered listener.
    fn notify_lock(&self, req: &HashedTransaction);
}
