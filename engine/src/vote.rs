//! A single masternode's lock vote.
//!
//! Votes are immutable after construction except for the confirmed-height
//! setter, which records where (or whether) the voted transaction landed in
//! the chain. Identity is the hash of (tx-hash, outpoint, voter); the
//! signature covers the textual form `hex(tx_hash) ‖ txid:index`.

use crate::adapters::{MasternodeRegistry, PeerId, UtxoView};
use crate::error::VoteRejection;
use crate::outpoint_lock::SIGNATURES_TOTAL;
use directsend_crypto::{hash_vote_identity, sign_vote, verify_vote};
use directsend_messages::{LockVoteMessage, MIN_LOCK_PROTO_VERSION};
use directsend_types::{OutPoint, PublicKey, SecretKey, Signature, Timestamp, TxHash, VoterId};
use serde::{Deserialize, Serialize};

/// Seconds an orphan vote (or an unfinished candidate) may wait for its
/// lock request before it is reaped.
pub const LOCK_TIMEOUT_SECONDS: u64 = 15;

/// Seconds after which a vote whose transaction never locked is discarded.
pub const FAILED_TIMEOUT_SECONDS: u64 = 60;

/// Rank queries are made at the voted UTXO's height plus this offset, so
/// every node computes the quorum against the same settled block.
pub const QUORUM_HEIGHT_OFFSET: u32 = 4;

/// Sentinel confirmed-height meaning unconfirmed (or reorged out).
pub const HEIGHT_UNCONFIRMED: i64 = -1;

/// One voter's signed attestation that one input of one transaction should
/// be locked.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxLockVote {
    tx_hash: TxHash,
    outpoint: OutPoint,
    voter: VoterId,
    signature: Option<Signature>,
    created_at: Timestamp,
    confirmed_height: i64,
}

impl TxLockVote {
    /// Construct an unsigned vote (local emission path).
    pub fn new(tx_hash: TxHash, outpoint: OutPoint, voter: VoterId, now: Timestamp) -> Self {
        Self {
            tx_hash,
            outpoint,
            voter,
            signature: None,
            created_at: now,
            confirmed_height: HEIGHT_UNCONFIRMED,
        }
    }

    /// Construct from a wire message (gossip ingress path).
    pub fn from_message(msg: LockVoteMessage, now: Timestamp) -> Self {
        Self {
            tx_hash: msg.tx_hash,
            outpoint: msg.outpoint,
            voter: msg.voter,
            signature: Some(msg.signature),
            created_at: now,
            confirmed_height: HEIGHT_UNCONFIRMED,
        }
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn outpoint(&self) -> OutPoint {
        self.outpoint
    }

    pub fn voter(&self) -> VoterId {
        self.voter
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn confirmed_height(&self) -> i64 {
        self.confirmed_height
    }

    /// Record the height of the block that confirmed this vote's
    /// transaction, or [`HEIGHT_UNCONFIRMED`] on reorg.
    pub fn set_confirmed_height(&mut self, height: i64) {
        self.confirmed_height = height;
    }

    /// The vote's identity: `H(tx_hash ‖ outpoint ‖ voter)`.
    pub fn hash(&self) -> TxHash {
        hash_vote_identity(&self.tx_hash, &self.outpoint, &self.voter)
    }

    /// Sign with the local voter's seed and record the signature.
    pub fn sign(&mut self, key: &SecretKey) {
        self.signature = Some(sign_vote(&self.tx_hash, &self.outpoint, key));
    }

    /// Verify the recorded signature against the given public key.
    pub fn check_signature(&self, pubkey: &PublicKey) -> bool {
        match &self.signature {
            Some(sig) => verify_vote(&self.tx_hash, &self.outpoint, sig, pubkey),
            None => false,
        }
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Full ingress validation.
    ///
    /// Fails when the voter is unknown (the origin peer is asked for the
    /// record), the voted UTXO is missing, the voter is outside the top-N
    /// quorum at `utxo_height + 4`, or the signature does not verify.
    pub fn validate(
        &self,
        origin: Option<PeerId>,
        utxo_view: &dyn UtxoView,
        registry: &dyn MasternodeRegistry,
    ) -> Result<(), VoteRejection> {
        if !registry.has(&self.voter) {
            registry.ask_for(origin, &self.voter);
            return Err(VoteRejection::UnknownVoter(self.voter));
        }

        let utxo = utxo_view
            .get_utxo(&self.outpoint)
            .ok_or(VoteRejection::MissingUtxo(self.outpoint))?;

        let quorum_height = utxo.height + QUORUM_HEIGHT_OFFSET;
        let rank = registry
            .rank(&self.voter, quorum_height, MIN_LOCK_PROTO_VERSION)
            .ok_or(VoteRejection::NoRank(self.voter))?;
        if rank > SIGNATURES_TOTAL {
            return Err(VoteRejection::OutOfQuorum {
                voter: self.voter,
                rank,
                total: SIGNATURES_TOTAL,
            });
        }

        let info = registry
            .info(&self.voter)
            .ok_or(VoteRejection::UnknownVoter(self.voter))?;
        if !self.check_signature(&info.pubkey) {
            return Err(VoteRejection::InvalidSignature);
        }

        Ok(())
    }

    /// Expiry by chain depth: the vote's transaction confirmed long enough
    /// ago that lock data may be pruned.
    pub fn is_expired(&self, current_height: u32, keep_lock_depth: u32) -> bool {
        self.confirmed_height != HEIGHT_UNCONFIRMED
            && i64::from(current_height) - self.confirmed_height > i64::from(keep_lock_depth)
    }

    /// Orphan timeout: the vote waited too long for its lock request.
    pub fn is_timed_out(&self, now: Timestamp) -> bool {
        self.created_at.age_exceeds(now, LOCK_TIMEOUT_SECONDS)
    }

    /// Failure timeout: the vote is old and its transaction never locked.
    /// `is_locked` is the engine's (spork-gated) verdict for the tx.
    pub fn is_failed(&self, now: Timestamp, is_locked: bool) -> bool {
        self.created_at.age_exceeds(now, FAILED_TIMEOUT_SECONDS) && !is_locked
    }

    /// Wire form of this vote. `None` for unsigned votes, which must never
    /// reach the wire.
    pub fn to_message(&self) -> Option<LockVoteMessage> {
        Some(LockVoteMessage {
            tx_hash: self.tx_hash,
            outpoint: self.outpoint,
            voter: self.voter,
            signature: self.signature.clone()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use directsend_crypto::voter_keys_from_seed;

    fn make_hash(byte: u8) -> TxHash {
        TxHash::new([byte; 32])
    }

    fn make_outpoint(byte: u8, index: u32) -> OutPoint {
        OutPoint::new(make_hash(byte), index)
    }

    fn make_voter(byte: u8) -> VoterId {
        VoterId::new(make_outpoint(byte, 0))
    }

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    #[test]
    fn hash_is_stable_and_identity_sensitive() {
        let v1 = TxLockVote::new(make_hash(1), make_outpoint(2, 0), make_voter(3), ts(100));
        let v2 = TxLockVote::new(make_hash(1), make_outpoint(2, 0), make_voter(3), ts(999));
        // created_at is not part of the identity
        assert_eq!(v1.hash(), v2.hash());

        let v3 = TxLockVote::new(make_hash(1), make_outpoint(2, 1), make_voter(3), ts(100));
        assert_ne!(v1.hash(), v3.hash());

        let v4 = TxLockVote::new(make_hash(1), make_outpoint(2, 0), make_voter(4), ts(100));
        assert_ne!(v1.hash(), v4.hash());
    }

    #[test]
    fn sign_then_check_signature() {
        let kp = voter_keys_from_seed(&[7u8; 32]);
        let mut vote = TxLockVote::new(make_hash(1), make_outpoint(2, 0), make_voter(3), ts(100));
        assert!(!vote.check_signature(&kp.public));

        vote.sign(&kp.secret);
        assert!(vote.check_signature(&kp.public));

        let other = voter_keys_from_seed(&[8u8; 32]);
        assert!(!vote.check_signature(&other.public));
    }

    #[test]
    fn message_roundtrip_preserves_hash() {
        let kp = voter_keys_from_seed(&[9u8; 32]);
        let mut vote = TxLockVote::new(make_hash(5), make_outpoint(6, 2), make_voter(7), ts(100));
        vote.sign(&kp.secret);

        let msg = vote.to_message().expect("signed");
        let bytes = directsend_messages::encode(&msg).unwrap();
        let back: LockVoteMessage = directsend_messages::decode(&bytes).unwrap();
        let restored = TxLockVote::from_message(back, ts(200));

        assert_eq!(restored.hash(), vote.hash());
        assert!(restored.check_signature(&kp.public));
    }

    #[test]
    fn unsigned_vote_has_no_message() {
        let vote = TxLockVote::new(make_hash(1), make_outpoint(2, 0), make_voter(3), ts(100));
        assert!(vote.to_message().is_none());
    }

    #[test]
    fn expiry_by_depth() {
        let mut vote = TxLockVote::new(make_hash(1), make_outpoint(2, 0), make_voter(3), ts(100));
        assert!(!vote.is_expired(1000, 24));

        vote.set_confirmed_height(100);
        assert!(!vote.is_expired(124, 24)); // exactly at the boundary
        assert!(vote.is_expired(125, 24));

        vote.set_confirmed_height(HEIGHT_UNCONFIRMED);
        assert!(!vote.is_expired(1_000_000, 24));
    }

    #[test]
    fn orphan_timeout_is_strictly_greater() {
        let vote = TxLockVote::new(make_hash(1), make_outpoint(2, 0), make_voter(3), ts(100));
        assert!(!vote.is_timed_out(ts(100 + LOCK_TIMEOUT_SECONDS)));
        assert!(vote.is_timed_out(ts(100 + LOCK_TIMEOUT_SECONDS + 1)));
    }

    #[test]
    fn failed_requires_not_locked() {
        let vote = TxLockVote::new(make_hash(1), make_outpoint(2, 0), make_voter(3), ts(100));
        let late = ts(100 + FAILED_TIMEOUT_SECONDS + 1);
        assert!(vote.is_failed(late, false));
        assert!(!vote.is_failed(late, true));
        assert!(!vote.is_failed(ts(100 + FAILED_TIMEOUT_SECONDS - 1), false));
    }
}
