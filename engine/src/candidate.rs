//! Per-transaction lock aggregation.
//!
//! A candidate owns one [`OutPointLock`] per transaction input, plus the lock
//! request itself. A candidate created from an orphan vote has no request —
//! its inputs are unknown, so readiness is impossible until the request
//! arrives.

use crate::outpoint_lock::OutPointLock;
use crate::request::TxLockRequest;
use crate::vote::{TxLockVote, HEIGHT_UNCONFIRMED, LOCK_TIMEOUT_SECONDS};
use directsend_types::{OutPoint, Timestamp, TxHash, VoterId};
use std::collections::BTreeMap;

/// The in-progress aggregation of votes toward locking one transaction.
#[derive(Clone, Debug)]
pub struct TxLockCandidate {
    tx_hash: TxHash,
    /// Absent while the candidate is an orphan-vote shell.
    request: Option<TxLockRequest>,
    outpoint_locks: BTreeMap<OutPoint, OutPointLock>,
    created_at: Timestamp,
    confirmed_height: i64,
}

impl TxLockCandidate {
    /// Create a candidate from a received lock request.
    pub fn new(request: TxLockRequest, now: Timestamp) -> Self {
        Self {
            tx_hash: request.hash(),
            request: Some(request),
            outpoint_locks: BTreeMap::new(),
            created_at: now,
            confirmed_height: HEIGHT_UNCONFIRMED,
        }
    }

    /// Create an empty shell for a tx we only know from orphan votes.
    /// Creation starts the shell's timeout countdown.
    pub fn new_empty(tx_hash: TxHash, now: Timestamp) -> Self {
        Self {
            tx_hash,
            request: None,
            outpoint_locks: BTreeMap::new(),
            created_at: now,
            confirmed_height: HEIGHT_UNCONFIRMED,
        }
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn request(&self) -> Option<&TxLockRequest> {
        self.request.as_ref()
    }

    pub fn has_request(&self) -> bool {
        self.request.is_some()
    }

    /// Attach the lock request to a previously empty shell.
    pub fn attach_request(&mut self, request: TxLockRequest) {
        self.request = Some(request);
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn confirmed_height(&self) -> i64 {
        self.confirmed_height
    }

    pub fn set_confirmed_height(&mut self, height: i64) {
        self.confirmed_height = height;
    }

    /// Register an empty per-input tally. Called once per input at
    /// request-ingest time.
    pub fn add_outpoint_lock(&mut self, outpoint: OutPoint) {
        self.outpoint_locks
            .entry(outpoint)
            .or_insert_with(|| OutPointLock::new(outpoint));
    }

    /// Route a vote to the tally for its outpoint. Returns false when that
    /// input is not registered on this candidate.
    pub fn add_vote(&mut self, vote: TxLockVote) -> bool {
        match self.outpoint_locks.get_mut(&vote.outpoint()) {
            Some(lock) => lock.add_vote(vote),
            None => false,
        }
    }

    /// Latch the attacked flag on a specific input.
    pub fn mark_outpoint_attacked(&mut self, outpoint: &OutPoint) {
        if let Some(lock) = self.outpoint_locks.get_mut(outpoint) {
            lock.mark_attacked();
        }
    }

    pub fn has_voter_voted(&self, outpoint: &OutPoint, voter: &VoterId) -> bool {
        self.outpoint_locks
            .get(outpoint)
            .map_or(false, |lock| lock.has_voter_voted(voter))
    }

    /// True iff at least one input is registered and every input's tally is
    /// ready. This — not the raw vote count — decides whether the
    /// transaction is locked.
    pub fn is_all_ready(&self) -> bool {
        !self.outpoint_locks.is_empty() && self.outpoint_locks.values().all(OutPointLock::is_ready)
    }

    /// Total votes across all inputs. Informational only.
    pub fn count_votes(&self) -> u32 {
        self.outpoint_locks.values().map(OutPointLock::vote_count).sum()
    }

    pub fn outpoint_locks(&self) -> impl Iterator<Item = &OutPointLock> {
        self.outpoint_locks.values()
    }

    pub fn outpoint_locks_mut(&mut self) -> impl Iterator<Item = &mut OutPointLock> {
        self.outpoint_locks.values_mut()
    }

    pub fn outpoints(&self) -> impl Iterator<Item = &OutPoint> {
        self.outpoint_locks.keys()
    }

    pub fn has_outpoint(&self, outpoint: &OutPoint) -> bool {
        self.outpoint_locks.contains_key(outpoint)
    }

    /// Expiry by chain depth, mirroring vote semantics.
    pub fn is_expired(&self, current_height: u32, keep_lock_depth: u32) -> bool {
        self.confirmed_height != HEIGHT_UNCONFIRMED
            && i64::from(current_height) - self.confirmed_height > i64::from(keep_lock_depth)
    }

    /// Wall-clock timeout, mirroring vote semantics.
    pub fn is_timed_out(&self, now: Timestamp) -> bool {
        self.created_at.age_exceeds(now, LOCK_TIMEOUT_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outpoint_lock::SIGNATURES_REQUIRED;
    use directsend_types::{Script, Transaction, TxIn, TxOut};

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

    fn make_request(input_bytes: &[u8]) -> TxLockRequest {
        let inputs = input_bytes
            .iter()
            .map(|&b| TxIn::new(make_outpoint(b, 0)))
            .collect();
        TxLockRequest::new(Transaction::new(
            inputs,
            vec![TxOut::new(100, Script::NormalPayment)],
        ))
    }

    fn make_vote(tx_hash: TxHash, outpoint: OutPoint, voter_byte: u8) -> TxLockVote {
        TxLockVote::new(tx_hash, outpoint, make_voter(voter_byte), ts(100))
    }

    fn fill_outpoint(c: &mut TxLockCandidate, outpoint: OutPoint) {
        for i in 0..SIGNATURES_REQUIRED {
            assert!(c.add_vote(make_vote(c.tx_hash(), outpoint, 100 + i as u8)));
        }
    }

    #[test]
    fn empty_candidate_is_never_ready() {
        let c = TxLockCandidate::new_empty(make_hash(1), ts(100));
        assert!(!c.is_all_ready());
        assert_eq!(c.count_votes(), 0);
    }

    #[test]
    fn candidate_with_no_registered_inputs_is_not_ready() {
        let c = TxLockCandidate::new(make_request(&[2]), ts(100));
        assert!(!c.is_all_ready());
    }

    #[test]
    fn vote_for_unregistered_input_is_rejected() {
        let mut c = TxLockCandidate::new(make_request(&[2]), ts(100));
        c.add_outpoint_lock(make_outpoint(2, 0));
        assert!(!c.add_vote(make_vote(c.tx_hash(), make_outpoint(9, 0), 10)));
    }

    #[test]
    fn all_inputs_must_be_ready() {
        let mut c = TxLockCandidate::new(make_request(&[2, 3]), ts(100));
        let op_a = make_outpoint(2, 0);
        let op_b = make_outpoint(3, 0);
        c.add_outpoint_lock(op_a);
        c.add_outpoint_lock(op_b);

        fill_outpoint(&mut c, op_a);
        assert!(!c.is_all_ready());

        fill_outpoint(&mut c, op_b);
        assert!(c.is_all_ready());
        assert_eq!(c.count_votes(), SIGNATURES_REQUIRED * 2);
    }

    #[test]
    fn attacked_input_blocks_readiness() {
        let mut c = TxLockCandidate::new(make_request(&[2]), ts(100));
        let op = make_outpoint(2, 0);
        c.add_outpoint_lock(op);
        fill_outpoint(&mut c, op);
        assert!(c.is_all_ready());

        c.mark_outpoint_attacked(&op);
        assert!(!c.is_all_ready());

        // further votes do not recover readiness
        assert!(c.add_vote(make_vote(c.tx_hash(), op, 200)));
        assert!(!c.is_all_ready());
    }

    #[test]
    fn has_voter_voted_is_per_outpoint() {
        let mut c = TxLockCandidate::new(make_request(&[2, 3]), ts(100));
        let op_a = make_outpoint(2, 0);
        let op_b = make_outpoint(3, 0);
        c.add_outpoint_lock(op_a);
        c.add_outpoint_lock(op_b);

        c.add_vote(make_vote(c.tx_hash(), op_a, 10));
        assert!(c.has_voter_voted(&op_a, &make_voter(10)));
        assert!(!c.has_voter_voted(&op_b, &make_voter(10)));
    }

    #[test]
    fn attach_request_upgrades_shell() {
        let req = make_request(&[2]);
        let hash = req.hash();
        let mut c = TxLockCandidate::new_empty(hash, ts(100));
        assert!(!c.has_request());

        c.attach_request(req);
        assert!(c.has_request());
        assert_eq!(c.tx_hash(), hash);
    }

    #[test]
    fn timeout_and_expiry() {
        let mut c = TxLockCandidate::new(make_request(&[2]), ts(100));
        assert!(!c.is_timed_out(ts(100 + LOCK_TIMEOUT_SECONDS)));
        assert!(c.is_timed_out(ts(100 + LOCK_TIMEOUT_SECONDS + 1)));

        assert!(!c.is_expired(1000, 24));
        c.set_confirmed_height(100);
        assert!(!c.is_expired(124, 24));
        assert!(c.is_expired(125, 24));
    }
}
