//! The Directsend engine — owns every index and runs the voting protocol.
//!
//! One engine exists per node. All indices live behind whatever lock the
//! caller wraps the engine in (see `service`); within a single `&mut self`
//! call the updates are atomic from other observers' perspectives. External
//! collaborators are adapter objects with their own internal locking; the
//! required acquisition order chain → wallet → engine → mempool is preserved
//! because the mempool spend index is only consulted from inside conflict
//! resolution and the wallet sink only from finalization.

use crate::adapters::{
    ChainView, MasternodeRegistry, PeerId, Spork, SporkOracle, Transport, UtxoView, WalletSink,
};
use crate::candidate::TxLockCandidate;
use crate::config::{DirectsendConfig, LocalVoter};
use crate::notify;
use crate::outpoint_lock::SIGNATURES_TOTAL;
use crate::request::TxLockRequest;
use crate::vote::{TxLockVote, HEIGHT_UNCONFIRMED, QUORUM_HEIGHT_OFFSET};
use directsend_crypto::public_from_secret;
use directsend_messages::{Inv, MIN_LOCK_PROTO_VERSION};
use directsend_types::{ConsensusParams, OutPoint, Timestamp, TxHash, VoterId};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Seconds a voter's orphan-vote epoch stays relevant for rate limiting.
const ORPHAN_VOTE_EXPIRE_SECONDS: u64 = 600;

/// Every external collaborator the engine talks to.
pub struct EngineDeps {
    pub utxo: Arc<dyn UtxoView>,
    pub registry: Arc<dyn MasternodeRegistry>,
    pub transport: Arc<dyn Transport>,
    pub sporks: Arc<dyn SporkOracle>,
    pub chain: Arc<dyn ChainView>,
    pub wallet: Arc<dyn WalletSink>,
}

/// What happened to a processed vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VoteOutcome {
    /// Dropped: invalid, spam, or delivered to a dead candidate.
    Rejected,
    /// Stored as an orphan, waiting for its lock request.
    Orphaned,
    /// Tallied into a live candidate.
    Delivered,
}

/// Point-in-time counters, used for maintenance logs and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineSummary {
    pub candidates: usize,
    pub votes: usize,
    pub orphan_votes: usize,
    pub completed_locks: u64,
}

impl fmt::Display for EngineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lock candidates: {}, votes: {}, orphans: {}, completed locks: {}",
            self.candidates, self.votes, self.orphan_votes, self.completed_locks
        )
    }
}

/// The process-wide transaction-locking engine.
pub struct DirectsendEngine {
    params: ConsensusParams,
    config: DirectsendConfig,
    local_voter: Option<LocalVoter>,
    deps: EngineDeps,

    /// tx-hash → in-progress lock aggregation.
    candidates: HashMap<TxHash, TxLockCandidate>,
    /// vote-hash → vote. Canonical store of all validated votes.
    votes: HashMap<TxHash, TxLockVote>,
    /// vote-hash → vote still waiting for its lock request.
    orphan_votes: HashMap<TxHash, TxLockVote>,
    /// outpoint → tx-hashes that received a vote on it.
    voted_outpoints: HashMap<OutPoint, BTreeSet<TxHash>>,
    /// outpoint → tx-hash of the completed lock claiming it.
    locked_outpoints: HashMap<OutPoint, TxHash>,
    /// Requests the upstream acceptor let in, kept for dedup.
    accepted_requests: HashMap<TxHash, TxLockRequest>,
    /// Requests the upstream acceptor refused, kept for dedup.
    rejected_requests: HashMap<TxHash, TxLockRequest>,
    /// voter → earliest instant the next orphan vote is welcome.
    voter_orphan_epoch: HashMap<VoterId, Timestamp>,
    cached_height: u32,
    completed_locks: u64,
}

impl DirectsendEngine {
    pub fn new(
        params: ConsensusParams,
        config: DirectsendConfig,
        local_voter: Option<LocalVoter>,
        deps: EngineDeps,
    ) -> Self {
        Self {
            params,
            config,
            local_voter,
            deps,
            candidates: HashMap::new(),
            votes: HashMap::new(),
            orphan_votes: HashMap::new(),
            voted_outpoints: HashMap::new(),
            locked_outpoints: HashMap::new(),
            accepted_requests: HashMap::new(),
            rejected_requests: HashMap::new(),
            voter_orphan_epoch: HashMap::new(),
            cached_height: 0,
            completed_locks: 0,
        }
    }

    // ── Ingress: lock requests ─────────────────────────────────────────

    /// Handle a structurally well-formed lock request.
    pub fn process_lock_request(&mut self, req: TxLockRequest, now: Timestamp) -> bool {
        let tx_hash = req.hash();

        // A completed lock already claims one of our inputs under another
        // tx. Not a rejection: conflict resolution settles it later.
        for input in &req.transaction().inputs {
            if let Some(&locked) = self.locked_outpoints.get(&input.prevout) {
                if locked != tx_hash {
                    warn!(txid = %tx_hash, locked = %locked, outpoint = %input.prevout,
                        "lock request conflicts with completed lock");
                }
            }
        }

        // Votes already exist for one of our inputs under another tx —
        // a double-spend attempt signal, let the votes decide.
        for input in &req.transaction().inputs {
            if let Some(hashes) = self.voted_outpoints.get(&input.prevout) {
                if hashes.iter().any(|h| *h != tx_hash) {
                    debug!(outpoint = %input.prevout, "double spend attempt");
                }
            }
        }

        if !self.ensure_candidate(&req, now) {
            warn!(txid = %tx_hash, "could not create lock candidate");
            return false;
        }
        info!(txid = %tx_hash, "lock request accepted");

        self.vote_on(tx_hash, now);
        self.process_orphan_votes(now);
        self.try_finalize(tx_hash, now);
        true
    }

    /// Create the candidate for `req`, or attach `req` to an orphan shell.
    fn ensure_candidate(&mut self, req: &TxLockRequest, now: Timestamp) -> bool {
        let tx_hash = req.hash();

        if let Err(reason) = req.is_valid(
            &*self.deps.utxo,
            self.deps.chain.height(),
            self.deps.sporks.max_lock_value(),
            &self.params,
        ) {
            debug!(txid = %tx_hash, %reason, "invalid lock request");
            return false;
        }

        match self.candidates.get_mut(&tx_hash) {
            None => {
                info!(txid = %tx_hash, "new lock candidate");
                let mut candidate = TxLockCandidate::new(req.clone(), now);
                for input in &req.transaction().inputs {
                    candidate.add_outpoint_lock(input.prevout);
                }
                self.candidates.insert(tx_hash, candidate);
            }
            Some(candidate) if !candidate.has_request() => {
                // Empty shell from earlier orphan votes: attach the real data.
                candidate.attach_request(req.clone());
                if candidate.is_timed_out(now) {
                    info!(txid = %tx_hash, "lock candidate timed out");
                    return false;
                }
                info!(txid = %tx_hash, "updated empty lock candidate");
                for input in &req.transaction().inputs {
                    candidate.add_outpoint_lock(input.prevout);
                }
            }
            Some(_) => {
                debug!(txid = %tx_hash, "lock candidate seen");
            }
        }
        true
    }

    fn create_empty_candidate(&mut self, tx_hash: TxHash, now: Timestamp) {
        if self.candidates.contains_key(&tx_hash) {
            return;
        }
        info!(txid = %tx_hash, "new empty lock candidate");
        self.candidates
            .insert(tx_hash, TxLockCandidate::new_empty(tx_hash, now));
    }

    // ── Voter role ─────────────────────────────────────────────────────

    /// Cast our own votes on a candidate's inputs, when we are in the
    /// elected quorum for them.
    fn vote_on(&mut self, tx_hash: TxHash, now: Timestamp) {
        let Some(voter_id) = self.local_voter.as_ref().map(|v| v.id) else {
            return;
        };
        if !self.deps.sporks.is_active(Spork::DirectsendEnabled) {
            return;
        }
        if !self.deps.registry.is_synced() {
            return;
        }
        let outpoints: Vec<OutPoint> = match self.candidates.get(&tx_hash) {
            Some(c) => c.outpoints().copied().collect(),
            None => return,
        };

        for outpoint in outpoints {
            let Some(utxo) = self.deps.utxo.get_utxo(&outpoint) else {
                // cannot rank anyone without the UTXO; give up on the
                // whole candidate
                debug!(%outpoint, "failed to find UTXO");
                return;
            };
            let quorum_height = utxo.height + QUORUM_HEIGHT_OFFSET;

            let Some(rank) =
                self.deps
                    .registry
                    .rank(&voter_id, quorum_height, MIN_LOCK_PROTO_VERSION)
            else {
                debug!(voter = %voter_id, "cannot calculate own rank");
                continue;
            };
            if rank > SIGNATURES_TOTAL {
                debug!(rank, total = SIGNATURES_TOTAL, "not in the quorum");
                continue;
            }

            // One vote per outpoint, ever — even across competing txs.
            let already_voted = self.voted_outpoints.get(&outpoint).map_or(false, |hashes| {
                hashes
                    .iter()
                    .any(|h| self.candidates.get(h).map_or(false, |c| {
                        c.has_voter_voted(&outpoint, &voter_id)
                    }))
            });
            if already_voted {
                warn!(txid = %tx_hash, %outpoint, "already voted for this outpoint, skipping");
                continue;
            }

            let mut vote = TxLockVote::new(tx_hash, outpoint, voter_id, now);
            if !self.sign_and_verify(&mut vote) {
                error!("failed to sign lock vote");
                return;
            }

            let vote_hash = vote.hash();
            self.votes.insert(vote_hash, vote.clone());
            let tallied = self
                .candidates
                .get_mut(&tx_hash)
                .map_or(false, |c| c.add_vote(vote));
            if tallied {
                info!(txid = %tx_hash, %outpoint, vote = %vote_hash,
                    "lock vote created, relaying");
                let hashes = self.voted_outpoints.entry(outpoint).or_default();
                hashes.insert(tx_hash);
                if hashes.len() > 1 {
                    warn!(txid = %tx_hash, %outpoint, "own vote conflicts with existing votes");
                }
                self.deps.transport.relay_inventory(Inv::lock_vote(vote_hash));
            }
        }
    }

    fn sign_and_verify(&self, vote: &mut TxLockVote) -> bool {
        let Some(local) = &self.local_voter else {
            return false;
        };
        vote.sign(&local.key);
        vote.check_signature(&public_from_secret(&local.key))
    }

    // ── Ingress: lock votes ────────────────────────────────────────────

    /// Handle a lock vote from gossip. Duplicates (by vote-hash) are
    /// no-ops, making replays harmless.
    pub fn process_vote_message(
        &mut self,
        vote: TxLockVote,
        origin: Option<PeerId>,
        now: Timestamp,
    ) -> bool {
        if self.votes.contains_key(&vote.hash()) {
            debug!(vote = %vote.hash(), "lock vote seen");
            return false;
        }
        self.process_vote(vote, origin, now) != VoteOutcome::Rejected
    }

    fn process_vote(
        &mut self,
        vote: TxLockVote,
        origin: Option<PeerId>,
        now: Timestamp,
    ) -> VoteOutcome {
        let vote_hash = vote.hash();
        let tx_hash = vote.tx_hash();

        if let Err(reason) = vote.validate(origin, &*self.deps.utxo, &*self.deps.registry) {
            debug!(txid = %tx_hash, %reason, "invalid lock vote");
            return VoteOutcome::Rejected;
        }

        // relay valid votes immediately so the network converges even when
        // we cannot use the vote yet
        self.deps.transport.relay_inventory(Inv::lock_vote(vote_hash));

        let live = self
            .candidates
            .get(&tx_hash)
            .map_or(false, TxLockCandidate::has_request);
        if !live {
            return self.process_orphan_vote(vote, now);
        }

        let timed_out = self
            .candidates
            .get(&tx_hash)
            .map_or(true, |c| c.is_timed_out(now));
        if timed_out {
            debug!(txid = %tx_hash, "too late, lock candidate timed out");
            return VoteOutcome::Rejected;
        }

        self.votes.entry(vote_hash).or_insert_with(|| vote.clone());

        let outpoint = vote.outpoint();
        let voter = vote.voter();

        // Same voter, same outpoint, different tx: a double-vote attack.
        let conflicting: Vec<TxHash> = self
            .voted_outpoints
            .get(&outpoint)
            .map(|hashes| {
                hashes
                    .iter()
                    .copied()
                    .filter(|h| {
                        *h != tx_hash
                            && self
                                .candidates
                                .get(h)
                                .map_or(false, |c| c.has_voter_voted(&outpoint, &voter))
                    })
                    .collect()
            })
            .unwrap_or_default();
        if !conflicting.is_empty() {
            warn!(voter = %voter, %outpoint, "masternode sent conflicting votes");
            // Neither claim may complete. The vote keeps being relayed so
            // every honest node reaches the same verdict.
            if let Some(c) = self.candidates.get_mut(&tx_hash) {
                c.mark_outpoint_attacked(&outpoint);
            }
            for h in &conflicting {
                if let Some(c) = self.candidates.get_mut(h) {
                    c.mark_outpoint_attacked(&outpoint);
                }
            }
            self.deps.registry.ban(&voter);
        }

        self.voted_outpoints.entry(outpoint).or_default().insert(tx_hash);

        let (tallied, signatures, max_signatures) = match self.candidates.get_mut(&tx_hash) {
            Some(c) => {
                let tallied = c.add_vote(vote);
                let max = c.request().map_or(0, TxLockRequest::max_signatures);
                (tallied, c.count_votes(), max)
            }
            None => (false, 0, 0),
        };
        if !tallied {
            error!(txid = %tx_hash, %outpoint, "candidate refused vote");
            return VoteOutcome::Rejected;
        }
        debug!(txid = %tx_hash, signatures, max_signatures, vote = %vote_hash,
            "lock vote tallied");

        self.try_finalize(tx_hash, now);
        VoteOutcome::Delivered
    }

    /// A vote arrived before its lock request: park it, maybe reprocess a
    /// stored request, and rate-limit the voter.
    fn process_orphan_vote(&mut self, vote: TxLockVote, now: Timestamp) -> VoteOutcome {
        let vote_hash = vote.hash();
        let tx_hash = vote.tx_hash();
        let voter = vote.voter();

        let newly_parked = !self.orphan_votes.contains_key(&vote_hash);
        if newly_parked {
            // the shell's creation starts the timeout countdown
            self.create_empty_candidate(tx_hash, now);
            self.votes.insert(vote_hash, vote.clone());
            self.orphan_votes.insert(vote_hash, vote);
            debug!(txid = %tx_hash, voter = %voter, "orphan lock vote: new");

            // The request may have been seen (and accepted or rejected)
            // before any candidate survived. With a quorum of orphans per
            // input it can be re-ingested right away.
            let stored = self
                .accepted_requests
                .get(&tx_hash)
                .or_else(|| self.rejected_requests.get(&tx_hash))
                .cloned();
            if let Some(req) = stored {
                if self.is_enough_orphan_votes(&req) {
                    debug!(txid = %tx_hash, "enough orphan votes, reprocessing lock request");
                    self.process_lock_request(req, now);
                    return VoteOutcome::Delivered;
                }
            }

            // Per-voter rate limit, charged on first parking only: a voter
            // whose previous orphan epoch is still ahead of both the clock
            // and the all-voter mean keeps naming transactions that never
            // arrive.
            let next_epoch = now.saturating_add_secs(ORPHAN_VOTE_EXPIRE_SECONDS);
            match self.voter_orphan_epoch.get(&voter).copied() {
                None => {
                    self.voter_orphan_epoch.insert(voter, next_epoch);
                }
                Some(previous) => {
                    if previous > now && previous >= self.average_orphan_epoch() {
                        debug!(txid = %tx_hash, voter = %voter,
                            "masternode is spamming orphan lock votes");
                        self.discard_orphan(&vote_hash, &tx_hash);
                        return VoteOutcome::Rejected;
                    }
                    self.voter_orphan_epoch.insert(voter, next_epoch);
                }
            }
        } else {
            debug!(txid = %tx_hash, voter = %voter, "orphan lock vote: seen");
        }

        VoteOutcome::Orphaned
    }

    /// Undo the parking of a spam-classified orphan vote, including its
    /// shell candidate when nothing else references it.
    fn discard_orphan(&mut self, vote_hash: &TxHash, tx_hash: &TxHash) {
        self.orphan_votes.remove(vote_hash);
        self.votes.remove(vote_hash);

        let shell_unused = self
            .candidates
            .get(tx_hash)
            .map_or(false, |c| !c.has_request())
            && !self.orphan_votes.values().any(|v| v.tx_hash() == *tx_hash);
        if shell_unused {
            self.candidates.remove(tx_hash);
        }
    }

    fn average_orphan_epoch(&self) -> Timestamp {
        if self.voter_orphan_epoch.is_empty() {
            return Timestamp::EPOCH;
        }
        let total: u64 = self
            .voter_orphan_epoch
            .values()
            .map(Timestamp::as_secs)
            .sum();
        Timestamp::new(total / self.voter_orphan_epoch.len() as u64)
    }

    /// Whether every input of `req` already has a quorum of orphan votes.
    fn is_enough_orphan_votes(&self, req: &TxLockRequest) -> bool {
        let tx_hash = req.hash();
        req.transaction().inputs.iter().all(|input| {
            let votes = self
                .orphan_votes
                .values()
                .filter(|v| v.tx_hash() == tx_hash && v.outpoint() == input.prevout)
                .count() as u32;
            votes >= crate::outpoint_lock::SIGNATURES_REQUIRED
        })
    }

    /// Retry every parked vote; the ones whose candidate went live since
    /// are absorbed and unparked.
    fn process_orphan_votes(&mut self, now: Timestamp) {
        let parked: Vec<TxHash> = self.orphan_votes.keys().copied().collect();
        for vote_hash in parked {
            let Some(vote) = self.orphan_votes.get(&vote_hash).cloned() else {
                continue; // drained by a nested reprocess
            };
            if self.process_vote(vote, None, now) == VoteOutcome::Delivered {
                self.orphan_votes.remove(&vote_hash);
            }
        }
    }

    // ── Finalization ───────────────────────────────────────────────────

    /// Complete the lock if the candidate just became all-ready and the
    /// claim survives conflict resolution.
    fn try_finalize(&mut self, tx_hash: TxHash, now: Timestamp) {
        if !self.deps.sporks.is_active(Spork::DirectsendEnabled) {
            return;
        }
        let all_ready = self
            .candidates
            .get(&tx_hash)
            .map_or(false, TxLockCandidate::is_all_ready);
        if !all_ready || self.is_locked(&tx_hash) {
            return;
        }
        debug!(txid = %tx_hash, "transaction lock is ready to complete");

        if self.resolve_conflicts(tx_hash, now) {
            self.lock_transaction_inputs(tx_hash);
            self.update_locked_transaction(tx_hash);
        }
    }

    fn lock_transaction_inputs(&mut self, tx_hash: TxHash) {
        if !self.deps.sporks.is_active(Spork::DirectsendEnabled) {
            return;
        }
        let outpoints: Vec<OutPoint> = match self.candidates.get(&tx_hash) {
            Some(c) if c.is_all_ready() => c.outpoints().copied().collect(),
            _ => return,
        };
        for outpoint in outpoints {
            self.locked_outpoints.insert(outpoint, tx_hash);
        }
        debug!(txid = %tx_hash, "transaction inputs locked");
    }

    fn update_locked_transaction(&mut self, tx_hash: TxHash) {
        if !self.is_locked(&tx_hash) {
            return;
        }

        if self.deps.wallet.transaction_updated(&tx_hash) {
            self.completed_locks += 1;
            if let Some(template) = &self.config.notify_command {
                notify::spawn_lock_notification(template, &tx_hash);
            }
        }

        if let Some(req) = self.candidates.get(&tx_hash).and_then(TxLockCandidate::request) {
            self.deps.wallet.notify_lock(req.hashed());
        }
        debug!(txid = %tx_hash, "transaction lock complete");
    }

    /// Check the candidate's claim against completed locks, the mempool,
    /// and the UTXO set.
    fn resolve_conflicts(&mut self, tx_hash: TxHash, now: Timestamp) -> bool {
        let Some(candidate) = self.candidates.get(&tx_hash) else {
            return false;
        };
        if !candidate.is_all_ready() {
            return false;
        }
        let Some(req) = candidate.request().cloned() else {
            return false;
        };
        let inputs: Vec<OutPoint> = req
            .transaction()
            .inputs
            .iter()
            .map(|i| i.prevout)
            .collect();

        for outpoint in &inputs {
            let locked_by = self.locked_outpoints.get(outpoint).copied();
            if let Some(other) = locked_by.filter(|h| *h != tx_hash) {
                // Two completed locks disagree on one input: the quorum
                // for that input is majority-adversarial, neither claim
                // can be trusted.
                let Some(other_req) = self
                    .candidates
                    .get(&other)
                    .and_then(TxLockCandidate::request)
                    .cloned()
                else {
                    error!(txid = %tx_hash, conflicting = %other,
                        "conflicting completed lock with missing candidate");
                    return false;
                };
                warn!(txid = %tx_hash, conflicting = %other,
                    "conflicting completed transaction locks, dropping both");
                if let Some(c) = self.candidates.get_mut(&tx_hash) {
                    c.set_confirmed_height(0); // force expiry at next sweep
                }
                if let Some(c) = self.candidates.get_mut(&other) {
                    c.set_confirmed_height(0);
                }
                self.check_and_remove(now);
                // already_have must keep answering true for both
                self.rejected_requests.insert(tx_hash, req);
                self.rejected_requests.insert(other, other_req);
                return false;
            }

            if let Some(spender) = self.deps.chain.mempool_spender(outpoint) {
                if spender != tx_hash {
                    // a standard-path spend is racing us; the candidate may
                    // retry on a later state change
                    warn!(txid = %tx_hash, mempool = %spender, %outpoint,
                        "transaction lock conflicts with mempool");
                    return false;
                }
            }
        }

        if let Some((_, block_hash)) = self.deps.chain.get_transaction(&tx_hash) {
            if !block_hash.is_zero() {
                debug!(txid = %tx_hash, block = %block_hash, "already included in block");
                return true;
            }
        }

        // Not mined yet: every input must still be unspent.
        for outpoint in &inputs {
            if self.deps.utxo.get_utxo(outpoint).is_none() {
                warn!(txid = %tx_hash, %outpoint,
                    "failed to find UTXO, a competing transaction was mined");
                return false;
            }
        }

        debug!(txid = %tx_hash, "no conflicts found");
        true
    }

    // ── Chain callbacks ────────────────────────────────────────────────

    /// Record the new tip height. Used only by expiry checks.
    pub fn updated_chain_tip(&mut self, height: u32) {
        self.cached_height = height;
    }

    /// A transaction we track was mined (`Some(height)`) or fell back to
    /// unconfirmed (`None`). Propagate the height into the candidate, its
    /// votes, and any orphans so expiry uses the right baseline.
    pub fn sync_transaction(&mut self, tx_hash: &TxHash, block_height: Option<u32>) {
        let new_height = block_height.map_or(HEIGHT_UNCONFIRMED, i64::from);
        debug!(txid = %tx_hash, new_height, "sync transaction");

        let mut vote_hashes = Vec::new();
        if let Some(candidate) = self.candidates.get_mut(tx_hash) {
            candidate.set_confirmed_height(new_height);
            for lock in candidate.outpoint_locks_mut() {
                for vote in lock.votes_mut() {
                    vote_hashes.push(vote.hash());
                    vote.set_confirmed_height(new_height);
                }
            }
        }
        for vote_hash in vote_hashes {
            if let Some(vote) = self.votes.get_mut(&vote_hash) {
                vote.set_confirmed_height(new_height);
            }
        }

        let parked: Vec<TxHash> = self
            .orphan_votes
            .iter()
            .filter(|(_, v)| v.tx_hash() == *tx_hash)
            .map(|(h, _)| *h)
            .collect();
        for vote_hash in parked {
            if let Some(vote) = self.orphan_votes.get_mut(&vote_hash) {
                vote.set_confirmed_height(new_height);
            }
            if let Some(vote) = self.votes.get_mut(&vote_hash) {
                vote.set_confirmed_height(new_height);
            }
        }
    }

    // ── Garbage collection ─────────────────────────────────────────────

    /// Periodic sweep of expired, timed-out, and failed state. The phase
    /// order preserves the cross-index invariants.
    pub fn check_and_remove(&mut self, now: Timestamp) {
        if !self.deps.registry.is_synced() {
            return;
        }
        let height = self.cached_height;
        let keep_depth = self.params.keep_lock_depth;

        // 1. expired candidates (plus orphan shells past their timeout),
        //    with every index entry hanging off them
        let doomed: Vec<TxHash> = self
            .candidates
            .iter()
            .filter(|(_, c)| {
                c.is_expired(height, keep_depth) || (!c.has_request() && c.is_timed_out(now))
            })
            .map(|(h, _)| *h)
            .collect();
        for tx_hash in doomed {
            info!(txid = %tx_hash, "removing expired lock candidate");
            if let Some(candidate) = self.candidates.remove(&tx_hash) {
                for outpoint in candidate.outpoints() {
                    self.locked_outpoints.remove(outpoint);
                    self.voted_outpoints.remove(outpoint);
                }
            }
            self.accepted_requests.remove(&tx_hash);
            self.rejected_requests.remove(&tx_hash);
        }

        // 2. expired votes
        self.votes
            .retain(|_, vote| !vote.is_expired(height, keep_depth));

        // 3. timed-out orphans, also dropped from the canonical store
        let timed_out: Vec<TxHash> = self
            .orphan_votes
            .iter()
            .filter(|(_, v)| v.is_timed_out(now))
            .map(|(h, _)| *h)
            .collect();
        for vote_hash in timed_out {
            debug!(vote = %vote_hash, "removing timed out orphan vote");
            self.orphan_votes.remove(&vote_hash);
            self.votes.remove(&vote_hash);
        }

        // 4. votes for lock attempts that failed to complete
        let failed: Vec<TxHash> = self
            .votes
            .iter()
            .filter(|(_, v)| v.is_failed(now, self.is_locked(&v.tx_hash())))
            .map(|(h, _)| *h)
            .collect();
        for vote_hash in failed {
            debug!(vote = %vote_hash, "removing vote for failed lock attempt");
            self.votes.remove(&vote_hash);
        }

        // 5. stale orphan rate-limit epochs
        self.voter_orphan_epoch.retain(|_, epoch| *epoch >= now);

        info!(summary = %self.summary(), "directsend maintenance");
    }

    // ── Read-only queries ──────────────────────────────────────────────

    /// Whether we already know this hash (request or vote) — gossip dedup.
    pub fn already_have(&self, hash: &TxHash) -> bool {
        self.accepted_requests.contains_key(hash)
            || self.rejected_requests.contains_key(hash)
            || self.votes.contains_key(hash)
    }

    /// Record a request the upstream acceptor let into the mempool.
    pub fn accept_request(&mut self, req: TxLockRequest) {
        self.accepted_requests.insert(req.hash(), req);
    }

    /// Record a request the upstream acceptor refused.
    pub fn reject_request(&mut self, req: TxLockRequest) {
        self.rejected_requests.insert(req.hash(), req);
    }

    pub fn get_request(&self, tx_hash: &TxHash) -> Option<&TxLockRequest> {
        self.candidates.get(tx_hash).and_then(TxLockCandidate::request)
    }

    pub fn has_request(&self, tx_hash: &TxHash) -> bool {
        self.get_request(tx_hash).is_some()
    }

    pub fn get_vote(&self, vote_hash: &TxHash) -> Option<&TxLockVote> {
        self.votes.get(vote_hash)
    }

    /// The tx claiming this outpoint through a completed lock, if any.
    pub fn get_locked_outpoint_tx(&self, outpoint: &OutPoint) -> Option<TxHash> {
        self.locked_outpoints.get(outpoint).copied()
    }

    fn status_usable(&self) -> bool {
        self.config.enabled && !self.deps.chain.is_fork_warning()
    }

    /// A verified request exists and every input has enough signatures.
    pub fn is_ready_to_lock(&self, tx_hash: &TxHash) -> bool {
        if !self.status_usable() || !self.deps.sporks.is_active(Spork::DirectsendEnabled) {
            return false;
        }
        self.candidates
            .get(tx_hash)
            .map_or(false, TxLockCandidate::is_all_ready)
    }

    /// The settled verdict the rest of the node acts on: every input of
    /// the candidate is claimed in `locked_outpoints` under this tx.
    pub fn is_locked(&self, tx_hash: &TxHash) -> bool {
        if !self.status_usable() || !self.deps.sporks.is_active(Spork::BlockFiltering) {
            return false;
        }
        let Some(candidate) = self.candidates.get(tx_hash) else {
            return false;
        };
        let mut outpoints = candidate.outpoints().peekable();
        if outpoints.peek().is_none() {
            return false;
        }
        outpoints.all(|o| self.locked_outpoints.get(o) == Some(tx_hash))
    }

    /// Lock-grade confirmations for the wallet/UI.
    pub fn confirmations(&self, tx_hash: &TxHash) -> u32 {
        if self.is_locked(tx_hash) {
            self.config.lock_depth
        } else {
            0
        }
    }

    /// Total signatures across inputs, or a status sentinel:
    /// −1 disabled / unknown, −2 fork warning, −3 feature flag off.
    pub fn signatures(&self, tx_hash: &TxHash) -> i32 {
        if !self.config.enabled {
            return -1;
        }
        if self.deps.chain.is_fork_warning() {
            return -2;
        }
        if !self.deps.sporks.is_active(Spork::DirectsendEnabled) {
            return -3;
        }
        self.candidates
            .get(tx_hash)
            .map_or(-1, |c| c.count_votes() as i32)
    }

    /// A candidate that ran out of time without gathering its quorum.
    pub fn is_candidate_timed_out(&self, tx_hash: &TxHash, now: Timestamp) -> bool {
        if !self.config.enabled {
            return false;
        }
        self.candidates
            .get(tx_hash)
            .map_or(false, |c| !c.is_all_ready() && c.is_timed_out(now))
    }

    /// Re-relay a candidate: the request plus every signed vote.
    pub fn relay_candidate(&self, tx_hash: &TxHash) {
        let Some(candidate) = self.candidates.get(tx_hash) else {
            return;
        };
        if let Some(req) = candidate.request() {
            self.deps.transport.relay_transaction(req.hashed());
        }
        for lock in candidate.outpoint_locks() {
            for vote in lock.votes() {
                self.deps.transport.relay_inventory(Inv::lock_vote(vote.hash()));
            }
        }
    }

    pub fn cached_height(&self) -> u32 {
        self.cached_height
    }

    pub fn completed_locks(&self) -> u64 {
        self.completed_locks
    }

    pub fn summary(&self) -> EngineSummary {
        EngineSummary {
            candidates: self.candidates.len(),
            votes: self.votes.len(),
            orphan_votes: self.orphan_votes.len(),
            completed_locks: self.completed_locks,
        }
    }
}
