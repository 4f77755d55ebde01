//! Nullable masternode registry — programmable membership, ranks, and a
//! record of every ban and ask-for.

use directsend_engine::adapters::{MasternodeInfo, MasternodeRegistry, PeerId};
use directsend_types::{PublicKey, VoterId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub struct NullRegistry {
    masternodes: Mutex<HashMap<VoterId, MasternodeInfo>>,
    ranks: Mutex<HashMap<VoterId, u32>>,
    synced: AtomicBool,
    banned: Mutex<Vec<VoterId>>,
    asked: Mutex<Vec<(Option<PeerId>, VoterId)>>,
}

impl NullRegistry {
    pub fn new() -> Self {
        Self {
            masternodes: Mutex::new(HashMap::new()),
            ranks: Mutex::new(HashMap::new()),
            synced: AtomicBool::new(false),
            banned: Mutex::new(Vec::new()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Register a masternode with its pubkey and fixed rank.
    pub fn add(&self, voter: VoterId, pubkey: PublicKey, rank: u32) {
        self.masternodes
            .lock()
            .unwrap()
            .insert(voter, MasternodeInfo { pubkey });
        self.ranks.lock().unwrap().insert(voter, rank);
    }

    /// Re-rank a masternode (as a new quorum height would).
    pub fn set_rank(&self, voter: VoterId, rank: u32) {
        self.ranks.lock().unwrap().insert(voter, rank);
    }

    pub fn set_synced(&self, synced: bool) {
        self.synced.store(synced, Ordering::Relaxed);
    }

    /// Voters banned so far (for assertions).
    pub fn banned(&self) -> Vec<VoterId> {
        self.banned.lock().unwrap().clone()
    }

    /// Records requested from peers so far (for assertions).
    pub fn asked(&self) -> Vec<(Option<PeerId>, VoterId)> {
        self.asked.lock().unwrap().clone()
    }
}

impl Default for NullRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MasternodeRegistry for NullRegistry {
    fn has(&self, voter: &VoterId) -> bool {
        self.masternodes.lock().unwrap().contains_key(voter)
    }

    fn info(&self, voter: &VoterId) -> Option<MasternodeInfo> {
        self.masternodes.lock().unwrap().get(voter).cloned()
    }

    fn ask_for(&self, origin: Option<PeerId>, voter: &VoterId) {
        self.asked.lock().unwrap().push((origin, *voter));
    }

    fn ban(&self, voter: &VoterId) {
        self.banned.lock().unwrap().push(*voter);
    }

    fn rank(&self, voter: &VoterId, _height: u32, _min_protocol: u32) -> Option<u32> {
        self.ranks.lock().unwrap().get(voter).copied()
    }

    fn is_synced(&self) -> bool {
        self.synced.load(Ordering::Relaxed)
    }
}
