//! Consensus parameters relevant to transaction locking.

use serde::{Deserialize, Serialize};

/// Consensus-level parameters stored by every node.
///
/// These are network constants (per-chain), not user configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Confirmations beyond which lock data may be pruned. Locks and votes
    /// expire this many blocks after the corresponding tx was mined.
    pub keep_lock_depth: u32,

    /// Minimum confirmations an input must have before its tx is eligible
    /// for locking.
    pub confirmations_required: u32,

    /// Base per-input minimum fee in duffs.
    pub min_fee: u64,

    /// Whether the reduced-fee activation is live at the tip. When active,
    /// the base fee is divided by ten.
    pub reduced_fee_active: bool,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            keep_lock_depth: 24,
            confirmations_required: 6,
            min_fee: 10_000,
            reduced_fee_active: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_defaults() {
        let p = ConsensusParams::default();
        assert_eq!(p.keep_lock_depth, 24);
        assert_eq!(p.confirmations_required, 6);
        assert!(p.min_fee > 0);
    }
}
