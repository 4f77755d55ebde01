//! Lock requests: transactions submitted for accelerated settlement.

use crate::adapters::UtxoView;
use crate::error::RequestRejection;
use crate::outpoint_lock::SIGNATURES_TOTAL;
use directsend_crypto::hash_transaction;
use directsend_types::{ConsensusParams, HashedTransaction, Transaction, TxHash};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inputs above this count only draw a warning; the request stays valid.
pub const WARN_MANY_INPUTS: usize = 100;

/// A transaction submitted for locking, paired with its hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxLockRequest {
    tx: HashedTransaction,
}

impl TxLockRequest {
    pub fn new(tx: Transaction) -> Self {
        let hash = hash_transaction(&tx);
        Self {
            tx: HashedTransaction::new(tx, hash),
        }
    }

    pub fn hash(&self) -> TxHash {
        self.tx.hash
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx.tx
    }

    pub fn hashed(&self) -> &HashedTransaction {
        &self.tx
    }

    /// Structural validation against current chain state.
    ///
    /// The caller supplies the tip height and the feature-flag-carried
    /// value ceiling; consensus constants come from `params`.
    pub fn is_valid(
        &self,
        utxo_view: &dyn UtxoView,
        tip_height: u32,
        max_value: u64,
        params: &ConsensusParams,
    ) -> Result<(), RequestRejection> {
        let tx = self.transaction();

        if tx.inputs.is_empty() {
            return Err(RequestRejection::NoInputs);
        }
        if tx.outputs.is_empty() {
            return Err(RequestRejection::NoOutputs);
        }
        if tx.inputs.len() > WARN_MANY_INPUTS {
            debug!(txid = %self.hash(), inputs = tx.inputs.len(), "lock request has many inputs");
        }

        if !tx.is_final_at(tip_height) {
            return Err(RequestRejection::NotFinal);
        }

        let mut value_out: u64 = 0;
        for output in &tx.outputs {
            if !output.script.is_normal_payment() && !output.script.is_unspendable() {
                return Err(RequestRejection::NonStandardOutput);
            }
            value_out = value_out.saturating_add(output.value);
        }

        // 1 less than the wallet-side requirement, in case a block is
        // propagating the network right now.
        let confirmations_required = params.confirmations_required.saturating_sub(1);

        let mut value_in: u64 = 0;
        for input in &tx.inputs {
            let utxo = utxo_view
                .get_utxo(&input.prevout)
                .ok_or(RequestRejection::MissingUtxo(input.prevout))?;

            let age = tip_height.saturating_sub(utxo.height) + 1;
            if age < confirmations_required {
                return Err(RequestRejection::InputTooYoung {
                    outpoint: input.prevout,
                    age,
                    required: confirmations_required,
                });
            }
            value_in = value_in.saturating_add(utxo.value);
        }

        if value_in > max_value {
            return Err(RequestRejection::ValueTooHigh {
                value: value_in,
                max: max_value,
            });
        }

        let required_fee = self.min_fee(params);
        let fee = value_in.saturating_sub(value_out);
        if value_in < value_out || fee < required_fee {
            return Err(RequestRejection::FeeTooLow {
                fee,
                required: required_fee,
            });
        }

        Ok(())
    }

    /// Per-request minimum fee: `max(base, n_inputs × base)`, with the base
    /// reduced tenfold once the fee activation is live.
    pub fn min_fee(&self, params: &ConsensusParams) -> u64 {
        let base = if params.reduced_fee_active {
            params.min_fee / 10
        } else {
            params.min_fee
        };
        base.max(self.transaction().inputs.len() as u64 * base)
    }

    /// Upper bound on votes this request can ever accumulate.
    pub fn max_signatures(&self) -> u32 {
        self.transaction().inputs.len() as u32 * SIGNATURES_TOTAL
    }
}
