//! Shared-engine wrapper with an explicit lifecycle.
//!
//! The engine itself is a plain struct; this service owns it behind one
//! async mutex, exposes the ingress entry points, and drives the periodic
//! maintenance sweep. Constructed at node start, dropped (aborting its
//! background task) at node stop — never reached through ambient state.

use crate::adapters::PeerId;
use crate::engine::DirectsendEngine;
use crate::request::TxLockRequest;
use crate::vote::TxLockVote;
use directsend_messages::LockVoteMessage;
use directsend_types::{Timestamp, TxHash};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Cadence of the `check_and_remove` sweep.
const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60);

/// Owns the engine for the lifetime of the node.
pub struct DirectsendService {
    engine: Arc<Mutex<DirectsendEngine>>,
    maintenance: JoinHandle<()>,
}

impl DirectsendService {
    /// Wrap the engine and spawn the maintenance task.
    pub fn start(engine: DirectsendEngine) -> Self {
        let engine = Arc::new(Mutex::new(engine));
        let sweeper = Arc::clone(&engine);
        let maintenance = tokio::spawn(async move {
            let mut tick = tokio::time::interval(MAINTENANCE_INTERVAL);
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tick.tick().await;
                sweeper.lock().await.check_and_remove(Timestamp::now());
            }
        });
        Self { engine, maintenance }
    }

    /// Shared handle for message handlers and RPC.
    pub fn engine(&self) -> Arc<Mutex<DirectsendEngine>> {
        Arc::clone(&self.engine)
    }

    /// Ingress: a decoded lock request.
    pub async fn on_lock_request(&self, req: TxLockRequest) -> bool {
        self.engine
            .lock()
            .await
            .process_lock_request(req, Timestamp::now())
    }

    /// Ingress: a lock vote from a peer.
    pub async fn on_lock_vote(&self, msg: LockVoteMessage, origin: Option<PeerId>) -> bool {
        let now = Timestamp::now();
        let vote = TxLockVote::from_message(msg, now);
        self.engine
            .lock()
            .await
            .process_vote_message(vote, origin, now)
    }

    /// Chain tip moved.
    pub async fn on_chain_tip(&self, height: u32) {
        self.engine.lock().await.updated_chain_tip(height);
    }

    /// A tracked transaction was (un)confirmed.
    pub async fn on_sync_transaction(&self, tx_hash: TxHash, block_height: Option<u32>) {
        self.engine
            .lock()
            .await
            .sync_transaction(&tx_hash, block_height);
    }
}

impl Drop for DirectsendService {
    fn drop(&mut self) {
        self.maintenance.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{Spork, Utxo};
    use crate::config::DirectsendConfig;
    use crate::engine::EngineDeps;
    use directsend_nullables::{
        NullChain, NullRegistry, NullSporks, NullTransport, NullUtxoView, NullWallet,
    };
    use directsend_types::{
        ConsensusParams, OutPoint, Script, Transaction, TxIn, TxOut,
    };

    fn engine() -> (DirectsendEngine, Arc<NullUtxoView>) {
        let utxo = Arc::new(NullUtxoView::new());
        let registry = Arc::new(NullRegistry::new());
        registry.set_synced(true);
        let sporks = Arc::new(NullSporks::new());
        sporks.set_active(Spork::DirectsendEnabled, true);
        let chain = Arc::new(NullChain::new());
        chain.set_height(100);
        let deps = EngineDeps {
            utxo: utxo.clone(),
            registry,
            transport: Arc::new(NullTransport::new()),
            sporks,
            chain,
            wallet: Arc::new(NullWallet::new()),
        };
        let engine = DirectsendEngine::new(
            ConsensusParams::default(),
            DirectsendConfig::default(),
            None,
            deps,
        );
        (engine, utxo)
    }

    #[tokio::test]
    async fn request_flows_through_the_service() {
        let (engine, utxo) = engine();
        let service = DirectsendService::start(engine);

        let prevout = OutPoint::new(directsend_types::TxHash::new([1; 32]), 0);
        utxo.insert(
            prevout,
            Utxo {
                height: 10,
                value: 1_000_000,
                script: Script::NormalPayment,
            },
        );
        let req = TxLockRequest::new(Transaction::new(
            vec![TxIn::new(prevout)],
            vec![TxOut::new(900_000, Script::NormalPayment)],
        ));
        let tx_hash = req.hash();

        assert!(service.on_lock_request(req).await);
        let engine = service.engine();
        assert!(engine.lock().await.has_request(&tx_hash));
    }

    #[tokio::test]
    async fn dropping_the_service_stops_maintenance() {
        let (engine, _) = engine();
        let service = DirectsendService::start(engine);
        let handle = service.engine();
        drop(service);
        // the engine stays usable through surviving handles
        assert_eq!(handle.lock().await.completed_locks(), 0);
    }
}
