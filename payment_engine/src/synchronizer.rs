//! Wallet registration and balance synchronization.
//!
//! A [`WalletApi`] pairs the storage backend with one node RPC session (a [`NodeClient`] opened for the wallet's
//! extended public key). [`WalletApi::sync_wallet`] is a one-shot balance refresh: a single node query, then a
//! single write on success, or the wallet's removal when the node rejects the key. Scheduling of refreshes is the
//! caller's concern.
use log::*;
use node_client::{NodeClient, NodeClientError};
use thiserror::Error;

use crate::{
    db_types::{NewWallet, Wallet},
    events::{EventProducers, WalletRemovedEvent},
    traits::{PaymentGatewayError, WalletManagement},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Balance refreshed from the node. Re-running with an unchanged node balance converges to the same value.
    Synced(bpg_common::Satoshis),
    /// The node rejected the wallet key; the wallet record was deleted.
    WalletRemoved,
    /// The wallet does not exist (any more). Nothing to do.
    NotFound,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Database failure: {0}")]
    Database(#[from] PaymentGatewayError),
    /// Transport and protocol errors propagate untouched. Only `InvalidKey` ever leads to deletion, and that is
    /// handled inside `sync_wallet`, not reported through this variant.
    #[error("Node client failure: {0}")]
    Node(NodeClientError),
    #[error("The node rejected the wallet key at registration")]
    KeyRejected,
}

pub struct WalletApi<B, C> {
    db: B,
    client: C,
    producers: EventProducers,
}

impl<B, C> WalletApi<B, C>
where
    B: WalletManagement,
    C: NodeClient,
{
    pub fn new(db: B, client: C, producers: EventProducers) -> Self {
        Self { db, client, producers }
    }

    /// Registers a new wallet, after asking the node whether the key is well-formed and loadable. Malformed keys
    /// are rejected here so the watcher and synchronizer never run against them.
    pub async fn register_wallet(&self, wallet: NewWallet) -> Result<Wallet, SyncError> {
        let valid = self.client.validate_key(&wallet.xpub).await.map_err(SyncError::Node)?;
        if !valid {
            warn!("💳️ Rejecting wallet '{}': the node cannot load its key", wallet.name);
            return Err(SyncError::KeyRejected);
        }
        let wallet = self.db.insert_wallet(wallet).await?;
        info!("💳️ Wallet #{} ('{}') registered", wallet.id, wallet.name);
        Ok(wallet)
    }

    /// Refreshes the wallet's cached balance from the node. One query, one write.
    ///
    /// * On success the confirmed balance is persisted; the cache only ever reflects a completed node query.
    /// * If the node signals that the key cannot be loaded, the wallet record is deleted. This is the only path in
    ///   the engine that removes data.
    /// * Every other error propagates; nothing is written and nothing is deleted.
    pub async fn sync_wallet(&self, wallet_id: i64) -> Result<SyncOutcome, SyncError> {
        let wallet = match self.db.fetch_wallet(wallet_id).await? {
            Some(w) => w,
            None => {
                debug!("💳️ Wallet #{wallet_id} does not exist. Nothing to sync.");
                return Ok(SyncOutcome::NotFound);
            },
        };
        match self.client.get_balance().await {
            Ok(balance) => {
                self.db.update_wallet_balance(wallet.id, balance.confirmed).await?;
                debug!("💳️ Wallet #{} balance synced to {}", wallet.id, balance.confirmed);
                Ok(SyncOutcome::Synced(balance.confirmed))
            },
            Err(NodeClientError::InvalidKey) => {
                warn!("💳️ The node cannot load the key for wallet #{}. Removing the wallet.", wallet.id);
                self.db.delete_wallet(wallet.id).await?;
                for producer in &self.producers.wallet_removed_producer {
                    producer.publish_event(WalletRemovedEvent::new(wallet.id, wallet.xpub.clone())).await;
                }
                Ok(SyncOutcome::WalletRemoved)
            },
            Err(e) => {
                warn!("💳️ Balance fetch for wallet #{} failed: {e}. The cached balance is untouched.", wallet.id);
                Err(SyncError::Node(e))
            },
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
