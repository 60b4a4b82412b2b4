use async_trait::async_trait;
use bpg_common::Satoshis;

use crate::{
    db_types::{NewStore, NewWallet, Store, Wallet},
    traits::PaymentGatewayError,
};

/// Wallet- and store-side storage operations, consumed by the wallet synchronizer and the creation paths.
///
/// `delete_wallet` is the one destructive operation in the engine. It exists solely for the synchronizer's
/// key-invalid path; no other code path removes data.
#[async_trait]
pub trait WalletManagement: Clone + Send + Sync {
    async fn insert_wallet(&self, wallet: NewWallet) -> Result<Wallet, PaymentGatewayError>;

    async fn fetch_wallet(&self, wallet_id: i64) -> Result<Option<Wallet>, PaymentGatewayError>;

    /// Overwrites the wallet's cached balance. Called only after a successful node query, so the cache never holds
    /// the result of a partial or failed fetch.
    async fn update_wallet_balance(
        &self,
        wallet_id: i64,
        balance: Satoshis,
    ) -> Result<(), PaymentGatewayError>;

    /// Removes the wallet record. Idempotent: deleting an absent wallet returns `false` rather than an error.
    async fn delete_wallet(&self, wallet_id: i64) -> Result<bool, PaymentGatewayError>;

    async fn insert_store(&self, store: NewStore) -> Result<Store, PaymentGatewayError>;

    async fn fetch_store(&self, store_id: i64) -> Result<Option<Store>, PaymentGatewayError>;

    /// Links a wallet to a store. A store needs at least one linked wallet before it can issue invoices.
    async fn link_wallet_to_store(&self, wallet_id: i64, store_id: i64) -> Result<(), PaymentGatewayError>;
}
