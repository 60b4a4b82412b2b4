#![allow(dead_code)]

pub mod fake_node;
pub mod prepare_env;

use bpg_common::Satoshis;
use node_client::Xpub;
use payment_engine::{
    db_types::{Invoice, NewInvoice, NewStore, NewWallet, Store, Wallet},
    InvoiceManagement, SqliteDatabase, WalletManagement,
};

/// Creates a store with one linked wallet, ready to issue invoices.
pub async fn seed_store(db: &SqliteDatabase) -> (Store, Wallet) {
    let store = db.insert_store(NewStore::new("Test store")).await.expect("Error creating store");
    let wallet = db
        .insert_wallet(NewWallet::new("hot wallet", Xpub::from("xpub6TestWalletKey")))
        .await
        .expect("Error creating wallet");
    db.link_wallet_to_store(wallet.id, store.id).await.expect("Error linking wallet to store");
    (store, wallet)
}

pub async fn seed_invoice(db: &SqliteDatabase, store_id: i64) -> Invoice {
    db.insert_invoice(NewInvoice::new(Satoshis::from_coins(1), store_id))
        .await
        .expect("Error creating invoice")
}
