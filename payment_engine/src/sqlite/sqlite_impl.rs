//! `SqliteDatabase` is the bundled storage backend for the payment engine. It implements the [`InvoiceManagement`]
//! and [`WalletManagement`] traits on top of a sqlx connection pool; the actual queries live in the [`super::db`]
//! modules.
use std::fmt::Debug;

use async_trait::async_trait;
use bpg_common::Satoshis;
use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, invoices, new_pool, stores, wallets};
use crate::{
    db_types::{Invoice, InvoiceStatus, NewInvoice, NewPaymentMethod, NewStore, NewWallet, PaymentMethod, Store, Wallet},
    traits::{InvoiceManagement, PaymentGatewayError, WalletManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool using the URL from the `BPG_DATABASE_URL` environment variable.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}

#[async_trait]
impl InvoiceManagement for SqliteDatabase {
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let store = stores::fetch_store_by_id(invoice.store_id, &mut tx)
            .await?
            .ok_or(PaymentGatewayError::StoreNotFound(invoice.store_id))?;
        let linked = stores::wallet_count_for_store(store.id, &mut tx).await?;
        if linked == 0 {
            return Err(PaymentGatewayError::NoWalletLinked(store.id));
        }
        let invoice = invoices::insert_invoice(invoice, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Invoice #{} has been saved for store '{}'", invoice.id, store.name);
        Ok(invoice)
    }

    async fn fetch_invoice(&self, invoice_id: i64) -> Result<Option<Invoice>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let invoice = invoices::fetch_invoice_by_id(invoice_id, &mut conn).await?;
        Ok(invoice)
    }

    async fn update_invoice_status(
        &self,
        invoice_id: i64,
        status: InvoiceStatus,
    ) -> Result<Option<Invoice>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let updated = invoices::update_invoice_status(invoice_id, status, &mut conn).await?;
        match &updated {
            Some(invoice) => debug!("🗃️ Invoice #{} is now {}", invoice.id, invoice.status),
            None => trace!("🗃️ Invoice #{invoice_id} was already terminal. No write performed."),
        }
        Ok(updated)
    }

    async fn attach_payment_method(
        &self,
        method: NewPaymentMethod,
    ) -> Result<PaymentMethod, PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let invoice_id = method.invoice_id;
        invoices::fetch_invoice_by_id(invoice_id, &mut tx)
            .await?
            .ok_or(PaymentGatewayError::InvoiceNotFound(invoice_id))?;
        let method = invoices::insert_payment_method(method, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Payment method #{} attached to invoice #{invoice_id}", method.id);
        Ok(method)
    }

    async fn fetch_payment_methods(
        &self,
        invoice_id: i64,
    ) -> Result<Vec<PaymentMethod>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let methods = invoices::fetch_payment_methods_for_invoice(invoice_id, &mut conn).await?;
        Ok(methods)
    }
}

#[async_trait]
impl WalletManagement for SqliteDatabase {
    async fn insert_wallet(&self, wallet: NewWallet) -> Result<Wallet, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let wallet = wallets::insert_wallet(wallet, &mut conn).await?;
        Ok(wallet)
    }

    async fn fetch_wallet(&self, wallet_id: i64) -> Result<Option<Wallet>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let wallet = wallets::fetch_wallet_by_id(wallet_id, &mut conn).await?;
        Ok(wallet)
    }

    async fn update_wallet_balance(
        &self,
        wallet_id: i64,
        balance: Satoshis,
    ) -> Result<(), PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let existed = wallets::update_wallet_balance(wallet_id, balance, &mut conn).await?;
        if !existed {
            return Err(PaymentGatewayError::WalletNotFound(wallet_id));
        }
        debug!("🗃️ Wallet #{wallet_id} balance set to {balance}");
        Ok(())
    }

    async fn delete_wallet(&self, wallet_id: i64) -> Result<bool, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = wallets::delete_wallet(wallet_id, &mut conn).await?;
        if deleted {
            warn!("🗃️ Wallet #{wallet_id} has been deleted");
        }
        Ok(deleted)
    }

    async fn insert_store(&self, store: NewStore) -> Result<Store, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let store = stores::insert_store(store, &mut conn).await?;
        debug!("🗃️ Store #{} ('{}') created", store.id, store.name);
        Ok(store)
    }

    async fn fetch_store(&self, store_id: i64) -> Result<Option<Store>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let store = stores::fetch_store_by_id(store_id, &mut conn).await?;
        Ok(store)
    }

    async fn link_wallet_to_store(&self, wallet_id: i64, store_id: i64) -> Result<(), PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        stores::fetch_store_by_id(store_id, &mut tx)
            .await?
            .ok_or(PaymentGatewayError::StoreNotFound(store_id))?;
        wallets::fetch_wallet_by_id(wallet_id, &mut tx)
            .await?
            .ok_or(PaymentGatewayError::WalletNotFound(wallet_id))?;
        stores::link_wallet_to_store(wallet_id, store_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Wallet #{wallet_id} linked to store #{store_id}");
        Ok(())
    }
}
