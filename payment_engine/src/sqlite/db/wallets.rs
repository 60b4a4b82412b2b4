use bpg_common::Satoshis;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewWallet, Wallet};

pub async fn insert_wallet(wallet: NewWallet, conn: &mut SqliteConnection) -> Result<Wallet, sqlx::Error> {
    let wallet: Wallet = sqlx::query_as(
        r#"
            INSERT INTO wallets (name, xpub, currency, balance, lightning_enabled, created_at)
            VALUES ($1, $2, $3, 0, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(wallet.name)
    .bind(wallet.xpub.as_str())
    .bind(wallet.currency)
    .bind(wallet.lightning_enabled)
    .bind(wallet.created_at)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Wallet #{} ({}) created", wallet.id, wallet.name);
    Ok(wallet)
}

pub async fn fetch_wallet_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Wallet>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM wallets WHERE id = $1").bind(id).fetch_optional(conn).await
}

/// Single-row balance write. Returns `true` if the wallet existed.
pub async fn update_wallet_balance(
    id: i64,
    balance: Satoshis,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE wallets SET balance = $1 WHERE id = $2")
        .bind(balance)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Removes the wallet row. Returns `false` when the wallet was already gone, so repeated deletion is a no-op.
pub async fn delete_wallet(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM wallets WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
