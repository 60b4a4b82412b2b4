//! # Low-level SQLite queries
//!
//! All database interactions live here as simple free functions that accept a `&mut SqliteConnection` argument.
//! Callers obtain a connection from the pool, or open a transaction when several statements must be atomic, and
//! pass it through without any other changes.
use std::env;

use log::info;
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod invoices;
pub mod stores;
pub mod wallets;

const SQLITE_DB_URL: &str = "sqlite://data/bpg_store.db";

pub fn db_url() -> String {
    let result = env::var("BPG_DATABASE_URL").unwrap_or_else(|_| {
        info!("BPG_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
