use sqlx::{Row, SqliteConnection};

use crate::db_types::{NewStore, Store};

pub async fn insert_store(store: NewStore, conn: &mut SqliteConnection) -> Result<Store, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO stores (name, default_currency, created_at)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(store.name)
    .bind(store.default_currency)
    .bind(store.created_at)
    .fetch_one(conn)
    .await
}

pub async fn fetch_store_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Store>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM stores WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn link_wallet_to_store(
    wallet_id: i64,
    store_id: i64,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    // Re-linking an existing pair is a no-op
    sqlx::query("INSERT OR IGNORE INTO wallets_x_stores (wallet_id, store_id) VALUES ($1, $2)")
        .bind(wallet_id)
        .bind(store_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn wallet_count_for_store(store_id: i64, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM wallets_x_stores WHERE store_id = $1")
        .bind(store_id)
        .fetch_one(conn)
        .await?;
    Ok(row.get("n"))
}
