use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{Invoice, InvoiceStatus, NewInvoice, NewPaymentMethod, PaymentMethod};

/// Inserts a new invoice in `pending` status. This is not atomic on its own; the store-validation check lives in
/// the backend implementation, which wraps both in a transaction and passes `&mut *tx` here.
pub async fn insert_invoice(invoice: NewInvoice, conn: &mut SqliteConnection) -> Result<Invoice, sqlx::Error> {
    let invoice: Invoice = sqlx::query_as(
        r#"
            INSERT INTO invoices (price, currency, status, expiration, buyer_email, discount, promocode, store_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(invoice.price)
    .bind(invoice.currency)
    .bind(InvoiceStatus::Pending)
    .bind(invoice.expiration)
    .bind(invoice.buyer_email)
    .bind(invoice.discount)
    .bind(invoice.promocode)
    .bind(invoice.store_id)
    .bind(invoice.created_at)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Invoice #{} created for store #{}", invoice.id, invoice.store_id);
    Ok(invoice)
}

pub async fn fetch_invoice_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Invoice>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM invoices WHERE id = $1").bind(id).fetch_optional(conn).await
}

/// The guarded terminal write. The `status = 'pending'` predicate makes the transition monotonic: once an invoice
/// is terminal, further updates match zero rows and return `None` without touching the record.
pub async fn update_invoice_status(
    id: i64,
    status: InvoiceStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Invoice>, sqlx::Error> {
    let updated = sqlx::query_as(
        r#"
            UPDATE invoices SET status = $1
            WHERE id = $2 AND status = $3
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(id)
    .bind(InvoiceStatus::Pending)
    .fetch_optional(conn)
    .await?;
    Ok(updated)
}

pub async fn insert_payment_method(
    method: NewPaymentMethod,
    conn: &mut SqliteConnection,
) -> Result<PaymentMethod, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO payment_methods (invoice_id, currency, payment_address, rate, confirmations, recommended_fee, lightning)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(method.invoice_id)
    .bind(method.currency)
    .bind(method.payment_address)
    .bind(method.rate)
    .bind(method.confirmations)
    .bind(method.recommended_fee)
    .bind(method.lightning)
    .fetch_one(conn)
    .await
}

pub async fn fetch_payment_methods_for_invoice(
    invoice_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentMethod>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM payment_methods WHERE invoice_id = $1 ORDER BY id")
        .bind(invoice_id)
        .fetch_all(conn)
        .await
}
