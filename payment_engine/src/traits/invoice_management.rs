use async_trait::async_trait;
use thiserror::Error;

use crate::db_types::{Invoice, InvoiceStatus, NewInvoice, NewPaymentMethod, PaymentMethod};

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Invoice #{0} does not exist")]
    InvoiceNotFound(i64),
    #[error("Store #{0} does not exist")]
    StoreNotFound(i64),
    #[error("Store #{0} has no wallet linked")]
    NoWalletLinked(i64),
    #[error("Wallet #{0} does not exist")]
    WalletNotFound(i64),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}

/// Invoice-side storage operations. Everything the payment watcher needs from a backend, plus the invoice and
/// payment-method creation paths used by the surrounding application.
#[async_trait]
pub trait InvoiceManagement: Clone + Send + Sync {
    /// Creates a new invoice in `pending` status.
    ///
    /// The owning store must exist and have at least one wallet linked, otherwise
    /// [`PaymentGatewayError::NoWalletLinked`] is returned. The check and the insert happen in one transaction.
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice, PaymentGatewayError>;

    async fn fetch_invoice(&self, invoice_id: i64) -> Result<Option<Invoice>, PaymentGatewayError>;

    /// Transitions the invoice to a terminal status with a single guarded write.
    ///
    /// The write only succeeds while the stored status is still `pending`; statuses move forward monotonically and
    /// a terminal status is never overwritten. Returns the updated record, or `None` when the invoice was already
    /// terminal (or does not exist), in which case nothing was written.
    async fn update_invoice_status(
        &self,
        invoice_id: i64,
        status: InvoiceStatus,
    ) -> Result<Option<Invoice>, PaymentGatewayError>;

    /// Attaches a currency-specific payment destination to an invoice.
    async fn attach_payment_method(
        &self,
        method: NewPaymentMethod,
    ) -> Result<PaymentMethod, PaymentGatewayError>;

    async fn fetch_payment_methods(
        &self,
        invoice_id: i64,
    ) -> Result<Vec<PaymentMethod>, PaymentGatewayError>;
}
