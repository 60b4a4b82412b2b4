//! Storage contracts for payment-engine backends.
//!
//! The engine never touches a database directly; it is written against the two traits in this module. A backend
//! supplies atomic single-row reads and writes for the records the core mutates:
//!
//! * [`InvoiceManagement`]: the invoice/payment-method side, consumed by the payment watcher. Its
//!   `update_invoice_status` operation is the single persistence write a watcher performs in its lifetime, and it is
//!   guarded so that invoice statuses only ever move forward.
//! * [`WalletManagement`]: the wallet/store side, consumed by the wallet synchronizer and the creation paths.
//!
//! [`crate::SqliteDatabase`] implements both.

mod invoice_management;
mod wallet_management;

pub use invoice_management::{InvoiceManagement, PaymentGatewayError};
pub use wallet_management::WalletManagement;
