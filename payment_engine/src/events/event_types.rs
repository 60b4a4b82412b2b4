use serde::{Deserialize, Serialize};

use crate::db_types::{Invoice, InvoiceStatus};

/// Emitted once, when the watcher persists `complete` for an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoicePaidEvent {
    pub invoice: Invoice,
}

impl InvoicePaidEvent {
    pub fn new(invoice: Invoice) -> Self {
        Self { invoice }
    }
}

/// Emitted once, when an invoice reaches `expired` or `invalid` instead of being paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceAnnulledEvent {
    pub invoice: Invoice,
    pub status: InvoiceStatus,
}

impl InvoiceAnnulledEvent {
    pub fn new(invoice: Invoice) -> Self {
        let status = invoice.status;
        Self { invoice, status }
    }
}

/// Emitted when the wallet synchronizer removes a wallet because the node rejected its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRemovedEvent {
    pub wallet_id: i64,
    pub xpub: String,
}

impl WalletRemovedEvent {
    pub fn new(wallet_id: i64, xpub: String) -> Self {
        Self { wallet_id, xpub }
    }
}
