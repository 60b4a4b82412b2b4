use std::{fmt::Display, str::FromStr};

use bpg_common::{Satoshis, BTC_CURRENCY_CODE};
use chrono::{DateTime, Utc};
use node_client::{PaymentRequestStatus, Xpub};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------   InvoiceStatus   -----------------------------------------------------------
/// The lifecycle of an invoice.
///
/// Every invoice starts out `pending`. Exactly one transition to one of the terminal states (`invalid`, `expired`,
/// `complete`) is allowed, and there are no transitions out of a terminal state. The storage layer enforces this
/// with a guarded update (see [`crate::traits::InvoiceManagement::update_invoice_status`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Awaiting payment. The only non-terminal state.
    Pending,
    /// The node does not know about the payment request.
    Invalid,
    /// The payment window lapsed before payment arrived.
    Expired,
    /// Payment was received in full.
    Complete,
}

impl InvoiceStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvoiceStatus::Pending)
    }

    /// Maps a node payment-request status onto the invoice lifecycle. `Pending` maps to `None`, i.e. no transition;
    /// the watcher keeps polling.
    pub fn from_request_status(status: PaymentRequestStatus) -> Option<Self> {
        match status {
            PaymentRequestStatus::Pending => None,
            PaymentRequestStatus::Unknown => Some(InvoiceStatus::Invalid),
            PaymentRequestStatus::Expired => Some(InvoiceStatus::Expired),
            PaymentRequestStatus::Paid => Some(InvoiceStatus::Complete),
        }
    }
}

impl Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Pending => write!(f, "pending"),
            InvoiceStatus::Invalid => write!(f, "invalid"),
            InvoiceStatus::Expired => write!(f, "expired"),
            InvoiceStatus::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid invoice status: {0}")]
pub struct InvoiceStatusConversionError(String);

impl FromStr for InvoiceStatus {
    type Err = InvoiceStatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "invalid" => Ok(Self::Invalid),
            "expired" => Ok(Self::Expired),
            "complete" => Ok(Self::Complete),
            s => Err(InvoiceStatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------      Invoice      -----------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub price: Satoshis,
    pub currency: String,
    pub status: InvoiceStatus,
    /// Payment window in seconds, measured from `created_at`. `None` means the invoice never expires on its own.
    pub expiration: Option<i64>,
    pub buyer_email: Option<String>,
    /// Id of the discount applied at checkout, if any
    pub discount: Option<i64>,
    pub promocode: Option<String>,
    pub store_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// The instant at which the payment window closes, if the invoice has one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiration.map(|secs| self.created_at + chrono::Duration::seconds(secs))
    }
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub price: Satoshis,
    pub currency: String,
    pub expiration: Option<i64>,
    pub buyer_email: Option<String>,
    pub discount: Option<i64>,
    pub promocode: Option<String>,
    pub store_id: i64,
    pub created_at: DateTime<Utc>,
}

impl NewInvoice {
    pub fn new(price: Satoshis, store_id: i64) -> Self {
        Self {
            price,
            currency: BTC_CURRENCY_CODE.to_string(),
            expiration: None,
            buyer_email: None,
            discount: None,
            promocode: None,
            store_id,
            created_at: Utc::now(),
        }
    }

    pub fn with_expiration(mut self, seconds: i64) -> Self {
        self.expiration = Some(seconds);
        self
    }

    pub fn with_discount(mut self, discount_id: i64) -> Self {
        self.discount = Some(discount_id);
        self
    }
}

//--------------------------------------   PaymentMethod   -----------------------------------------------------------
/// One currency-specific destination offered for paying an invoice. Immutable once attached; the invoice `status`
/// field is the only thing the watcher ever mutates.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: i64,
    pub invoice_id: i64,
    pub currency: String,
    pub payment_address: String,
    /// Exchange rate between the invoice currency and this method's currency at creation time
    pub rate: Satoshis,
    pub confirmations: i64,
    pub recommended_fee: Satoshis,
    pub lightning: bool,
}

impl PaymentMethod {
    /// Human-readable name for checkout pages, e.g. `BTC`, `BTC (⚡)` or `BTC (2)` when a currency is offered more
    /// than once.
    pub fn display_name(&self, index: Option<usize>) -> String {
        let mut name =
            if self.lightning { format!("{} (⚡)", self.currency) } else { self.currency.clone() };
        if let Some(i) = index {
            name = format!("{name} ({i})");
        }
        name.to_uppercase()
    }
}

#[derive(Debug, Clone)]
pub struct NewPaymentMethod {
    pub invoice_id: i64,
    pub currency: String,
    pub payment_address: String,
    pub rate: Satoshis,
    pub confirmations: i64,
    pub recommended_fee: Satoshis,
    pub lightning: bool,
}

impl NewPaymentMethod {
    pub fn new(invoice_id: i64, payment_address: &str, rate: Satoshis) -> Self {
        Self {
            invoice_id,
            currency: BTC_CURRENCY_CODE.to_string(),
            payment_address: payment_address.to_string(),
            rate,
            confirmations: 1,
            recommended_fee: Satoshis::default(),
            lightning: false,
        }
    }
}

//--------------------------------------      Wallet       -----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub name: String,
    pub xpub: String,
    pub currency: String,
    /// Cached balance, reflecting the last successful node query. Only the wallet synchronizer writes this.
    pub balance: Satoshis,
    pub lightning_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    pub fn xpub(&self) -> Xpub {
        Xpub::from(self.xpub.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct NewWallet {
    pub name: String,
    pub xpub: Xpub,
    pub currency: String,
    pub lightning_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl NewWallet {
    pub fn new(name: &str, xpub: Xpub) -> Self {
        Self {
            name: name.to_string(),
            xpub,
            currency: bpg_common::BTC_CURRENCY_CODE_LOWER.to_string(),
            lightning_enabled: false,
            created_at: Utc::now(),
        }
    }
}

//--------------------------------------       Store       -----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub default_currency: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub default_currency: String,
    pub created_at: DateTime<Utc>,
}

impl NewStore {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default_currency: bpg_common::BTC_CURRENCY_CODE_LOWER.to_string(),
            created_at: Utc::now(),
        }
    }
}
