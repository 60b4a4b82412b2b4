//! Crypto Payment Gateway Engine
//!
//! The engine contains the systems core of the payment gateway: the machinery that watches blockchain addresses for
//! incoming payments and keeps invoice and wallet records in step with what the node reports. The surrounding
//! application (REST routes, authentication, product/discount CRUD) sits on top of this crate and is deliberately
//! not part of it.
//!
//! The crate is divided into three main sections:
//! 1. Storage. The [`traits`] module defines the contracts a database backend must provide ([`InvoiceManagement`]
//!    and [`WalletManagement`]); [`SqliteDatabase`] is the bundled SQLite implementation. All writes the engine
//!    makes are atomic single-row updates, and invoice status transitions are guarded so that a terminal status can
//!    never be overwritten.
//! 2. Reconciliation. [`PaymentWatcher`] drives one invoice through its lifecycle by polling a
//!    [`node_client::NodeClient`] until the payment request settles; [`WalletApi`] refreshes a wallet's cached
//!    balance on demand and removes wallets the node can no longer load.
//! 3. Events. The [`events`] module provides a small hook system so callers can react to invoices being paid or
//!    annulled without the engine knowing anything about notification delivery.

pub mod config;
pub mod db_types;
pub mod events;
pub mod traits;

mod synchronizer;
mod watcher;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use synchronizer::{SyncError, SyncOutcome, WalletApi};
pub use traits::{InvoiceManagement, PaymentGatewayError, WalletManagement};
pub use watcher::{spawn_payment_watcher, PaymentWatcher, WatchOutcome, WatcherError};
