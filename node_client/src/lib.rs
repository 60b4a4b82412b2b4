//! Client abstraction over a cryptocurrency node's JSON-RPC daemon.
//!
//! The payment engine never talks to a node directly. Everything it needs is captured by the [`NodeClient`] trait:
//! querying the status of a payment request for an address, fetching the balance of an extended public key, and
//! validating a key before a wallet is accepted into the system. [`JsonRpcNodeClient`] is the production
//! implementation, speaking JSON-RPC 2.0 over HTTP(S) with basic-auth credentials taken from [`NodeConfig`].
//!
//! Tests and alternative backends provide their own `NodeClient` implementations.

mod api;
mod config;
mod data_objects;
mod error;
pub mod helpers;

pub use api::{JsonRpcNodeClient, NodeClient};
pub use config::NodeConfig;
pub use data_objects::{NodeBalance, PaymentRequest, PaymentRequestStatus, Xpub};
pub use error::NodeClientError;
