use std::{fmt::Display, str::FromStr};

use bpg_common::Satoshis;
use serde::{Deserialize, Serialize};

use crate::NodeClientError;

//--------------------------------------        Xpub        ----------------------------------------------------------
/// A lightweight wrapper around an extended public key string. The key is an opaque credential as far as the
/// gateway is concerned; only the node can tell whether it is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xpub(pub String);

impl Display for Xpub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Xpub {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Xpub {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Xpub {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------     PaymentRequestStatus     ------------------------------------------------------
/// The status vocabulary the node daemon uses for payment requests. Case-sensitive; a value outside this set is an
/// integration bug and parsing it fails loudly with [`NodeClientError::UnknownStatus`] rather than being silently
/// treated as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentRequestStatus {
    Pending,
    Unknown,
    Expired,
    Paid,
}

impl PaymentRequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, PaymentRequestStatus::Pending)
    }
}

impl Display for PaymentRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentRequestStatus::Pending => write!(f, "Pending"),
            PaymentRequestStatus::Unknown => write!(f, "Unknown"),
            PaymentRequestStatus::Expired => write!(f, "Expired"),
            PaymentRequestStatus::Paid => write!(f, "Paid"),
        }
    }
}

impl FromStr for PaymentRequestStatus {
    type Err = NodeClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Unknown" => Ok(Self::Unknown),
            "Expired" => Ok(Self::Expired),
            "Paid" => Ok(Self::Paid),
            other => Err(NodeClientError::UnknownStatus(other.to_string())),
        }
    }
}

//--------------------------------------   PaymentRequest   ----------------------------------------------------------
/// The node's view of a payment request attached to an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub address: String,
    pub status: PaymentRequestStatus,
    /// Amount received against the request so far, if the node reports it
    pub amount_received: Option<Satoshis>,
}

//--------------------------------------     NodeBalance    ----------------------------------------------------------
/// Wallet balance as reported by the node for an extended public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBalance {
    pub confirmed: Satoshis,
    #[serde(default)]
    pub unconfirmed: Satoshis,
}
