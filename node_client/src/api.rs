use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use bpg_common::Satoshis;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde_json::{json, Value};

use crate::{
    config::NodeConfig,
    data_objects::{NodeBalance, PaymentRequest, PaymentRequestStatus, Xpub},
    helpers::parse_amount,
    NodeClientError,
};

/// RPC error code the daemon returns when it cannot load the wallet for the supplied extended public key.
const RPC_KEY_LOAD_ERROR: i64 = -32021;

/// The node capability the payment engine is written against.
///
/// One client instance represents one RPC session for a single currency and (optionally) a single extended public
/// key. The watcher and synchronizer only ever see this trait; the concrete transport lives in
/// [`JsonRpcNodeClient`].
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Fetch the current status of the payment request attached to `address`.
    async fn get_payment_request_status(&self, address: &str) -> Result<PaymentRequest, NodeClientError>;

    /// Fetch the balance of the wallet this session was opened for.
    ///
    /// Fails with [`NodeClientError::InvalidKey`] if the node cannot load the wallet for the session key. Every
    /// other failure is a transport or protocol error.
    async fn get_balance(&self) -> Result<NodeBalance, NodeClientError>;

    /// Ask the node whether `xpub` is a well-formed, loadable extended public key.
    async fn validate_key(&self, xpub: &Xpub) -> Result<bool, NodeClientError>;
}

/// JSON-RPC 2.0 client for a cryptocurrency node daemon.
#[derive(Clone)]
pub struct JsonRpcNodeClient {
    config: NodeConfig,
    xpub: Option<Xpub>,
    client: Arc<Client>,
    next_id: Arc<AtomicU64>,
}

impl JsonRpcNodeClient {
    pub fn new(config: NodeConfig) -> Result<Self, NodeClientError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| NodeClientError::Initialization(e.to_string()))?;
        Ok(Self { config, xpub: None, client: Arc::new(client), next_id: Arc::new(AtomicU64::new(1)) })
    }

    /// Open the session against the wallet identified by `xpub`. All `getrequest`/`getbalance` calls made through
    /// this client are scoped to that wallet.
    pub fn with_xpub(mut self, xpub: Xpub) -> Self {
        self.xpub = Some(xpub);
        self
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    async fn rpc_call(&self, method: &str, mut params: Value) -> Result<Value, NodeClientError> {
        if let Some(xpub) = &self.xpub {
            params["xpub"] = json!(xpub.as_str());
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!("🔌️ Sending RPC call {method} (id {id})");
        let response = self
            .client
            .post(&self.config.rpc_url)
            .basic_auth(&self.config.rpc_user, Some(self.config.rpc_pass.reveal()))
            .json(&body)
            .send()
            .await
            .map_err(|e| NodeClientError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(NodeClientError::Transport(format!("node returned HTTP {status} for {method}")));
        }
        let envelope: Value =
            response.json().await.map_err(|e| NodeClientError::ResponseFormat(e.to_string()))?;
        if let Some(err) = envelope.get("error").filter(|e| !e.is_null()) {
            let code = err["code"].as_i64().unwrap_or_default();
            let message = err["message"].as_str().unwrap_or_default().to_string();
            trace!("🔌️ RPC call {method} failed with code {code}: {message}");
            return if code == RPC_KEY_LOAD_ERROR {
                Err(NodeClientError::InvalidKey)
            } else {
                Err(NodeClientError::Rpc { code, message })
            };
        }
        Ok(envelope["result"].clone())
    }
}

#[async_trait]
impl NodeClient for JsonRpcNodeClient {
    async fn get_payment_request_status(&self, address: &str) -> Result<PaymentRequest, NodeClientError> {
        let result = self.rpc_call("getrequest", json!({ "address": address })).await?;
        let status = result["status"]
            .as_str()
            .ok_or_else(|| NodeClientError::ResponseFormat("payment request is missing a status".into()))?
            .parse::<PaymentRequestStatus>()?;
        let amount_received = match result.get("amount") {
            Some(v) if !v.is_null() => Some(parse_amount(v)?),
            _ => None,
        };
        debug!("🔌️ Payment request for {address} is {status}");
        Ok(PaymentRequest { address: address.to_string(), status, amount_received })
    }

    async fn get_balance(&self) -> Result<NodeBalance, NodeClientError> {
        let result = self.rpc_call("getbalance", json!({})).await?;
        let confirmed = parse_amount(
            result
                .get("confirmed")
                .ok_or_else(|| NodeClientError::ResponseFormat("balance is missing 'confirmed'".into()))?,
        )?;
        let unconfirmed = match result.get("unconfirmed") {
            Some(v) if !v.is_null() => parse_amount(v)?,
            _ => Satoshis::default(),
        };
        Ok(NodeBalance { confirmed, unconfirmed })
    }

    async fn validate_key(&self, xpub: &Xpub) -> Result<bool, NodeClientError> {
        let result = self.rpc_call("validatekey", json!({ "xpub": xpub.as_str() })).await?;
        result
            .as_bool()
            .ok_or_else(|| NodeClientError::ResponseFormat(format!("validatekey returned {result}")))
    }
}
