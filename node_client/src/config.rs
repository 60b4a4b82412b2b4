use bpg_common::Secret;
use log::*;

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:5000";

/// Connection details for a node RPC daemon. Constructed explicitly and handed to [`super::JsonRpcNodeClient`],
/// rather than read from process-wide globals, so that tests can inject whatever they need.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Base URL of the node's RPC endpoint, e.g. `http://localhost:5000`
    pub rpc_url: String,
    pub rpc_user: String,
    pub rpc_pass: Secret<String>,
    /// Lowercase currency code the daemon serves, e.g. `btc`
    pub currency: String,
}

impl NodeConfig {
    pub fn new(rpc_url: &str, rpc_user: &str, rpc_pass: &str) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            rpc_user: rpc_user.to_string(),
            rpc_pass: Secret::new(rpc_pass.to_string()),
            currency: bpg_common::BTC_CURRENCY_CODE_LOWER.to_string(),
        }
    }

    pub fn from_env_or_default() -> Self {
        let rpc_url = std::env::var("BPG_RPC_URL").unwrap_or_else(|_| {
            warn!("🔌️ BPG_RPC_URL not set. Using the default, {DEFAULT_RPC_URL}");
            DEFAULT_RPC_URL.to_string()
        });
        let rpc_user = std::env::var("BPG_RPC_USER").unwrap_or_else(|_| {
            warn!("🔌️ BPG_RPC_USER not set. Using an empty username.");
            String::default()
        });
        let rpc_pass = Secret::new(std::env::var("BPG_RPC_PASS").unwrap_or_else(|_| {
            warn!("🔌️ BPG_RPC_PASS not set. Using an empty password.");
            String::default()
        }));
        let currency = std::env::var("BPG_RPC_CURRENCY")
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or_else(|_| bpg_common::BTC_CURRENCY_CODE_LOWER.to_string());
        Self { rpc_url, rpc_user, rpc_pass, currency }
    }
}
