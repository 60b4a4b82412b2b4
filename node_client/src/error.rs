use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NodeClientError {
    #[error("Could not initialize node client: {0}")]
    Initialization(String),
    #[error("Could not reach the node: {0}")]
    Transport(String),
    #[error("Node RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("The node rejected the wallet key")]
    InvalidKey,
    #[error("The node reported a payment request status outside the known vocabulary: {0}")]
    UnknownStatus(String),
    #[error("Could not decode the node response: {0}")]
    ResponseFormat(String),
}

impl NodeClientError {
    /// Transient errors are worth retrying; every other kind indicates a configuration or integration problem
    /// (or, for [`NodeClientError::InvalidKey`], a bad wallet credential) and must be handled, not retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, NodeClientError::Transport(_))
    }
}
