#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use bpg_common::Satoshis;
use node_client::{NodeBalance, NodeClient, NodeClientError, PaymentRequest, PaymentRequestStatus, Xpub};

/// A scripted stand-in for the node daemon.
///
/// `get_payment_request_status` plays back the supplied responses in order; once the script is exhausted the node
/// keeps reporting `Pending`, which models a payment that never arrives. Poll and balance-call counts are recorded
/// so tests can assert on them.
#[derive(Clone, Default)]
pub struct FakeNodeClient {
    script: Arc<Mutex<VecDeque<Result<PaymentRequestStatus, NodeClientError>>>>,
    balance: Arc<Mutex<Option<Result<NodeBalance, NodeClientError>>>>,
    key_is_valid: Arc<Mutex<bool>>,
    polls: Arc<AtomicUsize>,
    balance_calls: Arc<AtomicUsize>,
}

impl FakeNodeClient {
    pub fn with_script(script: Vec<Result<PaymentRequestStatus, NodeClientError>>) -> Self {
        let client = Self::default();
        *client.script.lock().unwrap() = script.into();
        client
    }

    pub fn with_balance(balance: Result<NodeBalance, NodeClientError>) -> Self {
        let client = Self::default();
        *client.balance.lock().unwrap() = Some(balance);
        *client.key_is_valid.lock().unwrap() = true;
        client
    }

    pub fn set_key_valid(&self, valid: bool) {
        *self.key_is_valid.lock().unwrap() = valid;
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn balance_call_count(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }
}

pub fn confirmed(sats: i64) -> NodeBalance {
    NodeBalance { confirmed: Satoshis::from(sats), unconfirmed: Satoshis::default() }
}

#[async_trait]
impl NodeClient for FakeNodeClient {
    async fn get_payment_request_status(&self, address: &str) -> Result<PaymentRequest, NodeClientError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        let status = match next {
            Some(Ok(status)) => status,
            Some(Err(e)) => return Err(e),
            None => PaymentRequestStatus::Pending,
        };
        Ok(PaymentRequest { address: address.to_string(), status, amount_received: None })
    }

    async fn get_balance(&self) -> Result<NodeBalance, NodeClientError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        match self.balance.lock().unwrap().clone() {
            Some(result) => result,
            None => Err(NodeClientError::Transport("no balance scripted".to_string())),
        }
    }

    async fn validate_key(&self, _xpub: &Xpub) -> Result<bool, NodeClientError> {
        Ok(*self.key_is_valid.lock().unwrap())
    }
}
