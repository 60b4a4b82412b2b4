//! The per-invoice payment reconciliation loop.
//!
//! A [`PaymentWatcher`] owns one RPC session (a [`NodeClient`] constructed for the invoice's wallet key) and a
//! handle to the storage backend. [`PaymentWatcher::watch_invoice`] polls the node for the payment-request status
//! of a single address until it leaves `Pending`, then persists the mapped terminal status with exactly one guarded
//! write and stops. Watchers for different invoices are fully independent; spawn as many as there are invoices
//! awaiting payment.
use std::time::Duration;

use log::*;
use node_client::{NodeClient, NodeClientError};
use thiserror::Error;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, sleep, sleep_until, Instant, MissedTickBehavior},
};

use crate::{
    config::EngineConfig,
    db_types::{Invoice, InvoiceStatus},
    events::{EventProducers, InvoiceAnnulledEvent, InvoicePaidEvent},
    traits::{InvoiceManagement, PaymentGatewayError},
};

/// Backoff after consecutive transient poll failures is capped at this multiple of the poll interval.
const BACKOFF_CAP_MULTIPLIER: u32 = 32;
/// Spacing between retries of a failed terminal write.
const WRITE_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub enum WatchOutcome {
    /// The invoice has no on-chain address to watch yet. No polls were made and nothing was written.
    NoAddress,
    /// The watcher persisted this terminal invoice record. The single write of the watcher's lifetime.
    Settled(Invoice),
    /// Something else settled the invoice first (manual cancellation, another process). Nothing was written.
    AlreadySettled,
    /// Cancellation was observed before a terminal status was persisted. The invoice is untouched.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("Invoice #{0} does not exist")]
    InvoiceNotFound(i64),
    #[error("Node unreachable after {attempts} consecutive poll failures: {last_error}")]
    NodeUnreachable { attempts: u32, last_error: NodeClientError },
    #[error("Node client failure: {0}")]
    Client(#[from] NodeClientError),
    #[error("Database failure: {0}")]
    Database(#[from] PaymentGatewayError),
}

pub struct PaymentWatcher<B, C> {
    db: B,
    client: C,
    config: EngineConfig,
    producers: EventProducers,
}

impl<B, C> PaymentWatcher<B, C>
where
    B: InvoiceManagement,
    C: NodeClient,
{
    pub fn new(db: B, client: C, config: EngineConfig, producers: EventProducers) -> Self {
        Self { db, client, config, producers }
    }

    /// Watch the payment request at `address` and drive invoice `invoice_id` to its terminal status.
    ///
    /// Runs until one of:
    /// * the node reports a non-`Pending` status: the mapped status is persisted (one write) and the watcher
    ///   stops;
    /// * the invoice's payment window lapses (when `enforce_expiry` is set): `expired` is persisted and the
    ///   watcher stops;
    /// * `shutdown` fires: the watcher stops without writing;
    /// * the node stays unreachable past `max_poll_failures` consecutive attempts: surfaced as an error so the
    ///   caller can alert, never mapped onto the invoice.
    pub async fn watch_invoice(
        &self,
        invoice_id: i64,
        address: Option<&str>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<WatchOutcome, WatcherError> {
        let address = match address {
            Some(a) if !a.trim().is_empty() => a,
            _ => {
                debug!("⏱️ Invoice #{invoice_id} has no address to watch yet. Nothing to do.");
                return Ok(WatchOutcome::NoAddress);
            },
        };
        let invoice = self
            .db
            .fetch_invoice(invoice_id)
            .await?
            .ok_or(WatcherError::InvoiceNotFound(invoice_id))?;
        if invoice.status.is_terminal() {
            debug!("⏱️ Invoice #{invoice_id} is already {}. Nothing to watch.", invoice.status);
            return Ok(WatchOutcome::AlreadySettled);
        }
        let deadline = self.expiry_deadline(&invoice);
        let expiry = async {
            match deadline {
                Some(at) => sleep_until(at).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expiry);

        info!("⏱️ Watching address {address} for payment of invoice #{invoice_id}");
        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failures = 0u32;
        let backoff_cap = self.config.poll_interval * BACKOFF_CAP_MULTIPLIER;
        let mut backoff = self.config.poll_interval;
        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    info!("⏱️ Watcher for invoice #{invoice_id} cancelled. No status was written.");
                    return Ok(WatchOutcome::Cancelled);
                },
                _ = &mut expiry => {
                    info!("⏱️ Payment window for invoice #{invoice_id} lapsed. Marking it expired.");
                    return self.settle(invoice_id, InvoiceStatus::Expired, &shutdown).await;
                },
                _ = ticker.tick() => {},
            }
            let poll = tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    info!("⏱️ Watcher for invoice #{invoice_id} cancelled mid-poll. No status was written.");
                    return Ok(WatchOutcome::Cancelled);
                },
                result = self.client.get_payment_request_status(address) => result,
            };
            match poll {
                Ok(request) => {
                    failures = 0;
                    backoff = self.config.poll_interval;
                    match InvoiceStatus::from_request_status(request.status) {
                        None => trace!("⏱️ Invoice #{invoice_id} is still pending payment"),
                        Some(status) => {
                            debug!("⏱️ Node reports {} for invoice #{invoice_id}. Settling as {status}.", request.status);
                            return self.settle(invoice_id, status, &shutdown).await;
                        },
                    }
                },
                Err(e) if e.is_transient() => {
                    failures += 1;
                    if failures >= self.config.max_poll_failures {
                        error!(
                            "⏱️ Giving up on invoice #{invoice_id} after {failures} consecutive failed polls. \
                             The invoice status is untouched. {e}"
                        );
                        return Err(WatcherError::NodeUnreachable { attempts: failures, last_error: e });
                    }
                    warn!("⏱️ Poll {failures} for invoice #{invoice_id} failed ({e}). Retrying in {backoff:?}.");
                    tokio::select! {
                        biased;
                        _ = shutdown.changed() => return Ok(WatchOutcome::Cancelled),
                        _ = sleep(backoff) => {},
                    }
                    backoff = (backoff * 2).min(backoff_cap);
                },
                // Unknown status vocabulary, protocol errors: an integration bug, not a payment outcome.
                Err(e) => {
                    error!("⏱️ Watcher for invoice #{invoice_id} stopping on a non-transient node error: {e}");
                    return Err(WatcherError::Client(e));
                },
            }
        }
    }

    /// Perform the watcher's single terminal write, retrying a bounded number of times on storage failure. A
    /// failed write is surfaced, never swallowed, so the invoice cannot silently stay `pending` while the node
    /// already considers it settled.
    async fn settle(
        &self,
        invoice_id: i64,
        status: InvoiceStatus,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<WatchOutcome, WatcherError> {
        let mut attempt = 0u32;
        loop {
            if cancelled(shutdown) {
                info!("⏱️ Cancellation observed before the terminal write for invoice #{invoice_id}. Skipping it.");
                return Ok(WatchOutcome::Cancelled);
            }
            match self.db.update_invoice_status(invoice_id, status).await {
                Ok(Some(invoice)) => {
                    info!("⏱️ Invoice #{invoice_id} settled as {status}");
                    self.publish_settled(&invoice).await;
                    return Ok(WatchOutcome::Settled(invoice));
                },
                Ok(None) => {
                    debug!("⏱️ Invoice #{invoice_id} was settled elsewhere before this watcher could write.");
                    return Ok(WatchOutcome::AlreadySettled);
                },
                Err(e) => {
                    attempt += 1;
                    if attempt > self.config.write_retries {
                        error!("⏱️ Could not persist {status} for invoice #{invoice_id} after {attempt} attempts: {e}");
                        return Err(WatcherError::Database(e));
                    }
                    warn!("⏱️ Terminal write for invoice #{invoice_id} failed ({e}). Retry {attempt}.");
                    sleep(WRITE_RETRY_DELAY).await;
                },
            }
        }
    }

    async fn publish_settled(&self, invoice: &Invoice) {
        match invoice.status {
            InvoiceStatus::Complete => {
                for producer in &self.producers.invoice_paid_producer {
                    producer.publish_event(InvoicePaidEvent::new(invoice.clone())).await;
                }
            },
            InvoiceStatus::Expired | InvoiceStatus::Invalid => {
                for producer in &self.producers.invoice_annulled_producer {
                    producer.publish_event(InvoiceAnnulledEvent::new(invoice.clone())).await;
                }
            },
            InvoiceStatus::Pending => {},
        }
    }

    fn expiry_deadline(&self, invoice: &Invoice) -> Option<Instant> {
        if !self.config.enforce_expiry {
            return None;
        }
        let expires_at = invoice.expires_at()?;
        let remaining = (expires_at - chrono::Utc::now()).to_std().unwrap_or(Duration::ZERO);
        Some(Instant::now() + remaining)
    }
}

fn cancelled(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}

/// Starts a watcher task for one invoice. Tasks for different invoices are independent; the only shared resource
/// is the storage backend.
pub fn spawn_payment_watcher<B, C>(
    watcher: PaymentWatcher<B, C>,
    invoice_id: i64,
    address: Option<String>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<Result<WatchOutcome, WatcherError>>
where
    B: InvoiceManagement + 'static,
    C: NodeClient + 'static,
{
    tokio::spawn(async move { watcher.watch_invoice(invoice_id, address.as_deref(), shutdown).await })
}
