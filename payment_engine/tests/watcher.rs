//! End-to-end tests for the invoice payment watcher, driven by a scripted fake node against a real SQLite
//! database.
use std::time::Duration;

use node_client::{NodeClientError, PaymentRequestStatus};
use payment_engine::{
    config::EngineConfig,
    db_types::InvoiceStatus,
    events::{EventHandler, EventProducers, InvoicePaidEvent},
    spawn_payment_watcher, InvoiceManagement, PaymentWatcher, SqliteDatabase, WatchOutcome, WatcherError,
};
use tokio::sync::watch;

use crate::support::{
    fake_node::FakeNodeClient,
    prepare_env::{prepare_test_env, random_db_path, tear_down},
    seed_invoice, seed_store,
};

mod support;

fn fast_config() -> EngineConfig {
    EngineConfig::default().with_poll_interval(Duration::from_millis(5))
}

async fn setup() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

fn live_shutdown() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

#[tokio::test]
async fn no_address_means_no_work() {
    let mut db = setup().await;
    let (store, _) = seed_store(&db).await;
    let invoice = seed_invoice(&db, store.id).await;
    let client = FakeNodeClient::with_script(vec![Ok(PaymentRequestStatus::Paid)]);
    let watcher = PaymentWatcher::new(db.clone(), client.clone(), fast_config(), EventProducers::default());

    let (_tx, rx) = live_shutdown();
    let outcome = watcher.watch_invoice(invoice.id, None, rx.clone()).await.unwrap();
    assert_eq!(outcome, WatchOutcome::NoAddress);
    let outcome = watcher.watch_invoice(invoice.id, Some("  "), rx).await.unwrap();
    assert_eq!(outcome, WatchOutcome::NoAddress);

    assert_eq!(client.poll_count(), 0);
    let invoice = db.fetch_invoice(invoice.id).await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Pending);
    tear_down(&mut db).await;
}

#[tokio::test]
async fn pending_pending_paid_settles_complete() {
    let mut db = setup().await;
    let (store, _) = seed_store(&db).await;
    let invoice = seed_invoice(&db, store.id).await;
    let client = FakeNodeClient::with_script(vec![
        Ok(PaymentRequestStatus::Pending),
        Ok(PaymentRequestStatus::Pending),
        Ok(PaymentRequestStatus::Paid),
    ]);
    let watcher = PaymentWatcher::new(db.clone(), client.clone(), fast_config(), EventProducers::default());

    let (_tx, rx) = live_shutdown();
    let outcome = watcher.watch_invoice(invoice.id, Some("addr1"), rx).await.unwrap();
    match outcome {
        WatchOutcome::Settled(settled) => assert_eq!(settled.status, InvoiceStatus::Complete),
        other => panic!("Expected Settled, got {other:?}"),
    }
    // Exactly one write, after the third poll
    assert_eq!(client.poll_count(), 3);
    let invoice = db.fetch_invoice(invoice.id).await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Complete);
    tear_down(&mut db).await;
}

#[tokio::test]
async fn unknown_maps_to_invalid_on_first_poll() {
    let mut db = setup().await;
    let (store, _) = seed_store(&db).await;
    let invoice = seed_invoice(&db, store.id).await;
    let client = FakeNodeClient::with_script(vec![Ok(PaymentRequestStatus::Unknown)]);
    let watcher = PaymentWatcher::new(db.clone(), client.clone(), fast_config(), EventProducers::default());

    let (_tx, rx) = live_shutdown();
    let outcome = watcher.watch_invoice(invoice.id, Some("addr2"), rx).await.unwrap();
    assert!(matches!(outcome, WatchOutcome::Settled(_)));
    assert_eq!(client.poll_count(), 1);
    let invoice = db.fetch_invoice(invoice.id).await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Invalid);
    tear_down(&mut db).await;
}

#[tokio::test]
async fn expired_request_maps_to_expired() {
    let mut db = setup().await;
    let (store, _) = seed_store(&db).await;
    let invoice = seed_invoice(&db, store.id).await;
    let client = FakeNodeClient::with_script(vec![Ok(PaymentRequestStatus::Expired)]);
    let watcher = PaymentWatcher::new(db.clone(), client, fast_config(), EventProducers::default());

    let (_tx, rx) = live_shutdown();
    watcher.watch_invoice(invoice.id, Some("addr3"), rx).await.unwrap();
    let invoice = db.fetch_invoice(invoice.id).await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Expired);
    tear_down(&mut db).await;
}

#[tokio::test]
async fn forever_pending_polls_until_cancelled() {
    let mut db = setup().await;
    let (store, _) = seed_store(&db).await;
    let invoice = seed_invoice(&db, store.id).await;
    // An empty script: the fake node reports Pending forever
    let client = FakeNodeClient::with_script(vec![]);
    let watcher = PaymentWatcher::new(db.clone(), client.clone(), fast_config(), EventProducers::default());

    let (tx, rx) = live_shutdown();
    let handle = spawn_payment_watcher(watcher, invoice.id, Some("addr4".to_string()), rx);
    tokio::time::sleep(Duration::from_millis(60)).await;
    tx.send(true).unwrap();
    let outcome = handle.await.unwrap().unwrap();
    assert_eq!(outcome, WatchOutcome::Cancelled);
    assert!(client.poll_count() > 1, "the watcher should have kept polling until cancellation");
    // Cancellation before a terminal status leaves the invoice untouched
    let invoice = db.fetch_invoice(invoice.id).await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Pending);
    tear_down(&mut db).await;
}

#[tokio::test]
async fn transient_errors_are_retried() {
    let mut db = setup().await;
    let (store, _) = seed_store(&db).await;
    let invoice = seed_invoice(&db, store.id).await;
    let client = FakeNodeClient::with_script(vec![
        Err(NodeClientError::Transport("connection refused".into())),
        Err(NodeClientError::Transport("connection refused".into())),
        Ok(PaymentRequestStatus::Paid),
    ]);
    let watcher = PaymentWatcher::new(db.clone(), client.clone(), fast_config(), EventProducers::default());

    let (_tx, rx) = live_shutdown();
    let outcome = watcher.watch_invoice(invoice.id, Some("addr5"), rx).await.unwrap();
    assert!(matches!(outcome, WatchOutcome::Settled(_)));
    assert_eq!(client.poll_count(), 3);
    let invoice = db.fetch_invoice(invoice.id).await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Complete);
    tear_down(&mut db).await;
}

#[tokio::test]
async fn persistent_node_failure_surfaces_without_write() {
    let mut db = setup().await;
    let (store, _) = seed_store(&db).await;
    let invoice = seed_invoice(&db, store.id).await;
    let mut config = fast_config();
    config.max_poll_failures = 3;
    let client = FakeNodeClient::with_script(vec![
        Err(NodeClientError::Transport("down".into())),
        Err(NodeClientError::Transport("down".into())),
        Err(NodeClientError::Transport("down".into())),
    ]);
    let watcher = PaymentWatcher::new(db.clone(), client, config, EventProducers::default());

    let (_tx, rx) = live_shutdown();
    let err = watcher.watch_invoice(invoice.id, Some("addr6"), rx).await.unwrap_err();
    assert!(matches!(err, WatcherError::NodeUnreachable { attempts: 3, .. }));
    // Node unavailability is never mapped onto the invoice
    let invoice = db.fetch_invoice(invoice.id).await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Pending);
    tear_down(&mut db).await;
}

#[tokio::test]
async fn unmapped_status_fails_loudly() {
    let mut db = setup().await;
    let (store, _) = seed_store(&db).await;
    let invoice = seed_invoice(&db, store.id).await;
    let client =
        FakeNodeClient::with_script(vec![Err(NodeClientError::UnknownStatus("Settled".into()))]);
    let watcher = PaymentWatcher::new(db.clone(), client, fast_config(), EventProducers::default());

    let (_tx, rx) = live_shutdown();
    let err = watcher.watch_invoice(invoice.id, Some("addr7"), rx).await.unwrap_err();
    assert!(matches!(err, WatcherError::Client(NodeClientError::UnknownStatus(_))));
    let invoice = db.fetch_invoice(invoice.id).await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Pending);
    tear_down(&mut db).await;
}

#[tokio::test]
async fn lapsed_payment_window_expires_the_invoice() {
    let mut db = setup().await;
    let (store, _) = seed_store(&db).await;
    let invoice = db
        .insert_invoice(
            payment_engine::db_types::NewInvoice::new(bpg_common::Satoshis::from_coins(1), store.id)
                .with_expiration(0),
        )
        .await
        .unwrap();
    let client = FakeNodeClient::with_script(vec![]);
    let watcher = PaymentWatcher::new(db.clone(), client.clone(), fast_config(), EventProducers::default());

    let (_tx, rx) = live_shutdown();
    let outcome = watcher.watch_invoice(invoice.id, Some("addr8"), rx).await.unwrap();
    match outcome {
        WatchOutcome::Settled(settled) => assert_eq!(settled.status, InvoiceStatus::Expired),
        other => panic!("Expected Settled, got {other:?}"),
    }
    assert_eq!(client.poll_count(), 0, "polling must stop once the window has lapsed");
    tear_down(&mut db).await;
}

#[tokio::test]
async fn already_settled_invoice_is_left_alone() {
    let mut db = setup().await;
    let (store, _) = seed_store(&db).await;
    let invoice = seed_invoice(&db, store.id).await;
    db.update_invoice_status(invoice.id, InvoiceStatus::Complete).await.unwrap().unwrap();
    let client = FakeNodeClient::with_script(vec![Ok(PaymentRequestStatus::Expired)]);
    let watcher = PaymentWatcher::new(db.clone(), client.clone(), fast_config(), EventProducers::default());

    let (_tx, rx) = live_shutdown();
    let outcome = watcher.watch_invoice(invoice.id, Some("addr9"), rx).await.unwrap();
    assert_eq!(outcome, WatchOutcome::AlreadySettled);
    assert_eq!(client.poll_count(), 0);
    let invoice = db.fetch_invoice(invoice.id).await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Complete);
    tear_down(&mut db).await;
}

#[tokio::test]
async fn paid_invoice_fires_the_hook() {
    let mut db = setup().await;
    let (store, _) = seed_store(&db).await;
    let invoice = seed_invoice(&db, store.id).await;
    let client = FakeNodeClient::with_script(vec![Ok(PaymentRequestStatus::Paid)]);

    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel(1);
    let handler = std::sync::Arc::new(move |ev: InvoicePaidEvent| {
        let tx = event_tx.clone();
        Box::pin(async move {
            let _ = tx.send(ev).await;
        }) as std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
    });
    let event_handler = EventHandler::new(4, handler);
    let producers = EventProducers {
        invoice_paid_producer: vec![event_handler.subscribe()],
        ..Default::default()
    };
    let handler_task = tokio::spawn(event_handler.start_handler());

    let watcher = PaymentWatcher::new(db.clone(), client, fast_config(), producers);
    let (_tx, rx) = live_shutdown();
    watcher.watch_invoice(invoice.id, Some("addr10"), rx).await.unwrap();
    let event = event_rx.recv().await.expect("The paid hook should have fired");
    assert_eq!(event.invoice.id, invoice.id);
    assert_eq!(event.invoice.status, InvoiceStatus::Complete);
    drop(watcher);
    handler_task.await.unwrap();
    tear_down(&mut db).await;
}
