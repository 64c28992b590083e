//! End-to-end observer scenarios over synthetic path sequences.
//!
//! Exercises the library the way a host application would: feed a channel of
//! path descriptors, watch the published status through all three surfaces
//! (poll, callback, event stream).

use reachd::observer::ConnectivityObserver;
use reachd::{ConnectivityStatus, InterfaceKind, NetworkPath};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

fn wifi() -> NetworkPath {
    NetworkPath::reachable_via([InterfaceKind::Wifi])
}

fn cellular() -> NetworkPath {
    NetworkPath::reachable_via([InterfaceKind::Cellular])
}

fn ethernet_and_wifi() -> NetworkPath {
    NetworkPath::reachable_via([InterfaceKind::WiredEthernet, InterfaceKind::Wifi])
}

#[tokio::test]
async fn fresh_observer_reports_disconnected() {
    let (_tx, rx) = mpsc::channel(8);
    let observer = ConnectivityObserver::spawn(rx);
    assert_eq!(observer.current(), ConnectivityStatus::Disconnected);
    assert!(!observer.current().is_reachable());
}

#[tokio::test]
async fn spec_sequence_delivers_in_order() {
    let (tx, rx) = mpsc::channel(8);
    let observer = ConnectivityObserver::spawn(rx);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = Arc::clone(&seen);
    let _handle = observer.subscribe(move |status| {
        seen_cb.lock().unwrap().push(status);
    });

    for path in [wifi(), cellular(), ethernet_and_wifi()] {
        tx.send(path).await.unwrap();
    }
    settle().await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ConnectivityStatus::Wifi,
            ConnectivityStatus::Cellular,
            ConnectivityStatus::Ethernet,
        ]
    );
    assert_eq!(observer.current(), ConnectivityStatus::Ethernet);
}

#[tokio::test]
async fn two_subscribers_both_hear_changes() {
    let (tx, rx) = mpsc::channel(8);
    let observer = ConnectivityObserver::spawn(rx);

    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));
    let first_cb = Arc::clone(&first);
    let second_cb = Arc::clone(&second);
    let _a = observer.subscribe(move |s| first_cb.lock().unwrap().push(s));
    let _b = observer.subscribe(move |s| second_cb.lock().unwrap().push(s));

    tx.send(wifi()).await.unwrap();
    settle().await;

    assert_eq!(*first.lock().unwrap(), vec![ConnectivityStatus::Wifi]);
    assert_eq!(*second.lock().unwrap(), vec![ConnectivityStatus::Wifi]);
}

#[tokio::test]
async fn cancelled_subscription_misses_later_changes() {
    let (tx, rx) = mpsc::channel(8);
    let observer = ConnectivityObserver::spawn(rx);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = Arc::clone(&seen);
    let handle = observer.subscribe(move |s| seen_cb.lock().unwrap().push(s));

    tx.send(wifi()).await.unwrap();
    settle().await;
    drop(handle);

    tx.send(cellular()).await.unwrap();
    tx.send(ethernet_and_wifi()).await.unwrap();
    settle().await;

    // Only the change observed before the drop.
    assert_eq!(*seen.lock().unwrap(), vec![ConnectivityStatus::Wifi]);
    // The observer itself kept up.
    assert_eq!(observer.current(), ConnectivityStatus::Ethernet);
}

#[tokio::test]
async fn event_stream_mirrors_transitions() {
    let (tx, rx) = mpsc::channel(8);
    let observer = ConnectivityObserver::spawn(rx);
    let mut events = observer.events();

    tx.send(wifi()).await.unwrap();
    tx.send(cellular()).await.unwrap();

    let first: serde_json::Value =
        serde_json::from_str(&events.recv().await.unwrap()).unwrap();
    assert_eq!(first["params"]["old"], "disconnected");
    assert_eq!(first["params"]["new"], "wifi");

    let second: serde_json::Value =
        serde_json::from_str(&events.recv().await.unwrap()).unwrap();
    assert_eq!(second["params"]["old"], "wifi");
    assert_eq!(second["params"]["new"], "cellular");
}

#[tokio::test]
async fn snapshot_counts_every_path() {
    let (tx, rx) = mpsc::channel(8);
    let observer = ConnectivityObserver::spawn(rx);

    // Three notifications, only one distinct status.
    for _ in 0..3 {
        tx.send(wifi()).await.unwrap();
    }
    settle().await;

    let snap = observer.snapshot();
    assert_eq!(snap.status, ConnectivityStatus::Wifi);
    assert_eq!(snap.paths_seen, 3);
    assert!(snap.since > 0);
}

#[tokio::test]
async fn shutdown_is_clean_with_pending_paths() {
    let (tx, rx) = mpsc::channel(8);
    let observer = ConnectivityObserver::spawn(rx);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_cb = Arc::clone(&seen);
    let _handle = observer.subscribe(move |s| seen_cb.lock().unwrap().push(s));

    tx.send(wifi()).await.unwrap();
    settle().await;
    assert_eq!(observer.current(), ConnectivityStatus::Wifi);

    // Queue more work, then shut down; shutdown must not hang and the
    // queued path must never reach subscribers.
    tx.send(cellular()).await.unwrap();
    tokio::time::timeout(Duration::from_secs(1), observer.shutdown())
        .await
        .expect("shutdown should complete promptly");

    assert_eq!(*seen.lock().unwrap(), vec![ConnectivityStatus::Wifi]);
}
