//! Connectivity observer.
//!
//! One background task drains a channel of [`NetworkPath`] descriptors,
//! classifies each one, and publishes the latest [`ConnectivityStatus`] three
//! ways: a non-blocking snapshot for pollers, registered callbacks for
//! in-process subscribers, and a JSON notification stream for wire consumers.
//!
//! The observer owns no path source of its own — anything holding the sender
//! side of the channel can feed it, which is what makes synthetic sequences
//! in tests trivial. The real OS-backed source lives in [`crate::monitor`].

use crate::events::StatusBroadcaster;
use crate::path::NetworkPath;
use crate::status::ConnectivityStatus;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

/// Point-in-time view of the observer's published state.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatusSnapshot {
    /// Latest classification. `Disconnected` until the first path arrives.
    pub status: ConnectivityStatus,
    /// Unix timestamp of the last status change. 0 before the first
    /// determination.
    pub since: i64,
    /// Total path notifications processed, including ones that did not
    /// change the status.
    pub paths_seen: u64,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            status: ConnectivityStatus::Disconnected,
            since: 0,
            paths_seen: 0,
        }
    }
}

type Callback = Arc<dyn Fn(ConnectivityStatus) + Send + Sync>;
type SubscriberMap = Arc<Mutex<HashMap<u64, Callback>>>;

/// Registration token for a status-change callback.
///
/// Dropping the handle unregisters the callback; no further invocations occur
/// afterwards, even if more notifications arrive.
pub struct SubscriptionHandle {
    id: u64,
    subscribers: SubscriberMap,
}

impl SubscriptionHandle {
    /// Explicitly unregister. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Ok(mut map) = self.subscribers.lock() {
            map.remove(&self.id);
        }
    }
}

/// Observes a stream of network paths and publishes the derived status.
///
/// Constructed with [`ConnectivityObserver::spawn`]; runs until the path
/// channel closes or [`shutdown`](ConnectivityObserver::shutdown) is called.
/// All reads are non-blocking; only the internal task writes the status.
pub struct ConnectivityObserver {
    shared: Arc<RwLock<StatusSnapshot>>,
    subscribers: SubscriberMap,
    next_id: AtomicU64,
    broadcaster: StatusBroadcaster,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl ConnectivityObserver {
    /// Spawn the observer over a channel of path updates.
    ///
    /// The initial status is `Disconnected` until the first path arrives.
    /// Updates are applied strictly in arrival order, one at a time.
    pub fn spawn(mut updates: mpsc::Receiver<NetworkPath>) -> Self {
        let shared = Arc::new(RwLock::new(StatusSnapshot::default()));
        let subscribers: SubscriberMap = Arc::new(Mutex::new(HashMap::new()));
        let broadcaster = StatusBroadcaster::new();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task_shared = Arc::clone(&shared);
        let task_subscribers = Arc::clone(&subscribers);
        let task_broadcaster = broadcaster.clone();

        let task = tokio::spawn(async move {
            // The first path always notifies, even when it classifies to the
            // initial Disconnected — subscribers hear the initial
            // determination. After that, only actual changes notify.
            let mut determined = false;
            loop {
                // Biased: once shutdown has been signaled, queued paths must
                // not be processed — only an already in-flight one completes.
                let path = tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => {
                        debug!("observer shutdown requested");
                        break;
                    }
                    maybe = updates.recv() => match maybe {
                        Some(path) => path,
                        None => {
                            // No reconnection: keep the last known status
                            // and stop updating.
                            warn!("path source closed — retaining last known status");
                            break;
                        }
                    },
                };

                let status = path.classify();
                let previous = {
                    let mut snap = write_lock(&task_shared);
                    snap.paths_seen += 1;
                    let previous = snap.status;
                    if !determined || status != previous {
                        snap.status = status;
                        snap.since = chrono::Utc::now().timestamp();
                    }
                    previous
                };

                if determined && status == previous {
                    debug!(status = %status, "path update with unchanged status");
                    continue;
                }
                determined = true;

                info!(old = %previous, new = %status, "connectivity changed");
                task_broadcaster.broadcast(
                    "reachability_changed",
                    serde_json::json!({
                        "old": previous,
                        "new": status,
                    }),
                );

                // Clone the callbacks out so user code runs without the
                // registry lock held — a callback may drop its own handle.
                let callbacks: Vec<Callback> = match task_subscribers.lock() {
                    Ok(map) => map.values().cloned().collect(),
                    Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
                };
                for cb in callbacks {
                    cb(status);
                }
            }
        });

        Self {
            shared,
            subscribers,
            next_id: AtomicU64::new(0),
            broadcaster,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Latest known status. Never blocks, never fails.
    pub fn current(&self) -> ConnectivityStatus {
        read_lock(&self.shared).status
    }

    /// Status plus change timestamp and processed-path count.
    pub fn snapshot(&self) -> StatusSnapshot {
        read_lock(&self.shared).clone()
    }

    /// Register a callback invoked on every status change, including the
    /// initial determination. The callback runs on the observer task;
    /// keep it short.
    pub fn subscribe<F>(&self, on_change: F) -> SubscriptionHandle
    where
        F: Fn(ConnectivityStatus) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        match self.subscribers.lock() {
            Ok(mut map) => {
                map.insert(id, Arc::new(on_change));
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(id, Arc::new(on_change));
            }
        }
        SubscriptionHandle {
            id,
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Attach a receiver for the JSON notification stream
    /// (`reachability_changed` with old/new status).
    pub fn events(&self) -> broadcast::Receiver<String> {
        self.broadcaster.subscribe()
    }

    /// Stop processing promptly and wait for the task to finish.
    ///
    /// An in-flight notification completes; nothing queued after it is
    /// processed. The last published status remains readable.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ConnectivityObserver {
    fn drop(&mut self) {
        // Graceful: the task exits at its next select point.
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn read_lock(shared: &RwLock<StatusSnapshot>) -> std::sync::RwLockReadGuard<'_, StatusSnapshot> {
    match shared.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_lock(shared: &RwLock<StatusSnapshot>) -> std::sync::RwLockWriteGuard<'_, StatusSnapshot> {
    match shared.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
