//! JSON notification fan-out for status changes.

use serde_json::Value;
use tokio::sync::broadcast;

/// Broadcasts JSON notification strings to all attached receivers.
///
/// Receivers are typically wire consumers (the `--json` stream on stdout, or
/// anything the host application plugs in). Lagging receivers lose the oldest
/// messages; the status snapshot is always available through
/// [`ConnectivityObserver::current`](crate::observer::ConnectivityObserver::current).
#[derive(Clone)]
pub struct StatusBroadcaster {
    tx: broadcast::Sender<String>,
}

impl Default for StatusBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Send a notification to all attached receivers.
    pub fn broadcast(&self, method: &str, params: Value) {
        let notification = serde_json::json!({
            "method": method,
            "params": params,
        });
        // Ignore errors — no subscribers is fine
        let _ = self
            .tx
            .send(serde_json::to_string(&notification).unwrap_or_default());
    }

    /// Attach a new receiver for all future notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_attached_receivers() {
        let b = StatusBroadcaster::new();
        let mut rx = b.subscribe();
        b.broadcast("reachability_changed", serde_json::json!({ "status": "wifi" }));

        let msg = rx.recv().await.unwrap();
        let parsed: Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(parsed["method"], "reachability_changed");
        assert_eq!(parsed["params"]["status"], "wifi");
    }

    #[tokio::test]
    async fn broadcast_without_receivers_is_a_no_op() {
        let b = StatusBroadcaster::new();
        b.broadcast("reachability_changed", serde_json::json!({}));
    }
}
