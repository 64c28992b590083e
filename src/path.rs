//! Network path descriptors and their classification.
//!
//! A [`NetworkPath`] is a snapshot of the route to the network: whether it is
//! usable at all and which interface kinds currently carry it. Classification
//! into a [`ConnectivityStatus`] is a pure function — total over every
//! possible descriptor via the `Disconnected` catch-all.

use crate::status::ConnectivityStatus;

/// Kind of network interface a path may run over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceKind {
    WiredEthernet,
    Wifi,
    Cellular,
    Loopback,
    /// Recognized as up, but not one of the kinds above (tun, bridge, ...).
    Other,
}

/// Snapshot of the current route to the network.
///
/// A path may report several interface kinds at once (e.g. a laptop bridging
/// WiFi and cellular); classification resolves the ambiguity by priority.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NetworkPath {
    /// Whether some usable route exists at all.
    pub reachable: bool,
    /// Interface kinds currently in use, in no particular order.
    pub interfaces: Vec<InterfaceKind>,
}

impl NetworkPath {
    /// A path with no route and no interfaces.
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            interfaces: Vec::new(),
        }
    }

    /// A usable path over the given interface kinds.
    pub fn reachable_via(interfaces: impl Into<Vec<InterfaceKind>>) -> Self {
        Self {
            reachable: true,
            interfaces: interfaces.into(),
        }
    }

    pub fn uses_interface(&self, kind: InterfaceKind) -> bool {
        self.interfaces.contains(&kind)
    }

    /// Classify this path into a connectivity status.
    ///
    /// Priority order, first match wins: wired Ethernet, then WiFi, then
    /// cellular — the typical reliability ranking when a path exposes several
    /// interface flags at once. A reachable path over unrecognized interfaces
    /// is `Unknown`; everything else is `Disconnected`.
    pub fn classify(&self) -> ConnectivityStatus {
        if self.uses_interface(InterfaceKind::WiredEthernet) {
            ConnectivityStatus::Ethernet
        } else if self.uses_interface(InterfaceKind::Wifi) {
            ConnectivityStatus::Wifi
        } else if self.uses_interface(InterfaceKind::Cellular) {
            ConnectivityStatus::Cellular
        } else if self.reachable {
            ConnectivityStatus::Unknown
        } else {
            ConnectivityStatus::Disconnected
        }
    }
}
