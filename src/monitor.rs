//! OS-backed path source.
//!
//! Polls the local interface table on a fixed cadence, builds a
//! [`NetworkPath`] from what is up, and feeds the observer's channel whenever
//! the path differs from the one sent before. Interface kinds are derived
//! from interface names by prefix tables, since no portable interface-type
//! API exists at this layer; the tables are configurable for unusual naming
//! schemes.

use crate::config::InterfaceTables;
use crate::error::MonitorError;
use crate::path::{InterfaceKind, NetworkPath};
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

const PATH_CHANNEL_CAPACITY: usize = 16;

/// Map an interface name to its kind.
///
/// Names are matched case-insensitively against the configured prefixes;
/// loopback is detected from the address, not the name.
pub fn kind_for_interface(name: &str, addr: IpAddr, tables: &InterfaceTables) -> InterfaceKind {
    if addr.is_loopback() {
        return InterfaceKind::Loopback;
    }
    let name = name.to_ascii_lowercase();
    let matches = |prefixes: &[String]| prefixes.iter().any(|p| name.starts_with(p.as_str()));
    if matches(&tables.ethernet_prefixes) {
        InterfaceKind::WiredEthernet
    } else if matches(&tables.wifi_prefixes) {
        InterfaceKind::Wifi
    } else if matches(&tables.cellular_prefixes) {
        InterfaceKind::Cellular
    } else {
        InterfaceKind::Other
    }
}

/// Build a path descriptor from an interface enumeration.
///
/// The enumeration only lists interfaces that are up with an address, so a
/// non-loopback entry is the usable-route signal. Kinds are sorted and
/// deduplicated to make descriptors comparable across polls.
pub fn path_from_interfaces(
    interfaces: impl IntoIterator<Item = (String, IpAddr)>,
    tables: &InterfaceTables,
) -> NetworkPath {
    let mut kinds: Vec<InterfaceKind> = interfaces
        .into_iter()
        .map(|(name, addr)| kind_for_interface(&name, addr, tables))
        .filter(|kind| *kind != InterfaceKind::Loopback)
        .collect();
    kinds.sort();
    kinds.dedup();
    NetworkPath {
        reachable: !kinds.is_empty(),
        interfaces: kinds,
    }
}

/// One-shot probe of the current path. Used by `reachd status`.
pub fn probe(tables: &InterfaceTables) -> Result<NetworkPath, MonitorError> {
    let interfaces = local_ip_address::list_afinet_netifas()?;
    Ok(path_from_interfaces(interfaces, tables))
}

/// Background poller feeding a channel of path descriptors.
///
/// Dropping the monitor (or calling [`shutdown`](SystemPathMonitor::shutdown))
/// stops polling and closes the channel, which in turn ends the observer
/// task's input.
pub struct SystemPathMonitor {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl SystemPathMonitor {
    /// Start polling. Returns the monitor handle and the receiver to hand to
    /// [`ConnectivityObserver::spawn`](crate::observer::ConnectivityObserver::spawn).
    ///
    /// Fails when interface enumeration is unavailable at startup — the
    /// monitor is meaningless without it.
    pub fn start(
        poll_interval: Duration,
        tables: InterfaceTables,
    ) -> Result<(Self, mpsc::Receiver<NetworkPath>), MonitorError> {
        // Probe once up front so a broken platform surfaces as Err instead
        // of a silent dead channel.
        let initial = probe(&tables)?;
        info!(
            reachable = initial.reachable,
            interfaces = ?initial.interfaces,
            interval_secs = poll_interval.as_secs(),
            "system path monitor started"
        );

        let (tx, rx) = mpsc::channel(PATH_CHANNEL_CAPACITY);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            // First tick fires immediately; the initial probe result is
            // re-derived there rather than threaded through.
            let mut last_sent: Option<NetworkPath> = None;
            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => {
                        debug!("path monitor shutdown requested");
                        break;
                    }
                    _ = interval.tick() => {}
                }

                let path = match local_ip_address::list_afinet_netifas() {
                    Ok(interfaces) => path_from_interfaces(interfaces, &tables),
                    Err(e) => {
                        // Transient enumeration failure: skip this tick and
                        // keep the last descriptor standing.
                        warn!(err = %e, "interface enumeration failed");
                        continue;
                    }
                };

                if last_sent.as_ref() == Some(&path) {
                    continue;
                }
                if tx.send(path.clone()).await.is_err() {
                    debug!("path channel closed — stopping monitor");
                    break;
                }
                last_sent = Some(path);
            }
        });

        Ok((
            Self {
                shutdown_tx: Some(shutdown_tx),
                task: Some(task),
            },
            rx,
        ))
    }

    /// Stop polling and wait for the poll task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SystemPathMonitor {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
