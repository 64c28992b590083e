//! Error types for path sources.

/// Failure starting or running a system path monitor.
///
/// The observer itself produces no errors — classification is total — so the
/// only fallible piece is the OS-backed source. A startup failure is fatal
/// for the monitor; the host decides whether to degrade or abort.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("network interface enumeration failed: {0}")]
    Enumerate(#[from] local_ip_address::Error),
}
