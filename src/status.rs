//! The five-way connectivity status published by the observer.

/// Current network connectivity status.
///
/// Derived from the most recent [`NetworkPath`](crate::path::NetworkPath)
/// notification. `Unknown` means a route exists but the interface carrying it
/// was not recognized; `Disconnected` means no usable route at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityStatus {
    Ethernet,
    Wifi,
    Cellular,
    Unknown,
    Disconnected,
}

impl ConnectivityStatus {
    /// `true` for any status except `Disconnected`.
    pub fn is_reachable(self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

impl std::fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ethernet => write!(f, "ethernet"),
            Self::Wifi => write!(f, "wifi"),
            Self::Cellular => write!(f, "cellular"),
            Self::Unknown => write!(f, "unknown"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&ConnectivityStatus::Wifi).unwrap();
        assert_eq!(json, "\"wifi\"");
    }

    #[test]
    fn only_disconnected_is_unreachable() {
        assert!(ConnectivityStatus::Ethernet.is_reachable());
        assert!(ConnectivityStatus::Unknown.is_reachable());
        assert!(!ConnectivityStatus::Disconnected.is_reachable());
    }
}
