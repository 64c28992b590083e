use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::error;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

// ─── InterfaceTables ──────────────────────────────────────────────────────────

/// Interface-name prefix tables (`[interfaces]` in config.toml).
///
/// Interface kinds are derived from names by prefix match; override these when
/// the platform uses naming schemes the defaults do not cover.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InterfaceTables {
    /// Prefixes treated as wired Ethernet (default: eth, en, em — "en" also
    /// covers eno/ens/enp/enx names).
    pub ethernet_prefixes: Vec<String>,
    /// Prefixes treated as WiFi (default: wlan, wlp, wl, wifi, ath).
    pub wifi_prefixes: Vec<String>,
    /// Prefixes treated as cellular (default: wwan, rmnet, ppp, cdc-wdm).
    pub cellular_prefixes: Vec<String>,
}

impl Default for InterfaceTables {
    fn default() -> Self {
        let list = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        Self {
            ethernet_prefixes: list(&["eth", "en", "em"]),
            wifi_prefixes: list(&["wlan", "wlp", "wl", "wifi", "ath"]),
            cellular_prefixes: list(&["wwan", "rmnet", "ppp", "cdc-wdm"]),
        }
    }
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// Log level filter string, e.g. "debug", "info,reachd=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured).
    log_format: Option<String>,
    /// Seconds between interface polls (default: 5).
    poll_interval_secs: Option<u64>,
    /// Interface-name prefix tables (`[interfaces]`).
    interfaces: Option<InterfaceTables>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

// ─── ReachdConfig ─────────────────────────────────────────────────────────────

/// Resolved daemon configuration.
#[derive(Debug, Clone)]
pub struct ReachdConfig {
    pub data_dir: PathBuf,
    pub log: String,
    /// "pretty" (default) | "json".
    pub log_format: String,
    pub poll_interval: Duration,
    pub interfaces: InterfaceTables,
}

impl ReachdConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        data_dir: Option<PathBuf>,
        log: Option<String>,
        poll_interval_secs: Option<u64>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let log_format = std::env::var("REACHD_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let poll_interval_secs = poll_interval_secs
            .or(toml.poll_interval_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
            .max(1);

        let interfaces = toml.interfaces.unwrap_or_default();

        Self {
            data_dir,
            log,
            log_format,
            poll_interval: Duration::from_secs(poll_interval_secs),
            interfaces,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/reachd
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("reachd");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/reachd or ~/.local/share/reachd
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("reachd");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("reachd");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\reachd
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("reachd");
        }
    }
    // Fallback
    PathBuf::from(".reachd")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReachdConfig::new(Some(dir.path().to_path_buf()), None, None);
        assert_eq!(config.log, "info");
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert!(config
            .interfaces
            .wifi_prefixes
            .contains(&"wlan".to_string()));
    }

    #[test]
    fn toml_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
log = "debug"
poll_interval_secs = 30

[interfaces]
wifi_prefixes = ["radio"]
"#,
        )
        .unwrap();

        let config = ReachdConfig::new(Some(dir.path().to_path_buf()), None, None);
        assert_eq!(config.log, "debug");
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.interfaces.wifi_prefixes, vec!["radio".to_string()]);
        // Unspecified tables keep their defaults.
        assert!(
            config
                .interfaces
                .ethernet_prefixes
                .contains(&"eth".to_string())
        );
    }

    #[test]
    fn cli_overrides_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "log = \"debug\"\npoll_interval_secs = 30\n",
        )
        .unwrap();

        let config = ReachdConfig::new(
            Some(dir.path().to_path_buf()),
            Some("warn".to_string()),
            Some(2),
        );
        assert_eq!(config.log, "warn");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "not valid toml [[").unwrap();
        let config = ReachdConfig::new(Some(dir.path().to_path_buf()), None, None);
        assert_eq!(config.log, "info");
    }

    #[test]
    fn poll_interval_has_a_floor() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReachdConfig::new(Some(dir.path().to_path_buf()), None, Some(0));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }
}
