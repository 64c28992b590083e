use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use reachd::config::ReachdConfig;
use reachd::monitor::{self, SystemPathMonitor};
use reachd::observer::ConnectivityObserver;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "reachd",
    about = "Network reachability observer daemon",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Data directory for config.toml
    #[arg(long, env = "REACHD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "REACHD_LOG")]
    log: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "REACHD_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,

    /// Seconds between interface polls
    #[arg(long, env = "REACHD_POLL_INTERVAL")]
    poll_interval: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the observer in the foreground (default when no subcommand given).
    ///
    /// Logs every connectivity transition. With --json, additionally emits
    /// one JSON notification per transition on stdout.
    ///
    /// Examples:
    ///   reachd serve
    ///   reachd serve --json
    Serve {
        /// Emit newline-delimited JSON notifications on stdout
        #[arg(long)]
        json: bool,
    },
    /// Probe the current path once and print the status.
    ///
    /// Exits 0 when some route exists, 1 when disconnected.
    ///
    /// Examples:
    ///   reachd status
    ///   reachd status --json
    Status {
        /// Print the full path descriptor as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ReachdConfig::new(args.data_dir, args.log, args.poll_interval);

    // Init once — must happen before any tracing calls.
    let _file_guard = setup_logging(&config.log, args.log_file.as_deref(), &config.log_format);

    match args.command {
        Some(Command::Status { json }) => {
            let exit_code = run_status(&config, json)?;
            std::process::exit(exit_code);
        }
        None | Some(Command::Serve { json: false }) => run_serve(config, false).await,
        Some(Command::Serve { json: true }) => run_serve(config, true).await,
    }
}

/// Initialize the tracing subscriber.
/// If `log_file` is set, logs go to both stdout and a daily-rolling file.
/// Returns a `WorkerGuard` that must stay alive for the process lifetime.
///
/// `log_format` may be `"pretty"` (default, human-readable compact format) or
/// `"json"` (structured JSON for log aggregators).
///
/// If the log directory cannot be created, falls back to stdout-only logging
/// with a warning — never panics.
fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("reachd.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            // Fall back to stdout-only — don't panic on a bad log path.
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_writer(non_blocking))
                .init();
        }

        Some(guard)
    } else if use_json {
        tracing_subscriber::fmt().json().with_env_filter(log_level).init();
        None
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
        None
    }
}

// ── reachd serve ──────────────────────────────────────────────────────────────

async fn run_serve(config: ReachdConfig, emit_json: bool) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        poll_secs = config.poll_interval.as_secs(),
        "reachd starting"
    );

    let (monitor, paths) =
        SystemPathMonitor::start(config.poll_interval, config.interfaces.clone())
            .context("failed to start the system path monitor")?;
    let observer = ConnectivityObserver::spawn(paths);

    // Forward the notification stream to stdout for wire consumers.
    let mut events = observer.events();
    let forwarder = emit_json.then(|| {
        tokio::spawn(async move {
            while let Ok(line) = events.recv().await {
                println!("{line}");
            }
        })
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!(status = %observer.current(), "shutting down");

    observer.shutdown().await;
    monitor.shutdown().await;
    if let Some(task) = forwarder {
        task.abort();
    }
    Ok(())
}

// ── reachd status ─────────────────────────────────────────────────────────────

fn run_status(config: &ReachdConfig, json: bool) -> Result<i32> {
    let path = monitor::probe(&config.interfaces).context("failed to probe network interfaces")?;
    let status = path.classify();

    if json {
        let out = serde_json::json!({
            "status": status,
            "reachable": path.reachable,
            "interfaces": path.interfaces,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{status}");
    }

    Ok(if path.reachable { 0 } else { 1 })
}
