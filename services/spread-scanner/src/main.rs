//! Cross-exchange spot-market spread scanner.
//!
//! Starts the supervisor, which owns the shared symbol-map slot and the
//! inter-stage signal queue and runs Stage-0/1/2 as independently restarted
//! workers. Exits 0 on a clean shutdown, non-zero if startup fails.

mod fees;
mod log_sink;
mod slot;
mod stage0;
mod stage1;
mod stage2;
mod store;
mod supervisor;
mod vwap;

use anyhow::Context;
use clap::Parser;
use log_sink::{ConfirmedSignalLog, SpreadSignalLog};
use scanner_config::ScannerConfig;
use slot::SnapshotSlot;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use supervisor::{supervise, RestartPolicy};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use venue_adapters::registry_from_config;

const STAGE0_PERIOD: Duration = Duration::from_secs(60);
const STAGE1_PERIOD: Duration = Duration::from_secs(4);
const SIGNAL_QUEUE_CAPACITY: usize = 256;
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "spread_scanner", about = "Cross-exchange spot-market spread scanner")]
struct Cli {
    /// Path to a YAML or JSON configuration file. Defaults are used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory append-only CSV logs are written to (overrides config file/env).
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Path to a SQLite file enabling the optional persistent store.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Increase log verbosity (stacks: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all but warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => ScannerConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ScannerConfig::from_env(),
    };
    if let Some(log_dir) = &cli.log_dir {
        config.logging.log_dir = log_dir.to_string_lossy().into_owned();
    }
    if let Some(db) = &cli.db {
        config.store.enabled = true;
        config.store.sqlite_path = Some(db.to_string_lossy().into_owned());
    }
    config.validate().context("configuration is invalid")?;

    info!("starting spread scanner");

    std::fs::create_dir_all(&config.logging.log_dir)
        .with_context(|| format!("creating log directory {}", config.logging.log_dir))?;

    if config.store.enabled {
        let path = config
            .store
            .sqlite_path
            .as_ref()
            .expect("validate() guarantees a path when the store is enabled");
        store::bootstrap(path).context("bootstrapping persistent store")?;
        info!(path, "persistent store ready");
    }

    let registry = Arc::new(registry_from_config(&config));
    if registry.is_empty() {
        anyhow::bail!("no venue adapters configured; nothing to scan");
    }

    let spread_log = Arc::new(
        SpreadSignalLog::open(
            std::path::Path::new(&config.logging.log_dir).join(&config.logging.spread_signal_log),
        )
        .context("opening spread-signal log")?,
    );
    let confirmed_log = Arc::new(
        ConfirmedSignalLog::open(
            std::path::Path::new(&config.logging.log_dir)
                .join(&config.logging.confirmed_signal_log),
        )
        .context("opening confirmed-signal log")?,
    );

    let slot = SnapshotSlot::new();
    let cancel = CancellationToken::new();
    let policy = RestartPolicy::default();

    // Stage-1 publishes onto `raw_tx`; a single long-lived forwarder logs
    // every candidate to the spread-signal log and relays it onto the queue
    // Stage-2 actually consumes from. The forwarder is not itself restarted
    // by the supervisor: it holds no state worth recovering, it just relays.
    let (raw_tx, mut raw_rx) = mpsc::channel(SIGNAL_QUEUE_CAPACITY);
    let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_QUEUE_CAPACITY);
    let signal_rx: stage2::SharedSignalReceiver = Arc::new(Mutex::new(signal_rx));

    let (result_tx, mut result_rx) = mpsc::channel(SIGNAL_QUEUE_CAPACITY);

    {
        let spread_log = spread_log.clone();
        let signal_tx = signal_tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    maybe = raw_rx.recv() => {
                        match maybe {
                            Some(candidate) => {
                                if let Err(e) = spread_log.append(&candidate).await {
                                    warn!(error = %e, "failed to append spread-signal log row");
                                }
                                if signal_tx.send(candidate).await.is_err() {
                                    break;
                                }
                            }
                            None => break,
                        }
                    }
                    _ = cancel.cancelled() => break,
                }
            }
        });
    }

    let exec_notional = config.thresholds.min_execution_notional_usdt;
    {
        let confirmed_log = confirmed_log.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    maybe = result_rx.recv() => {
                        match maybe {
                            Some(result) => {
                                if let Err(e) = confirmed_log.append(&result, exec_notional).await {
                                    warn!(error = %e, "failed to append confirmed-signal log row");
                                }
                            }
                            None => break,
                        }
                    }
                    _ = cancel.cancelled() => break,
                }
            }
        });
    }

    {
        let registry = registry.clone();
        let thresholds = config.thresholds.clone();
        let slot = slot.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            supervise("stage-0", cancel.clone(), policy, move || {
                stage0::run(
                    registry.clone(),
                    thresholds.clone(),
                    slot.clone(),
                    STAGE0_PERIOD,
                    cancel.clone(),
                )
            })
            .await;
        });
    }

    {
        let registry = registry.clone();
        let thresholds = config.thresholds.clone();
        let slot = slot.clone();
        let raw_tx = raw_tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            supervise("stage-1", cancel.clone(), policy, move || {
                stage1::run(
                    registry.clone(),
                    thresholds.clone(),
                    slot.clone(),
                    raw_tx.clone(),
                    STAGE1_PERIOD,
                    cancel.clone(),
                )
            })
            .await;
        });
    }

    {
        let registry = registry.clone();
        let thresholds = config.thresholds.clone();
        let fees = config.fees.clone();
        let signal_rx = signal_rx.clone();
        let result_tx = result_tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            supervise("stage-2", cancel.clone(), policy, move || {
                stage2::run(
                    registry.clone(),
                    thresholds.clone(),
                    fees.clone(),
                    signal_rx.clone(),
                    result_tx.clone(),
                    cancel.clone(),
                )
            })
            .await;
        });
    }

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("shutdown signal received");
    cancel.cancel();

    tokio::time::sleep(SHUTDOWN_GRACE_PERIOD).await;
    info!("spread scanner shut down cleanly");
    Ok(())
}
