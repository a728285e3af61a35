//! # Sally-port Interlock
//!
//! Loads `sally.toml` and the `io.toml` it names, creates the configured I/O
//! driver, performs RT setup and runs the interlock tick loop until Ctrl-C
//! (or `--max-ticks`). A status thread logs indicator changes alongside.

use clap::Parser;
use sally_common::config::{ConfigLoader, LogLevel};
use sally_common::consts::DEFAULT_CONFIG_PATH;
use sally_hal::DriverRegistry;
use sally_interlock::config::{InterlockConfig, load_config};
use sally_interlock::cycle::{TickRunner, rt_setup};
use sally_interlock::status::{spawn_status_task, status_channel};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Sally-port interlock: two-gate airlock sequencer
#[derive(Parser, Debug)]
#[command(name = "sally_interlock")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Two-gate sally-port interlock sequencer")]
struct Args {
    /// Path to the interlock configuration (sally.toml).
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// CPU core to pin the tick thread to (default: 1).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (default: 80).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Stop after this many ticks.
    #[arg(long, value_name = "N")]
    max_ticks: Option<u64>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("Sally-port interlock v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Sally-port interlock shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let loaded = load_config(&args.config)?;
    let timing = loaded.config.timing;
    info!(
        "Config OK: service={}, driver={}, tick={} ms",
        loaded.config.shared.service_name, loaded.config.io.driver, timing.tick_period_ms
    );

    let drivers = DriverRegistry::with_builtin();
    let (publisher, reader) = status_channel();
    let mut runner = TickRunner::from_config(loaded, &drivers, publisher)?
        .with_max_ticks(args.max_ticks);

    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        args.cpu_core, args.rt_priority
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let status = spawn_status_task(
        reader,
        Duration::from_millis(u64::from(timing.status_period_ms)),
        running.clone(),
    )?;

    let result = runner.run(&running);

    running.store(false, Ordering::SeqCst);
    if status.join().is_err() {
        warn!("status task panicked");
    }
    runner.shutdown()?;

    let stats = result?;
    if let Some(fault) = runner.controller().last_fault() {
        warn!("last fault: {fault}");
    }
    info!(
        "{} ticks, final state {}",
        stats.tick_count,
        runner.controller().state()
    );
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
///
/// `RUST_LOG` wins when set. Otherwise `-v` selects DEBUG and the
/// `[shared] log_level` of the configuration applies.
fn setup_tracing(args: &Args) {
    let level = configured_level(&args.config);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(args.verbose, level)));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}

/// Log level named by the configuration, INFO when it cannot be read.
///
/// Runs before the subscriber exists; `run` reports any load error.
fn configured_level(path: &Path) -> LogLevel {
    InterlockConfig::load(path)
        .map(|config| config.shared.log_level)
        .unwrap_or_default()
}

fn filter_directive(verbose: bool, level: LogLevel) -> &'static str {
    if verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    }
}
