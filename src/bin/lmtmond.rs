//! lmtmond - OST telemetry sampling daemon.
//!
//! Samples OS and Lustre per-target counters on a fixed interval and writes
//! one v2 OST record per cycle to stdout for the transport to pick up.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use lmtmon::codec::DEFAULT_RECORD_CAPACITY;
#[cfg(not(target_os = "linux"))]
use lmtmon::collector::MockFs;
#[cfg(target_os = "linux")]
use lmtmon::collector::RealFs;
use lmtmon::sampler::{OstSampler, SampleError, SampleOutcome};

/// OST telemetry sampling daemon.
#[derive(Parser)]
#[command(name = "lmtmond", about = "Lustre OST telemetry sampling daemon", version)]
struct Args {
    /// Sampling interval in seconds.
    #[arg(short, long, default_value = "5")]
    interval: u64,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Path to the Lustre proc tree.
    #[arg(long, default_value = "/proc/fs/lustre")]
    lustre_path: String,

    /// Record capacity in bytes; a cycle producing a larger record fails.
    #[arg(long, default_value_t = DEFAULT_RECORD_CAPACITY)]
    record_capacity: usize,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("lmtmond={}", level).parse().unwrap())
        .add_directive(format!("lmtmon={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("lmtmond {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, proc={}, lustre={}, record_capacity={}",
        args.interval, args.proc_path, args.lustre_path, args.record_capacity
    );

    #[cfg(target_os = "linux")]
    let fs = RealFs::new();
    #[cfg(not(target_os = "linux"))]
    let fs = MockFs::typical_oss();

    let mut sampler = OstSampler::new(fs, &args.proc_path, &args.lustre_path)
        .with_capacity(args.record_capacity);

    let interval = Duration::from_secs(args.interval);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting sampling loop");

    let mut cycle_count: u64 = 0;
    let stdout = std::io::stdout();

    while running.load(Ordering::SeqCst) {
        cycle_count += 1;

        match sampler.sample() {
            Ok(SampleOutcome::Emitted(record)) => {
                let mut out = stdout.lock();
                match writeln!(out, "{}", record).and_then(|_| out.flush()) {
                    Ok(()) => debug!("Cycle #{}: emitted {} bytes", cycle_count, record.len()),
                    Err(e) => error!("Cycle #{}: failed to write record: {}", cycle_count, e),
                }
            }
            Ok(SampleOutcome::Empty) => {
                debug!("Cycle #{}: no targets, nothing to report", cycle_count);
            }
            Err(SampleError::NotReady) => {
                debug!("Cycle #{}: cpu utilization warming up", cycle_count);
            }
            Err(e) => {
                error!("Cycle #{} failed: {}", cycle_count, e);
            }
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!("Shutdown complete");
}
