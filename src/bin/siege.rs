//! memsiege Load Generator Binary
//!
//! Continuously issues PUT requests with unique keys to probe the server's
//! capacity and memory behavior.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use memsiege::config::{DEFAULT_HOST, DEFAULT_PORT};
use memsiege::siege::SiegeState;
use memsiege::{ClientConfig, LoadGenerator, Session, SiegeConfig};
use signal_hook::consts::SIGINT;
use tracing_subscriber::{fmt, EnvFilter};

/// memsiege load generator
#[derive(Parser, Debug)]
#[command(name = "memsiege")]
#[command(about = "Siege a cache server with PUT requests")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Size of each value in bytes
    #[arg(long, default_value_t = 2_000_000)]
    value_size: usize,

    /// Memory of the server in bytes (only used for reporting)
    #[arg(long, default_value_t = 500_000_000)]
    server_memory: u64,

    /// Generate a random value for every request
    #[arg(long)]
    random_values: bool,

    /// Seconds between requests
    #[arg(long, default_value_t = 0.01)]
    interval: f64,

    /// Stop at the first non-OK response
    #[arg(long)]
    stop_after_failure: bool,

    /// Requests sent between progress reports (0 disables them)
    #[arg(long, default_value_t = 50)]
    log_every: u64,

    /// Total number of requests to send (unbounded when omitted)
    #[arg(long)]
    total: Option<u64>,

    /// Label for this instance when running several side by side
    #[arg(long)]
    id: Option<String>,

    /// Connect timeout in milliseconds
    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    /// Read timeout in milliseconds
    #[arg(long)]
    read_timeout_ms: Option<u64>,

    /// Write timeout in milliseconds
    #[arg(long)]
    write_timeout_ms: Option<u64>,

    /// How long to wait for content after an OK status, in milliseconds
    #[arg(long, default_value_t = 10)]
    response_grace_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,memsiege=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let args = Args::parse();

    if !args.interval.is_finite() || args.interval < 0.0 {
        tracing::error!("Interval must be a non-negative number of seconds");
        std::process::exit(1);
    }

    let client_config = ClientConfig::builder()
        .host(&args.host)
        .port(args.port)
        .connect_timeout(args.connect_timeout_ms.map(Duration::from_millis))
        .read_timeout(args.read_timeout_ms.map(Duration::from_millis))
        .write_timeout(args.write_timeout_ms.map(Duration::from_millis))
        .response_grace(Duration::from_millis(args.response_grace_ms))
        .build();

    let siege_config = SiegeConfig::builder()
        .value_size(args.value_size)
        .server_memory(args.server_memory)
        .random_values(args.random_values)
        .interval(Duration::from_secs_f64(args.interval))
        .stop_after_failure(args.stop_after_failure)
        .log_every(args.log_every)
        .total(args.total)
        .id(args.id)
        .build();

    tracing::info!("memsiege v{}", memsiege::VERSION);
    tracing::info!("Target: {}", client_config.addr());

    // Ctrl+C flips the flag; the generator checks it between cycles
    let stop = Arc::new(AtomicBool::new(false));
    if let Err(e) = signal_hook::flag::register(SIGINT, Arc::clone(&stop)) {
        tracing::warn!("Failed to install SIGINT handler: {}", e);
    }

    let session = match Session::connect(&client_config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", client_config.addr(), e);
            std::process::exit(1);
        }
    };

    let mut generator = match LoadGenerator::new(session, siege_config) {
        Ok(g) => g.with_stop_flag(stop),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    match generator.run() {
        Ok(report) if report.state == SiegeState::Aborted => std::process::exit(1),
        Ok(report) => {
            if report.state == SiegeState::Exhausted {
                println!("Done!");
            }
        }
        Err(e) => {
            tracing::error!("Siege error: {}", e);
            std::process::exit(1);
        }
    }
}
