//! memsiege Interactive Shell Binary
//!
//! Line-based shell speaking the binary protocol:
//! `PUT key value`, `GET key`, `DEL key`, `TAKE key`, `STATS`.

use std::io::{self, BufRead};
use std::thread;
use std::time::Duration;

use clap::Parser;
use crossbeam::channel::{bounded, unbounded};
use memsiege::config::{DEFAULT_HOST, DEFAULT_PORT};
use memsiege::{ClientConfig, Session, Shell};
use signal_hook::consts::SIGINT;
use signal_hook::iterator::Signals;
use tracing_subscriber::{fmt, EnvFilter};

/// memsiege shell
#[derive(Parser, Debug)]
#[command(name = "memsiege-shell")]
#[command(about = "Interactive shell for a binary-protocol cache server")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

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
    // Logs go to stderr so they don't interleave with responses
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,memsiege=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = ClientConfig::builder()
        .host(&args.host)
        .port(args.port)
        .connect_timeout(args.connect_timeout_ms.map(Duration::from_millis))
        .read_timeout(args.read_timeout_ms.map(Duration::from_millis))
        .write_timeout(args.write_timeout_ms.map(Duration::from_millis))
        .response_grace(Duration::from_millis(args.response_grace_ms))
        .build();

    let session = match Session::connect(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", config.addr(), e);
            std::process::exit(1);
        }
    };

    // stdin is read on its own thread so an interrupt can end the loop
    // while a read is pending
    let (line_tx, line_rx) = unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let (interrupt_tx, interrupt_rx) = bounded(1);
    match Signals::new([SIGINT]) {
        Ok(mut signals) => {
            thread::spawn(move || {
                for _ in signals.forever() {
                    let _ = interrupt_tx.try_send(());
                }
            });
        }
        Err(e) => {
            tracing::warn!("Failed to install SIGINT handler: {}", e);
            // Keep the sender alive so the shell doesn't read a disconnect
            // as an interrupt
            std::mem::forget(interrupt_tx);
        }
    }

    let mut shell = Shell::new(session);
    let mut stdout = io::stdout();
    if let Err(e) = shell.run(&line_rx, &interrupt_rx, &mut stdout) {
        tracing::error!("Shell error: {}", e);
        std::process::exit(1);
    }
}
