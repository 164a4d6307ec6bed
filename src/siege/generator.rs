//! Load Generator
//!
//! Drives PUT requests through one client at a fixed pace.
//!
//! ## State Machine
//! ```text
//!              ┌──────────► Stopped    (stop flag seen between cycles)
//!   Running ───┼──────────► Exhausted  (request cap reached)
//!              └──────────► Aborted    (failure with stop-after-failure)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::SiegeConfig;
use crate::error::Result;
use crate::network::{Client, Transport};
use super::payload::Payloads;

/// Lifecycle of a load generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiegeState {
    Running,
    Stopped,
    Exhausted,
    Aborted,
}

impl SiegeState {
    pub fn is_terminal(self) -> bool {
        self != SiegeState::Running
    }
}

/// Per-instance accounting; only ever grows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiegeStats {
    /// Completed request cycles
    pub requests: u64,

    /// Key and value bytes sent, excluding framing
    pub bytes_sent: u64,

    /// Cycles that ended in a non-OK status or a recoverable error
    pub failures: u64,
}

/// Values of one progress report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub requests: u64,
    pub bytes_sent: u64,
    pub memory_percent: f64,
}

impl SiegeStats {
    /// Progress relative to a nominal server memory budget
    pub fn progress(&self, server_memory: u64) -> Progress {
        let memory_percent = if server_memory == 0 {
            0.0
        } else {
            self.bytes_sent as f64 / server_memory as f64 * 100.0
        };
        Progress {
            requests: self.requests,
            bytes_sent: self.bytes_sent,
            memory_percent,
        }
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiegeReport {
    pub state: SiegeState,
    pub stats: SiegeStats,
}

/// A single paced stream of PUT requests over its own connection
pub struct LoadGenerator<T> {
    client: Client<T>,
    config: SiegeConfig,
    payloads: Payloads,
    stats: SiegeStats,
    state: SiegeState,
    stop: Arc<AtomicBool>,
}

impl<T: Transport> LoadGenerator<T> {
    /// Create a generator; fails if the config does not validate
    pub fn new(transport: T, config: SiegeConfig) -> Result<Self> {
        config.validate()?;
        let payloads = Payloads::new(config.value_size, config.random_values);
        Ok(Self {
            client: Client::new(transport),
            config,
            payloads,
            stats: SiegeStats::default(),
            state: SiegeState::Running,
            stop: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Share an external stop flag (e.g. one set by a signal handler)
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn state(&self) -> SiegeState {
        self.state
    }

    pub fn stats(&self) -> SiegeStats {
        self.stats
    }

    pub fn config(&self) -> &SiegeConfig {
        &self.config
    }

    pub fn into_client(self) -> Client<T> {
        self.client
    }

    /// Run cycles until the generator leaves `Running`
    ///
    /// Errors are returned only when they end the run.
    pub fn run(&mut self) -> Result<SiegeReport> {
        tracing::info!(
            "[{}] Starting siege: value_size={} interval={:?} total={:?}",
            self.label(),
            self.config.value_size,
            self.config.interval,
            self.config.total
        );

        while !self.state.is_terminal() {
            self.step()?;
        }

        tracing::info!(
            "[{}] Siege finished ({:?}): {} requests, {} bytes, {} failures",
            self.label(),
            self.state,
            self.stats.requests,
            self.stats.bytes_sent,
            self.stats.failures
        );

        Ok(self.report())
    }

    /// Perform one cycle and return the resulting state
    pub fn step(&mut self) -> Result<SiegeState> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }
        if self.stop.load(Ordering::Relaxed) {
            tracing::info!("[{}] Stop requested", self.label());
            self.state = SiegeState::Stopped;
            return Ok(self.state);
        }

        let key = self.payloads.next_key();
        let value = self.payloads.next_value();

        match self.client.put(&key, &value) {
            Ok(response) if response.is_ok() => {}
            Ok(response) => {
                self.stats.failures += 1;
                tracing::warn!("[{}] Received response: {}", self.label(), response.status());
                if self.config.stop_after_failure {
                    self.state = SiegeState::Aborted;
                    return Ok(self.state);
                }
            }
            Err(e) if self.config.stop_after_failure || e.is_fatal_transport() => {
                tracing::error!("[{}] Request failed: {}", self.label(), e);
                self.state = SiegeState::Aborted;
                return Err(e);
            }
            Err(e) => {
                // Unread bytes of this reply may be taken as the next status
                self.stats.failures += 1;
                tracing::warn!(
                    "[{}] Request failed: {}; later responses may be out of sync",
                    self.label(),
                    e
                );
            }
        }

        self.stats.requests += 1;
        self.stats.bytes_sent += (key.len() + value.len()) as u64;

        if !self.config.interval.is_zero() {
            thread::sleep(self.config.interval);
        }

        if self.config.log_every > 0 && self.stats.requests % self.config.log_every == 0 {
            let progress = self.stats.progress(self.config.server_memory);
            tracing::info!(
                "[{}] Total PUTs sent: {}, approx memory sent: {} (~{:.2}%)",
                self.label(),
                progress.requests,
                progress.bytes_sent,
                progress.memory_percent
            );
        }

        if let Some(total) = self.config.total {
            if self.stats.requests >= total {
                self.state = SiegeState::Exhausted;
            }
        }

        Ok(self.state)
    }

    pub fn report(&self) -> SiegeReport {
        SiegeReport {
            state: self.state,
            stats: self.stats,
        }
    }

    fn label(&self) -> &str {
        self.config.id.as_deref().unwrap_or("siege")
    }
}
