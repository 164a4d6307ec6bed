//! Configuration for memsiege
//!
//! Centralized configuration with defaults taken from the tools this crate
//! replaces. Connection settings are shared by the shell and the siege;
//! load settings belong to the siege only.

use std::time::Duration;

use crate::error::{Result, SiegeError};

/// Default server host
pub const DEFAULT_HOST: &str = "localhost";

/// Default binary-protocol port of the cache server
pub const DEFAULT_PORT: u16 = 7667;

// =============================================================================
// Client (connection) configuration
// =============================================================================

/// Connection settings for one transport session
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server host name or address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Connect timeout (`None` blocks until the OS gives up)
    pub connect_timeout: Option<Duration>,

    /// Read timeout for `receive_exact` (`None` blocks indefinitely)
    pub read_timeout: Option<Duration>,

    /// Write timeout for `send` (`None` blocks indefinitely)
    pub write_timeout: Option<Duration>,

    /// How long to wait for more bytes after an OK status before deciding the
    /// response carries no content. Zero means "only what already arrived".
    pub response_grace: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: None,
            read_timeout: None,
            write_timeout: None,
            response_grace: Duration::from_millis(10),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// `host:port` as accepted by `ToSocketAddrs`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    pub fn write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.write_timeout = timeout;
        self
    }

    pub fn response_grace(mut self, grace: Duration) -> Self {
        self.config.response_grace = grace;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

// =============================================================================
// Siege (load generator) configuration
// =============================================================================

/// Settings for one load generator instance
#[derive(Debug, Clone)]
pub struct SiegeConfig {
    /// Bytes per generated value
    pub value_size: usize,

    /// Nominal server memory budget, only used for percentage reporting
    pub server_memory: u64,

    /// Generate a fresh random value per request instead of fixed filler
    pub random_values: bool,

    /// Pause between requests
    pub interval: Duration,

    /// Abort on the first non-OK response
    pub stop_after_failure: bool,

    /// Requests between progress reports (0 disables them)
    pub log_every: u64,

    /// Optional cap on the number of requests
    pub total: Option<u64>,

    /// Label distinguishing concurrent instances in output
    pub id: Option<String>,
}

impl Default for SiegeConfig {
    fn default() -> Self {
        Self {
            value_size: 2_000_000,
            server_memory: 500_000_000,
            random_values: false,
            interval: Duration::from_millis(10),
            stop_after_failure: false,
            log_every: 50,
            total: None,
            id: None,
        }
    }
}

impl SiegeConfig {
    /// Create a new config builder
    pub fn builder() -> SiegeConfigBuilder {
        SiegeConfigBuilder::default()
    }

    /// Reject settings the generator cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.server_memory == 0 {
            return Err(SiegeError::Config(
                "server memory must be greater than zero".to_string(),
            ));
        }
        if self.total == Some(0) {
            return Err(SiegeError::Config(
                "total must be greater than zero when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for SiegeConfig
#[derive(Default)]
pub struct SiegeConfigBuilder {
    config: SiegeConfig,
}

impl SiegeConfigBuilder {
    /// Set the size of each generated value (in bytes)
    pub fn value_size(mut self, size: usize) -> Self {
        self.config.value_size = size;
        self
    }

    /// Set the nominal server memory (in bytes)
    pub fn server_memory(mut self, bytes: u64) -> Self {
        self.config.server_memory = bytes;
        self
    }

    pub fn random_values(mut self, random: bool) -> Self {
        self.config.random_values = random;
        self
    }

    /// Set the pause between requests
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    pub fn stop_after_failure(mut self, stop: bool) -> Self {
        self.config.stop_after_failure = stop;
        self
    }

    pub fn log_every(mut self, every: u64) -> Self {
        self.config.log_every = every;
        self
    }

    pub fn total(mut self, total: Option<u64>) -> Self {
        self.config.total = total;
        self
    }

    pub fn id(mut self, id: Option<String>) -> Self {
        self.config.id = id;
        self
    }

    pub fn build(self) -> SiegeConfig {
        self.config
    }
}
