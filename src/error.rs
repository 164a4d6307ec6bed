//! Error types for memsiege
//!
//! Provides a unified error type for the codec, the transport session and
//! both tools. Protocol-level failures (`EINVAL`, `ENOTFOUND`, ...) are not
//! errors here: they arrive as [`Response`](crate::protocol::Response) values.

use thiserror::Error;

/// Result type alias using SiegeError
pub type Result<T> = std::result::Result<T, SiegeError>;

/// Unified error type for memsiege operations
#[derive(Debug, Error)]
pub enum SiegeError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Local (client-side) Errors
    // -------------------------------------------------------------------------
    #[error("{command} expects {expected} argument(s), got {got}")]
    ArgumentCount {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Argument of {len} bytes does not fit a 32-bit length prefix")]
    ArgumentTooLarge { len: usize },

    // -------------------------------------------------------------------------
    // Decoding Errors
    // -------------------------------------------------------------------------
    #[error("Unknown response status: {0}")]
    UnknownStatus(u8),

    #[error("Truncated response: expected {expected} bytes, received {received}")]
    TruncatedResponse { expected: usize, received: usize },

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Connection closed by peer after {received} of {expected} bytes")]
    ConnectionClosed { expected: usize, received: usize },

    #[error("Timed out: {0}")]
    Timeout(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SiegeError {
    /// Client-side mistakes that are reported locally and never sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SiegeError::ArgumentCount { .. }
                | SiegeError::UnknownCommand(_)
                | SiegeError::ArgumentTooLarge { .. }
        )
    }

    /// Errors after which the session cannot carry another exchange.
    ///
    /// A `Timeout` or `UnknownStatus` leaves the session open, but any unread
    /// rest of that reply stays in the stream and is read by the next exchange.
    pub fn is_fatal_transport(&self) -> bool {
        matches!(
            self,
            SiegeError::Connection(_) | SiegeError::ConnectionClosed { .. } | SiegeError::Io(_)
        )
    }
}
