//! # memsiege
//!
//! Client-side toolkit for a key-value cache server speaking a small binary
//! TCP protocol:
//! - `memsiege-shell`: interactive command shell for manual exploration
//! - `memsiege`: load generator ("siege") issuing paced PUTs to probe
//!   server capacity and memory behavior
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────┐        ┌──────────────────┐
//! │       Shell      │        │  Load Generator  │
//! │   (line → cmd)   │        │  (paced PUTs)    │
//! └────────┬─────────┘        └────────┬─────────┘
//!          │                           │
//!          └─────────────┬─────────────┘
//!                        ▼
//!              ┌──────────────────┐
//!              │     Exchange     │
//!              │ (1 req → 1 resp) │
//!              └────────┬─────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Codec    │          │   Session   │
//!   │  (framing)  │          │    (TCP)    │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod siege;
pub mod shell;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SiegeError, Result};
pub use config::{ClientConfig, SiegeConfig};
pub use network::{Client, Session, Transport};
pub use siege::LoadGenerator;
pub use shell::Shell;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of memsiege
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
