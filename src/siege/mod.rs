//! Siege Module
//!
//! Load generation against the cache server: an endless (or capped) stream
//! of PUTs with unique keys and fixed-size values, paced by a fixed interval.
//!
//! Independent instances share nothing; run several processes with distinct
//! ids to multiply the load.

mod payload;
mod generator;

pub use payload::{filler_value, generate_key, random_value, Payloads, FILLER, KEY_LEN};
pub use generator::{LoadGenerator, Progress, SiegeReport, SiegeState, SiegeStats};
