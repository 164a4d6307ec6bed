//! Network Module
//!
//! TCP transport and the request/response exchange built on it.
//!
//! ## Architecture
//! - One `Session` per connection, one request in flight at a time
//! - `execute` frames a request, sends it and decodes exactly one response
//! - Everything above this layer is generic over [`Transport`]

mod session;
mod exchange;

pub use session::Session;
pub use exchange::{execute, execute_command, Client};

use crate::error::Result;
use crate::protocol::ByteSource;

/// A bidirectional, ordered byte stream carrying frames
pub trait Transport: ByteSource {
    /// Send exactly these bytes, in order
    fn send(&mut self, frame: &[u8]) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        (**self).send(frame)
    }
}
