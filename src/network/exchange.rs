//! Request/Response Exchange
//!
//! One request out, one response back. No retries, no pipelining: a failure
//! is returned to the caller exactly as it happened.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::protocol::{decode_response, encode_request, Command, Opcode, Response};
use super::{Session, Transport};

/// Encode, send and await exactly one decoded response
///
/// Arity is checked before anything is written to the transport.
pub fn execute<T, A>(transport: &mut T, opcode: Opcode, args: &[A]) -> Result<Response>
where
    T: Transport + ?Sized,
    A: AsRef<[u8]>,
{
    let frame = encode_request(opcode, args)?;
    transport.send(&frame)?;

    let response = decode_response(&mut *transport)?;
    tracing::debug!(
        "{} ({} bytes) -> {}",
        opcode,
        frame.len(),
        response.status()
    );
    Ok(response)
}

/// `execute` for an already validated command
pub fn execute_command<T>(transport: &mut T, command: &Command) -> Result<Response>
where
    T: Transport + ?Sized,
{
    execute(transport, command.opcode(), command.args())
}

/// Typed client over a single transport
pub struct Client<T> {
    transport: T,
}

impl Client<Session> {
    /// Open a session to the configured server
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(Session::connect(config)?))
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<Response> {
        execute(&mut self.transport, Opcode::Put, &[key, value])
    }

    pub fn get(&mut self, key: &[u8]) -> Result<Response> {
        execute(&mut self.transport, Opcode::Get, &[key])
    }

    pub fn del(&mut self, key: &[u8]) -> Result<Response> {
        execute(&mut self.transport, Opcode::Del, &[key])
    }

    pub fn take(&mut self, key: &[u8]) -> Result<Response> {
        execute(&mut self.transport, Opcode::Take, &[key])
    }

    pub fn stats(&mut self) -> Result<Response> {
        execute::<_, &[u8]>(&mut self.transport, Opcode::Stats, &[])
    }

    pub fn execute(&mut self, command: &Command) -> Result<Response> {
        execute_command(&mut self.transport, command)
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}
