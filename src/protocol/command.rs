//! Command definitions
//!
//! A request ready to be framed. Arity is checked at construction, so a
//! `Command` always encodes to a complete frame.

use bytes::Bytes;

use crate::error::{Result, SiegeError};
use super::Opcode;

/// A validated request: opcode plus exactly `opcode.arity()` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    opcode: Opcode,
    args: Vec<Bytes>,
}

impl Command {
    /// Build a command, failing with `ArgumentCount` on an arity mismatch
    pub fn new(opcode: Opcode, args: Vec<Bytes>) -> Result<Self> {
        check_arity(opcode, args.len())?;
        Ok(Self { opcode, args })
    }

    pub fn put(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            opcode: Opcode::Put,
            args: vec![key.into(), value.into()],
        }
    }

    pub fn get(key: impl Into<Bytes>) -> Self {
        Self::keyed(Opcode::Get, key)
    }

    pub fn del(key: impl Into<Bytes>) -> Self {
        Self::keyed(Opcode::Del, key)
    }

    pub fn take(key: impl Into<Bytes>) -> Self {
        Self::keyed(Opcode::Take, key)
    }

    pub fn stats() -> Self {
        Self {
            opcode: Opcode::Stats,
            args: Vec::new(),
        }
    }

    fn keyed(opcode: Opcode, key: impl Into<Bytes>) -> Self {
        Self {
            opcode,
            args: vec![key.into()],
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// Total argument bytes, excluding framing
    pub fn payload_len(&self) -> usize {
        self.args.iter().map(Bytes::len).sum()
    }
}

/// Fails with `ArgumentCount` unless `got` matches the opcode's arity
pub(crate) fn check_arity(opcode: Opcode, got: usize) -> Result<()> {
    let expected = opcode.arity();
    if got != expected {
        return Err(SiegeError::ArgumentCount {
            command: opcode.name(),
            expected,
            got,
        });
    }
    Ok(())
}
