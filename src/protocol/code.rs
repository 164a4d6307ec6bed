//! Opcode and status tables
//!
//! The one place the numeric protocol codes are defined. Request opcodes
//! occupy 11..=21 and response statuses 101..=115; the two spaces never
//! overlap.

use std::fmt;
use std::str::FromStr;

use crate::error::SiegeError;

/// Request opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Put = 11,
    Del = 12,
    Get = 13,
    Take = 14,
    Stats = 21,
}

impl Opcode {
    pub const ALL: [Opcode; 5] = [
        Opcode::Put,
        Opcode::Del,
        Opcode::Get,
        Opcode::Take,
        Opcode::Stats,
    ];

    /// Number of arguments a request with this opcode carries
    pub fn arity(self) -> usize {
        match self {
            Opcode::Put => 2,
            Opcode::Del | Opcode::Get | Opcode::Take => 1,
            Opcode::Stats => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Put => "PUT",
            Opcode::Del => "DEL",
            Opcode::Get => "GET",
            Opcode::Take => "TAKE",
            Opcode::Stats => "STATS",
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|op| *op as u8 == byte)
    }
}

impl FromStr for Opcode {
    type Err = SiegeError;

    /// Case-insensitive lookup by name (`put`, `Get`, `STATS`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|op| op.name() == upper)
            .ok_or(SiegeError::UnknownCommand(upper))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    Ok = 101,
    Einval = 111,
    Enotfound = 112,
    Ebinary = 113,
    Ebig = 114,
    Eunk = 115,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Ok,
        Status::Einval,
        Status::Enotfound,
        Status::Ebinary,
        Status::Ebig,
        Status::Eunk,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Einval => "EINVAL",
            Status::Enotfound => "ENOTFOUND",
            Status::Ebinary => "EBINARY",
            Status::Ebig => "EBIG",
            Status::Eunk => "EUNK",
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|status| *status as u8 == byte)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any code of the protocol, request or response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Request(Opcode),
    Response(Status),
}

impl Code {
    /// Every defined code, in numeric order
    pub const ALL: [Code; 11] = [
        Code::Request(Opcode::Put),
        Code::Request(Opcode::Del),
        Code::Request(Opcode::Get),
        Code::Request(Opcode::Take),
        Code::Request(Opcode::Stats),
        Code::Response(Status::Ok),
        Code::Response(Status::Einval),
        Code::Response(Status::Enotfound),
        Code::Response(Status::Ebinary),
        Code::Response(Status::Ebig),
        Code::Response(Status::Eunk),
    ];

    /// Classify a raw byte; `None` if it is not a protocol code
    pub fn from_byte(byte: u8) -> Option<Self> {
        Opcode::from_byte(byte)
            .map(Code::Request)
            .or_else(|| Status::from_byte(byte).map(Code::Response))
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Code::Request(op) => op as u8,
            Code::Response(status) => status as u8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Code::Request(op) => op.name(),
            Code::Response(status) => status.name(),
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
