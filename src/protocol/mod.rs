//! Protocol Module
//!
//! Defines the binary wire protocol spoken with the cache server.
//!
//! ## Request Format
//! ```text
//! ┌───────────┬──────────┬────────────┐
//! │ Opcode(1) │ Len (4)  │    Arg     │ × arity
//! └───────────┴──────────┴────────────┘
//! ```
//!
//! ### Opcodes
//! - 11: PUT   - key, value
//! - 12: DEL   - key
//! - 13: GET   - key
//! - 14: TAKE  - key
//! - 21: STATS - no arguments
//!
//! ## Response Format
//! ```text
//! ┌───────────┬──────────┬─────────────────────────────┐
//! │ Status(1) │ Len (4)  │     Content (OK only)       │
//! └───────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 101: OK
//! - 111: EINVAL
//! - 112: ENOTFOUND
//! - 113: EBINARY
//! - 114: EBIG
//! - 115: EUNK
//!
//! All lengths are big-endian `u32`.

mod code;
mod command;
mod response;
mod codec;

pub use code::{Code, Opcode, Status};
pub use command::Command;
pub use response::Response;
pub use codec::{
    decode_response, encode_request, encode_response, length_prefix, ByteSource, ReaderSource, LEN_PREFIX_SIZE,
    READ_CHUNK_SIZE,
};
pub(crate) use codec::read_fully;
