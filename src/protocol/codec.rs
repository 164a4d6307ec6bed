//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌───────────┬──────────┬────────────┬──────────┬────────────┐
//! │ Opcode(1) │ Len (4)  │   Arg 1    │ Len (4)  │   Arg 2    │ ...
//! └───────────┴──────────┴────────────┴──────────┴────────────┘
//! ```
//! The number of `(len, arg)` pairs is fixed by the opcode.
//!
//! ### Response Format
//! ```text
//! ┌───────────┬──────────┬─────────────────────────────┐
//! │ Status(1) │ Len (4)  │          Content            │
//! └───────────┴──────────┴─────────────────────────────┘
//! ```
//! Only OK responses may carry the `(len, content)` group. Every other
//! status is exactly one byte on the wire.

use std::io::{ErrorKind, Read};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, SiegeError};
use super::command::check_arity;
use super::{Command, Opcode, Response, Status};

/// Size of the big-endian length prefix in front of every argument/content
pub const LEN_PREFIX_SIZE: usize = 4;

/// Largest single read issued while receiving response content
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

// =============================================================================
// Byte sources
// =============================================================================

/// Where response bytes come from
///
/// Decoding only ever asks for exact sizes, so one underlying read may hold
/// several frames and one frame may span several reads.
pub trait ByteSource {
    /// Fill `buf` completely or fail
    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Fill `buf` completely, or return `false` if the current response has
    /// no further bytes. Fails like `receive_exact` once any byte arrived.
    fn receive_optional(&mut self, buf: &mut [u8]) -> Result<bool>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).receive_exact(buf)
    }

    fn receive_optional(&mut self, buf: &mut [u8]) -> Result<bool> {
        (**self).receive_optional(buf)
    }
}

/// Adapts any `Read` into a `ByteSource`; end of stream ends the response
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let received = read_fully(&mut self.reader, buf)?;
        if received < buf.len() {
            return Err(SiegeError::ConnectionClosed {
                expected: buf.len(),
                received,
            });
        }
        Ok(())
    }

    fn receive_optional(&mut self, buf: &mut [u8]) -> Result<bool> {
        match read_fully(&mut self.reader, buf)? {
            0 if !buf.is_empty() => Ok(false),
            n if n == buf.len() => Ok(true),
            received => Err(SiegeError::ConnectionClosed {
                expected: buf.len(),
                received,
            }),
        }
    }
}

/// Read until `buf` is full or the reader hits EOF; returns bytes read
pub(crate) fn read_fully<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

// =============================================================================
// Request Encoding
// =============================================================================

/// Encode a request frame
///
/// Fails with `ArgumentCount` before producing any byte if `args` does not
/// match the opcode's arity.
pub fn encode_request<A: AsRef<[u8]>>(opcode: Opcode, args: &[A]) -> Result<Bytes> {
    check_arity(opcode, args.len())?;

    let size = 1 + args
        .iter()
        .map(|arg| LEN_PREFIX_SIZE + arg.as_ref().len())
        .sum::<usize>();
    let mut frame = BytesMut::with_capacity(size);
    frame.put_u8(opcode as u8);
    for arg in args {
        put_length_prefixed(&mut frame, arg.as_ref())?;
    }

    Ok(frame.freeze())
}

impl Command {
    /// Encode this command; arity was checked when it was built
    pub fn encode(&self) -> Result<Bytes> {
        encode_request(self.opcode(), self.args())
    }
}

/// Length prefix for `len` bytes; fails with `ArgumentTooLarge` past `u32::MAX`
pub fn length_prefix(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| SiegeError::ArgumentTooLarge { len })
}

fn put_length_prefixed(frame: &mut BytesMut, data: &[u8]) -> Result<()> {
    frame.put_u32(length_prefix(data.len())?);
    frame.put_slice(data);
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Decode exactly one response from `source`
///
/// Reads the status byte, then, for OK only, an optional length prefix and
/// exactly that many content bytes. Nothing past the frame is consumed.
pub fn decode_response<S: ByteSource + ?Sized>(source: &mut S) -> Result<Response> {
    let mut status_byte = [0u8; 1];
    source.receive_exact(&mut status_byte)?;

    let status =
        Status::from_byte(status_byte[0]).ok_or(SiegeError::UnknownStatus(status_byte[0]))?;
    if status != Status::Ok {
        return Ok(Response::from_status(status));
    }

    let mut len_prefix = [0u8; LEN_PREFIX_SIZE];
    if !source
        .receive_optional(&mut len_prefix)
        .map_err(into_truncated)?
    {
        return Ok(Response::Ok(None));
    }

    let content_len = u32::from_be_bytes(len_prefix) as usize;
    let content = receive_content(source, content_len)?;

    Ok(Response::Ok(Some(content)))
}

/// Read `len` content bytes, growing the buffer at most `READ_CHUNK_SIZE`
/// at a time so memory tracks what actually arrived, not what was claimed
fn receive_content<S: ByteSource + ?Sized>(source: &mut S, len: usize) -> Result<Bytes> {
    let mut content = BytesMut::with_capacity(len.min(READ_CHUNK_SIZE));
    while content.len() < len {
        let filled = content.len();
        let step = (len - filled).min(READ_CHUNK_SIZE);
        content.resize(filled + step, 0);
        source
            .receive_exact(&mut content[filled..])
            .map_err(|err| match err {
                SiegeError::ConnectionClosed { received, .. } => SiegeError::TruncatedResponse {
                    expected: len,
                    received: filled + received,
                },
                other => other,
            })?;
    }
    Ok(content.freeze())
}

/// A peer closing mid-frame is a truncated response, not a plain disconnect
fn into_truncated(err: SiegeError) -> SiegeError {
    match err {
        SiegeError::ConnectionClosed { expected, received } => {
            SiegeError::TruncatedResponse { expected, received }
        }
        other => other,
    }
}

/// Encode a response frame (what a server would send)
///
/// Fails with `ArgumentTooLarge` if the content does not fit the length prefix.
pub fn encode_response(response: &Response) -> Result<Bytes> {
    let content = response.content();
    let mut frame = BytesMut::with_capacity(1 + content.map_or(0, |c| LEN_PREFIX_SIZE + c.len()));
    frame.put_u8(response.status() as u8);
    if let Some(content) = content {
        put_length_prefixed(&mut frame, content)?;
    }
    Ok(frame.freeze())
}
