//! Transport Session
//!
//! Owns one TCP connection to the cache server.

use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{Result, SiegeError};
use crate::protocol::{read_fully, ByteSource};
use super::Transport;

/// A single ordered byte-stream connection
///
/// Serves one outstanding request at a time. Reads never go past what the
/// caller asked for, except for bytes the OS already handed to the buffer.
pub struct Session {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered, flushed once per frame)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    /// Wait for further bytes after an OK status before calling it empty
    response_grace: Duration,
}

impl Session {
    /// Connect to the server described by `config`
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let addr = config.addr();
        let stream = match config.connect_timeout {
            Some(timeout) => connect_with_timeout(&addr, timeout)?,
            None => TcpStream::connect(&addr)
                .map_err(|e| SiegeError::Connection(format!("{}: {}", addr, e)))?,
        };

        let mut session = Self::from_stream(stream, config.response_grace)?;
        session.set_timeouts(config.read_timeout, config.write_timeout)?;

        tracing::info!("Connected to {}", session.peer_addr);
        Ok(session)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, response_grace: Duration) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Frames are flushed whole; don't let Nagle hold them back
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
            response_grace,
        })
    }

    /// Configure read/write timeouts (`None` blocks indefinitely)
    pub fn set_timeouts(&mut self, read: Option<Duration>, write: Option<Duration>) -> Result<()> {
        if read.is_some_and(|d| d.is_zero()) || write.is_some_and(|d| d.is_zero()) {
            return Err(SiegeError::Config("timeouts must be non-zero".to_string()));
        }
        self.reader.get_ref().set_read_timeout(read)?;
        self.writer.get_ref().set_write_timeout(write)?;
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Wait up to the response grace for at least one byte to be buffered.
    ///
    /// Returns `false` if the peer closed or stayed silent.
    fn probe(&mut self) -> Result<bool> {
        let previous = self.reader.get_ref().read_timeout()?;
        let nonblocking = self.response_grace.is_zero();
        if nonblocking {
            self.reader.get_ref().set_nonblocking(true)?;
        } else {
            self.reader.get_ref().set_read_timeout(Some(self.response_grace))?;
        }

        let outcome = loop {
            match self.reader.fill_buf() {
                Ok(buf) => break Ok(!buf.is_empty()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => break Ok(false),
                Err(e) => break Err(read_error(e)),
            }
        };

        let stream = self.reader.get_ref();
        if nonblocking {
            stream.set_nonblocking(false)?;
        } else {
            stream.set_read_timeout(previous)?;
        }

        outcome
    }
}

impl ByteSource for Session {
    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let received = read_fully(&mut self.reader, buf).map_err(read_error)?;
        if received < buf.len() {
            tracing::debug!(
                "{} closed after {} of {} bytes",
                self.peer_addr,
                received,
                buf.len()
            );
            return Err(SiegeError::ConnectionClosed {
                expected: buf.len(),
                received,
            });
        }
        Ok(())
    }

    fn receive_optional(&mut self, buf: &mut [u8]) -> Result<bool> {
        if buf.is_empty() {
            return Ok(true);
        }
        if self.reader.buffer().is_empty() && !self.probe()? {
            return Ok(false);
        }
        self.receive_exact(buf)?;
        Ok(true)
    }
}

impl Transport for Session {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.writer.write_all(frame).map_err(write_error)?;
        self.writer.flush().map_err(write_error)?;
        tracing::trace!("Sent {} bytes to {}", frame.len(), self.peer_addr);
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn connect_with_timeout(addr: &str, timeout: Duration) -> Result<TcpStream> {
    let addrs = addr
        .to_socket_addrs()
        .map_err(|e| SiegeError::Connection(format!("{}: {}", addr, e)))?;

    let mut last_err = None;
    for socket_addr in addrs {
        match TcpStream::connect_timeout(&socket_addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(match last_err {
        Some(e) if is_timeout(&e) => {
            SiegeError::Timeout(format!("connecting to {} after {:?}", addr, timeout))
        }
        Some(e) => SiegeError::Connection(format!("{}: {}", addr, e)),
        None => SiegeError::Connection(format!("{}: no addresses resolved", addr)),
    })
}

/// Read timeouts surface as WouldBlock on Unix and TimedOut on Windows
fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

fn read_error(e: io::Error) -> SiegeError {
    if is_timeout(&e) {
        SiegeError::Timeout("waiting for response bytes".to_string())
    } else {
        SiegeError::Connection(e.to_string())
    }
}

fn write_error(e: io::Error) -> SiegeError {
    if is_timeout(&e) {
        SiegeError::Timeout("sending request".to_string())
    } else {
        SiegeError::Connection(e.to_string())
    }
}
