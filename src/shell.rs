//! Interactive Shell
//!
//! Turns human input lines into requests and prints decoded responses.
//!
//! ```text
//! memsiege> put greeting hello
//! Received OK
//! memsiege> get greeting
//! Received OK
//! Content length: 5
//! Content: <hello>
//! ```
//!
//! Unknown commands and wrong argument counts are reported locally; nothing
//! is sent for them.

use std::io::Write;

use bytes::Bytes;
use crossbeam::channel::Receiver;

use crate::error::Result;
use crate::network::{Client, Transport};
use crate::protocol::{Command, Opcode, Response};

/// Prompt printed before each input line
pub const PROMPT: &str = "memsiege> ";

/// Parse one input line; `Ok(None)` for a blank line
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let mut tokens = line.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };

    let opcode: Opcode = name.parse()?;
    let args = tokens
        .map(|token| Bytes::copy_from_slice(token.as_bytes()))
        .collect();

    Command::new(opcode, args).map(Some)
}

/// Human-readable rendering of a response
pub fn format_response(response: &Response) -> String {
    let mut text = format!("Received {}", response.status());
    if let Some(content) = response.content() {
        text.push_str(&format!(
            "\nContent length: {}\nContent: <{}>",
            content.len(),
            String::from_utf8_lossy(content)
        ));
    }
    text
}

/// Read-line / dispatch / print loop over one transport
pub struct Shell<T> {
    client: Client<T>,
}

impl<T: Transport> Shell<T> {
    pub fn new(transport: T) -> Self {
        Self {
            client: Client::new(transport),
        }
    }

    /// Parse, send and format a single line
    ///
    /// Local errors (unknown command, arity) come back as `Err` without
    /// touching the transport.
    pub fn handle_line(&mut self, line: &str) -> Result<Option<String>> {
        let Some(command) = parse_line(line)? else {
            return Ok(None);
        };
        tracing::debug!("Sending {} with {} argument(s)", command.opcode(), command.args().len());

        let response = self.client.execute(&command)?;
        Ok(Some(format_response(&response)))
    }

    /// Serve lines until input ends or an interrupt arrives
    ///
    /// A pending interrupt is only noticed between requests. Transport and
    /// decoding errors end the loop; local errors are printed and skipped.
    pub fn run<W: Write>(
        &mut self,
        lines: &Receiver<String>,
        interrupts: &Receiver<()>,
        out: &mut W,
    ) -> Result<()> {
        loop {
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            crossbeam::select! {
                recv(interrupts) -> _ => {
                    writeln!(out)?;
                    return Ok(());
                }
                recv(lines) -> line => {
                    let Ok(line) = line else {
                        // Input closed (EOF)
                        writeln!(out)?;
                        return Ok(());
                    };
                    match self.handle_line(&line) {
                        Ok(Some(text)) => writeln!(out, "{}", text)?,
                        Ok(None) => {}
                        Err(e) if e.is_local() => writeln!(out, "{}", e)?,
                        Err(e) => return Err(e),
                    }
                }
            }
        }
    }

    pub fn into_client(self) -> Client<T> {
        self.client
    }
}
