// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Streaming SIP parser.
//!
//! A [`Parser`] ingests raw bytes through [`write`](Parser::write) and emits
//! typed [`SipMessage`] values on an output channel, with structured
//! [`ParserError`]s on a separate error channel. A dedicated Tokio task runs
//! the framing loop, so a parser must be created inside a runtime.
//!
//! Two framing modes exist:
//! - [`Mode::Stream`]: writes may carry arbitrary fragments of arbitrary
//!   messages (TCP-style); every message must carry a `Content-Length`
//!   header, which is authoritative for framing.
//! - [`Mode::Datagram`]: every write carries exactly one complete message
//!   (UDP-style); the body length is computed from the CRLFCRLF position.
//!
//! # Example
//! ```no_run
//! use sift_stream::{parse_message, Mode, Parser};
//! use tokio::sync::mpsc;
//! # async fn example() {
//! let (out_tx, mut out_rx) = mpsc::channel(32);
//! let (err_tx, _err_rx) = mpsc::channel(32);
//! let parser = Parser::new(out_tx, err_tx, Mode::Stream);
//! parser
//!     .write(b"SIP/2.0 200 OK\r\nContent-Length: 0\r\n\r\n")
//!     .unwrap();
//! let msg = out_rx.recv().await.unwrap();
//! assert!(msg.is_response());
//! parser.stop().await;
//!
//! // One-shot convenience for a single datagram:
//! let msg = parse_message(b"SIP/2.0 200 OK\r\n\r\n").await.unwrap();
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use memchr::memmem;
use parking_lot::Mutex;
use sift_core::SipMessage;
use sift_parse::{HeaderParser, HeaderRegistry};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

mod buffer;
mod engine;
mod error;

pub use buffer::{BufferError, ParserBuffer};
pub use error::ParserError;

use engine::{Engine, FrameInfo};

/// Framing mode of a [`Parser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Writes carry arbitrary stream fragments; `Content-Length` frames
    /// each message.
    Stream,
    /// Every write carries exactly one complete message; the CRLFCRLF
    /// position frames the body.
    Datagram,
}

/// Streaming SIP parser facade.
///
/// Owns the managed input buffer, the header-parser registry, and the
/// framing task. Messages are emitted in exactly the order their bytes were
/// written; errors are emitted in the order they are detected.
pub struct Parser {
    mode: Mode,
    buffer: Arc<ParserBuffer>,
    registry: Arc<HeaderRegistry>,
    frame_info: Mutex<Option<mpsc::UnboundedSender<FrameInfo>>>,
    terminal: Arc<Mutex<Option<ParserError>>>,
    stopped: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
    output: mpsc::Sender<SipMessage>,
    errors: mpsc::Sender<ParserError>,
}

impl Parser {
    /// Creates a parser and spawns its framing task.
    ///
    /// Parsed messages are sent on `output`; errors on `errors`. A consumer
    /// that stops reading `output` eventually blocks the loop (the channels
    /// are bounded); dropping the output receiver stops the loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        output: mpsc::Sender<SipMessage>,
        errors: mpsc::Sender<ParserError>,
        mode: Mode,
    ) -> Self {
        let parser = Self {
            mode,
            buffer: Arc::new(ParserBuffer::new()),
            registry: Arc::new(HeaderRegistry::default()),
            frame_info: Mutex::new(None),
            terminal: Arc::new(Mutex::new(None)),
            stopped: AtomicBool::new(false),
            task: Mutex::new(None),
            output,
            errors,
        };
        parser.spawn_engine();
        parser
    }

    fn spawn_engine(&self) {
        let receiver = match self.mode {
            Mode::Stream => None,
            Mode::Datagram => {
                let (tx, rx) = mpsc::unbounded_channel();
                *self.frame_info.lock() = Some(tx);
                Some(rx)
            }
        };
        let engine = Engine {
            buffer: self.buffer.clone(),
            registry: self.registry.clone(),
            frame_info: receiver,
            output: self.output.clone(),
            errors: self.errors.clone(),
            terminal: self.terminal.clone(),
            streamed: self.mode == Mode::Stream,
        };
        *self.task.lock() = Some(tokio::spawn(engine.run()));
    }

    /// Queues bytes for parsing, returning how many were accepted.
    ///
    /// `Ok` means the bytes were queued, not that they are valid SIP. In
    /// datagram mode, a buffer without a CRLFCRLF sequence returns `Ok(0)`
    /// so the transport can retry once more data has arrived.
    ///
    /// # Errors
    /// Fails with [`ParserError::WriteError`] after [`stop`](Self::stop).
    pub fn write(&self, data: &[u8]) -> Result<usize, ParserError> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(ParserError::WriteError(
                "cannot write to a stopped parser".to_owned(),
            ));
        }

        if self.mode == Mode::Datagram {
            let Some(body_len) = datagram_body_length(data) else {
                return Ok(0);
            };
            let sender = self.frame_info.lock();
            match sender.as_ref() {
                Some(tx) => {
                    if tx
                        .send(FrameInfo {
                            body_len,
                            frame_len: data.len(),
                        })
                        .is_err()
                    {
                        return Err(ParserError::WriteError(
                            "parser loop has terminated".to_owned(),
                        ));
                    }
                }
                None => {
                    return Err(ParserError::WriteError(
                        "cannot write to a stopped parser".to_owned(),
                    ));
                }
            }
        }

        self.buffer
            .write(data)
            .map_err(|err| ParserError::WriteError(format!("input buffer rejected bytes: {}", err)))
    }

    /// Stops the parser: the input buffer and body-length channel close,
    /// pending reads fail, and this call waits for the framing task to
    /// exit. Idempotent; subsequent [`write`](Self::write) calls fail.
    ///
    /// A message the loop is still delivering is flushed first, so keep
    /// draining the output channel or drop its receiver before stopping.
    pub async fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.buffer.stop();
        self.frame_info.lock().take();
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    /// Restores a stopped parser to a running state: fresh input buffer and
    /// body-length channel, cleared terminal error, re-spawned framing task
    /// with the same mode, sinks, and registry.
    pub fn reset(&mut self) {
        self.stopped.store(false, Ordering::SeqCst);
        *self.terminal.lock() = None;
        self.buffer = Arc::new(ParserBuffer::new());
        self.spawn_engine();
    }

    /// Registers a custom parser for a header name, replacing any existing
    /// entry (including the defaults). Takes effect for headers parsed
    /// after the call.
    pub fn set_header_parser(&self, name: &str, parser: HeaderParser) {
        self.registry.set(name, parser);
    }

    /// Returns the most recent fatal error recorded by the framing loop.
    pub fn terminal_error(&self) -> Option<ParserError> {
        self.terminal.lock().clone()
    }

    /// Returns the parser's framing mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }
}

/// Body length of a single-message datagram: everything past the first
/// CRLFCRLF. `None` when no CRLFCRLF is present.
fn datagram_body_length(data: &[u8]) -> Option<usize> {
    memmem::find(data, b"\r\n\r\n").map(|idx| data.len() - idx - 4)
}

/// Parses a single complete SIP message by running a one-shot datagram
/// parser over `data` and returning whichever of message or error arrives
/// first.
///
/// This is costlier than reusing a [`Parser`], but fits transports where
/// consecutive messages may come from different endpoints.
pub async fn parse_message(data: &[u8]) -> Result<SipMessage, ParserError> {
    let (out_tx, mut out_rx) = mpsc::channel(1);
    let (err_tx, mut err_rx) = mpsc::channel(1);
    let parser = Parser::new(out_tx, err_tx, Mode::Datagram);

    let queued = match parser.write(data) {
        Ok(n) => n,
        Err(err) => {
            parser.stop().await;
            return Err(err);
        }
    };
    if queued == 0 {
        parser.stop().await;
        return Err(ParserError::BrokenMessage(
            "incomplete message: no CRLFCRLF sequence found".to_owned(),
        ));
    }

    let result = tokio::select! {
        Some(msg) = out_rx.recv() => Ok(msg),
        Some(err) = err_rx.recv() => Err(err),
        else => Err(ParserError::BrokenMessage(
            "parser terminated without producing a message".to_owned(),
        )),
    };
    parser.stop().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datagram_body_length_measures_past_crlfcrlf() {
        assert_eq!(datagram_body_length(b"headers\r\n\r\nbody"), Some(4));
        assert_eq!(datagram_body_length(b"headers\r\n\r\n"), Some(0));
        assert_eq!(datagram_body_length(b"no terminator"), None);
    }
}
