// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The framing loop: consumes the managed buffer one line at a time and
//! emits whole messages (or structured errors) on the parser's sinks.

use std::sync::Arc;

use parking_lot::Mutex;
use sift_core::{Request, Response, SipMessage};
use sift_parse::{
    is_request_line, is_response_line, parse_request_line, parse_status_line, HeaderRegistry,
    ParseError,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{buffer::ParserBuffer, error::ParserError};

/// Body and frame lengths computed by the datagram write path, one per
/// `write` call.
pub(crate) struct FrameInfo {
    pub body_len: usize,
    pub frame_len: usize,
}

pub(crate) struct Engine {
    pub buffer: Arc<ParserBuffer>,
    pub registry: Arc<HeaderRegistry>,
    /// Present in datagram mode only.
    pub frame_info: Option<mpsc::UnboundedReceiver<FrameInfo>>,
    pub output: mpsc::Sender<SipMessage>,
    pub errors: mpsc::Sender<ParserError>,
    pub terminal: Arc<Mutex<Option<ParserError>>>,
    pub streamed: bool,
}

impl Engine {
    pub async fn run(mut self) {
        debug!("parser loop started");

        loop {
            let start_line = match self.buffer.next_line().await {
                Ok(line) => line,
                Err(_) => break,
            };
            let line_len = start_line.len();
            let line = String::from_utf8_lossy(&start_line).into_owned();
            debug!(line = %line, "read start line");

            let mut msg = match read_start_line(&line) {
                Ok(msg) => msg,
                Err(err) => {
                    let term = ParserError::InvalidStartLine(format!(
                        "failed to parse first line of message: {}",
                        err
                    ));
                    self.report(term).await;

                    if !self.streamed && !self.skip_invalid_frame(line_len).await {
                        break;
                    }
                    continue;
                }
            };

            // Headers may continue across physical lines (continuations
            // start with whitespace), so lines accumulate in a buffer that
            // is flushed whenever a new header starts or the block ends.
            let mut pending = String::new();
            loop {
                let line = match self.buffer.next_line().await {
                    Ok(line) => line,
                    Err(_) => break,
                };
                if line.is_empty() {
                    self.flush_header(&mut pending, &mut msg);
                    break;
                }
                let text = String::from_utf8_lossy(&line);
                if line[0] != b' ' && line[0] != b'\t' {
                    self.flush_header(&mut pending, &mut msg);
                    pending.push_str(&text);
                } else if !pending.is_empty() {
                    pending.push(' ');
                    pending.push_str(text.trim());
                } else {
                    warn!(
                        line = %text,
                        message = %msg.short(),
                        "discarding continuation line at start of header block"
                    );
                }
            }

            let content_length = if self.streamed {
                match self.streamed_content_length(&msg) {
                    Ok(length) => length,
                    Err(term) => {
                        self.report(term).await;
                        continue;
                    }
                }
            } else {
                match self.next_frame_info().await {
                    Some(frame) => frame.body_len,
                    None => break,
                }
            };

            debug!(content_length, "reading message body");
            let body = match self.buffer.next_chunk(content_length).await {
                Ok(body) => body,
                Err(err) => {
                    let term = ParserError::BrokenMessage(format!(
                        "read message body failed: {}; message was: {}",
                        err,
                        msg.short()
                    ));
                    self.report(term).await;
                    continue;
                }
            };

            if !body.iter().all(u8::is_ascii_whitespace) {
                msg.set_body(body);
            }

            if self.output.send(msg).await.is_err() {
                debug!("output receiver dropped; stopping parser loop");
                break;
            }
        }

        debug!("parser loop stopped");
    }

    /// Records the error in the terminal cell and emits it on the error sink.
    async fn report(&self, err: ParserError) {
        *self.terminal.lock() = Some(err.clone());
        let _ = self.errors.send(err).await;
    }

    /// Parses one buffered logical header and appends the results to the
    /// message. Failed headers are dropped with a warning; they never abort
    /// the message.
    fn flush_header(&self, pending: &mut String, msg: &mut SipMessage) {
        if pending.is_empty() {
            return;
        }
        match self.registry.parse_header(pending) {
            Ok(headers) => {
                for header in headers {
                    msg.headers_mut().push(header);
                }
            }
            Err(err) => {
                warn!(header = %pending, error = %err, "skipping unparseable header");
            }
        }
        pending.clear();
    }

    /// Stream mode framing: exactly one `Content-Length` header decides the
    /// body length. Zero or several of them is fatal.
    fn streamed_content_length(&self, msg: &SipMessage) -> Result<usize, ParserError> {
        let mut lengths = msg.headers().iter().filter_map(|h| match h {
            sift_core::Header::ContentLength(n) => Some(*n),
            _ => None,
        });
        let Some(length) = lengths.next() else {
            return Err(ParserError::MalformedMessage(format!(
                "missing required 'Content-Length' header in message '{}'",
                msg.short()
            )));
        };
        if lengths.next().is_some() {
            return Err(ParserError::MalformedMessage(format!(
                "multiple 'Content-Length' headers in message '{}'",
                msg.short()
            )));
        }
        Ok(length as usize)
    }

    /// Pops the body-length pair for the current datagram. Returns `None`
    /// when the side channel has been closed by `stop`.
    async fn next_frame_info(&mut self) -> Option<FrameInfo> {
        match &mut self.frame_info {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }

    /// After an invalid start line in datagram mode, discards the remainder
    /// of the frame so the next datagram starts cleanly. Returns `false`
    /// when the parser is shutting down.
    async fn skip_invalid_frame(&mut self, line_len: usize) -> bool {
        let Some(frame) = self.next_frame_info().await else {
            return false;
        };
        let skip = frame.frame_len.saturating_sub(line_len + 2);
        debug!(
            frame_len = frame.frame_len,
            line_len, skip, "skipping remainder of invalid datagram"
        );
        if let Err(err) = self.buffer.next_chunk(skip).await {
            warn!(error = %err, "failed to skip invalid datagram remainder");
        }
        true
    }
}

fn read_start_line(line: &str) -> Result<SipMessage, ParseError> {
    if is_request_line(line) {
        let (method, uri, version) = parse_request_line(line)?;
        let request = Request::new(method, uri, version)
            .map_err(|err| ParseError::InvalidStartLine(err.to_string()))?;
        Ok(SipMessage::Request(request))
    } else if is_response_line(line) {
        let (version, code, reason) = parse_status_line(line)?;
        let response = Response::new(version, code, reason)
            .map_err(|err| ParseError::InvalidStartLine(err.to_string()))?;
        Ok(SipMessage::Response(response))
    } else {
        Err(ParseError::InvalidStartLine(format!(
            "transmission beginning '{}' is not a SIP message",
            line
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_start_line_classifies_request() {
        let msg = read_start_line("INVITE sip:bob@example.com SIP/2.0").unwrap();
        assert!(msg.is_request());
    }

    #[test]
    fn read_start_line_classifies_response() {
        let msg = read_start_line("SIP/2.0 180 Ringing").unwrap();
        let res = msg.as_response().unwrap();
        assert_eq!(res.code(), 180);
        assert_eq!(res.reason(), "Ringing");
    }

    #[test]
    fn read_start_line_rejects_garbage() {
        assert!(read_start_line("HELLO WORLD").is_err());
        assert!(read_start_line("").is_err());
    }

    #[test]
    fn read_start_line_rejects_out_of_range_status() {
        assert!(read_start_line("SIP/2.0 99 Too Low").is_err());
        assert!(read_start_line("SIP/2.0 700 Too High").is_err());
    }

    #[test]
    fn read_start_line_rejects_wildcard_request_uri() {
        assert!(read_start_line("REGISTER * SIP/2.0").is_err());
    }
}
