// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

/// Errors reported by the streaming parser.
///
/// `MalformedMessage` and `BrokenMessage` are fatal: they land in the
/// terminal-error cell and, in stream mode, there is usually nothing left
/// to read. `InvalidStartLine` also sets the terminal error, but in
/// datagram mode the loop skips the rest of the bad frame and keeps going.
/// `WriteError` is only ever returned to the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// The start line is neither request-like nor response-like, or its
    /// components failed sub-parsing.
    InvalidStartLine(String),
    /// In stream mode, the `Content-Length` header is missing or duplicated.
    MalformedMessage(String),
    /// The body read returned fewer bytes than declared because the input
    /// closed mid-message.
    BrokenMessage(String),
    /// `write` was called after `stop`, or the input buffer rejected bytes.
    WriteError(String),
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStartLine(msg) => write!(f, "invalid start line: {}", msg),
            Self::MalformedMessage(msg) => write!(f, "malformed message: {}", msg),
            Self::BrokenMessage(msg) => write!(f, "broken message: {}", msg),
            Self::WriteError(msg) => write!(f, "write error: {}", msg),
        }
    }
}

impl std::error::Error for ParserError {}
