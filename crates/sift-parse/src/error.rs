// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

/// Errors raised by the grammar-level parsers.
///
/// All variants carry human-readable detail; the streaming engine decides
/// which of them are fatal and which merely drop a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A start line that is neither request-like nor response-like, or whose
    /// components fail sub-parsing.
    InvalidStartLine(String),
    /// A URI whose scheme is neither `sip` nor `sips`.
    UnsupportedUriScheme(String),
    /// A malformed SIP/SIPS URI.
    InvalidUri(String),
    /// A malformed `key=value` parameter section.
    InvalidParams(String),
    /// A malformed address value (display name / angle brackets / list).
    InvalidAddress(String),
    /// A header value rejected by its registered parser.
    InvalidHeader(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStartLine(msg) => write!(f, "invalid start line: {}", msg),
            Self::UnsupportedUriScheme(scheme) => {
                write!(f, "unsupported URI scheme '{}'", scheme)
            }
            Self::InvalidUri(msg) => write!(f, "invalid URI: {}", msg),
            Self::InvalidParams(msg) => write!(f, "invalid parameters: {}", msg),
            Self::InvalidAddress(msg) => write!(f, "invalid address: {}", msg),
            Self::InvalidHeader(msg) => write!(f, "invalid header: {}", msg),
        }
    }
}

impl std::error::Error for ParseError {}
