// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

use smol_str::SmolStr;

use crate::params::Params;

/// Parsed representation of a SIP or SIPS URI (RFC 3261 §19.1).
///
/// # Examples
///
/// ```
/// use sift_core::SipUri;
///
/// let uri = SipUri::new("example.com");
/// assert_eq!(uri.to_string(), "sip:example.com");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SipUri {
    /// `true` for `sips:`.
    pub secure: bool,
    pub user: Option<SmolStr>,
    pub password: Option<SmolStr>,
    pub host: SmolStr,
    pub port: Option<u16>,
    /// `;key=value` URI parameters.
    pub params: Params,
    /// `?key=value&key=value` URI headers.
    pub headers: Params,
}

impl SipUri {
    /// Constructs a plain `sip:` URI with the given host and no other parts.
    pub fn new(host: impl Into<SmolStr>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for SipUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.secure { "sips:" } else { "sip:" })?;
        if let Some(user) = &self.user {
            f.write_str(user)?;
            if let Some(password) = &self.password {
                write!(f, ":{}", password)?;
            }
            f.write_str("@")?;
        }
        f.write_str(&self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        self.params.fmt_delimited(f, ';', true)?;
        if !self.headers.is_empty() {
            f.write_str("?")?;
            self.headers.fmt_delimited(f, '&', false)?;
        }
        Ok(())
    }
}

/// A URI as it may appear in a SIP message: either a SIP/SIPS URI or the
/// literal `*` wildcard permitted only in `Contact` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Uri {
    Sip(SipUri),
    Wildcard,
}

impl Uri {
    /// Returns `true` for the `*` wildcard.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Uri::Wildcard)
    }

    /// Returns the inner [`SipUri`] unless this is the wildcard.
    pub fn as_sip(&self) -> Option<&SipUri> {
        match self {
            Uri::Sip(uri) => Some(uri),
            Uri::Wildcard => None,
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uri::Sip(uri) => uri.fmt(f),
            Uri::Wildcard => f.write_str("*"),
        }
    }
}

impl From<SipUri> for Uri {
    fn from(uri: SipUri) -> Self {
        Uri::Sip(uri)
    }
}
