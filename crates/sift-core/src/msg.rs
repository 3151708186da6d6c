// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SIP message values produced by the framing loop.
//!
//! A [`SipMessage`] is either a [`Request`] or a [`Response`]; both carry an
//! ordered header list and an opaque body. The SIP version is kept as the
//! wire token so a message renders back exactly as it arrived.

use std::fmt;

use bytes::Bytes;
use smol_str::SmolStr;

use crate::{
    cseq::{CallId, CSeq},
    header::{Credentials, Header},
    headers::Headers,
    method::Method,
    name_addr::NameAddr,
    uri::Uri,
    via::{Via, ViaHop},
};

/// Transport assumed when a message carries no Via header.
pub const DEFAULT_TRANSPORT: &str = "UDP";

/// Errors raised when assembling a message from parsed parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// Status code outside the SIP range 100-699.
    InvalidStatusCode { code: u16 },
    /// The `*` wildcard URI is not permitted in a request line.
    WildcardRequestUri,
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStatusCode { code } => {
                write!(f, "invalid SIP status code: {} (must be 100-699)", code)
            }
            Self::WildcardRequestUri => {
                write!(f, "wildcard URI '*' not permitted in request line")
            }
        }
    }
}

impl std::error::Error for MessageError {}

/// A SIP request: method, request-URI, version, headers, body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    uri: Uri,
    version: SmolStr,
    headers: Headers,
    body: Bytes,
}

impl Request {
    /// Builds a request with empty headers and body.
    ///
    /// # Errors
    /// Fails when the request-URI is the `*` wildcard, which RFC 3261 only
    /// permits in Contact headers.
    pub fn new(
        method: Method,
        uri: Uri,
        version: impl Into<SmolStr>,
    ) -> Result<Self, MessageError> {
        if uri.is_wildcard() {
            return Err(MessageError::WildcardRequestUri);
        }
        Ok(Self {
            method,
            uri,
            version: version.into(),
            headers: Headers::new(),
            body: Bytes::new(),
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the SIP version token from the wire, e.g. `SIP/2.0`.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn set_body(&mut self, body: Bytes) {
        self.body = body;
    }

    /// Renders the request line without the trailing CRLF.
    pub fn start_line(&self) -> String {
        format!("{} {} {}", self.method, self.uri, self.version)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n", self.start_line())?;
        for header in &self.headers {
            write!(f, "{}\r\n", header)?;
        }
        write!(f, "\r\n{}", String::from_utf8_lossy(&self.body))
    }
}

/// A SIP response: version, status code, reason phrase, headers, body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    version: SmolStr,
    code: u16,
    reason: SmolStr,
    headers: Headers,
    body: Bytes,
}

impl Response {
    /// Builds a response with empty headers and body.
    ///
    /// # Errors
    /// Fails when the status code lies outside 100-699.
    pub fn new(
        version: impl Into<SmolStr>,
        code: u16,
        reason: impl Into<SmolStr>,
    ) -> Result<Self, MessageError> {
        if !(100..=699).contains(&code) {
            return Err(MessageError::InvalidStatusCode { code });
        }
        Ok(Self {
            version: version.into(),
            code,
            reason: reason.into(),
            headers: Headers::new(),
            body: Bytes::new(),
        })
    }

    /// Returns the SIP version token from the wire, e.g. `SIP/2.0`.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn set_body(&mut self, body: Bytes) {
        self.body = body;
    }

    /// Renders the status line without the trailing CRLF.
    pub fn start_line(&self) -> String {
        format!("{} {} {}", self.version, self.code, self.reason)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n", self.start_line())?;
        for header in &self.headers {
            write!(f, "{}\r\n", header)?;
        }
        write!(f, "\r\n{}", String::from_utf8_lossy(&self.body))
    }
}

/// Either a SIP request or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SipMessage {
    Request(Request),
    Response(Response),
}

impl SipMessage {
    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request(_))
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Self::Response(_))
    }

    pub fn as_request(&self) -> Option<&Request> {
        match self {
            Self::Request(req) => Some(req),
            _ => None,
        }
    }

    pub fn as_response(&self) -> Option<&Response> {
        match self {
            Self::Response(res) => Some(res),
            _ => None,
        }
    }

    /// Returns the headers regardless of message kind.
    pub fn headers(&self) -> &Headers {
        match self {
            Self::Request(req) => req.headers(),
            Self::Response(res) => res.headers(),
        }
    }

    /// Returns mutable headers regardless of message kind.
    pub fn headers_mut(&mut self) -> &mut Headers {
        match self {
            Self::Request(req) => req.headers_mut(),
            Self::Response(res) => res.headers_mut(),
        }
    }

    /// Returns the body regardless of message kind.
    pub fn body(&self) -> &Bytes {
        match self {
            Self::Request(req) => req.body(),
            Self::Response(res) => res.body(),
        }
    }

    /// Sets the body regardless of message kind.
    pub fn set_body(&mut self, body: Bytes) {
        match self {
            Self::Request(req) => req.set_body(body),
            Self::Response(res) => res.set_body(body),
        }
    }

    /// Renders the start line without the trailing CRLF.
    pub fn start_line(&self) -> String {
        match self {
            Self::Request(req) => req.start_line(),
            Self::Response(res) => res.start_line(),
        }
    }

    /// Short description for log and error text: the start line.
    pub fn short(&self) -> String {
        self.start_line()
    }

    /// Returns the Call-ID header value, if present.
    pub fn call_id(&self) -> Option<&CallId> {
        self.headers().iter().find_map(|h| match h {
            Header::CallId(id) => Some(id),
            _ => None,
        })
    }

    /// Returns the CSeq header value, if present.
    pub fn cseq(&self) -> Option<&CSeq> {
        self.headers().iter().find_map(|h| match h {
            Header::CSeq(cseq) => Some(cseq),
            _ => None,
        })
    }

    /// Returns the From header value, if present.
    pub fn from(&self) -> Option<&NameAddr> {
        self.headers().iter().find_map(|h| match h {
            Header::From(addr) => Some(addr),
            _ => None,
        })
    }

    /// Returns the To header value, if present.
    pub fn to(&self) -> Option<&NameAddr> {
        self.headers().iter().find_map(|h| match h {
            Header::To(addr) => Some(addr),
            _ => None,
        })
    }

    /// Returns the first Contact header value, if present.
    pub fn contact(&self) -> Option<&NameAddr> {
        self.headers().iter().find_map(|h| match h {
            Header::Contact(addr) => Some(addr),
            _ => None,
        })
    }

    /// Returns the topmost Via header, if present.
    pub fn via(&self) -> Option<&Via> {
        self.headers().iter().find_map(|h| match h {
            Header::Via(via) => Some(via),
            _ => None,
        })
    }

    /// Returns the first hop of the topmost Via header, if present.
    pub fn via_hop(&self) -> Option<&ViaHop> {
        self.via().map(Via::first_hop)
    }

    /// Returns the Expires header value, if present.
    pub fn expires(&self) -> Option<u32> {
        self.headers().iter().find_map(|h| match h {
            Header::Expires(n) => Some(*n),
            _ => None,
        })
    }

    /// Returns the Content-Length header value, if present.
    pub fn content_length(&self) -> Option<u32> {
        self.headers().iter().find_map(|h| match h {
            Header::ContentLength(n) => Some(*n),
            _ => None,
        })
    }

    /// Returns the Content-Type header value, if present.
    pub fn content_type(&self) -> Option<&SmolStr> {
        self.headers().iter().find_map(|h| match h {
            Header::ContentType(s) => Some(s),
            _ => None,
        })
    }

    /// Returns the Authorization header credentials, if present.
    pub fn authorization(&self) -> Option<&Credentials> {
        self.headers().iter().find_map(|h| match h {
            Header::Authorization(creds) => Some(creds),
            _ => None,
        })
    }

    /// Returns the transport named by the first Via hop, or the default.
    pub fn transport(&self) -> &str {
        self.via_hop()
            .map(|hop| hop.transport.as_str())
            .unwrap_or(DEFAULT_TRANSPORT)
    }
}

impl fmt::Display for SipMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(req) => req.fmt(f),
            Self::Response(res) => res.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uri::SipUri;

    fn request() -> Request {
        Request::new(
            Method::Register,
            Uri::Sip(SipUri::new("registrar.example.com")),
            "SIP/2.0",
        )
        .expect("valid request")
    }

    #[test]
    fn request_start_line() {
        assert_eq!(
            request().start_line(),
            "REGISTER sip:registrar.example.com SIP/2.0"
        );
    }

    #[test]
    fn rejects_wildcard_request_uri() {
        let err = Request::new(Method::Register, Uri::Wildcard, "SIP/2.0").unwrap_err();
        assert_eq!(err, MessageError::WildcardRequestUri);
    }

    #[test]
    fn response_code_range() {
        assert!(Response::new("SIP/2.0", 200, "OK").is_ok());
        assert!(Response::new("SIP/2.0", 100, "Trying").is_ok());
        assert!(Response::new("SIP/2.0", 699, "Weird").is_ok());
        assert!(Response::new("SIP/2.0", 99, "Low").is_err());
        assert!(Response::new("SIP/2.0", 700, "High").is_err());
    }

    #[test]
    fn typed_accessors() {
        let mut req = request();
        req.headers_mut().push(Header::CallId(CallId(SmolStr::new(
            "a84b4c76e66710@client.example.com",
        ))));
        req.headers_mut().push(Header::CSeq(CSeq {
            seq: 314159,
            method: Method::Register,
        }));
        let msg = SipMessage::Request(req);

        assert_eq!(
            msg.call_id().map(CallId::as_str),
            Some("a84b4c76e66710@client.example.com")
        );
        assert_eq!(msg.cseq().map(|c| c.seq), Some(314159));
        assert_eq!(msg.transport(), DEFAULT_TRANSPORT);
        assert!(msg.via().is_none());
    }

    #[test]
    fn renders_message_round_trippable_text() {
        let mut req = request();
        req.headers_mut().push(Header::MaxForwards(70));
        req.headers_mut().push(Header::ContentLength(4));
        req.set_body(Bytes::from_static(b"body"));

        let text = req.to_string();
        assert_eq!(
            text,
            "REGISTER sip:registrar.example.com SIP/2.0\r\n\
             Max-Forwards: 70\r\n\
             Content-Length: 4\r\n\
             \r\nbody"
        );
    }
}
