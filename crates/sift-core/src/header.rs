// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The closed set of typed SIP headers.
//!
//! Every header the parser recognises is a variant of [`Header`];
//! unrecognised field names fall back to [`Header::Generic`], which keeps
//! the raw name (in its original case) and the trimmed value. Each variant
//! answers `name()` with its canonical wire name and `value()` with the
//! rendered field value, so a message can be reconstructed in header order.

use std::fmt;

use smol_str::SmolStr;

use crate::{
    cseq::{CallId, CSeq},
    method::Method,
    name_addr::NameAddr,
    params::Params,
    uri::Uri,
    via::Via,
};

/// Authorization / Proxy-Authorization credentials: an auth scheme followed
/// by a comma-separated parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub scheme: SmolStr,
    pub params: Params,
}

impl Credentials {
    pub fn param(&self, name: &str) -> Option<&SmolStr> {
        self.params.get(name).and_then(|v| v.as_ref())
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.scheme)?;
        self.params.fmt_delimited(f, ',', false)
    }
}

/// An unrecognised header, stored verbatim: wire-case name, trimmed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericHeader {
    pub name: SmolStr,
    pub value: SmolStr,
}

/// A single typed SIP header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    To(NameAddr),
    From(NameAddr),
    Contact(NameAddr),
    CallId(CallId),
    CSeq(CSeq),
    Via(Via),
    MaxForwards(u32),
    Expires(u32),
    ContentLength(u32),
    ContentType(SmolStr),
    Accept(SmolStr),
    UserAgent(SmolStr),
    Allow(Vec<Method>),
    Require(Vec<SmolStr>),
    Supported(Vec<SmolStr>),
    Route(Vec<Uri>),
    RecordRoute(Vec<Uri>),
    Authorization(Credentials),
    ProxyAuthorization(Credentials),
    Generic(GenericHeader),
}

impl Header {
    /// Returns the canonical wire name of the header. Generic headers keep
    /// the case they arrived with.
    pub fn name(&self) -> &str {
        match self {
            Header::To(_) => "To",
            Header::From(_) => "From",
            Header::Contact(_) => "Contact",
            Header::CallId(_) => "Call-ID",
            Header::CSeq(_) => "CSeq",
            Header::Via(_) => "Via",
            Header::MaxForwards(_) => "Max-Forwards",
            Header::Expires(_) => "Expires",
            Header::ContentLength(_) => "Content-Length",
            Header::ContentType(_) => "Content-Type",
            Header::Accept(_) => "Accept",
            Header::UserAgent(_) => "User-Agent",
            Header::Allow(_) => "Allow",
            Header::Require(_) => "Require",
            Header::Supported(_) => "Supported",
            Header::Route(_) => "Route",
            Header::RecordRoute(_) => "Record-Route",
            Header::Authorization(_) => "Authorization",
            Header::ProxyAuthorization(_) => "Proxy-Authorization",
            Header::Generic(g) => &g.name,
        }
    }

    /// Renders the header field value.
    pub fn value(&self) -> String {
        match self {
            Header::To(addr) | Header::From(addr) | Header::Contact(addr) => addr.to_string(),
            Header::CallId(id) => id.to_string(),
            Header::CSeq(cseq) => cseq.to_string(),
            Header::Via(via) => via.to_string(),
            Header::MaxForwards(n) | Header::Expires(n) | Header::ContentLength(n) => n.to_string(),
            Header::ContentType(s) | Header::Accept(s) | Header::UserAgent(s) => s.to_string(),
            Header::Allow(methods) => {
                let tokens: Vec<&str> = methods.iter().map(Method::as_str).collect();
                tokens.join(", ")
            }
            Header::Require(tokens) | Header::Supported(tokens) => {
                let tokens: Vec<&str> = tokens.iter().map(SmolStr::as_str).collect();
                tokens.join(", ")
            }
            Header::Route(uris) | Header::RecordRoute(uris) => {
                let addrs: Vec<String> = uris.iter().map(|u| format!("<{}>", u)).collect();
                addrs.join(", ")
            }
            Header::Authorization(creds) | Header::ProxyAuthorization(creds) => creds.to_string(),
            Header::Generic(g) => g.value.to_string(),
        }
    }

    /// Returns `true` when the header's wire name matches `name` ignoring
    /// ASCII case.
    pub fn is_named(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name)
    }
}

/// Renders the header as a full `Name: value` field line (no CRLF).
impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uri::SipUri;

    #[test]
    fn names_are_canonical() {
        assert_eq!(Header::MaxForwards(70).name(), "Max-Forwards");
        assert_eq!(Header::CallId(CallId(SmolStr::new("x"))).name(), "Call-ID");
        let generic = Header::Generic(GenericHeader {
            name: SmolStr::new("X-Custom"),
            value: SmolStr::new("value"),
        });
        assert_eq!(generic.name(), "X-Custom");
        assert_eq!(generic.value(), "value");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(Header::Expires(60).is_named("EXPIRES"));
        assert!(Header::Expires(60).is_named("expires"));
        assert!(!Header::Expires(60).is_named("expire"));
    }

    #[test]
    fn renders_list_headers() {
        let allow = Header::Allow(vec![Method::Invite, Method::Ack, Method::Bye]);
        assert_eq!(allow.value(), "INVITE, ACK, BYE");

        let route = Header::Route(vec![
            Uri::Sip(SipUri::new("proxy1.example.com")),
            Uri::Sip(SipUri::new("proxy2.example.com")),
        ]);
        assert_eq!(
            route.value(),
            "<sip:proxy1.example.com>, <sip:proxy2.example.com>"
        );
    }

    #[test]
    fn renders_field_line() {
        assert_eq!(Header::ContentLength(0).to_string(), "Content-Length: 0");
    }

    #[test]
    fn credentials_param_lookup() {
        let mut params = Params::new();
        params.add("realm", Some(SmolStr::new("example.com")));
        params.add("nonce", Some(SmolStr::new("n1")));
        let creds = Credentials {
            scheme: SmolStr::new("Digest"),
            params,
        };
        assert_eq!(creds.param("Realm").map(|v| v.as_str()), Some("example.com"));
        assert!(creds.to_string().starts_with("Digest "));
    }
}
