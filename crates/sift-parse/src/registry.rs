// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pluggable header-parser registry.
//!
//! Header field names map case-insensitively to parsers; the compact forms
//! (`t`, `f`, `m`, `v`, `l`, `c`) are first-class keys sharing the full
//! forms' parsers. Unregistered names fall back to [`Header::Generic`].
//! Registration is allowed after construction, so the map is a
//! [`DashMap`] safe for concurrent lookup from the framing loop.

use std::sync::Arc;

use dashmap::DashMap;
use sift_core::{GenericHeader, Header};
use smol_str::SmolStr;

use crate::{error::ParseError, header_values};

/// A header parser: turns a `(lowercased name, trimmed value)` pair into
/// one or more typed headers.
pub type HeaderParser =
    Arc<dyn Fn(&str, &str) -> Result<Vec<Header>, ParseError> + Send + Sync>;

/// Case-insensitive mapping from header field name to parser.
pub struct HeaderRegistry {
    parsers: DashMap<SmolStr, HeaderParser>,
}

impl HeaderRegistry {
    /// Creates a registry with no parsers; every header parses as generic.
    pub fn empty() -> Self {
        Self {
            parsers: DashMap::new(),
        }
    }

    /// Registers a parser for a header name, replacing any existing entry.
    /// The name is lowercased, so registration and lookup are both
    /// case-insensitive.
    pub fn set(&self, name: &str, parser: HeaderParser) {
        self.parsers
            .insert(SmolStr::new(name.to_ascii_lowercase()), parser);
    }

    /// Parses one logical header line (`Name: value`) into typed headers.
    ///
    /// A recognised name dispatches to its registered parser; anything else
    /// becomes a [`Header::Generic`] preserving the wire-case name and the
    /// trimmed value.
    pub fn parse_header(&self, header_text: &str) -> Result<Vec<Header>, ParseError> {
        let colon = header_text.find(':').ok_or_else(|| {
            ParseError::InvalidHeader(format!(
                "field name with no value in header: '{}'",
                header_text
            ))
        })?;
        let field_name = header_text[..colon].trim();
        let field_value = header_text[colon + 1..].trim();
        let key = field_name.to_ascii_lowercase();

        // Clone the parser out so a long-running parser never holds a map
        // shard lock.
        let parser = self.parsers.get(key.as_str()).map(|p| p.value().clone());
        match parser {
            Some(parser) => parser(&key, field_value),
            None => Ok(vec![Header::Generic(GenericHeader {
                name: SmolStr::new(field_name),
                value: SmolStr::new(field_value),
            })]),
        }
    }
}

/// The default parser set: address headers (with compact forms), Call-ID,
/// CSeq, Via, the numeric and opaque headers, token lists, routing
/// headers, and credentials.
impl Default for HeaderRegistry {
    fn default() -> Self {
        let registry = Self::empty();
        let address: HeaderParser = Arc::new(header_values::parse_address_header);
        for name in ["to", "t", "from", "f", "contact", "m"] {
            registry.set(name, address.clone());
        }
        registry.set("call-id", Arc::new(header_values::parse_call_id));
        registry.set("cseq", Arc::new(header_values::parse_cseq));
        let via: HeaderParser = Arc::new(header_values::parse_via);
        registry.set("via", via.clone());
        registry.set("v", via);
        registry.set("max-forwards", Arc::new(header_values::parse_max_forwards));
        let content_length: HeaderParser = Arc::new(header_values::parse_content_length);
        registry.set("content-length", content_length.clone());
        registry.set("l", content_length);
        registry.set("expires", Arc::new(header_values::parse_expires));
        registry.set("user-agent", Arc::new(header_values::parse_user_agent));
        registry.set("allow", Arc::new(header_values::parse_allow));
        let content_type: HeaderParser = Arc::new(header_values::parse_content_type);
        registry.set("content-type", content_type.clone());
        registry.set("c", content_type);
        registry.set("accept", Arc::new(header_values::parse_accept));
        registry.set("require", Arc::new(header_values::parse_require));
        registry.set("supported", Arc::new(header_values::parse_supported));
        let route: HeaderParser = Arc::new(header_values::parse_route);
        registry.set("route", route.clone());
        registry.set("record-route", route);
        let authorization: HeaderParser = Arc::new(header_values::parse_authorization);
        registry.set("authorization", authorization.clone());
        registry.set("proxy-authorization", authorization);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::{CallId, Method};

    #[test]
    fn parses_registered_header() {
        let registry = HeaderRegistry::default();
        let headers = registry.parse_header("CSeq: 1 INVITE").unwrap();
        assert_eq!(headers.len(), 1);
        assert!(matches!(headers[0], Header::CSeq(_)));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = HeaderRegistry::default();
        let headers = registry.parse_header("cAlL-iD: abc123").unwrap();
        assert_eq!(
            headers,
            vec![Header::CallId(CallId(SmolStr::new("abc123")))]
        );
    }

    #[test]
    fn compact_forms_share_parsers() {
        let registry = HeaderRegistry::default();
        assert!(matches!(
            registry.parse_header("l: 0").unwrap()[0],
            Header::ContentLength(0)
        ));
        assert!(matches!(
            registry.parse_header("v: SIP/2.0/UDP host").unwrap()[0],
            Header::Via(_)
        ));
        assert!(matches!(
            registry.parse_header("m: <sip:a@example.com>").unwrap()[0],
            Header::Contact(_)
        ));
        assert!(matches!(
            registry.parse_header("f: <sip:a@example.com>").unwrap()[0],
            Header::From(_)
        ));
        assert!(matches!(
            registry.parse_header("t: <sip:a@example.com>").unwrap()[0],
            Header::To(_)
        ));
        assert!(matches!(
            registry.parse_header("c: application/sdp").unwrap()[0],
            Header::ContentType(_)
        ));
    }

    #[test]
    fn unknown_header_falls_back_to_generic_with_wire_case() {
        let registry = HeaderRegistry::default();
        let headers = registry.parse_header("X-Custom: value").unwrap();
        assert_eq!(
            headers,
            vec![Header::Generic(GenericHeader {
                name: SmolStr::new("X-Custom"),
                value: SmolStr::new("value"),
            })]
        );
    }

    #[test]
    fn missing_colon_is_an_error() {
        let registry = HeaderRegistry::default();
        assert!(registry.parse_header("NoColonHere").is_err());
    }

    #[test]
    fn registration_replaces_existing_parser() {
        let registry = HeaderRegistry::default();
        registry.set(
            "Allow",
            Arc::new(|_, _| Ok(vec![Header::Allow(vec![Method::Invite])])),
        );
        let headers = registry.parse_header("allow: BYE, CANCEL").unwrap();
        assert_eq!(headers, vec![Header::Allow(vec![Method::Invite])]);
    }

    #[test]
    fn comma_separated_contacts_yield_multiple_headers() {
        let registry = HeaderRegistry::default();
        let headers = registry
            .parse_header("Contact: <sip:a@example.com>, <sip:b@example.com>")
            .unwrap();
        assert_eq!(headers.len(), 2);
    }
}
