// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SIP grammar parsers: start lines, URIs, address values, `key=value`
//! parameter blocks, and the pluggable header-parser registry.
//!
//! The streaming engine feeds this crate one start line or logical header
//! at a time; everything here is synchronous and allocation-light.
//!
//! # Example
//! ```
//! use sift_parse::{parse_request_line, HeaderRegistry};
//!
//! let (method, uri, version) =
//!     parse_request_line("INVITE sip:bob@example.com SIP/2.0").unwrap();
//! assert_eq!(method.as_str(), "INVITE");
//! assert_eq!(version.as_str(), "SIP/2.0");
//! assert_eq!(uri.as_sip().unwrap().host.as_str(), "example.com");
//!
//! let registry = HeaderRegistry::default();
//! let headers = registry.parse_header("Max-Forwards: 70").unwrap();
//! assert_eq!(headers[0].value(), "70");
//! ```

use sift_core::{Method, Uri};
use smol_str::SmolStr;

pub mod address;
pub mod error;
pub mod header_values;
pub mod params;
pub mod registry;
pub mod uri;

pub use address::{parse_address_value, parse_address_values};
pub use error::ParseError;
pub use params::parse_params;
pub use registry::{HeaderParser, HeaderRegistry};
pub use uri::{parse_host_port, parse_sip_uri, parse_uri};

/// Heuristic request-line check: exactly two spaces, with the third token
/// beginning `SIP` (case-insensitive). Every RFC 3261 request line passes;
/// invalid lines are not necessarily rejected.
pub fn is_request_line(line: &str) -> bool {
    if line.matches(' ').count() != 2 {
        return false;
    }
    let parts: Vec<&str> = line.split(' ').collect();
    parts.len() == 3 && token_starts_with_sip(parts[2])
}

/// Heuristic status-line check: at least two spaces, with the first token
/// beginning `SIP` (case-insensitive).
pub fn is_response_line(line: &str) -> bool {
    if line.matches(' ').count() < 2 {
        return false;
    }
    let parts: Vec<&str> = line.split(' ').collect();
    parts.len() >= 3 && token_starts_with_sip(parts[0])
}

fn token_starts_with_sip(token: &str) -> bool {
    token.len() >= 3 && token[..3].eq_ignore_ascii_case("SIP")
}

/// Parses a request line, e.g. `INVITE sip:bob@example.com SIP/2.0`.
///
/// The request-URI must not be the `*` wildcard, which RFC 3261 only
/// permits in Contact headers.
pub fn parse_request_line(line: &str) -> Result<(Method, Uri, SmolStr), ParseError> {
    let parts: Vec<&str> = line.split(' ').collect();
    if parts.len() != 3 {
        return Err(ParseError::InvalidStartLine(format!(
            "request line should have 2 spaces: '{}'",
            line
        )));
    }
    let method = Method::from_token(parts[0]);
    let uri = parse_uri(parts[1])
        .map_err(|err| ParseError::InvalidStartLine(err.to_string()))?;
    if uri.is_wildcard() {
        return Err(ParseError::InvalidStartLine(format!(
            "wildcard URI '*' not permitted in request line: '{}'",
            line
        )));
    }
    Ok((method, uri, SmolStr::new(parts[2])))
}

/// Parses a status line, e.g. `SIP/2.0 200 OK`. Returns the version token,
/// the numeric status code, and the reason phrase (which may itself
/// contain spaces).
pub fn parse_status_line(line: &str) -> Result<(SmolStr, u16, SmolStr), ParseError> {
    let mut parts = line.splitn(3, ' ');
    let (Some(version), Some(code), Some(reason)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::InvalidStartLine(format!(
            "status line has too few spaces: '{}'",
            line
        )));
    };
    let code: u16 = code.parse().map_err(|_| {
        ParseError::InvalidStartLine(format!("invalid status code in '{}'", line))
    })?;
    Ok((SmolStr::new(version), code, SmolStr::new(reason)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sift_core::{Params, SipUri};

    #[test]
    fn classifies_request_lines() {
        assert!(is_request_line("INVITE sip:bob@example.com SIP/2.0"));
        assert!(is_request_line("REGISTER sip:registrar.example.com sip/2.0"));
        assert!(!is_request_line("INVITE sip:bob@example.com"));
        assert!(!is_request_line("INVITE sip:bob@example.com HTTP/1.1"));
        assert!(!is_request_line("HELLO WORLD"));
        assert!(!is_request_line(""));
    }

    #[test]
    fn classifies_status_lines() {
        assert!(is_response_line("SIP/2.0 200 OK"));
        assert!(is_response_line("SIP/2.0 404 Not Found"));
        assert!(!is_response_line("SIP/2.0 200"));
        assert!(!is_response_line("HTTP/1.1 200 OK"));
    }

    #[test]
    fn parses_request_line_components() {
        let (method, uri, version) =
            parse_request_line("REGISTER sip:registrar.example.com SIP/2.0").unwrap();
        assert_eq!(method, Method::Register);
        assert_eq!(
            uri.as_sip().unwrap().host.as_str(),
            "registrar.example.com"
        );
        assert_eq!(version.as_str(), "SIP/2.0");
    }

    #[test]
    fn request_line_rejects_wildcard_uri() {
        assert!(parse_request_line("REGISTER * SIP/2.0").is_err());
    }

    #[test]
    fn parses_status_line_with_spaced_reason() {
        let (version, code, reason) = parse_status_line("SIP/2.0 404 Not Found").unwrap();
        assert_eq!(version.as_str(), "SIP/2.0");
        assert_eq!(code, 404);
        assert_eq!(reason.as_str(), "Not Found");
    }

    #[test]
    fn status_line_rejects_non_numeric_code() {
        assert!(parse_status_line("SIP/2.0 OK 200").is_err());
    }

    fn params_strategy() -> impl Strategy<Value = Vec<(String, Option<String>)>> {
        proptest::collection::vec(
            (
                "[a-z][a-z0-9]{0,7}",
                proptest::option::of("[a-zA-Z0-9.]{1,8}"),
            ),
            0..6,
        )
    }

    fn build_params(pairs: &[(String, Option<String>)]) -> Params {
        let mut params = Params::new();
        for (key, value) in pairs {
            params.add(key, value.as_ref().map(SmolStr::new));
        }
        params
    }

    proptest! {
        // Round trip: parsing the Display form recovers the same multimap.
        #[test]
        fn params_round_trip(pairs in params_strategy()) {
            let params = build_params(&pairs);
            let serialized = params.to_string();
            let (reparsed, consumed) =
                parse_params(&serialized, b';', b';', 0, true, true).unwrap();
            prop_assert_eq!(consumed, serialized.len());
            if pairs.is_empty() {
                prop_assert!(reparsed.is_empty());
            } else {
                prop_assert_eq!(reparsed, params);
            }
        }

        // Round trip: parsing a formatted URI recovers the same value.
        #[test]
        fn uri_round_trip(
            secure in any::<bool>(),
            user in proptest::option::of("[a-z]{1,8}"),
            use_password in any::<bool>(),
            host in "[a-z]{1,10}(\\.[a-z]{2,3})?",
            port in proptest::option::of(1u16..=u16::MAX),
            params in params_strategy(),
            headers in proptest::collection::vec(
                ("[a-z][a-z0-9]{0,7}", "[a-zA-Z0-9.]{1,8}"),
                0..4,
            ),
        ) {
            let mut uri = SipUri::new(host);
            uri.secure = secure;
            uri.password = user
                .as_ref()
                .filter(|_| use_password)
                .map(|_| SmolStr::new("secret"));
            uri.user = user.map(SmolStr::new);
            uri.params = build_params(&params);
            for (key, value) in &headers {
                uri.headers.add(key, Some(SmolStr::new(value)));
            }
            uri.port = port;

            let formatted = uri.to_string();
            let reparsed = parse_sip_uri(&formatted).unwrap();
            prop_assert_eq!(reparsed, uri);
        }

        // Every sequence number above 2**31 - 1 is rejected.
        #[test]
        fn cseq_rejects_values_above_max(
            excess in 1u64..=u32::MAX as u64,
            method in "[A-Z]{3,9}",
        ) {
            let seq = 2_147_483_647u64 + excess;
            let value = format!("{} {}", seq, method);
            prop_assert!(header_values::parse_cseq("cseq", &value).is_err());
        }

        // A ';' anywhere in the method token is rejected.
        #[test]
        fn cseq_rejects_semicolon_methods(
            seq in 0u32..=2_147_483_647,
            prefix in "[A-Z]{1,5}",
            suffix in "[a-z0-9=]{0,5}",
        ) {
            let value = format!("{} {};{}", seq, prefix, suffix);
            prop_assert!(header_values::parse_cseq("cseq", &value).is_err());
        }
    }
}
