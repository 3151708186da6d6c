// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SIP/SIPS URI parsing (RFC 3261 §19.1) plus the `*` wildcard.

use sift_core::{Params, SipUri, Uri};
use smol_str::SmolStr;

use crate::{error::ParseError, params::parse_params};

/// Parses a URI as it may appear in a start line or address header.
///
/// A trimmed `*` is the wildcard URI (permitted only in Contact headers);
/// anything else must be a `sip:` or `sips:` URI.
pub fn parse_uri(input: &str) -> Result<Uri, ParseError> {
    if input.trim() == "*" {
        return Ok(Uri::Wildcard);
    }
    let colon = input
        .find(':')
        .ok_or_else(|| ParseError::InvalidUri(format!("no ':' in URI '{}'", input)))?;
    let scheme = &input[..colon];
    if scheme.eq_ignore_ascii_case("sip") || scheme.eq_ignore_ascii_case("sips") {
        parse_sip_uri(input).map(Uri::Sip)
    } else {
        Err(ParseError::UnsupportedUriScheme(scheme.to_owned()))
    }
}

/// Parses a `sip:` / `sips:` URI into its components.
pub fn parse_sip_uri(input: &str) -> Result<SipUri, ParseError> {
    let colon = input
        .find(':')
        .ok_or_else(|| ParseError::InvalidUri(format!("no ':' in URI '{}'", input)))?;
    let scheme = &input[..colon];
    let secure = scheme.eq_ignore_ascii_case("sips");
    if !secure && !scheme.eq_ignore_ascii_case("sip") {
        return Err(ParseError::UnsupportedUriScheme(scheme.to_owned()));
    }
    let mut rest = &input[colon + 1..];

    // The only place '@' may occur is at the end of the user-info part.
    let mut user = None;
    let mut password = None;
    if let Some(at) = rest.find('@') {
        let user_info = &rest[..at];
        match user_info.find(':') {
            Some(idx) => {
                user = Some(SmolStr::new(&user_info[..idx]));
                password = Some(SmolStr::new(&user_info[idx + 1..]));
            }
            None => user = Some(SmolStr::new(user_info)),
        }
        rest = &rest[at + 1..];
    }

    // The host section runs to the first ';' (URI params) or '?' (URI
    // headers), whichever comes first.
    let host_end = rest
        .find(|c| c == ';' || c == '?')
        .unwrap_or(rest.len());
    let (host, port) = parse_host_port(&rest[..host_end])?;
    rest = &rest[host_end..];

    let mut uri = SipUri {
        secure,
        user,
        password,
        host,
        port,
        params: Params::new(),
        headers: Params::new(),
    };

    if rest.is_empty() {
        return Ok(uri);
    }

    if rest.as_bytes()[0] == b';' {
        let (params, consumed) = parse_params(rest, b';', b';', b'?', true, true)?;
        uri.params = params;
        rest = &rest[consumed..];
    }

    let (headers, consumed) = parse_params(rest, b'?', b'&', 0, true, false)?;
    uri.headers = headers;
    rest = &rest[consumed..];

    if !rest.is_empty() {
        return Err(ParseError::InvalidUri(format!(
            "parse of SIP URI ended early: '{}'",
            input
        )));
    }

    Ok(uri)
}

/// Parses a `host[:port]` pair. The port, when present, must be a base-10
/// unsigned 16-bit integer.
pub fn parse_host_port(input: &str) -> Result<(SmolStr, Option<u16>), ParseError> {
    match input.find(':') {
        None => {
            if input.is_empty() {
                return Err(ParseError::InvalidUri("empty host".to_owned()));
            }
            Ok((SmolStr::new(input), None))
        }
        Some(idx) => {
            let host = &input[..idx];
            if host.is_empty() {
                return Err(ParseError::InvalidUri("empty host".to_owned()));
            }
            let port = input[idx + 1..].parse::<u16>().map_err(|_| {
                ParseError::InvalidUri(format!("invalid port in '{}'", input))
            })?;
            Ok((SmolStr::new(host), Some(port)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wildcard() {
        assert_eq!(parse_uri("*").unwrap(), Uri::Wildcard);
        assert_eq!(parse_uri(" * ").unwrap(), Uri::Wildcard);
    }

    #[test]
    fn parses_bare_host() {
        let uri = parse_sip_uri("sip:example.com").unwrap();
        assert!(!uri.secure);
        assert_eq!(uri.host.as_str(), "example.com");
        assert_eq!(uri.port, None);
        assert!(uri.user.is_none());
        assert!(uri.params.is_empty());
        assert!(uri.headers.is_empty());
    }

    #[test]
    fn parses_sips_scheme() {
        let uri = parse_sip_uri("sips:example.com").unwrap();
        assert!(uri.secure);
        let uri = parse_sip_uri("SIPS:example.com").unwrap();
        assert!(uri.secure);
    }

    #[test]
    fn parses_user_password_host_port() {
        let uri = parse_sip_uri("sip:alice:secret@example.com:5061").unwrap();
        assert_eq!(uri.user, Some(SmolStr::new("alice")));
        assert_eq!(uri.password, Some(SmolStr::new("secret")));
        assert_eq!(uri.host.as_str(), "example.com");
        assert_eq!(uri.port, Some(5061));
    }

    #[test]
    fn user_without_password() {
        let uri = parse_sip_uri("sip:alice@example.com").unwrap();
        assert_eq!(uri.user, Some(SmolStr::new("alice")));
        assert_eq!(uri.password, None);
    }

    #[test]
    fn parses_uri_params_and_headers() {
        let uri =
            parse_sip_uri("sip:alice@example.com;transport=tcp;lr?subject=call&priority=urgent")
                .unwrap();
        assert_eq!(
            uri.params.get("transport"),
            Some(&Some(SmolStr::new("tcp")))
        );
        assert_eq!(uri.params.get("lr"), Some(&None));
        assert_eq!(uri.headers.get("subject"), Some(&Some(SmolStr::new("call"))));
        assert_eq!(
            uri.headers.get("priority"),
            Some(&Some(SmolStr::new("urgent")))
        );
    }

    #[test]
    fn parses_headers_without_params() {
        let uri = parse_sip_uri("sip:example.com?h=v").unwrap();
        assert!(uri.params.is_empty());
        assert_eq!(uri.headers.get("h"), Some(&Some(SmolStr::new("v"))));
    }

    #[test]
    fn headers_disallow_singletons() {
        assert!(parse_sip_uri("sip:example.com?lonely").is_err());
    }

    #[test]
    fn rejects_unsupported_scheme() {
        assert!(matches!(
            parse_uri("http://example.com"),
            Err(ParseError::UnsupportedUriScheme(_))
        ));
        assert!(matches!(
            parse_uri("tel:+15551234567"),
            Err(ParseError::UnsupportedUriScheme(_))
        ));
    }

    #[test]
    fn rejects_missing_colon() {
        assert!(parse_uri("example.com").is_err());
    }

    #[test]
    fn rejects_bad_port() {
        assert!(parse_sip_uri("sip:example.com:70000").is_err());
        assert!(parse_sip_uri("sip:example.com:abc").is_err());
    }

    #[test]
    fn rejects_empty_host() {
        assert!(parse_sip_uri("sip:").is_err());
        assert!(parse_sip_uri("sip:alice@").is_err());
    }
}
