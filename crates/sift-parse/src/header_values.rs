// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed parsers for the recognised header kinds.
//!
//! Every function here matches the registry's [`HeaderParser`] shape:
//! `(lowercased name, trimmed value) -> Vec<Header>`. A single field value
//! may yield several headers (`Contact: a, b`), while Via always yields one
//! header holding the whole hop list.
//!
//! [`HeaderParser`]: crate::registry::HeaderParser

use sift_core::{
    CallId, CSeq, Credentials, Header, Method, Params, Uri, Via, ViaHop, MAX_CSEQ,
};
use smol_str::SmolStr;

use crate::{
    address::parse_address_values,
    error::ParseError,
    params::parse_params,
    uri::parse_host_port,
};

const ABNF_WS: [char; 2] = [' ', '\t'];

/// Parses To, From, and Contact headers from their shared address grammar.
///
/// To and From take a single address and never the wildcard URI; Contact
/// takes a comma-separated list, and a wildcard contact must carry neither
/// display name nor parameters.
pub fn parse_address_header(name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    let addresses = parse_address_values(value)?;
    let mut headers = Vec::with_capacity(addresses.len());

    for (idx, addr) in addresses.into_iter().enumerate() {
        let header = match name {
            "to" | "t" | "from" | "f" => {
                if idx > 0 {
                    return Err(ParseError::InvalidHeader(format!(
                        "multiple addresses in single-address header: '{}: {}'",
                        name, value
                    )));
                }
                if addr.uri.is_wildcard() {
                    return Err(ParseError::InvalidHeader(format!(
                        "wildcard URI not permitted in '{}' header: '{}'",
                        name, value
                    )));
                }
                if name.starts_with('t') {
                    Header::To(addr)
                } else {
                    Header::From(addr)
                }
            }
            "contact" | "m" => {
                if addr.uri.is_wildcard() {
                    if !addr.params.is_empty() {
                        return Err(ParseError::InvalidHeader(format!(
                            "wildcard contact must carry no parameters: '{}'",
                            value
                        )));
                    }
                    if addr.display_name.is_some() {
                        return Err(ParseError::InvalidHeader(format!(
                            "wildcard contact must carry no display name: '{}'",
                            value
                        )));
                    }
                }
                Header::Contact(addr)
            }
            other => {
                return Err(ParseError::InvalidHeader(format!(
                    "'{}' is not an address header",
                    other
                )));
            }
        };
        headers.push(header);
    }

    Ok(headers)
}

/// Parses a CSeq value: sequence number and method, whitespace-separated.
pub fn parse_cseq(_name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    let parts = split_by_whitespace(value);
    if parts.len() != 2 {
        return Err(ParseError::InvalidHeader(format!(
            "CSeq field should have precisely one whitespace section: '{}'",
            value
        )));
    }

    let seq: u64 = parts[0].parse().map_err(|_| {
        ParseError::InvalidHeader(format!("invalid CSeq sequence number: '{}'", parts[0]))
    })?;
    if seq > MAX_CSEQ as u64 {
        return Err(ParseError::InvalidHeader(format!(
            "CSeq {} exceeds maximum permitted value 2**31 - 1",
            seq
        )));
    }

    let method_token = parts[1].trim();
    if method_token.contains(';') {
        return Err(ParseError::InvalidHeader(format!(
            "unexpected ';' in CSeq body: '{}'",
            value
        )));
    }

    Ok(vec![Header::CSeq(CSeq {
        seq: seq as u32,
        method: Method::from_token(method_token),
    })])
}

/// Parses a Call-ID value: non-empty, no whitespace, no semicolons.
pub fn parse_call_id(_name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ParseError::InvalidHeader("empty Call-ID body".to_owned()));
    }
    if value.contains(ABNF_WS) {
        return Err(ParseError::InvalidHeader(format!(
            "unexpected whitespace in Call-ID body '{}'",
            value
        )));
    }
    if value.contains(';') {
        return Err(ParseError::InvalidHeader(format!(
            "unexpected semicolon in Call-ID body '{}'",
            value
        )));
    }
    Ok(vec![Header::CallId(CallId(SmolStr::new(value)))])
}

/// Parses a Via value into a single header holding one or more hops.
///
/// Commas in a Via body separate hops of the same logical header, never
/// separate headers (RFC 3261 §7.3.1).
pub fn parse_via(_name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    let mut hops = Vec::new();

    for section in value.split(',') {
        let parts: Vec<&str> = section.split('/').collect();
        if parts.len() < 3 {
            return Err(ParseError::InvalidHeader(format!(
                "not enough protocol parts in Via header: '{}'",
                section
            )));
        }
        let protocol_name = parts[0].trim();
        let protocol_version = parts[1].trim();

        // Transports such as TLS-SCTP contain no '/', but the sent-by part
        // may; rejoin everything past the version before splitting on
        // whitespace.
        let remainder = parts[2..].join("/");
        let trimmed = remainder.trim_start_matches(ABNF_WS);
        let ws = trimmed.find(ABNF_WS).ok_or_else(|| {
            ParseError::InvalidHeader(format!(
                "expected whitespace after sent-protocol part in Via header '{}'",
                section
            ))
        })?;
        let transport = trimmed[..ws].trim();
        let via_body = trimmed[ws..].trim();

        if protocol_name.is_empty() {
            return Err(ParseError::InvalidHeader(format!(
                "no protocol name in Via header '{}'",
                section
            )));
        }
        if protocol_version.is_empty() {
            return Err(ParseError::InvalidHeader(format!(
                "no protocol version in Via header '{}'",
                section
            )));
        }
        if transport.is_empty() {
            return Err(ParseError::InvalidHeader(format!(
                "no transport in Via header '{}'",
                section
            )));
        }

        let (host_port, params) = match via_body.find(';') {
            None => (via_body, Params::new()),
            Some(idx) => {
                let (params, _) = parse_params(&via_body[idx..], b';', b';', 0, true, true)?;
                (&via_body[..idx], params)
            }
        };
        let (host, port) = parse_host_port(host_port.trim())?;

        hops.push(ViaHop {
            protocol_name: SmolStr::new(protocol_name),
            protocol_version: SmolStr::new(protocol_version),
            transport: SmolStr::new(transport),
            host,
            port,
            params,
        });
    }

    Ok(vec![Header::Via(Via(hops))])
}

pub fn parse_max_forwards(_name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    Ok(vec![Header::MaxForwards(parse_u32("Max-Forwards", value)?)])
}

pub fn parse_expires(_name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    Ok(vec![Header::Expires(parse_u32("Expires", value)?)])
}

pub fn parse_content_length(_name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    Ok(vec![Header::ContentLength(parse_u32(
        "Content-Length",
        value,
    )?)])
}

pub fn parse_content_type(_name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    Ok(vec![Header::ContentType(SmolStr::new(value.trim()))])
}

pub fn parse_accept(_name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    Ok(vec![Header::Accept(SmolStr::new(value.trim()))])
}

pub fn parse_user_agent(_name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    Ok(vec![Header::UserAgent(SmolStr::new(value.trim()))])
}

/// Parses an Allow value: comma-separated method tokens.
pub fn parse_allow(_name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    let methods = value
        .split(',')
        .map(|token| Method::from_token(token.trim()))
        .collect();
    Ok(vec![Header::Allow(methods)])
}

pub fn parse_require(_name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    Ok(vec![Header::Require(parse_token_list(value))])
}

pub fn parse_supported(_name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    Ok(vec![Header::Supported(parse_token_list(value))])
}

/// Parses Route and Record-Route values, keeping the URIs and discarding
/// display names and parameters.
pub fn parse_route(name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    let uris: Vec<Uri> = parse_address_values(value)?
        .into_iter()
        .map(|addr| addr.uri)
        .collect();
    let header = if name == "record-route" {
        Header::RecordRoute(uris)
    } else {
        Header::Route(uris)
    };
    Ok(vec![header])
}

/// Parses Authorization and Proxy-Authorization credentials: a scheme token
/// followed by comma-separated, optionally quoted parameters.
pub fn parse_authorization(name: &str, value: &str) -> Result<Vec<Header>, ParseError> {
    let value = value.trim();
    let (scheme, remainder) = match value.find(ABNF_WS) {
        Some(idx) => (&value[..idx], value[idx..].trim_start()),
        None => (value, ""),
    };
    if scheme.is_empty() {
        return Err(ParseError::InvalidHeader(
            "missing authorization scheme".to_owned(),
        ));
    }
    let (params, _) = parse_params(remainder, 0, b',', 0, true, true)?;
    let credentials = Credentials {
        scheme: SmolStr::new(scheme),
        params,
    };
    let header = if name == "proxy-authorization" {
        Header::ProxyAuthorization(credentials)
    } else {
        Header::Authorization(credentials)
    };
    Ok(vec![header])
}

fn parse_u32(name: &str, value: &str) -> Result<u32, ParseError> {
    value.trim().parse().map_err(|_| {
        ParseError::InvalidHeader(format!("invalid {} value: '{}'", name, value.trim()))
    })
}

fn parse_token_list(value: &str) -> Vec<SmolStr> {
    value
        .split(',')
        .map(|token| SmolStr::new(token.trim()))
        .collect()
}

/// Splits `text` into sections separated by runs of spaces and tabs.
fn split_by_whitespace(text: &str) -> Vec<&str> {
    text.split(ABNF_WS).filter(|s| !s.is_empty()).collect()
}
