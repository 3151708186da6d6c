// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Address-value parsing for To/From/Contact/Route-style headers
//! (RFC 3261 §20.10): optional display name, angle-bracketed URI, and
//! trailing header parameters, possibly as a comma-separated list.

use sift_core::{NameAddr, Params};
use smol_str::SmolStr;

use crate::{error::ParseError, params::parse_params, uri::parse_uri};

/// Splits `text` on commas lying outside angle brackets and double quotes,
/// parsing each section as one address value.
pub fn parse_address_values(text: &str) -> Result<Vec<NameAddr>, ParseError> {
    let mut values = Vec::new();
    let mut prev = 0usize;
    let mut in_brackets = false;
    let mut in_quotes = false;

    // A trailing comma marks the end of the final section, so every section
    // is handled by the same arm.
    let padded = format!("{},", text);
    for (idx, ch) in padded.char_indices() {
        match ch {
            '<' if !in_quotes => in_brackets = true,
            '>' if !in_quotes => in_brackets = false,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes && !in_brackets => {
                values.push(parse_address_value(&padded[prev..idx])?);
                prev = idx + 1;
            }
            _ => {}
        }
    }

    Ok(values)
}

/// Parses a single address value: `["Display"] <uri>[;params]` or a bare
/// `uri[;params]`.
pub fn parse_address_value(text: &str) -> Result<NameAddr, ParseError> {
    if text.is_empty() {
        return Err(ParseError::InvalidAddress(
            "address-type header has empty body".to_owned(),
        ));
    }

    let mut rest = text.trim();
    let mut display_name = None;

    // A '<' past position zero means everything before it is a display name.
    if let Some(angle) = find_unquoted(rest, '<').filter(|&idx| idx > 0) {
        if rest.starts_with('"') {
            let quoted = &rest[1..];
            let close = quoted.find('"').ok_or_else(|| {
                ParseError::InvalidAddress(format!("unclosed quotes in '{}'", text))
            })?;
            display_name = Some(SmolStr::new(&quoted[..close]));
            rest = &quoted[close + 1..];
        } else {
            display_name = Some(SmolStr::new(rest[..angle].trim()));
            rest = &rest[angle..];
        }
    }

    let rest = rest.trim();
    let (uri_text, params_text) = if let Some(inner) = rest.strip_prefix('<') {
        let close = inner.find('>').ok_or_else(|| {
            ParseError::InvalidAddress(format!("'<' without closing '>' in '{}'", text))
        })?;
        (&inner[..close], &inner[close + 1..])
    } else {
        if display_name.is_some() {
            return Err(ParseError::InvalidAddress(format!(
                "display name requires a '<'-bracketed URI in '{}'",
                text
            )));
        }
        let end = rest.find(';').unwrap_or(rest.len());
        (&rest[..end], &rest[end..])
    };

    let uri = parse_uri(uri_text)?;
    let params = if params_text.is_empty() {
        Params::new()
    } else {
        parse_params(params_text, b';', b';', b',', true, true)?.0
    };

    Ok(NameAddr {
        display_name,
        uri,
        params,
    })
}

/// Finds the first occurrence of `target` in `text` that is not inside a
/// double-quoted section.
fn find_unquoted(text: &str, target: char) -> Option<usize> {
    let mut in_quotes = false;
    for (idx, ch) in text.char_indices() {
        if !in_quotes && ch == target {
            return Some(idx);
        }
        if ch == '"' {
            in_quotes = !in_quotes;
        }
    }
    None
}
