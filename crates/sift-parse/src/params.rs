// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generic `key=value` parameter-list parsing.
//!
//! The same byte-by-byte scanner serves URI parameters (`;a=b;c`), URI
//! headers (`?a=b&c=d`), Via/address header parameters, and authorization
//! credentials, differing only in delimiters and policy flags.

use sift_core::Params;
use smol_str::SmolStr;

use crate::error::ParseError;

/// Parses successive `key=value` pairs from `source`.
///
/// When `start` is non-zero the first byte must equal it. Pairs are
/// separated by `sep`; scanning terminates at `end` (when non-zero) or at
/// end of input, and the number of consumed bytes is returned so callers
/// can continue past the parameter block.
///
/// When `quote_values` is set, values may be enclosed in double quotes; the
/// quotes are validated and stripped, and `sep`/`end` bytes inside them are
/// literal. A closing quote must be immediately followed by `sep`, `end`,
/// or end of input. Quotes never appear in keys.
///
/// When `permit_singletons` is set, a key without `=value` is stored with a
/// `None` value; otherwise it is an error.
///
/// Unquoted spaces and tabs are skipped.
pub fn parse_params(
    source: &str,
    start: u8,
    sep: u8,
    end: u8,
    quote_values: bool,
    permit_singletons: bool,
) -> Result<(Params, usize), ParseError> {
    let mut params = Params::new();
    let bytes = source.as_bytes();

    if bytes.is_empty() {
        return Ok((params, 0));
    }

    let mut consumed = 0usize;
    if start != 0 {
        if bytes[0] != start {
            return Err(ParseError::InvalidParams(format!(
                "expected '{}' at start of key-value section; got '{}' in \"{}\"",
                start as char, bytes[0] as char, source
            )));
        }
        consumed += 1;
    }

    let mut buffer: Vec<u8> = Vec::new();
    let mut key = SmolStr::default();
    let mut parsing_key = true;
    let mut in_quotes = false;

    while consumed < bytes.len() {
        let b = bytes[consumed];

        if end != 0 && b == end {
            if in_quotes {
                // Literal inside quotes.
                buffer.push(b);
                consumed += 1;
                continue;
            }
            break;
        }

        if b == sep {
            if in_quotes {
                buffer.push(b);
            } else {
                flush_pair(
                    &mut params,
                    &mut buffer,
                    &key,
                    parsing_key,
                    permit_singletons,
                    source,
                )?;
                parsing_key = true;
            }
        } else if b == b'"' {
            if !quote_values {
                buffer.push(b);
            } else if parsing_key {
                return Err(ParseError::InvalidParams(format!(
                    "unexpected '\"' in parameter key in \"{}\"",
                    source
                )));
            } else if !in_quotes && !buffer.is_empty() {
                return Err(ParseError::InvalidParams(format!(
                    "unexpected '\"' midway through a value in \"{}\"",
                    source
                )));
            } else if in_quotes {
                // The closing quote must end the value.
                match bytes.get(consumed + 1) {
                    None => {}
                    Some(&next) if next == sep || (end != 0 && next == end) => {}
                    Some(&next) => {
                        return Err(ParseError::InvalidParams(format!(
                            "unexpected character '{}' after quoted value in \"{}\"",
                            next as char, source
                        )));
                    }
                }
                in_quotes = false;
            } else {
                in_quotes = true;
            }
        } else if b == b'=' {
            if in_quotes {
                buffer.push(b);
            } else if buffer.is_empty() {
                return Err(ParseError::InvalidParams(format!(
                    "key of length 0 in \"{}\"",
                    source
                )));
            } else if !parsing_key {
                return Err(ParseError::InvalidParams(format!(
                    "unexpected '=' in value token in \"{}\"",
                    source
                )));
            } else {
                key = take_buffer(&mut buffer);
                parsing_key = false;
            }
        } else if !in_quotes && (b == b' ' || b == b'\t') {
            // Unquoted whitespace is skipped.
        } else {
            buffer.push(b);
        }

        consumed += 1;
    }

    if in_quotes {
        return Err(ParseError::InvalidParams(format!(
            "unclosed quotes in parameter string \"{}\"",
            source
        )));
    }
    flush_pair(
        &mut params,
        &mut buffer,
        &key,
        parsing_key,
        permit_singletons,
        source,
    )?;

    Ok((params, consumed))
}

fn flush_pair(
    params: &mut Params,
    buffer: &mut Vec<u8>,
    key: &SmolStr,
    parsing_key: bool,
    permit_singletons: bool,
    source: &str,
) -> Result<(), ParseError> {
    if parsing_key {
        let name = take_buffer(buffer);
        if !permit_singletons {
            return Err(ParseError::InvalidParams(format!(
                "singleton param '{}' where singletons are disallowed: \"{}\"",
                name, source
            )));
        }
        params.add(name, None);
    } else {
        params.add(key.clone(), Some(take_buffer(buffer)));
    }
    Ok(())
}

fn take_buffer(buffer: &mut Vec<u8>) -> SmolStr {
    let text = SmolStr::new(String::from_utf8_lossy(buffer));
    buffer.clear();
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri_params(source: &str) -> Result<(Params, usize), ParseError> {
        parse_params(source, b';', b';', b'?', true, true)
    }

    #[test]
    fn parses_simple_pairs() {
        let (params, consumed) = uri_params(";transport=udp;user=phone").unwrap();
        assert_eq!(consumed, 25);
        assert_eq!(params.get("transport"), Some(&Some(SmolStr::new("udp"))));
        assert_eq!(params.get("user"), Some(&Some(SmolStr::new("phone"))));
    }

    #[test]
    fn parses_singletons() {
        let (params, _) = uri_params(";lr;tag=abc").unwrap();
        assert_eq!(params.get("lr"), Some(&None));
        assert_eq!(params.get("tag"), Some(&Some(SmolStr::new("abc"))));
    }

    #[test]
    fn rejects_singletons_when_disallowed() {
        let err = parse_params("?a=1&b", b'?', b'&', 0, true, false).unwrap_err();
        assert!(matches!(err, ParseError::InvalidParams(_)));
    }

    #[test]
    fn stops_at_end_delimiter_and_reports_consumed() {
        let (params, consumed) = uri_params(";a=1?rest=ignored").unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("a"), Some(&Some(SmolStr::new("1"))));
    }

    #[test]
    fn end_delimiter_is_literal_inside_quotes() {
        let (params, _) = uri_params(";note=\"a?b;c\"").unwrap();
        assert_eq!(params.get("note"), Some(&Some(SmolStr::new("a?b;c"))));
    }

    #[test]
    fn quoted_values_are_stripped() {
        let (params, _) = uri_params(";tag=\"hello world\"").unwrap();
        assert_eq!(params.get("tag"), Some(&Some(SmolStr::new("hello world"))));
    }

    #[test]
    fn rejects_quote_in_key() {
        assert!(uri_params(";\"tag\"=x").is_err());
    }

    #[test]
    fn rejects_opening_quote_mid_value() {
        assert!(uri_params(";tag=ab\"cd\"").is_err());
    }

    #[test]
    fn rejects_text_after_closing_quote() {
        assert!(uri_params(";tag=\"ab\"cd").is_err());
    }

    #[test]
    fn closing_quote_may_precede_sep_end_or_eof() {
        assert!(uri_params(";a=\"x\";b=y").is_ok());
        assert!(uri_params(";a=\"x\"?h=v").is_ok());
        assert!(uri_params(";a=\"x\"").is_ok());
    }

    #[test]
    fn rejects_unclosed_quotes() {
        let err = uri_params(";tag=\"abc").unwrap_err();
        assert!(matches!(err, ParseError::InvalidParams(_)));
    }

    #[test]
    fn rejects_empty_key_before_equals() {
        assert!(uri_params(";=value").is_err());
    }

    #[test]
    fn rejects_second_equals_in_value() {
        assert!(uri_params(";a=b=c").is_err());
    }

    #[test]
    fn skips_unquoted_whitespace() {
        let (params, _) = parse_params("a=1, b=2", 0, b',', 0, true, true).unwrap();
        assert_eq!(params.get("a"), Some(&Some(SmolStr::new("1"))));
        assert_eq!(params.get("b"), Some(&Some(SmolStr::new("2"))));
    }

    #[test]
    fn rejects_wrong_start_byte() {
        assert!(uri_params("transport=udp").is_err());
    }

    #[test]
    fn empty_source_is_empty_params() {
        let (params, consumed) = uri_params("").unwrap();
        assert!(params.is_empty());
        assert_eq!(consumed, 0);
    }

    #[test]
    fn repeated_keys_preserve_order() {
        let (params, _) = uri_params(";k=1;k=2").unwrap();
        let values: Vec<_> = params.iter().map(|(_, v)| v.clone()).collect();
        assert_eq!(
            values,
            vec![Some(SmolStr::new("1")), Some(SmolStr::new("2"))]
        );
    }
}
