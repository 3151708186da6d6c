// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;

use smol_str::SmolStr;

/// Ordered multimap of `key=value` parameters.
///
/// This is the syntactic home of URI parameters, URI headers, Via-hop
/// parameters, and address-header parameters. Keys are lowercased on
/// insertion; a `None` value marks a singleton parameter (`;lr` as opposed
/// to `;tag=abc`). Insertion order is preserved and keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(SmolStr, Option<SmolStr>)>);

impl Params {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter. The key is lowercased; `None` marks a singleton.
    pub fn add(&mut self, key: impl AsRef<str>, value: Option<SmolStr>) {
        self.0
            .push((SmolStr::new(key.as_ref().to_ascii_lowercase()), value));
    }

    /// Returns the value of the first parameter with the given name.
    ///
    /// The outer `Option` is presence; the inner one distinguishes
    /// singletons (`None`) from valued parameters.
    pub fn get(&self, name: &str) -> Option<&Option<SmolStr>> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Returns `true` if a parameter with the given name is present.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of parameters, counting repeats.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no parameters are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &Option<SmolStr>)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    /// Writes the parameters as `sep`-joined `key=value` pairs, prefixing
    /// each pair with `sep` when `leading` is set (the `;tag=x;lr` shape
    /// used by URIs and address headers).
    pub(crate) fn fmt_delimited(
        &self,
        f: &mut fmt::Formatter<'_>,
        sep: char,
        leading: bool,
    ) -> fmt::Result {
        for (idx, (key, value)) in self.0.iter().enumerate() {
            if leading || idx > 0 {
                write!(f, "{}", sep)?;
            }
            match value {
                Some(v) if needs_quoting(v) => write!(f, "{}=\"{}\"", key, v)?,
                Some(v) => write!(f, "{}={}", key, v)?,
                None => write!(f, "{}", key)?,
            }
        }
        Ok(())
    }
}

// A formatted value must re-parse to the same codepoints, so anything that
// would read as a delimiter is emitted inside quotes.
fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| matches!(c, ' ' | '\t' | ';' | ',' | '?' | '&' | '='))
}

/// Displays the parameters in the `;key=value` form used by URIs and
/// address headers.
impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_delimited(f, ';', true)
    }
}
