use std::fmt;

use smol_str::SmolStr;

use crate::{params::Params, uri::Uri};

/// Generic SIP name-addr value used by the To, From, and Contact headers:
/// an optional display name, a URI, and trailing header parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameAddr {
    pub display_name: Option<SmolStr>,
    pub uri: Uri,
    pub params: Params,
}

impl NameAddr {
    pub fn new(uri: Uri) -> Self {
        Self {
            display_name: None,
            uri,
            params: Params::new(),
        }
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn get_param(&self, name: &str) -> Option<&Option<SmolStr>> {
        self.params.get(name)
    }

    /// Returns the `tag` parameter value when present.
    pub fn tag(&self) -> Option<&SmolStr> {
        self.get_param("tag").and_then(|v| v.as_ref())
    }
}

impl fmt::Display for NameAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.display_name, &self.uri) {
            (_, Uri::Wildcard) => f.write_str("*")?,
            (Some(name), uri) => write!(f, "\"{}\" <{}>", name, uri)?,
            (None, uri) => write!(f, "<{}>", uri)?,
        }
        self.params.fmt_delimited(f, ';', true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uri::SipUri;

    #[test]
    fn displays_with_and_without_name() {
        let uri = Uri::Sip(SipUri::new("example.com"));
        let mut addr = NameAddr::new(uri);
        assert_eq!(addr.to_string(), "<sip:example.com>");

        addr.display_name = Some(SmolStr::new("Alice"));
        addr.params.add("tag", Some(SmolStr::new("1928")));
        assert_eq!(addr.to_string(), "\"Alice\" <sip:example.com>;tag=1928");
        assert_eq!(addr.tag().map(|t| t.as_str()), Some("1928"));
    }

    #[test]
    fn wildcard_renders_bare() {
        let addr = NameAddr::new(Uri::Wildcard);
        assert_eq!(addr.to_string(), "*");
    }
}
