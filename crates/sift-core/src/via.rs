// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Via header value (RFC 3261 §20.42).
//!
//! A Via header carries a nonempty ordered list of hops. RFC 3261 treats
//! commas in a Via body as value separators within a single logical header,
//! never as separate headers, so the whole list lives in one [`Via`].

use std::fmt;

use smol_str::SmolStr;

use crate::params::Params;

/// One forwarding hop of a Via header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViaHop {
    /// Protocol name, `SIP` in practice.
    pub protocol_name: SmolStr,
    /// Protocol version, `2.0` in practice.
    pub protocol_version: SmolStr,
    pub transport: SmolStr,
    pub host: SmolStr,
    pub port: Option<u16>,
    pub params: Params,
}

impl fmt::Display for ViaHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} {}",
            self.protocol_name, self.protocol_version, self.transport, self.host
        )?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        self.params.fmt_delimited(f, ';', true)
    }
}

/// A Via header: a nonempty ordered list of hops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Via(pub Vec<ViaHop>);

impl Via {
    /// Returns the first (topmost) hop.
    pub fn first_hop(&self) -> &ViaHop {
        &self.0[0]
    }

    pub fn hops(&self) -> &[ViaHop] {
        &self.0
    }
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, hop) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            hop.fmt(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hop(host: &str, port: Option<u16>) -> ViaHop {
        ViaHop {
            protocol_name: SmolStr::new("SIP"),
            protocol_version: SmolStr::new("2.0"),
            transport: SmolStr::new("UDP"),
            host: SmolStr::new(host),
            port,
            params: Params::new(),
        }
    }

    #[test]
    fn displays_single_hop() {
        let mut h = hop("host1", Some(5060));
        h.params.add("branch", Some(SmolStr::new("z9hG4bK1")));
        assert_eq!(
            Via(vec![h]).to_string(),
            "SIP/2.0/UDP host1:5060;branch=z9hG4bK1"
        );
    }

    #[test]
    fn displays_hop_list_in_order() {
        let via = Via(vec![hop("host1", Some(5060)), hop("host2", None)]);
        assert_eq!(via.to_string(), "SIP/2.0/UDP host1:5060, SIP/2.0/UDP host2");
        assert_eq!(via.first_hop().host.as_str(), "host1");
    }
}
