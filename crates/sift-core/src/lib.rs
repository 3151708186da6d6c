// sift - The Sift SIP Message Parser
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core SIP types for the sift streaming parser.
//!
//! This crate provides the data model shared by the grammar parsers and the
//! streaming engine:
//! - **Messages**: [`Request`], [`Response`], [`SipMessage`]
//! - **URIs**: [`SipUri`] (sip/sips) and the wildcard `*` via [`Uri`]
//! - **Headers**: the closed [`Header`] sum type and the order-preserving
//!   [`Headers`] collection
//! - **Parameters**: [`Params`], the ordered `key=value` multimap used by
//!   URIs, address headers, and Via hops
//!
//! All types use [`SmolStr`](smol_str::SmolStr) for short text and
//! [`Bytes`](bytes::Bytes) for message bodies, so cloning a parsed message
//! is cheap.

pub mod cseq;
pub mod header;
pub mod headers;
pub mod method;
pub mod msg;
pub mod name_addr;
pub mod params;
pub mod uri;
pub mod via;

pub use cseq::{CallId, CSeq, MAX_CSEQ};
pub use header::{Credentials, GenericHeader, Header};
pub use headers::Headers;
pub use method::Method;
pub use msg::{MessageError, Request, Response, SipMessage, DEFAULT_TRANSPORT};
pub use name_addr::NameAddr;
pub use params::Params;
pub use uri::{SipUri, Uri};
pub use via::{Via, ViaHop};
