//! WS-Trust message codec for Keycloak Rust.
//!
//! This crate reads and writes WS-Trust security token exchange messages:
//!
//! - **RequestSecurityToken (RST)** - Issue, Renew, Cancel and Validate requests
//! - **RequestSecurityTokenResponse (RSTR)** - Single responses and 1.3 response collections
//! - **Protocol versions** - WS-Trust February 2005 and 1.3, with the 1.4 `ActAs` extension
//! - **Proof keys** - Plaintext `BinarySecret` and encrypted-key entropy
//! - **Embedded tokens** - Captured verbatim and resolved through pluggable handlers
//!
//! The codec performs no cryptography and parses no concrete token type;
//! both are injected through [`keys::TokenResolver`] and
//! [`token::SecurityTokenHandler`].
//!
//! # Architecture
//!
//! - [`types`] - Version-neutral message model and value objects
//! - [`version`] - Per-version vocabulary tables
//! - [`serializer`] - Reading and writing messages
//! - [`keys`] - Key identifier clauses, protected keys and the resolver seam
//! - [`token`] - Embedded token elements and handler collections
//! - [`xml`] - Namespace-aware cursor and emitter
//! - [`config`] - Serializer options
//! - [`error`] - Error types for WS-Trust operations
//!
//! # Example
//!
//! ```rust
//! use kc_protocol_wstrust::{KeyType, ProtocolVersion, RequestSecurityToken, WsTrustSerializer};
//!
//! let serializer = WsTrustSerializer::new(ProtocolVersion::Trust13);
//! let rst = RequestSecurityToken::issue()
//!     .with_key_type(KeyType::Symmetric)
//!     .with_key_size(256)
//!     .with_applies_to("https://svc.example/");
//!
//! let xml = serializer.write_request(&rst)?;
//! let (version, parsed) = serializer.read_request_any(&xml)?;
//! assert_eq!(version, ProtocolVersion::Trust13);
//! assert_eq!(parsed, rst);
//! # Ok::<(), kc_protocol_wstrust::WsTrustError>(())
//! ```
//!
//! # WS-Trust Specifications
//!
//! - [WS-Trust 1.3](https://docs.oasis-open.org/ws-sx/ws-trust/200512/ws-trust-1.3-os.html)
//! - [WS-Trust 1.4](https://docs.oasis-open.org/ws-sx/ws-trust/v1.4/ws-trust.html)
//! - [WS-Trust February 2005](http://specs.xmlsoap.org/ws/2005/02/trust/WS-Trust.pdf)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod keys;
pub mod serializer;
pub mod token;
pub mod types;
pub mod version;
pub mod xml;

pub use config::SerializerConfig;
pub use error::{WsTrustError, WsTrustResult};
pub use serializer::{sniff_version, SerializationContext, WsTrustSerializer};
pub use types::*;
pub use version::{ProtocolVersion, TrustAdapter};
