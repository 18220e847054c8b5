//! Binary negotiation payloads (SPNEGO, TLS) carried in `BinaryExchange`.

use serde::{Deserialize, Serialize};

use super::constants::BinaryEncoding;

/// An opaque binary negotiation blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryExchange {
    /// Decoded payload.
    pub binary_data: Vec<u8>,

    /// URI identifying the negotiation protocol.
    pub value_type: String,

    /// Encoding used on the wire.
    pub encoding: BinaryEncoding,
}

impl BinaryExchange {
    /// Creates a base64-encoded exchange.
    #[must_use]
    pub fn new(binary_data: Vec<u8>, value_type: impl Into<String>) -> Self {
        Self {
            binary_data,
            value_type: value_type.into(),
            encoding: BinaryEncoding::Base64,
        }
    }

    /// Sets the wire encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: BinaryEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}
