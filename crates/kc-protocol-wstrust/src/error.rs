//! WS-Trust error types.
//!
//! Errors fall into four families: wire-format faults (the XML does not have
//! the expected shape), unsupported content (well-formed but not understood),
//! unresolved key material (caller configuration) and request semantics
//! (cross-field invariants).

use thiserror::Error;

/// Result type for WS-Trust operations.
pub type WsTrustResult<T> = Result<T, WsTrustError>;

/// WS-Trust codec errors.
#[derive(Debug, Error)]
pub enum WsTrustError {
    /// The XML does not have the shape the protocol mandates.
    #[error("malformed wire format: expected {expected}, got {actual}")]
    MalformedWireFormat {
        /// What the codec expected at this position.
        expected: String,
        /// What was actually found.
        actual: String,
    },

    /// Well-formed content that this codec or its handlers do not support.
    #[error("unsupported content: {0}")]
    UnsupportedContent(String),

    /// No configured key could unwrap an encrypted key.
    #[error("unresolved key material: {0}")]
    UnresolvedKeyMaterial(String),

    /// The message violates a cross-field invariant.
    #[error("invalid request: {0}")]
    InvalidRequestSemantics(String),

    /// Low-level XML syntax error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Base64 decoding error.
    #[error("base64 decode error: {0}")]
    Base64Decode(String),

    /// An injected key operation failed.
    #[error("crypto error: {0}")]
    Crypto(String),
}

impl WsTrustError {
    /// Creates a wire-format error from an expected/actual pair.
    #[must_use]
    pub fn malformed(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::MalformedWireFormat {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates an unsupported-content error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedContent(message.into())
    }

    /// Creates an invalid-request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequestSemantics(message.into())
    }

    /// Creates an unresolved-key error.
    #[must_use]
    pub fn unresolved_key(message: impl Into<String>) -> Self {
        Self::UnresolvedKeyMaterial(message.into())
    }

    /// Returns the WS-Trust SOAP fault code for this error.
    ///
    /// Fault codes are the local names defined by WS-Trust 1.3 section 11;
    /// callers qualify them with the namespace of the version in use.
    #[must_use]
    pub const fn fault_code(&self) -> &'static str {
        match self {
            Self::MalformedWireFormat { .. } | Self::Xml(_) | Self::Base64Decode(_) => {
                "InvalidRequest"
            }
            Self::InvalidRequestSemantics(_) => "BadRequest",
            Self::UnsupportedContent(_) => "UnsupportedAlgorithm",
            Self::UnresolvedKeyMaterial(_) => "FailedAuthentication",
            Self::Crypto(_) => "RequestFailed",
        }
    }

    /// Returns true if the input was not syntactically what the protocol requires.
    #[must_use]
    pub const fn is_wire_format_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedWireFormat { .. } | Self::Xml(_) | Self::Base64Decode(_)
        )
    }
}

impl From<quick_xml::Error> for WsTrustError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<base64::DecodeError> for WsTrustError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64Decode(err.to_string())
    }
}

impl From<hex::FromHexError> for WsTrustError {
    fn from(err: hex::FromHexError) -> Self {
        Self::malformed("hexBinary content", err.to_string())
    }
}

impl From<chrono::ParseError> for WsTrustError {
    fn from(err: chrono::ParseError) -> Self {
        Self::malformed("xs:dateTime", err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for WsTrustError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::Xml(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_fault_codes() {
        let err = WsTrustError::malformed("{ns}RequestSecurityToken", "{ns}Foo");
        assert_eq!(err.fault_code(), "InvalidRequest");
        assert!(err.is_wire_format_error());

        let err = WsTrustError::invalid_request("UseKey missing");
        assert_eq!(err.fault_code(), "BadRequest");
        assert!(!err.is_wire_format_error());

        let err = WsTrustError::unsupported("unknown key type");
        assert_eq!(err.fault_code(), "UnsupportedAlgorithm");

        let err = WsTrustError::unresolved_key("no key");
        assert_eq!(err.fault_code(), "FailedAuthentication");
    }

    #[test]
    fn malformed_message_cites_both_sides() {
        let err = WsTrustError::malformed("KeySize", "Lifetime");
        let message = err.to_string();
        assert!(message.contains("expected KeySize"));
        assert!(message.contains("got Lifetime"));
    }
}
