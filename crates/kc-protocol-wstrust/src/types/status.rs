//! Validation status.
//!
//! Status information returned in responses to Validate requests.

use serde::{Deserialize, Serialize};

use crate::version::ProtocolVersion;

/// Validation status of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// The status code URI.
    pub code: String,

    /// Optional human readable reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Status {
    /// Creates a status with the given code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            reason: None,
        }
    }

    /// Creates the "valid" status of a protocol version.
    #[must_use]
    pub fn valid(version: ProtocolVersion) -> Self {
        Self::new(version.adapter().status_codes.valid)
    }

    /// Creates the "invalid" status of a protocol version with a reason.
    #[must_use]
    pub fn invalid(version: ProtocolVersion, reason: impl Into<String>) -> Self {
        Self::new(version.adapter().status_codes.invalid).with_reason(reason)
    }

    /// Returns true if this is the "valid" code of any protocol version.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [ProtocolVersion::Feb2005, ProtocolVersion::Trust13]
            .into_iter()
            .any(|version| version.adapter().status_codes.valid == self.code)
    }

    /// Sets the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
