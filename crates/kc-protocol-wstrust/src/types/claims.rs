//! Requested claims.

use serde::{Deserialize, Serialize};

use super::constants::claim_dialects;

/// A single requested claim type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestClaim {
    /// Claim type URI.
    pub claim_type: String,

    /// Whether the claim may be omitted by the issuer.
    pub optional: bool,

    /// Requested value. Only legal under the authorization dialect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl RequestClaim {
    /// Creates a required claim.
    #[must_use]
    pub fn required(claim_type: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            optional: false,
            value: None,
        }
    }

    /// Creates an optional claim.
    #[must_use]
    pub fn optional(claim_type: impl Into<String>) -> Self {
        Self {
            optional: true,
            ..Self::required(claim_type)
        }
    }

    /// Sets the requested value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Claims requested in an RST, with their dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestClaimCollection {
    /// Dialect URI; WS-Identity unless set otherwise.
    pub dialect: String,

    /// Claims in document order.
    pub claims: Vec<RequestClaim>,
}

impl Default for RequestClaimCollection {
    fn default() -> Self {
        Self {
            dialect: claim_dialects::IDENTITY.to_string(),
            claims: Vec::new(),
        }
    }
}

impl RequestClaimCollection {
    /// Creates an empty collection in the default dialect.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty collection in the given dialect.
    #[must_use]
    pub fn with_dialect(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            claims: Vec::new(),
        }
    }

    /// Appends a claim.
    #[must_use]
    pub fn with_claim(mut self, claim: RequestClaim) -> Self {
        self.claims.push(claim);
        self
    }

    /// Returns true if no claims are requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Returns true if the collection uses the authorization dialect.
    #[must_use]
    pub fn is_authorization_dialect(&self) -> bool {
        self.dialect == claim_dialects::AUTHORIZATION
    }

    /// Returns true if the collection carries nothing worth writing.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.claims.is_empty() && self.dialect == claim_dialects::IDENTITY
    }
}
