//! RequestSecurityTokenResponse message and its collection.

use super::binary_exchange::BinaryExchange;
use super::constants::{ComputedKeyAlgorithm, KeyType, RequestType};
use super::endpoint::EndpointReference;
use super::extension::ExtensionProperties;
use super::lifetime::Lifetime;
use super::status::Status;
use crate::keys::{Entropy, KeyIdentifierClause, ProtectedKey};
use crate::token::SecurityTokenElement;

/// Proof-of-possession material returned with an issued token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedProofToken {
    /// The key is derived from both parties' entropy with this algorithm.
    ComputedKey(ComputedKeyAlgorithm),

    /// The key itself, in the clear or wrapped.
    ProtectedKey(ProtectedKey),
}

/// A WS-Trust `RequestSecurityTokenResponse`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestSecurityTokenResponse {
    /// Correlation string copied from the request.
    pub context: Option<String>,

    /// Issuer entropy.
    pub entropy: Option<Entropy>,

    /// Issued key size.
    pub key_size_in_bits: Option<u32>,

    /// Issued token lifetime.
    pub lifetime: Option<Lifetime>,

    /// Scope of the issued token.
    pub applies_to: Option<EndpointReference>,

    /// The issued token.
    pub requested_security_token: Option<SecurityTokenElement>,

    /// Proof-of-possession material.
    pub requested_proof_token: Option<RequestedProofToken>,

    /// Reference to the issued token from inside the message.
    pub requested_attached_reference: Option<KeyIdentifierClause>,

    /// Reference to the issued token from outside the message.
    pub requested_unattached_reference: Option<KeyIdentifierClause>,

    /// Signature algorithm the issued key is for.
    pub sign_with: Option<String>,

    /// Encryption algorithm the issued key is for.
    pub encrypt_with: Option<String>,

    /// Issued token type URI.
    pub token_type: Option<String>,

    /// Kind of request answered.
    pub request_type: Option<RequestType>,

    /// Issued key type.
    pub key_type: Option<KeyType>,

    /// Authentication type URI.
    pub authentication_type: Option<String>,

    /// Encryption algorithm URI.
    pub encryption_algorithm: Option<String>,

    /// Canonicalization algorithm URI.
    pub canonicalization_algorithm: Option<String>,

    /// Signature algorithm URI.
    pub signature_algorithm: Option<String>,

    /// Negotiation payload.
    pub binary_exchange: Option<BinaryExchange>,

    /// Validation outcome.
    pub status: Option<Status>,

    /// Set when answering a Cancel request.
    pub requested_token_cancelled: bool,

    /// Whether this is the final response of the exchange.
    ///
    /// Final WS-Trust 1.3 responses travel inside a
    /// `RequestSecurityTokenResponseCollection`.
    pub is_final: bool,

    /// Unrecognised elements, in document order.
    pub extensions: ExtensionProperties,
}

impl RequestSecurityTokenResponse {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Sets the issued token.
    #[must_use]
    pub fn with_requested_security_token(mut self, token: SecurityTokenElement) -> Self {
        self.requested_security_token = Some(token);
        self
    }

    /// Sets the proof token.
    #[must_use]
    pub fn with_proof_token(mut self, proof: RequestedProofToken) -> Self {
        self.requested_proof_token = Some(proof);
        self
    }

    /// Sets the token type.
    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// Sets the lifetime.
    #[must_use]
    pub const fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Marks the response as final.
    #[must_use]
    pub const fn finalized(mut self) -> Self {
        self.is_final = true;
        self
    }
}

/// A WS-Trust 1.3 `RequestSecurityTokenResponseCollection`.
///
/// Only final responses are collected; writing a collection with a
/// non-final member fails.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestSecurityTokenResponseCollection {
    /// The responses, in document order.
    pub responses: Vec<RequestSecurityTokenResponse>,
}

impl RequestSecurityTokenResponseCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a response.
    #[must_use]
    pub fn with_response(mut self, response: RequestSecurityTokenResponse) -> Self {
        self.responses.push(response);
        self
    }

    /// Returns true if the collection holds no response.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::ProtocolVersion;

    #[test]
    fn new_response_is_not_final() {
        let rstr = RequestSecurityTokenResponse::new().with_context("c-1");
        assert!(!rstr.is_final);
        assert_eq!(rstr.context.as_deref(), Some("c-1"));

        let finalized = rstr.clone().finalized();
        assert!(finalized.is_final);
        assert_ne!(finalized, rstr);
    }

    #[test]
    fn builders_set_fields() {
        let rstr = RequestSecurityTokenResponse::new()
            .with_token_type("urn:example:token")
            .with_status(Status::valid(ProtocolVersion::Trust13))
            .with_proof_token(RequestedProofToken::ComputedKey(ComputedKeyAlgorithm::Psha1));
        assert_eq!(rstr.token_type.as_deref(), Some("urn:example:token"));
        assert!(rstr.status.as_ref().is_some_and(Status::is_valid));
        assert!(rstr.requested_security_token.is_none());
    }

    #[test]
    fn collection_emptiness() {
        let collection = RequestSecurityTokenResponseCollection::new();
        assert!(collection.is_empty());

        let collection = collection.with_response(RequestSecurityTokenResponse::new().finalized());
        assert!(!collection.is_empty());
        assert_eq!(collection.responses.len(), 1);
    }
}
