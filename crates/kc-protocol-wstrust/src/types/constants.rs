//! WS-Trust constants and URIs.
//!
//! Contains namespace URIs, element and attribute names, and the canonical
//! vocabularies (request types, key types, computed key algorithms) shared by
//! every protocol version. Version-specific spellings live in
//! [`crate::version`].

use serde::{Deserialize, Serialize};

/// WS-Trust February 2005 namespace URI.
pub const TRUST_FEB2005_NS: &str = "http://schemas.xmlsoap.org/ws/2005/02/trust";

/// WS-Trust 1.3 namespace URI.
pub const TRUST_13_NS: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512";

/// WS-Trust 1.4 namespace URI (ActAs extension).
pub const TRUST_14_NS: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200802";

/// WS-Policy namespace URI (AppliesTo).
pub const WSP_NS: &str = "http://schemas.xmlsoap.org/ws/2004/09/policy";

/// WS-Addressing 1.0 namespace URI.
pub const WSA_NS: &str = "http://www.w3.org/2005/08/addressing";

/// WS-Addressing August 2004 submission namespace URI.
pub const WSA_2004_NS: &str = "http://schemas.xmlsoap.org/ws/2004/08/addressing";

/// WS-Security utility namespace URI.
pub const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";

/// WS-Security extension namespace URI.
pub const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";

/// XML Digital Signature namespace URI.
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// XML Encryption namespace URI.
pub const XMLENC_NS: &str = "http://www.w3.org/2001/04/xmlenc#";

/// WS-Identity namespace URI, also the default claims dialect.
pub const IDENTITY_NS: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity";

/// WS-Federation authorization namespace URI.
pub const AUTH_NS: &str = "http://docs.oasis-open.org/wsfed/authorization/200706";

/// Returns true if the namespace belongs to any WS-Trust version.
#[must_use]
pub fn is_trust_namespace(ns: &str) -> bool {
    ns == TRUST_FEB2005_NS || ns == TRUST_13_NS || ns == TRUST_14_NS
}

/// Preferred prefixes used when writing.
pub mod prefixes {
    /// WS-Trust 1.4 prefix.
    pub const TRUST_14: &str = "tr";
    /// WS-Policy prefix.
    pub const WSP: &str = "wsp";
    /// WS-Addressing prefix.
    pub const WSA: &str = "wsa";
    /// WS-Security utility prefix.
    pub const WSU: &str = "wsu";
    /// WS-Security extension prefix.
    pub const WSSE: &str = "wsse";
    /// XML Digital Signature prefix.
    pub const DS: &str = "ds";
    /// XML Encryption prefix.
    pub const XENC: &str = "xenc";
    /// WS-Identity prefix.
    pub const IDENTITY: &str = "i";
    /// WS-Federation authorization prefix.
    pub const AUTH: &str = "auth";
}

/// Element local names. These are identical across WS-Trust versions.
pub mod elements {
    #![allow(missing_docs)]

    pub const REQUEST_SECURITY_TOKEN: &str = "RequestSecurityToken";
    pub const REQUEST_SECURITY_TOKEN_RESPONSE: &str = "RequestSecurityTokenResponse";
    pub const REQUEST_SECURITY_TOKEN_RESPONSE_COLLECTION: &str =
        "RequestSecurityTokenResponseCollection";
    pub const ACT_AS: &str = "ActAs";
    pub const ADDITIONAL_CONTEXT: &str = "AdditionalContext";
    pub const ALLOW_POSTDATING: &str = "AllowPostdating";
    pub const APPLIES_TO: &str = "AppliesTo";
    pub const AUTHENTICATION_TYPE: &str = "AuthenticationType";
    pub const BINARY_EXCHANGE: &str = "BinaryExchange";
    pub const BINARY_SECRET: &str = "BinarySecret";
    pub const CANCEL_TARGET: &str = "CancelTarget";
    pub const CANONICALIZATION_ALGORITHM: &str = "CanonicalizationAlgorithm";
    pub const CLAIM_TYPE: &str = "ClaimType";
    pub const CLAIMS: &str = "Claims";
    pub const CODE: &str = "Code";
    pub const COMPUTED_KEY: &str = "ComputedKey";
    pub const COMPUTED_KEY_ALGORITHM: &str = "ComputedKeyAlgorithm";
    pub const CONTEXT_ITEM: &str = "ContextItem";
    pub const CREATED: &str = "Created";
    pub const DELEGATABLE: &str = "Delegatable";
    pub const DELEGATE_TO: &str = "DelegateTo";
    pub const ENCRYPT_WITH: &str = "EncryptWith";
    pub const ENCRYPTION: &str = "Encryption";
    pub const ENCRYPTION_ALGORITHM: &str = "EncryptionAlgorithm";
    pub const ENDPOINT_REFERENCE: &str = "EndpointReference";
    pub const ADDRESS: &str = "Address";
    pub const ENTROPY: &str = "Entropy";
    pub const EXPIRES: &str = "Expires";
    pub const FORWARDABLE: &str = "Forwardable";
    pub const ISSUER: &str = "Issuer";
    pub const KEY_SIZE: &str = "KeySize";
    pub const KEY_TYPE: &str = "KeyType";
    pub const KEY_WRAP_ALGORITHM: &str = "KeyWrapAlgorithm";
    pub const LIFETIME: &str = "Lifetime";
    pub const ON_BEHALF_OF: &str = "OnBehalfOf";
    pub const PARTICIPANT: &str = "Participant";
    pub const PARTICIPANTS: &str = "Participants";
    pub const PRIMARY: &str = "Primary";
    pub const PROOF_ENCRYPTION: &str = "ProofEncryption";
    pub const REASON: &str = "Reason";
    pub const RENEW_TARGET: &str = "RenewTarget";
    pub const RENEWING: &str = "Renewing";
    pub const REQUEST_TYPE: &str = "RequestType";
    pub const REQUESTED_ATTACHED_REFERENCE: &str = "RequestedAttachedReference";
    pub const REQUESTED_PROOF_TOKEN: &str = "RequestedProofToken";
    pub const REQUESTED_SECURITY_TOKEN: &str = "RequestedSecurityToken";
    pub const REQUESTED_TOKEN_CANCELLED: &str = "RequestedTokenCancelled";
    pub const REQUESTED_UNATTACHED_REFERENCE: &str = "RequestedUnattachedReference";
    pub const SECONDARY_PARAMETERS: &str = "SecondaryParameters";
    pub const SIGN_WITH: &str = "SignWith";
    pub const SIGNATURE_ALGORITHM: &str = "SignatureAlgorithm";
    pub const STATUS: &str = "Status";
    pub const TOKEN_TYPE: &str = "TokenType";
    pub const USE_KEY: &str = "UseKey";
    pub const VALIDATE_TARGET: &str = "ValidateTarget";
    pub const VALUE: &str = "Value";
}

/// Attribute local names (all unqualified).
pub mod attributes {
    #![allow(missing_docs)]

    pub const CONTEXT: &str = "Context";
    pub const DIALECT: &str = "Dialect";
    pub const URI: &str = "Uri";
    pub const OPTIONAL: &str = "Optional";
    pub const ALLOW: &str = "Allow";
    pub const OK: &str = "OK";
    pub const NAME: &str = "Name";
    pub const SCOPE: &str = "Scope";
    pub const VALUE_TYPE: &str = "ValueType";
    pub const ENCODING_TYPE: &str = "EncodingType";
    pub const TYPE: &str = "Type";
}

/// Claims dialect URIs.
pub mod claim_dialects {
    /// WS-Identity claims dialect, the default.
    pub const IDENTITY: &str = super::IDENTITY_NS;
    /// WS-Federation authorization claims dialect.
    pub const AUTHORIZATION: &str =
        "http://docs.oasis-open.org/wsfed/authorization/200706/authclaims";
}

// ============================================================================
// Request Types
// ============================================================================

/// Canonical WS-Trust request types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    /// Issue a new token.
    Issue,
    /// Renew an existing token.
    Renew,
    /// Cancel an existing token.
    Cancel,
    /// Validate an existing token.
    Validate,
}

impl RequestType {
    /// Every request type, in declaration order.
    pub const ALL: [Self; 4] = [Self::Issue, Self::Renew, Self::Cancel, Self::Validate];
}

// ============================================================================
// Key Types
// ============================================================================

/// Canonical WS-Trust key types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Symmetric proof key.
    Symmetric,
    /// Asymmetric (public) proof key.
    Asymmetric,
    /// No proof key.
    Bearer,
}

impl KeyType {
    /// Every key type, in declaration order.
    pub const ALL: [Self; 3] = [Self::Symmetric, Self::Asymmetric, Self::Bearer];
}

// ============================================================================
// Computed Key Algorithms
// ============================================================================

/// Canonical computed key algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComputedKeyAlgorithm {
    /// P_SHA1 combination of requester and issuer entropy.
    Psha1,
}

// ============================================================================
// Binary Exchange Encodings
// ============================================================================

/// Encoding of BinaryExchange content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryEncoding {
    /// Base64 encoded content.
    Base64,
    /// Hex encoded content.
    HexBinary,
}

impl BinaryEncoding {
    /// Returns the WS-Security encoding type URI.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::Base64 => {
                "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary"
            }
            Self::HexBinary => {
                "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#HexBinary"
            }
        }
    }

    /// Parses an encoding from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        [Self::Base64, Self::HexBinary]
            .into_iter()
            .find(|encoding| encoding.uri() == uri)
    }
}

/// Well-known WS-Security key identifier value types.
pub mod value_types {
    /// SHA-1 thumbprint of an X.509 certificate.
    pub const THUMBPRINT_SHA1: &str =
        "http://docs.oasis-open.org/wss/oasis-wss-soap-message-security-1.1#ThumbprintSHA1";
    /// Subject key identifier of an X.509 certificate.
    pub const X509_SKI: &str =
        "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-x509-token-profile-1.0#X509SubjectKeyIdentifier";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_encoding_uri_roundtrip() {
        for encoding in [BinaryEncoding::Base64, BinaryEncoding::HexBinary] {
            assert_eq!(BinaryEncoding::from_uri(encoding.uri()), Some(encoding));
        }
        assert_eq!(BinaryEncoding::from_uri("urn:unknown"), None);
    }

    #[test]
    fn trust_namespaces_are_recognised() {
        assert!(is_trust_namespace(TRUST_FEB2005_NS));
        assert!(is_trust_namespace(TRUST_13_NS));
        assert!(is_trust_namespace(TRUST_14_NS));
        assert!(!is_trust_namespace(WSP_NS));
    }
}
