//! Protocol version adapter.
//!
//! Each supported WS-Trust revision is described by an immutable
//! [`TrustAdapter`] table that maps the canonical vocabulary in
//! [`crate::types::constants`] to the strings used on the wire. The tables
//! are `static` data, so concurrent first use needs no synchronisation.

use serde::{Deserialize, Serialize};

use crate::types::constants::{
    ComputedKeyAlgorithm, KeyType, RequestType, TRUST_13_NS, TRUST_14_NS, TRUST_FEB2005_NS,
};

/// Supported WS-Trust protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProtocolVersion {
    /// WS-Trust February 2005.
    Feb2005,
    /// WS-Trust 1.3 (OASIS), with the 1.4 ActAs extension.
    #[default]
    Trust13,
}

impl ProtocolVersion {
    /// Resolves the version whose namespace matches `namespace`.
    ///
    /// The 1.4 namespace only defines extension elements on top of 1.3,
    /// so it resolves to [`ProtocolVersion::Trust13`].
    #[must_use]
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            TRUST_FEB2005_NS => Some(Self::Feb2005),
            TRUST_13_NS | TRUST_14_NS => Some(Self::Trust13),
            _ => None,
        }
    }

    /// Returns the lookup table for this version.
    #[must_use]
    pub fn adapter(self) -> &'static TrustAdapter {
        match self {
            Self::Feb2005 => &FEB2005,
            Self::Trust13 => &TRUST13,
        }
    }

    /// Returns the namespace URI of this version.
    #[must_use]
    pub fn namespace(self) -> &'static str {
        self.adapter().namespace
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Feb2005 => f.write_str("WS-Trust Feb2005"),
            Self::Trust13 => f.write_str("WS-Trust 1.3"),
        }
    }
}

/// Resolves the adapter for a namespace URI.
#[must_use]
pub fn resolve_adapter(namespace: &str) -> Option<&'static TrustAdapter> {
    ProtocolVersion::from_namespace(namespace).map(ProtocolVersion::adapter)
}

/// SOAP action URIs for one request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionPair {
    /// Action of the request message.
    pub request: &'static str,
    /// Action of the response message.
    pub response: &'static str,
}

/// SOAP action URIs of a protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustActions {
    /// Issue actions.
    pub issue: ActionPair,
    /// Renew actions.
    pub renew: ActionPair,
    /// Cancel actions.
    pub cancel: ActionPair,
    /// Validate actions.
    pub validate: ActionPair,
    /// Action of a final issuance response collection (1.3 only).
    pub issue_final: Option<&'static str>,
}

impl TrustActions {
    /// Returns the action pair for a request type.
    #[must_use]
    pub const fn for_request_type(&self, request_type: RequestType) -> &ActionPair {
        match request_type {
            RequestType::Issue => &self.issue,
            RequestType::Renew => &self.renew,
            RequestType::Cancel => &self.cancel,
            RequestType::Validate => &self.validate,
        }
    }
}

/// Validation status codes of a protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustStatusCodes {
    /// The validated token is valid.
    pub valid: &'static str,
    /// The validated token is invalid.
    pub invalid: &'static str,
}

/// Per-version table of wire strings.
#[derive(Debug)]
pub struct TrustAdapter {
    /// The version this table describes.
    pub version: ProtocolVersion,
    /// Namespace URI of the version.
    pub namespace: &'static str,
    /// Prefix used when writing.
    pub prefix: &'static str,
    /// Request type URIs.
    pub request_types: &'static [(RequestType, &'static str)],
    /// Key type URIs.
    pub key_types: &'static [(KeyType, &'static str)],
    /// Computed key algorithm URIs.
    pub computed_key_algorithms: &'static [(ComputedKeyAlgorithm, &'static str)],
    /// Validation status codes.
    pub status_codes: TrustStatusCodes,
    /// SOAP actions.
    pub actions: TrustActions,
    /// Whether SecondaryParameters, ValidateTarget and KeyWrapAlgorithm exist.
    pub supports_secondary_parameters: bool,
    /// Whether responses may be wrapped in a response collection.
    pub supports_response_collection: bool,
}

impl TrustAdapter {
    /// Returns the wire URI for a request type.
    #[must_use]
    pub fn request_type_uri(&self, request_type: RequestType) -> &'static str {
        lookup(self.request_types, &request_type)
    }

    /// Parses a wire URI into a request type.
    #[must_use]
    pub fn parse_request_type(&self, uri: &str) -> Option<RequestType> {
        reverse(self.request_types, uri)
    }

    /// Returns the wire URI for a key type.
    #[must_use]
    pub fn key_type_uri(&self, key_type: KeyType) -> &'static str {
        lookup(self.key_types, &key_type)
    }

    /// Parses a wire URI into a key type.
    #[must_use]
    pub fn parse_key_type(&self, uri: &str) -> Option<KeyType> {
        reverse(self.key_types, uri)
    }

    /// Returns the wire URI for a computed key algorithm.
    #[must_use]
    pub fn computed_key_algorithm_uri(&self, algorithm: ComputedKeyAlgorithm) -> &'static str {
        lookup(self.computed_key_algorithms, &algorithm)
    }

    /// Parses a wire URI into a computed key algorithm.
    #[must_use]
    pub fn parse_computed_key_algorithm(&self, uri: &str) -> Option<ComputedKeyAlgorithm> {
        reverse(self.computed_key_algorithms, uri)
    }
}

fn lookup<T: PartialEq>(table: &'static [(T, &'static str)], key: &T) -> &'static str {
    table
        .iter()
        .find(|(k, _)| k == key)
        .map_or("", |(_, uri)| *uri)
}

fn reverse<T: Copy>(table: &'static [(T, &'static str)], uri: &str) -> Option<T> {
    table.iter().find(|(_, u)| *u == uri).map(|(k, _)| *k)
}

// ============================================================================
// Version tables
// ============================================================================

static FEB2005: TrustAdapter = TrustAdapter {
    version: ProtocolVersion::Feb2005,
    namespace: TRUST_FEB2005_NS,
    prefix: "t",
    request_types: &[
        (RequestType::Issue, "http://schemas.xmlsoap.org/ws/2005/02/trust/Issue"),
        (RequestType::Renew, "http://schemas.xmlsoap.org/ws/2005/02/trust/Renew"),
        (RequestType::Cancel, "http://schemas.xmlsoap.org/ws/2005/02/trust/Cancel"),
        (RequestType::Validate, "http://schemas.xmlsoap.org/ws/2005/02/trust/Validate"),
    ],
    key_types: &[
        (KeyType::Symmetric, "http://schemas.xmlsoap.org/ws/2005/02/trust/SymmetricKey"),
        (KeyType::Asymmetric, "http://schemas.xmlsoap.org/ws/2005/02/trust/PublicKey"),
        (KeyType::Bearer, "http://schemas.xmlsoap.org/ws/2005/05/identity/NoProofKey"),
    ],
    computed_key_algorithms: &[(
        ComputedKeyAlgorithm::Psha1,
        "http://schemas.xmlsoap.org/ws/2005/02/trust/CK/PSHA1",
    )],
    status_codes: TrustStatusCodes {
        valid: "http://schemas.xmlsoap.org/ws/2005/02/trust/status/valid",
        invalid: "http://schemas.xmlsoap.org/ws/2005/02/trust/status/invalid",
    },
    actions: TrustActions {
        issue: ActionPair {
            request: "http://schemas.xmlsoap.org/ws/2005/02/trust/RST/Issue",
            response: "http://schemas.xmlsoap.org/ws/2005/02/trust/RSTR/Issue",
        },
        renew: ActionPair {
            request: "http://schemas.xmlsoap.org/ws/2005/02/trust/RST/Renew",
            response: "http://schemas.xmlsoap.org/ws/2005/02/trust/RSTR/Renew",
        },
        cancel: ActionPair {
            request: "http://schemas.xmlsoap.org/ws/2005/02/trust/RST/Cancel",
            response: "http://schemas.xmlsoap.org/ws/2005/02/trust/RSTR/Cancel",
        },
        validate: ActionPair {
            request: "http://schemas.xmlsoap.org/ws/2005/02/trust/RST/Validate",
            response: "http://schemas.xmlsoap.org/ws/2005/02/trust/RSTR/Validate",
        },
        issue_final: None,
    },
    supports_secondary_parameters: false,
    supports_response_collection: false,
};

static TRUST13: TrustAdapter = TrustAdapter {
    version: ProtocolVersion::Trust13,
    namespace: TRUST_13_NS,
    prefix: "trust",
    request_types: &[
        (RequestType::Issue, "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Issue"),
        (RequestType::Renew, "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Renew"),
        (RequestType::Cancel, "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Cancel"),
        (RequestType::Validate, "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Validate"),
    ],
    key_types: &[
        (KeyType::Symmetric, "http://docs.oasis-open.org/ws-sx/ws-trust/200512/SymmetricKey"),
        (KeyType::Asymmetric, "http://docs.oasis-open.org/ws-sx/ws-trust/200512/PublicKey"),
        (KeyType::Bearer, "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Bearer"),
    ],
    computed_key_algorithms: &[(
        ComputedKeyAlgorithm::Psha1,
        "http://docs.oasis-open.org/ws-sx/ws-trust/200512/CK/PSHA1",
    )],
    status_codes: TrustStatusCodes {
        valid: "http://docs.oasis-open.org/ws-sx/ws-trust/200512/status/valid",
        invalid: "http://docs.oasis-open.org/ws-sx/ws-trust/200512/status/invalid",
    },
    actions: TrustActions {
        issue: ActionPair {
            request: "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RST/Issue",
            response: "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RSTR/Issue",
        },
        renew: ActionPair {
            request: "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RST/Renew",
            response: "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RSTR/Renew",
        },
        cancel: ActionPair {
            request: "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RST/Cancel",
            response: "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RSTR/Cancel",
        },
        validate: ActionPair {
            request: "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RST/Validate",
            response: "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RSTR/Validate",
        },
        issue_final: Some("http://docs.oasis-open.org/ws-sx/ws-trust/200512/RSTRC/IssueFinal"),
    },
    supports_secondary_parameters: true,
    supports_response_collection: true,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_resolution() {
        assert_eq!(
            ProtocolVersion::from_namespace(TRUST_FEB2005_NS),
            Some(ProtocolVersion::Feb2005)
        );
        assert_eq!(
            ProtocolVersion::from_namespace(TRUST_13_NS),
            Some(ProtocolVersion::Trust13)
        );
        assert_eq!(
            ProtocolVersion::from_namespace(TRUST_14_NS),
            Some(ProtocolVersion::Trust13)
        );
        assert!(resolve_adapter("urn:example:other").is_none());
    }

    #[test]
    fn vocabulary_roundtrip_per_version() {
        for version in [ProtocolVersion::Feb2005, ProtocolVersion::Trust13] {
            let adapter = version.adapter();
            for request_type in RequestType::ALL {
                let uri = adapter.request_type_uri(request_type);
                assert!(uri.starts_with(adapter.namespace), "{uri}");
                assert_eq!(adapter.parse_request_type(uri), Some(request_type));
            }
            for key_type in KeyType::ALL {
                let uri = adapter.key_type_uri(key_type);
                assert_eq!(adapter.parse_key_type(uri), Some(key_type));
            }
            let psha1 = adapter.computed_key_algorithm_uri(ComputedKeyAlgorithm::Psha1);
            assert_eq!(
                adapter.parse_computed_key_algorithm(psha1),
                Some(ComputedKeyAlgorithm::Psha1)
            );
        }
    }

    #[test]
    fn versions_do_not_share_wire_strings() {
        let feb = ProtocolVersion::Feb2005.adapter();
        let v13 = ProtocolVersion::Trust13.adapter();
        let issue13 = v13.request_type_uri(RequestType::Issue);
        assert_eq!(feb.parse_request_type(issue13), None);
        assert_eq!(
            feb.key_type_uri(KeyType::Bearer),
            "http://schemas.xmlsoap.org/ws/2005/05/identity/NoProofKey"
        );
        assert!(feb.actions.issue_final.is_none());
        assert!(v13.actions.issue_final.is_some());
    }

    #[test]
    fn actions_by_request_type() {
        let actions = &ProtocolVersion::Trust13.adapter().actions;
        assert!(actions
            .for_request_type(RequestType::Validate)
            .response
            .ends_with("/RSTR/Validate"));
    }
}
