//! RequestSecurityToken message.

use super::binary_exchange::BinaryExchange;
use super::claims::RequestClaimCollection;
use super::constants::{ComputedKeyAlgorithm, KeyType, RequestType};
use super::context::AdditionalContext;
use super::endpoint::{EndpointReference, Participants};
use super::extension::ExtensionProperties;
use super::lifetime::Lifetime;
use super::use_key::UseKey;
use crate::error::{WsTrustError, WsTrustResult};
use crate::keys::Entropy;
use crate::token::SecurityTokenElement;

/// How deep `SecondaryParameters` may nest. A nested request carries no
/// secondary parameters of its own.
pub const MAX_SECONDARY_PARAMETERS_DEPTH: usize = 1;

/// Renewal semantics requested for the issued token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renewing {
    /// Whether the token may be renewed (`Allow`).
    pub allow_renewal: bool,

    /// Whether the token may be renewed after it expired (`OK`).
    pub ok_for_renewal_after_expiration: bool,
}

impl Default for Renewing {
    fn default() -> Self {
        Self {
            allow_renewal: true,
            ok_for_renewal_after_expiration: false,
        }
    }
}

impl Renewing {
    /// Creates renewal semantics.
    #[must_use]
    pub const fn new(allow_renewal: bool, ok_for_renewal_after_expiration: bool) -> Self {
        Self {
            allow_renewal,
            ok_for_renewal_after_expiration,
        }
    }
}

/// A WS-Trust `RequestSecurityToken`.
///
/// Every field is optional on the wire. Fields are grouped the way they are
/// written, see the serializer for the exact element order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestSecurityToken {
    /// Opaque correlation string (`Context` attribute).
    pub context: Option<String>,

    /// Scope of the request.
    pub applies_to: Option<EndpointReference>,

    /// Requested claims.
    pub claims: RequestClaimCollection,

    /// Key derivation algorithm for combined entropy.
    pub computed_key_algorithm: Option<ComputedKeyAlgorithm>,

    /// Signature algorithm the issued key will be used with.
    pub sign_with: Option<String>,

    /// Encryption algorithm the issued key will be used with.
    pub encrypt_with: Option<String>,

    /// Requester entropy.
    pub entropy: Option<Entropy>,

    /// Requested key size.
    pub key_size_in_bits: Option<u32>,

    /// Requested key type.
    pub key_type: Option<KeyType>,

    /// Requested lifetime.
    pub lifetime: Option<Lifetime>,

    /// Token to renew.
    pub renew_target: Option<SecurityTokenElement>,

    /// Token of the party the request is made for.
    pub on_behalf_of: Option<SecurityTokenElement>,

    /// Token of the identity to act as (WS-Trust 1.4).
    pub act_as: Option<SecurityTokenElement>,

    /// Kind of request. Only absent in `SecondaryParameters`.
    pub request_type: Option<RequestType>,

    /// Requested token type URI.
    pub token_type: Option<String>,

    /// Existing key to bind the token to.
    pub use_key: Option<UseKey>,

    /// Requested authentication type URI.
    pub authentication_type: Option<String>,

    /// Requested encryption algorithm URI.
    pub encryption_algorithm: Option<String>,

    /// Requested canonicalization algorithm URI.
    pub canonicalization_algorithm: Option<String>,

    /// Requested signature algorithm URI.
    pub signature_algorithm: Option<String>,

    /// Negotiation payload.
    pub binary_exchange: Option<BinaryExchange>,

    /// Issuer of the `OnBehalfOf` token.
    pub issuer: Option<EndpointReference>,

    /// Token encrypting the proof token.
    pub proof_encryption: Option<SecurityTokenElement>,

    /// Token encrypting the issued token.
    pub encryption: Option<SecurityTokenElement>,

    /// Token of the party the issued token may be delegated to.
    pub delegate_to: Option<SecurityTokenElement>,

    /// Whether the issued token may be forwarded.
    pub forwardable: Option<bool>,

    /// Whether the issued token may be delegated.
    pub delegatable: Option<bool>,

    /// Whether a postdated token is acceptable.
    pub allow_postdating: bool,

    /// Renewal semantics.
    pub renewing: Option<Renewing>,

    /// Token to cancel.
    pub cancel_target: Option<SecurityTokenElement>,

    /// Parties sharing the issued token.
    pub participants: Option<Participants>,

    /// Additional authorization context.
    pub additional_context: Option<AdditionalContext>,

    /// Key wrap algorithm URI (WS-Trust 1.3).
    pub key_wrap_algorithm: Option<String>,

    /// Token to validate (WS-Trust 1.3).
    pub validate_target: Option<SecurityTokenElement>,

    /// Defaults supplied by the relying party (WS-Trust 1.3).
    pub secondary_parameters: Option<Box<RequestSecurityToken>>,

    /// Unrecognised elements, in document order.
    pub extensions: ExtensionProperties,
}

impl RequestSecurityToken {
    /// Creates a request of the given type.
    #[must_use]
    pub fn new(request_type: RequestType) -> Self {
        Self {
            request_type: Some(request_type),
            ..Self::default()
        }
    }

    /// Creates an `Issue` request.
    #[must_use]
    pub fn issue() -> Self {
        Self::new(RequestType::Issue)
    }

    /// Sets the context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Sets the scope to an endpoint address.
    #[must_use]
    pub fn with_applies_to(mut self, address: impl Into<String>) -> Self {
        self.applies_to = Some(EndpointReference::new(address));
        self
    }

    /// Sets the key type.
    #[must_use]
    pub const fn with_key_type(mut self, key_type: KeyType) -> Self {
        self.key_type = Some(key_type);
        self
    }

    /// Sets the key size.
    #[must_use]
    pub const fn with_key_size(mut self, bits: u32) -> Self {
        self.key_size_in_bits = Some(bits);
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

    /// Sets the requested claims.
    #[must_use]
    pub fn with_claims(mut self, claims: RequestClaimCollection) -> Self {
        self.claims = claims;
        self
    }

    /// Sets the requester entropy.
    #[must_use]
    pub fn with_entropy(mut self, entropy: Entropy) -> Self {
        self.entropy = Some(entropy);
        self
    }

    /// Sets the existing key to bind to.
    #[must_use]
    pub fn with_use_key(mut self, use_key: UseKey) -> Self {
        self.use_key = Some(use_key);
        self
    }

    /// Sets the `OnBehalfOf` token.
    #[must_use]
    pub fn with_on_behalf_of(mut self, token: SecurityTokenElement) -> Self {
        self.on_behalf_of = Some(token);
        self
    }

    /// Sets the `ActAs` token.
    #[must_use]
    pub fn with_act_as(mut self, token: SecurityTokenElement) -> Self {
        self.act_as = Some(token);
        self
    }

    /// Sets the secondary parameters.
    #[must_use]
    pub fn with_secondary_parameters(mut self, secondary: RequestSecurityToken) -> Self {
        self.secondary_parameters = Some(Box::new(secondary));
        self
    }

    /// Returns the nesting depth of secondary parameters.
    #[must_use]
    pub fn secondary_parameters_depth(&self) -> usize {
        self.secondary_parameters
            .as_ref()
            .map_or(0, |secondary| 1 + secondary.secondary_parameters_depth())
    }

    /// Checks the cross-field invariants.
    ///
    /// An `Issue` (or untyped) request for an asymmetric key must name the
    /// key in `UseKey`, and secondary parameters may nest at most
    /// [`MAX_SECONDARY_PARAMETERS_DEPTH`] levels.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::InvalidRequestSemantics`] on the first
    /// violated invariant.
    pub fn validate(&self) -> WsTrustResult<()> {
        let issues_key = matches!(self.request_type, None | Some(RequestType::Issue));
        if issues_key && self.key_type == Some(KeyType::Asymmetric) {
            let resolvable = self.use_key.as_ref().is_some_and(UseKey::is_resolvable);
            if !resolvable {
                return Err(WsTrustError::invalid_request(
                    "asymmetric key requested without UseKey",
                ));
            }
        }

        let depth = self.secondary_parameters_depth();
        if depth > MAX_SECONDARY_PARAMETERS_DEPTH {
            return Err(WsTrustError::invalid_request(format!(
                "SecondaryParameters nested {depth} levels deep, \
                 at most {MAX_SECONDARY_PARAMETERS_DEPTH} allowed"
            )));
        }
        Ok(())
    }
}
