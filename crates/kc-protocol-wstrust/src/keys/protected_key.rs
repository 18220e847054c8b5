//! Protected key material.
//!
//! Entropy and proof tokens carry a secret either in the clear, as a
//! `BinarySecret`, or wrapped for a key the recipient holds, as an
//! `xenc:EncryptedKey`. Unwrapping and re-wrapping go through the
//! [`SecurityKey`] returned by the injected [`TokenResolver`].

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{WsTrustError, WsTrustResult};
use crate::keys::{decode, EncryptedKeyClause, KeyIdentifierClause, SecurityKey, TokenResolver};
use crate::token::TokenHandlerCollection;
use crate::types::constants::{elements, BinaryEncoding};
use crate::version::TrustAdapter;
use crate::xml::{XmlCursor, XmlEmitter};

/// The key and algorithm that wrapped a secret, kept so it can be re-wrapped.
#[derive(Clone)]
pub struct WrappingCredentials {
    key: Arc<dyn SecurityKey>,
    key_identifier: KeyIdentifierClause,
    algorithm: String,
}

impl WrappingCredentials {
    /// Creates wrapping credentials.
    #[must_use]
    pub fn new(
        key: Arc<dyn SecurityKey>,
        key_identifier: KeyIdentifierClause,
        algorithm: impl Into<String>,
    ) -> Self {
        Self {
            key,
            key_identifier,
            algorithm: algorithm.into(),
        }
    }

    /// Returns the wrapping key.
    #[must_use]
    pub fn key(&self) -> &Arc<dyn SecurityKey> {
        &self.key
    }

    /// Returns the clause identifying the wrapping key.
    #[must_use]
    pub fn key_identifier(&self) -> &KeyIdentifierClause {
        &self.key_identifier
    }

    /// Returns the key wrap algorithm URI.
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }
}

impl fmt::Debug for WrappingCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappingCredentials")
            .field("key_identifier", &self.key_identifier)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl PartialEq for WrappingCredentials {
    fn eq(&self, other: &Self) -> bool {
        self.key_identifier == other.key_identifier && self.algorithm == other.algorithm
    }
}

impl Eq for WrappingCredentials {}

/// A secret, either in the clear or wrapped for a known key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectedKey {
    /// Written as `BinarySecret`.
    PlaintextSecret(Vec<u8>),

    /// Written as `xenc:EncryptedKey`.
    WrappedSecret {
        /// The unwrapped secret.
        secret: Vec<u8>,
        /// How to wrap it again.
        credentials: WrappingCredentials,
    },
}

impl ProtectedKey {
    /// Returns the secret bytes.
    #[must_use]
    pub fn secret(&self) -> &[u8] {
        match self {
            Self::PlaintextSecret(secret) | Self::WrappedSecret { secret, .. } => secret,
        }
    }

    /// Returns the wrapping credentials of a wrapped secret.
    #[must_use]
    pub fn wrapping_credentials(&self) -> Option<&WrappingCredentials> {
        match self {
            Self::PlaintextSecret(_) => None,
            Self::WrappedSecret { credentials, .. } => Some(credentials),
        }
    }
}

/// Requestor or issuer entropy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entropy(ProtectedKey);

impl Entropy {
    /// Wraps a protected key as entropy.
    #[must_use]
    pub const fn new(key: ProtectedKey) -> Self {
        Self(key)
    }

    /// Creates plaintext entropy.
    #[must_use]
    pub const fn from_secret(secret: Vec<u8>) -> Self {
        Self(ProtectedKey::PlaintextSecret(secret))
    }

    /// Returns the protected key.
    #[must_use]
    pub const fn protected_key(&self) -> &ProtectedKey {
        &self.0
    }

    /// Returns the secret bytes.
    #[must_use]
    pub fn secret(&self) -> &[u8] {
        self.0.secret()
    }
}

/// Reads the protected key at the cursor.
///
/// # Errors
///
/// - [`WsTrustError::MalformedWireFormat`] for an empty or undecodable secret.
/// - [`WsTrustError::UnsupportedContent`] if the element is neither a
///   `BinarySecret` nor an encrypted key.
/// - [`WsTrustError::UnresolvedKeyMaterial`] if no candidate wrapping key
///   resolves.
pub fn read_protected_key(
    cursor: &mut XmlCursor<'_>,
    adapter: &TrustAdapter,
    handlers: &TokenHandlerCollection,
    resolver: &dyn TokenResolver,
) -> WsTrustResult<ProtectedKey> {
    if cursor.is_start_element_named(elements::BINARY_SECRET, adapter.namespace)? {
        let text = cursor.read_element_text(elements::BINARY_SECRET, adapter.namespace)?;
        let secret = decode(BinaryEncoding::Base64, &text)?;
        if secret.is_empty() {
            return Err(WsTrustError::malformed("non-empty BinarySecret", "empty element"));
        }
        return Ok(ProtectedKey::PlaintextSecret(secret));
    }

    let fragment = cursor.capture_element()?;
    if !handlers.can_read_key_identifier_clause(&fragment) {
        return Err(WsTrustError::unsupported(format!(
            "protected key element {}",
            fragment.root()
        )));
    }
    let clause = handlers.read_key_identifier_clause(&fragment)?;
    let KeyIdentifierClause::EncryptedKey(encrypted) = clause else {
        return Err(WsTrustError::unsupported(format!(
            "key identifier clause {} does not carry a key",
            fragment.root()
        )));
    };

    for identifier in &encrypted.encrypting_key_identifier {
        if let Some(key) = resolver.try_resolve_security_key(identifier) {
            let secret = key.decrypt_key(&encrypted.encryption_method, &encrypted.cipher_value)?;
            tracing::debug!(
                algorithm = %encrypted.encryption_method,
                identifier = ?identifier,
                "unwrapped encrypted key"
            );
            return Ok(ProtectedKey::WrappedSecret {
                secret,
                credentials: WrappingCredentials::new(
                    key,
                    identifier.clone(),
                    encrypted.encryption_method.clone(),
                ),
            });
        }
    }

    tracing::warn!(
        candidates = encrypted.encrypting_key_identifier.len(),
        "no wrapping key resolved for encrypted key"
    );
    Err(WsTrustError::unresolved_key(format!(
        "none of {} wrapping key identifiers resolved",
        encrypted.encrypting_key_identifier.len()
    )))
}

/// Writes a protected key.
///
/// # Errors
///
/// Returns an error if re-wrapping fails or the emitter fails.
pub fn write_protected_key(
    emitter: &mut XmlEmitter,
    key: &ProtectedKey,
    adapter: &TrustAdapter,
    handlers: &TokenHandlerCollection,
) -> WsTrustResult<()> {
    match key {
        ProtectedKey::PlaintextSecret(secret) => emitter.element_string(
            adapter.prefix,
            elements::BINARY_SECRET,
            adapter.namespace,
            &STANDARD.encode(secret),
        ),
        ProtectedKey::WrappedSecret { secret, credentials } => {
            let cipher_value = credentials.key.encrypt_key(&credentials.algorithm, secret)?;
            let clause = KeyIdentifierClause::EncryptedKey(EncryptedKeyClause {
                encryption_method: credentials.algorithm.clone(),
                cipher_value,
                encrypting_key_identifier: vec![credentials.key_identifier.clone()],
            });
            handlers.write_key_identifier_clause(emitter, &clause)
        }
    }
}
