//! Key and token resolution seam.
//!
//! The codec never performs cryptography itself. When it meets an encrypted
//! key or a UseKey reference it asks an injected [`TokenResolver`] for the
//! key or token the clause points at, and delegates the actual wrap/unwrap to
//! the returned [`SecurityKey`].

use std::fmt;
use std::sync::Arc;

use crate::error::WsTrustResult;
use crate::keys::KeyIdentifierClause;
use crate::token::SecurityToken;

/// A key able to wrap and unwrap symmetric keys.
pub trait SecurityKey: fmt::Debug + Send + Sync {
    /// Unwraps `wrapped_key` using `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns an error if the algorithm is unsupported or the data does not
    /// decrypt.
    fn decrypt_key(&self, algorithm: &str, wrapped_key: &[u8]) -> WsTrustResult<Vec<u8>>;

    /// Wraps `key` using `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns an error if the algorithm is unsupported.
    fn encrypt_key(&self, algorithm: &str, key: &[u8]) -> WsTrustResult<Vec<u8>>;
}

/// Resolves key identifier clauses to keys and tokens.
pub trait TokenResolver: Send + Sync {
    /// Returns the key the clause refers to, if known.
    fn try_resolve_security_key(
        &self,
        clause: &KeyIdentifierClause,
    ) -> Option<Arc<dyn SecurityKey>>;

    /// Returns the token the clause refers to, if known.
    fn try_resolve_token(&self, clause: &KeyIdentifierClause) -> Option<Arc<dyn SecurityToken>>;
}

/// A resolver that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyTokenResolver;

impl TokenResolver for EmptyTokenResolver {
    fn try_resolve_security_key(
        &self,
        _clause: &KeyIdentifierClause,
    ) -> Option<Arc<dyn SecurityKey>> {
        None
    }

    fn try_resolve_token(&self, _clause: &KeyIdentifierClause) -> Option<Arc<dyn SecurityToken>> {
        None
    }
}

/// A resolver over a fixed set of clause-to-key and clause-to-token entries.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenResolver {
    keys: Vec<(KeyIdentifierClause, Arc<dyn SecurityKey>)>,
    tokens: Vec<(KeyIdentifierClause, Arc<dyn SecurityToken>)>,
}

impl StaticTokenResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a key under a clause.
    #[must_use]
    pub fn with_key(mut self, clause: KeyIdentifierClause, key: Arc<dyn SecurityKey>) -> Self {
        self.keys.push((clause, key));
        self
    }

    /// Registers a token under a clause.
    #[must_use]
    pub fn with_token(
        mut self,
        clause: KeyIdentifierClause,
        token: Arc<dyn SecurityToken>,
    ) -> Self {
        self.tokens.push((clause, token));
        self
    }
}

impl TokenResolver for StaticTokenResolver {
    fn try_resolve_security_key(
        &self,
        clause: &KeyIdentifierClause,
    ) -> Option<Arc<dyn SecurityKey>> {
        self.keys
            .iter()
            .find(|(candidate, _)| candidate == clause)
            .map(|(_, key)| Arc::clone(key))
    }

    fn try_resolve_token(&self, clause: &KeyIdentifierClause) -> Option<Arc<dyn SecurityToken>> {
        self.tokens
            .iter()
            .find(|(candidate, _)| candidate == clause)
            .map(|(_, token)| Arc::clone(token))
    }
}
