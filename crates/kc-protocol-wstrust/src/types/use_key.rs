//! Existing-key references.

use crate::keys::KeyIdentifierClause;
use crate::token::SecurityTokenElement;

/// A request to bind the issued token to a key the requester already holds.
///
/// On read the embedded token is resolved and its key identifier checked
/// against the use-key resolver, so a parsed `UseKey` always refers to a key
/// the requester has proven possession of.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UseKey {
    /// The token carrying the key.
    pub token: Option<SecurityTokenElement>,

    /// Identifier of the key.
    pub key_identifier: Option<KeyIdentifierClause>,
}

impl UseKey {
    /// Creates a reference from a token.
    #[must_use]
    pub fn from_token(token: SecurityTokenElement) -> Self {
        Self {
            token: Some(token),
            key_identifier: None,
        }
    }

    /// Sets the key identifier.
    #[must_use]
    pub fn with_key_identifier(mut self, clause: KeyIdentifierClause) -> Self {
        self.key_identifier = Some(clause);
        self
    }

    /// Returns true if the reference names a token or a key.
    #[must_use]
    pub const fn is_resolvable(&self) -> bool {
        self.token.is_some() || self.key_identifier.is_some()
    }
}
