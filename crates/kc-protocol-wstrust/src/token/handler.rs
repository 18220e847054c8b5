//! Token handlers and usage-scoped handler collections.
//!
//! Concrete token types (X.509, SAML, session tokens) are parsed and written
//! by [`SecurityTokenHandler`] implementations registered with a
//! [`TokenHandlerCollection`]. A [`HandlerCollectionManager`] keeps one
//! collection per [`TokenHandlerUsage`], so delegation tokens can be handled
//! by a different set of handlers than ordinary tokens.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{WsTrustError, WsTrustResult};
use crate::keys::{
    is_standard_clause, read_standard_clause, write_standard_clause, KeyIdentifierClause,
};
use crate::xml::{XmlEmitter, XmlFragment};

/// A parsed security token.
pub trait SecurityToken: fmt::Debug + Send + Sync {
    /// Returns the token identifier.
    fn id(&self) -> &str;

    /// Returns a clause identifying the token's key, if it has one.
    ///
    /// Used to prove possession of a UseKey token.
    fn key_identifier_clause(&self) -> Option<KeyIdentifierClause> {
        None
    }

    /// Returns the token as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Reads and writes one concrete token type.
pub trait SecurityTokenHandler: Send + Sync {
    /// Returns a short name for diagnostics.
    fn name(&self) -> &str;

    /// Returns true if the handler understands this token XML.
    fn can_read_token(&self, xml: &XmlFragment) -> bool;

    /// Parses the token XML.
    ///
    /// # Errors
    ///
    /// Returns an error if the XML is not a valid token of this type.
    fn read_token(&self, xml: &XmlFragment) -> WsTrustResult<Arc<dyn SecurityToken>>;

    /// Returns true if the handler can serialize this token.
    fn can_write_token(&self, token: &dyn SecurityToken) -> bool;

    /// Serializes the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be serialized.
    fn write_token(&self, token: &dyn SecurityToken) -> WsTrustResult<XmlFragment>;

    /// Returns true if the handler understands this key identifier clause.
    fn can_read_key_identifier_clause(&self, _xml: &XmlFragment) -> bool {
        false
    }

    /// Parses a key identifier clause.
    ///
    /// # Errors
    ///
    /// Returns an error if the clause is not understood.
    fn read_key_identifier_clause(&self, xml: &XmlFragment) -> WsTrustResult<KeyIdentifierClause> {
        Err(WsTrustError::unsupported(format!(
            "{} cannot read key identifier clause {}",
            self.name(),
            xml.root()
        )))
    }

    /// Returns true if the handler can serialize this clause.
    fn can_write_key_identifier_clause(&self, _clause: &KeyIdentifierClause) -> bool {
        false
    }

    /// Serializes a key identifier clause.
    ///
    /// # Errors
    ///
    /// Returns an error if the clause is not supported.
    fn write_key_identifier_clause(
        &self,
        _clause: &KeyIdentifierClause,
    ) -> WsTrustResult<XmlFragment> {
        Err(WsTrustError::unsupported(format!(
            "{} cannot write key identifier clauses",
            self.name()
        )))
    }
}

/// The role a handler collection plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenHandlerUsage {
    /// Ordinary tokens.
    Default,
    /// Tokens in `OnBehalfOf`.
    OnBehalfOf,
    /// Tokens in `ActAs`.
    ActAs,
}

impl fmt::Display for TokenHandlerUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::OnBehalfOf => f.write_str("OnBehalfOf"),
            Self::ActAs => f.write_str("ActAs"),
        }
    }
}

/// An ordered set of token handlers.
///
/// Handlers are consulted in registration order; the first that claims the
/// input wins.
#[derive(Default)]
pub struct TokenHandlerCollection {
    handlers: RwLock<Vec<Arc<dyn SecurityTokenHandler>>>,
}

impl fmt::Debug for TokenHandlerCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .handlers
            .read()
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        f.debug_struct("TokenHandlerCollection")
            .field("handlers", &names)
            .finish()
    }
}

impl TokenHandlerCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler and returns the collection.
    #[must_use]
    pub fn with_handler(self, handler: Arc<dyn SecurityTokenHandler>) -> Self {
        self.add_handler(handler);
        self
    }

    /// Adds a handler.
    pub fn add_handler(&self, handler: Arc<dyn SecurityTokenHandler>) {
        self.handlers.write().push(handler);
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Returns true if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    fn find(
        &self,
        predicate: impl Fn(&dyn SecurityTokenHandler) -> bool,
    ) -> Option<Arc<dyn SecurityTokenHandler>> {
        self.handlers
            .read()
            .iter()
            .find(|handler| predicate(handler.as_ref()))
            .map(Arc::clone)
    }

    /// Returns true if some handler can read the token XML.
    #[must_use]
    pub fn can_read_token(&self, xml: &XmlFragment) -> bool {
        self.find(|h| h.can_read_token(xml)).is_some()
    }

    /// Reads a token with the first handler that claims it.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::UnsupportedContent`] if no handler claims the
    /// XML, or the handler's own error.
    pub fn read_token(&self, xml: &XmlFragment) -> WsTrustResult<Arc<dyn SecurityToken>> {
        let handler = self.find(|h| h.can_read_token(xml)).ok_or_else(|| {
            WsTrustError::unsupported(format!("no token handler can read {}", xml.root()))
        })?;
        tracing::debug!(handler = handler.name(), element = %xml.root(), "reading token");
        handler.read_token(xml)
    }

    /// Returns true if some handler can write the token.
    #[must_use]
    pub fn can_write_token(&self, token: &dyn SecurityToken) -> bool {
        self.find(|h| h.can_write_token(token)).is_some()
    }

    /// Writes a token with the first handler able to.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::UnsupportedContent`] if no handler can write the
    /// token, or the handler's own error.
    pub fn write_token(
        &self,
        emitter: &mut XmlEmitter,
        token: &dyn SecurityToken,
    ) -> WsTrustResult<()> {
        let handler = self.find(|h| h.can_write_token(token)).ok_or_else(|| {
            WsTrustError::unsupported(format!("no token handler can write token {}", token.id()))
        })?;
        let fragment = handler.write_token(token)?;
        emitter.raw(&fragment);
        Ok(())
    }

    /// Returns true if a handler or a standard shape covers the clause XML.
    #[must_use]
    pub fn can_read_key_identifier_clause(&self, xml: &XmlFragment) -> bool {
        is_standard_clause(xml.root())
            || self
                .find(|h| h.can_read_key_identifier_clause(xml))
                .is_some()
    }

    /// Reads a key identifier clause.
    ///
    /// Registered handlers are offered the XML first; the XML-DSig,
    /// WS-Security and XML-Enc shapes are the fallback.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::UnsupportedContent`] if nothing understands the
    /// clause, or a wire-format error for a malformed standard shape.
    pub fn read_key_identifier_clause(
        &self,
        xml: &XmlFragment,
    ) -> WsTrustResult<KeyIdentifierClause> {
        if let Some(handler) = self.find(|h| h.can_read_key_identifier_clause(xml)) {
            return handler.read_key_identifier_clause(xml);
        }
        let nested = |inner: &XmlFragment| {
            if self.can_read_key_identifier_clause(inner) {
                self.read_key_identifier_clause(inner)
            } else {
                Ok(KeyIdentifierClause::Custom(inner.clone()))
            }
        };
        read_standard_clause(xml, &nested)?.ok_or_else(|| {
            WsTrustError::unsupported(format!(
                "no handler can read key identifier clause {}",
                xml.root()
            ))
        })
    }

    /// Writes a key identifier clause.
    ///
    /// # Errors
    ///
    /// Returns an error if the handler or emitter fails.
    pub fn write_key_identifier_clause(
        &self,
        emitter: &mut XmlEmitter,
        clause: &KeyIdentifierClause,
    ) -> WsTrustResult<()> {
        if let Some(handler) = self.find(|h| h.can_write_key_identifier_clause(clause)) {
            let fragment = handler.write_key_identifier_clause(clause)?;
            emitter.raw(&fragment);
            return Ok(());
        }
        let nested = |emitter: &mut XmlEmitter, inner: &KeyIdentifierClause| {
            self.write_key_identifier_clause(emitter, inner)
        };
        write_standard_clause(emitter, clause, &nested)
    }
}

/// Handler collections keyed by usage.
///
/// A `Default` collection always exists. `OnBehalfOf` and `ActAs`
/// collections must be registered before messages carrying those elements
/// can be read.
#[derive(Debug)]
pub struct HandlerCollectionManager {
    collections: DashMap<TokenHandlerUsage, Arc<TokenHandlerCollection>>,
}

impl Default for HandlerCollectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerCollectionManager {
    /// Creates a manager with an empty `Default` collection.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default(TokenHandlerCollection::new())
    }

    /// Creates a manager with the given `Default` collection.
    #[must_use]
    pub fn with_default(collection: TokenHandlerCollection) -> Self {
        let collections = DashMap::new();
        collections.insert(TokenHandlerUsage::Default, Arc::new(collection));
        Self { collections }
    }

    /// Registers the collection for a usage, replacing any previous one.
    pub fn register(&self, usage: TokenHandlerUsage, collection: Arc<TokenHandlerCollection>) {
        self.collections.insert(usage, collection);
    }

    /// Registers the collection for a usage and returns the manager.
    #[must_use]
    pub fn with_collection(
        self,
        usage: TokenHandlerUsage,
        collection: Arc<TokenHandlerCollection>,
    ) -> Self {
        self.register(usage, collection);
        self
    }

    /// Returns the collection for a usage, if registered.
    #[must_use]
    pub fn get(&self, usage: TokenHandlerUsage) -> Option<Arc<TokenHandlerCollection>> {
        self.collections.get(&usage).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns true if a collection is registered for the usage.
    #[must_use]
    pub fn contains(&self, usage: TokenHandlerUsage) -> bool {
        self.collections.contains_key(&usage)
    }

    /// Returns the `Default` collection.
    #[must_use]
    pub fn default_collection(&self) -> Arc<TokenHandlerCollection> {
        self.get(TokenHandlerUsage::Default)
            .unwrap_or_else(|| Arc::new(TokenHandlerCollection::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct NamedToken(String);

    impl SecurityToken for NamedToken {
        fn id(&self) -> &str {
            &self.0
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct NamedTokenHandler;

    impl SecurityTokenHandler for NamedTokenHandler {
        fn name(&self) -> &str {
            "named"
        }

        fn can_read_token(&self, xml: &XmlFragment) -> bool {
            xml.root().is("Named", "urn:named")
        }

        fn read_token(&self, xml: &XmlFragment) -> WsTrustResult<Arc<dyn SecurityToken>> {
            let mut cursor = xml.cursor();
            let id = cursor.read_element_text("Named", "urn:named")?;
            Ok(Arc::new(NamedToken(id)))
        }

        fn can_write_token(&self, token: &dyn SecurityToken) -> bool {
            token.as_any().is::<NamedToken>()
        }

        fn write_token(&self, token: &dyn SecurityToken) -> WsTrustResult<XmlFragment> {
            XmlFragment::parse(&format!(r#"<n:Named xmlns:n="urn:named">{}</n:Named>"#, token.id()))
        }
    }

    #[test]
    fn collection_reads_and_writes_with_matching_handler() {
        let collection = TokenHandlerCollection::new().with_handler(Arc::new(NamedTokenHandler));
        let xml = XmlFragment::parse(r#"<n:Named xmlns:n="urn:named">alice</n:Named>"#).unwrap();
        assert!(collection.can_read_token(&xml));
        let token = collection.read_token(&xml).unwrap();
        assert_eq!(token.id(), "alice");

        let mut emitter = XmlEmitter::new();
        collection.write_token(&mut emitter, token.as_ref()).unwrap();
        assert_eq!(emitter.into_string().unwrap(), xml.as_str());
    }

    #[test]
    fn unclaimed_token_is_unsupported() {
        let collection = TokenHandlerCollection::new();
        let xml = XmlFragment::parse(r#"<x:Other xmlns:x="urn:x"/>"#).unwrap();
        assert!(!collection.can_read_token(&xml));
        assert!(matches!(
            collection.read_token(&xml),
            Err(WsTrustError::UnsupportedContent(_))
        ));
    }

    #[test]
    fn standard_clauses_need_no_handler() {
        let collection = TokenHandlerCollection::new();
        let xml = XmlFragment::parse(
            r#"<ds:KeyName xmlns:ds="http://www.w3.org/2000/09/xmldsig#">k1</ds:KeyName>"#,
        )
        .unwrap();
        assert!(collection.can_read_key_identifier_clause(&xml));
        assert_eq!(
            collection.read_key_identifier_clause(&xml).unwrap(),
            KeyIdentifierClause::KeyName("k1".to_string())
        );
    }

    #[test]
    fn manager_scopes_collections_by_usage() {
        let manager = HandlerCollectionManager::new();
        assert!(manager.contains(TokenHandlerUsage::Default));
        assert!(!manager.contains(TokenHandlerUsage::ActAs));

        let act_as =
            Arc::new(TokenHandlerCollection::new().with_handler(Arc::new(NamedTokenHandler)));
        manager.register(TokenHandlerUsage::ActAs, act_as);
        assert_eq!(manager.get(TokenHandlerUsage::ActAs).map(|c| c.len()), Some(1));
        assert!(manager.default_collection().is_empty());
    }
}
