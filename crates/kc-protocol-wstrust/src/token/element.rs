//! Opaque embedded tokens.

use std::sync::Arc;

use super::handler::{SecurityToken, TokenHandlerCollection};
use crate::error::WsTrustResult;
use crate::xml::{XmlEmitter, XmlFragment};

/// A security token embedded in a message.
///
/// Tokens read off the wire stay as captured XML until a caller resolves
/// them against a handler collection. Tokens built in code start resolved.
#[derive(Debug, Clone)]
pub enum SecurityTokenElement {
    /// Captured XML not yet parsed.
    Unresolved(XmlFragment),

    /// A parsed token, with the XML it came from if it was read.
    Resolved {
        /// The token.
        token: Arc<dyn SecurityToken>,
        /// The captured XML the token was parsed from.
        source: Option<XmlFragment>,
    },
}

impl SecurityTokenElement {
    /// Wraps captured XML.
    #[must_use]
    pub const fn from_xml(xml: XmlFragment) -> Self {
        Self::Unresolved(xml)
    }

    /// Wraps a token object.
    #[must_use]
    pub const fn from_token(token: Arc<dyn SecurityToken>) -> Self {
        Self::Resolved { token, source: None }
    }

    /// Returns the captured XML, if any.
    #[must_use]
    pub const fn xml(&self) -> Option<&XmlFragment> {
        match self {
            Self::Unresolved(xml) => Some(xml),
            Self::Resolved { source, .. } => source.as_ref(),
        }
    }

    /// Returns the token if already resolved.
    #[must_use]
    pub const fn token(&self) -> Option<&Arc<dyn SecurityToken>> {
        match self {
            Self::Unresolved(_) => None,
            Self::Resolved { token, .. } => Some(token),
        }
    }

    /// Returns true if the token has been parsed.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    /// Returns the token, parsing the captured XML if needed.
    ///
    /// The element itself is not changed; use
    /// [`SecurityTokenElement::into_resolved`] to keep the result.
    ///
    /// # Errors
    ///
    /// Returns [`crate::WsTrustError::UnsupportedContent`] if no handler
    /// claims the XML, or the handler's parse error.
    pub fn resolve(
        &self,
        handlers: &TokenHandlerCollection,
    ) -> WsTrustResult<Arc<dyn SecurityToken>> {
        match self {
            Self::Resolved { token, .. } => Ok(Arc::clone(token)),
            Self::Unresolved(xml) => handlers.read_token(xml),
        }
    }

    /// Resolves the element and returns it in resolved form.
    ///
    /// # Errors
    ///
    /// See [`SecurityTokenElement::resolve`].
    pub fn into_resolved(self, handlers: &TokenHandlerCollection) -> WsTrustResult<Self> {
        match self {
            Self::Resolved { .. } => Ok(self),
            Self::Unresolved(xml) => {
                let token = handlers.read_token(&xml)?;
                Ok(Self::Resolved {
                    token,
                    source: Some(xml),
                })
            }
        }
    }

    /// Writes the element content.
    ///
    /// Captured XML is re-emitted verbatim; a token built in code is written
    /// by `handlers`.
    ///
    /// # Errors
    ///
    /// Returns an error if a token must be written and no handler can.
    pub fn write(
        &self,
        emitter: &mut XmlEmitter,
        handlers: &TokenHandlerCollection,
    ) -> WsTrustResult<()> {
        match self {
            Self::Unresolved(xml) | Self::Resolved { source: Some(xml), .. } => {
                emitter.raw(xml);
                Ok(())
            }
            Self::Resolved { token, source: None } => handlers.write_token(emitter, token.as_ref()),
        }
    }
}

impl PartialEq for SecurityTokenElement {
    fn eq(&self, other: &Self) -> bool {
        match (self.xml(), other.xml()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => match (self.token(), other.token()) {
                (Some(a), Some(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
                _ => false,
            },
            _ => false,
        }
    }
}

impl From<XmlFragment> for SecurityTokenElement {
    fn from(xml: XmlFragment) -> Self {
        Self::from_xml(xml)
    }
}
