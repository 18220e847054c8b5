//! WS-Trust message serializer.
//!
//! [`WsTrustSerializer`] reads and writes RST, RSTR and RSTR collection
//! documents for one protocol version. Reading is order-independent; writing
//! emits a fixed canonical order.
//!
//! # Example
//!
//! ```
//! use kc_protocol_wstrust::{KeyType, ProtocolVersion, RequestSecurityToken, WsTrustSerializer};
//!
//! let serializer = WsTrustSerializer::new(ProtocolVersion::Trust13);
//! let rst = RequestSecurityToken::issue()
//!     .with_key_type(KeyType::Bearer)
//!     .with_applies_to("https://svc.example/");
//!
//! let xml = serializer.write_request(&rst).unwrap();
//! assert_eq!(serializer.read_request(&xml).unwrap(), rst);
//! ```

mod context;
mod elements;
mod request;
mod response;
mod trust13;

pub use context::SerializationContext;

use elements::{peek_name, reject, Codec};

use crate::error::{WsTrustError, WsTrustResult};
use crate::types::constants::elements as names;
use crate::types::{
    RequestSecurityToken, RequestSecurityTokenResponse, RequestSecurityTokenResponseCollection,
};
use crate::version::{ProtocolVersion, TrustAdapter};
use crate::xml::{XmlCursor, XmlEmitter};

/// Reads and writes WS-Trust messages of one protocol version.
#[derive(Debug, Clone)]
pub struct WsTrustSerializer {
    version: ProtocolVersion,
    context: SerializationContext,
}

impl Default for WsTrustSerializer {
    fn default() -> Self {
        Self::from_context(SerializationContext::default())
    }
}

impl WsTrustSerializer {
    /// Creates a serializer with an empty context.
    #[must_use]
    pub fn new(version: ProtocolVersion) -> Self {
        Self::with_context(version, SerializationContext::new())
    }

    /// Creates a serializer with the given handlers, resolvers and options.
    #[must_use]
    pub const fn with_context(version: ProtocolVersion, context: SerializationContext) -> Self {
        Self { version, context }
    }

    /// Creates a serializer for the context's configured default version.
    #[must_use]
    pub fn from_context(context: SerializationContext) -> Self {
        let version = context.config().default_version;
        Self::with_context(version, context)
    }

    /// Returns the protocol version.
    #[must_use]
    pub const fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Returns the version's lookup table.
    #[must_use]
    pub fn adapter(&self) -> &'static TrustAdapter {
        self.version.adapter()
    }

    /// Returns the serialization context.
    #[must_use]
    pub const fn context(&self) -> &SerializationContext {
        &self.context
    }

    fn codec(&self) -> Codec<'_> {
        Codec::new(self.adapter(), &self.context)
    }

    /// Returns true if `xml` is a request of this version.
    #[must_use]
    pub fn can_read_request(&self, xml: &str) -> bool {
        self.root_is(xml, names::REQUEST_SECURITY_TOKEN)
    }

    /// Returns true if `xml` is a response or response collection of this
    /// version.
    #[must_use]
    pub fn can_read_response(&self, xml: &str) -> bool {
        self.root_is(xml, names::REQUEST_SECURITY_TOKEN_RESPONSE)
            || (self.adapter().supports_response_collection
                && self.root_is(xml, names::REQUEST_SECURITY_TOKEN_RESPONSE_COLLECTION))
    }

    fn root_is(&self, xml: &str, local: &str) -> bool {
        XmlCursor::new(xml)
            .is_start_element_named(local, self.adapter().namespace)
            .unwrap_or(false)
    }

    /// Parses a `RequestSecurityToken` document.
    ///
    /// # Errors
    ///
    /// - [`WsTrustError::MalformedWireFormat`] if the document is not a
    ///   request of this version or a value is unparsable.
    /// - [`WsTrustError::UnsupportedContent`] for vocabulary or embedded
    ///   content nothing understands.
    /// - [`WsTrustError::UnresolvedKeyMaterial`] if encrypted entropy cannot
    ///   be unwrapped.
    /// - [`WsTrustError::InvalidRequestSemantics`] if the request violates a
    ///   cross-field invariant.
    pub fn read_request(&self, xml: &str) -> WsTrustResult<RequestSecurityToken> {
        let mut cursor = XmlCursor::new(xml);
        let rst = request::read_request(&mut cursor, &self.codec())?;
        cursor.expect_eof()?;
        tracing::debug!(
            version = %self.version,
            root = names::REQUEST_SECURITY_TOKEN,
            context = rst.context.as_deref().unwrap_or_default(),
            "read WS-Trust request"
        );
        Ok(rst)
    }

    /// Serializes a `RequestSecurityToken` document.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::InvalidRequestSemantics`] if the request fails
    /// validation, and [`WsTrustError::UnsupportedContent`] for fields this
    /// version cannot express.
    pub fn write_request(&self, rst: &RequestSecurityToken) -> WsTrustResult<String> {
        let mut emitter = XmlEmitter::new();
        request::write_request(&mut emitter, rst, &self.codec())?;
        tracing::debug!(
            version = %self.version,
            root = names::REQUEST_SECURITY_TOKEN,
            context = rst.context.as_deref().unwrap_or_default(),
            "wrote WS-Trust request"
        );
        emitter.into_string()
    }

    /// Parses a bare `RequestSecurityTokenResponse` document.
    ///
    /// # Errors
    ///
    /// See [`WsTrustSerializer::read_request`].
    pub fn read_response(&self, xml: &str) -> WsTrustResult<RequestSecurityTokenResponse> {
        let mut cursor = XmlCursor::new(xml);
        let rstr = response::read_response(&mut cursor, &self.codec())?;
        cursor.expect_eof()?;
        tracing::debug!(
            version = %self.version,
            root = names::REQUEST_SECURITY_TOKEN_RESPONSE,
            context = rstr.context.as_deref().unwrap_or_default(),
            "read WS-Trust response"
        );
        Ok(rstr)
    }

    /// Serializes a bare `RequestSecurityTokenResponse`, ignoring
    /// [`RequestSecurityTokenResponse::is_final`].
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be written.
    pub fn write_response(&self, rstr: &RequestSecurityTokenResponse) -> WsTrustResult<String> {
        let mut emitter = XmlEmitter::new();
        response::write_response(&mut emitter, rstr, &self.codec())?;
        tracing::debug!(
            version = %self.version,
            root = names::REQUEST_SECURITY_TOKEN_RESPONSE,
            context = rstr.context.as_deref().unwrap_or_default(),
            "wrote WS-Trust response"
        );
        emitter.into_string()
    }

    /// Parses a `RequestSecurityTokenResponseCollection` document. Every
    /// response read from it is final.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::UnsupportedContent`] for Feb2005, and
    /// [`WsTrustError::MalformedWireFormat`] for an empty collection.
    pub fn read_response_collection(
        &self,
        xml: &str,
    ) -> WsTrustResult<RequestSecurityTokenResponseCollection> {
        let mut cursor = XmlCursor::new(xml);
        let collection = trust13::read_response_collection(&mut cursor, &self.codec())?;
        cursor.expect_eof()?;
        tracing::debug!(
            version = %self.version,
            root = names::REQUEST_SECURITY_TOKEN_RESPONSE_COLLECTION,
            responses = collection.responses.len(),
            "read WS-Trust response collection"
        );
        Ok(collection)
    }

    /// Serializes a `RequestSecurityTokenResponseCollection`.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::UnsupportedContent`] for Feb2005, and
    /// [`WsTrustError::InvalidRequestSemantics`] for an empty collection.
    pub fn write_response_collection(
        &self,
        collection: &RequestSecurityTokenResponseCollection,
    ) -> WsTrustResult<String> {
        let mut emitter = XmlEmitter::new();
        trust13::write_response_collection(&mut emitter, collection, &self.codec())?;
        tracing::debug!(
            version = %self.version,
            root = names::REQUEST_SECURITY_TOKEN_RESPONSE_COLLECTION,
            responses = collection.responses.len(),
            "wrote WS-Trust response collection"
        );
        emitter.into_string()
    }

    /// Serializes a response, wrapping it in a one-element collection when
    /// it is final and the version has collections.
    ///
    /// Non-final responses are never wrapped.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be written.
    pub fn write_final_response(
        &self,
        rstr: &RequestSecurityTokenResponse,
    ) -> WsTrustResult<String> {
        if rstr.is_final && self.adapter().supports_response_collection {
            let collection =
                RequestSecurityTokenResponseCollection::new().with_response(rstr.clone());
            self.write_response_collection(&collection)
        } else {
            self.write_response(rstr)
        }
    }

    /// Parses either a bare response or a collection holding exactly one.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::InvalidRequestSemantics`] if a collection
    /// holds more than one response.
    pub fn read_final_response(&self, xml: &str) -> WsTrustResult<RequestSecurityTokenResponse> {
        let collection_root = self.adapter().supports_response_collection
            && self.root_is(xml, names::REQUEST_SECURITY_TOKEN_RESPONSE_COLLECTION);
        if !collection_root {
            return self.read_response(xml);
        }

        let mut collection = self.read_response_collection(xml)?;
        if collection.responses.len() != 1 {
            return Err(reject(WsTrustError::invalid_request(format!(
                "expected one final response, found {}",
                collection.responses.len()
            ))));
        }
        collection
            .responses
            .pop()
            .ok_or_else(|| {
                WsTrustError::malformed("RequestSecurityTokenResponse", "empty collection")
            })
    }

    /// Parses a request of whichever version its root namespace names.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::MalformedWireFormat`] if the root is not in a
    /// WS-Trust namespace, otherwise see
    /// [`WsTrustSerializer::read_request`].
    pub fn read_request_any(
        &self,
        xml: &str,
    ) -> WsTrustResult<(ProtocolVersion, RequestSecurityToken)> {
        let version = sniff_version(xml)?;
        let serializer = Self::with_context(version, self.context.clone());
        Ok((version, serializer.read_request(xml)?))
    }

    /// Parses a response, or a collection holding one final response, of
    /// whichever version its root namespace names.
    ///
    /// # Errors
    ///
    /// See [`WsTrustSerializer::read_request_any`] and
    /// [`WsTrustSerializer::read_final_response`].
    pub fn read_response_any(
        &self,
        xml: &str,
    ) -> WsTrustResult<(ProtocolVersion, RequestSecurityTokenResponse)> {
        let version = sniff_version(xml)?;
        let serializer = Self::with_context(version, self.context.clone());
        Ok((version, serializer.read_final_response(xml)?))
    }
}

/// Determines the protocol version from the root element's namespace.
///
/// # Errors
///
/// Returns [`WsTrustError::MalformedWireFormat`] if there is no root element
/// or its namespace is not a WS-Trust namespace.
pub fn sniff_version(xml: &str) -> WsTrustResult<ProtocolVersion> {
    let mut cursor = XmlCursor::new(xml);
    let Some(root) = peek_name(&mut cursor)? else {
        let actual = cursor.describe_current()?;
        return Err(reject(WsTrustError::malformed("WS-Trust root element", actual)));
    };
    ProtocolVersion::from_namespace(&root.namespace)
        .ok_or_else(|| reject(WsTrustError::malformed("WS-Trust namespace", root.to_string())))
}
