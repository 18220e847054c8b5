//! Common test utilities and fixtures.

use std::any::Any;
use std::sync::Arc;

use kc_protocol_wstrust::keys::{KeyIdentifierClause, SecurityKey, TokenResolver};
use kc_protocol_wstrust::token::{
    HandlerCollectionManager, SecurityToken, SecurityTokenElement, SecurityTokenHandler,
    TokenHandlerCollection, TokenHandlerUsage,
};
use kc_protocol_wstrust::xml::XmlFragment;
use kc_protocol_wstrust::{ProtocolVersion, SerializationContext, WsTrustResult, WsTrustSerializer};

/// Namespace of the test ticket token.
pub const TICKET_NS: &str = "urn:example:ticket";

/// AES-256 key wrap algorithm URI.
pub const KW_AES256: &str = "http://www.w3.org/2001/04/xmlenc#kw-aes256";

/// A minimal token: `<tk:Ticket>id</tk:Ticket>`.
#[derive(Debug)]
pub struct Ticket {
    id: String,
}

impl Ticket {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The clause a ticket's key is known by.
    pub fn clause_for(id: &str) -> KeyIdentifierClause {
        KeyIdentifierClause::KeyName(format!("ticket:{id}"))
    }
}

impl SecurityToken for Ticket {
    fn id(&self) -> &str {
        &self.id
    }

    fn key_identifier_clause(&self) -> Option<KeyIdentifierClause> {
        Some(Self::clause_for(&self.id))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reads and writes [`Ticket`] tokens.
pub struct TicketHandler;

impl SecurityTokenHandler for TicketHandler {
    fn name(&self) -> &str {
        "ticket"
    }

    fn can_read_token(&self, xml: &XmlFragment) -> bool {
        xml.root().is("Ticket", TICKET_NS)
    }

    fn read_token(&self, xml: &XmlFragment) -> WsTrustResult<Arc<dyn SecurityToken>> {
        let id = xml.cursor().read_element_text("Ticket", TICKET_NS)?;
        Ok(Arc::new(Ticket::new(id)))
    }

    fn can_write_token(&self, token: &dyn SecurityToken) -> bool {
        token.as_any().is::<Ticket>()
    }

    fn write_token(&self, token: &dyn SecurityToken) -> WsTrustResult<XmlFragment> {
        Ok(ticket_xml(token.id()))
    }
}

/// Returns the XML of a ticket.
pub fn ticket_xml(id: &str) -> XmlFragment {
    XmlFragment::parse(&format!(r#"<tk:Ticket xmlns:tk="{TICKET_NS}">{id}</tk:Ticket>"#))
        .expect("ticket XML is well-formed")
}

/// Returns an unresolved token element holding a ticket.
pub fn ticket_element(id: &str) -> SecurityTokenElement {
    SecurityTokenElement::from_xml(ticket_xml(id))
}

/// A key that "wraps" by XOR-ing every byte.
#[derive(Debug)]
pub struct XorKey(pub u8);

impl SecurityKey for XorKey {
    fn decrypt_key(&self, _algorithm: &str, wrapped_key: &[u8]) -> WsTrustResult<Vec<u8>> {
        Ok(wrapped_key.iter().map(|b| b ^ self.0).collect())
    }

    fn encrypt_key(&self, _algorithm: &str, key: &[u8]) -> WsTrustResult<Vec<u8>> {
        Ok(key.iter().map(|b| b ^ self.0).collect())
    }
}

fn ticket_handlers() -> Arc<TokenHandlerCollection> {
    Arc::new(TokenHandlerCollection::new().with_handler(Arc::new(TicketHandler)))
}

/// Handler collections for every usage, all understanding tickets.
pub fn all_usages() -> Arc<HandlerCollectionManager> {
    Arc::new(
        HandlerCollectionManager::new()
            .with_collection(TokenHandlerUsage::Default, ticket_handlers())
            .with_collection(TokenHandlerUsage::OnBehalfOf, ticket_handlers())
            .with_collection(TokenHandlerUsage::ActAs, ticket_handlers()),
    )
}

/// Test environment holding a serialization context.
pub struct TestEnv {
    pub context: SerializationContext,
}

impl TestEnv {
    /// Creates an environment with ticket handlers for every usage and
    /// empty resolvers.
    pub fn new() -> Self {
        // Initialize tracing for tests
        let _ = tracing_subscriber::fmt()
            .with_env_filter("kc_protocol_wstrust=debug")
            .with_test_writer()
            .try_init();

        Self {
            context: SerializationContext::new().with_handlers(all_usages()),
        }
    }

    /// Replaces the resolver used for wrapped keys.
    pub fn with_token_resolver(mut self, resolver: Arc<dyn TokenResolver>) -> Self {
        self.context = self.context.with_token_resolver(resolver);
        self
    }

    /// Replaces the resolver used for UseKey.
    pub fn with_use_key_resolver(mut self, resolver: Arc<dyn TokenResolver>) -> Self {
        self.context = self.context.with_use_key_resolver(resolver);
        self
    }

    /// Returns a serializer for a version sharing this environment's context.
    pub fn serializer(&self, version: ProtocolVersion) -> WsTrustSerializer {
        WsTrustSerializer::with_context(version, self.context.clone())
    }
}
