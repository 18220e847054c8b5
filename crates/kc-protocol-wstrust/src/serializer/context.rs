//! Collaborators injected into the serializer.

use std::fmt;
use std::sync::Arc;

use crate::config::SerializerConfig;
use crate::keys::{EmptyTokenResolver, TokenResolver};
use crate::token::{HandlerCollectionManager, TokenHandlerCollection, TokenHandlerUsage};

/// Token handlers, resolvers and options shared by every read and write.
#[derive(Clone)]
pub struct SerializationContext {
    handlers: Arc<HandlerCollectionManager>,
    token_resolver: Arc<dyn TokenResolver>,
    use_key_resolver: Arc<dyn TokenResolver>,
    config: SerializerConfig,
}

impl fmt::Debug for SerializationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationContext")
            .field("handlers", &self.handlers)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for SerializationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializationContext {
    /// Creates a context with no handlers, empty resolvers and default
    /// options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(HandlerCollectionManager::new()),
            token_resolver: Arc::new(EmptyTokenResolver),
            use_key_resolver: Arc::new(EmptyTokenResolver),
            config: SerializerConfig::default(),
        }
    }

    /// Sets the handler collections.
    #[must_use]
    pub fn with_handlers(mut self, handlers: Arc<HandlerCollectionManager>) -> Self {
        self.handlers = handlers;
        self
    }

    /// Sets the resolver used to unwrap encrypted keys.
    #[must_use]
    pub fn with_token_resolver(mut self, resolver: Arc<dyn TokenResolver>) -> Self {
        self.token_resolver = resolver;
        self
    }

    /// Sets the resolver used to check `UseKey` proof of possession.
    #[must_use]
    pub fn with_use_key_resolver(mut self, resolver: Arc<dyn TokenResolver>) -> Self {
        self.use_key_resolver = resolver;
        self
    }

    /// Sets the options.
    #[must_use]
    pub fn with_config(mut self, config: SerializerConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the handler collections.
    #[must_use]
    pub fn handlers(&self) -> &HandlerCollectionManager {
        &self.handlers
    }

    /// Returns the `Default` handler collection.
    #[must_use]
    pub fn default_handlers(&self) -> Arc<TokenHandlerCollection> {
        self.handlers.default_collection()
    }

    /// Returns the collection for a usage, falling back to `Default`.
    #[must_use]
    pub fn handlers_for(&self, usage: TokenHandlerUsage) -> Arc<TokenHandlerCollection> {
        self.handlers
            .get(usage)
            .unwrap_or_else(|| self.default_handlers())
    }

    /// Returns the resolver used to unwrap encrypted keys.
    #[must_use]
    pub fn token_resolver(&self) -> &dyn TokenResolver {
        self.token_resolver.as_ref()
    }

    /// Returns the resolver used to check `UseKey`.
    #[must_use]
    pub fn use_key_resolver(&self) -> &dyn TokenResolver {
        self.use_key_resolver.as_ref()
    }

    /// Returns the options.
    #[must_use]
    pub const fn config(&self) -> &SerializerConfig {
        &self.config
    }
}
