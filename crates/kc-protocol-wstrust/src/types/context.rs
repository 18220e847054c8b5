//! WS-Federation authorization context.

use serde::{Deserialize, Serialize};

/// One name/value/scope triple of additional context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextItem {
    /// Absolute URI naming the item.
    pub name: String,

    /// Optional absolute URI scoping the item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Optional value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ContextItem {
    /// Creates an item with a name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: None,
            value: Some(value.into()),
        }
    }

    /// Sets the scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

/// Additional context supplied by the requester.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdditionalContext {
    /// Items in document order.
    pub items: Vec<ContextItem>,
}

impl AdditionalContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item.
    #[must_use]
    pub fn with_item(mut self, item: ContextItem) -> Self {
        self.items.push(item);
        self
    }
}
