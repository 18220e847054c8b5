//! WS-Addressing endpoint references and participant lists.

use crate::xml::XmlFragment;

/// A WS-Addressing endpoint reference.
///
/// Only the address is interpreted; reference parameters, metadata and any
/// other children are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointReference {
    /// Absolute address URI.
    pub address: String,

    /// Remaining children of the reference, in document order.
    pub details: Vec<XmlFragment>,
}

impl EndpointReference {
    /// Creates a reference to `address`.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            details: Vec::new(),
        }
    }

    /// Appends a verbatim child element.
    #[must_use]
    pub fn with_detail(mut self, detail: XmlFragment) -> Self {
        self.details.push(detail);
        self
    }
}

/// Parties sharing the requested token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Participants {
    /// The primary user of the token.
    pub primary: Option<EndpointReference>,

    /// Other parties, in document order.
    pub participants: Vec<EndpointReference>,
}

impl Participants {
    /// Creates an empty participant list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the primary participant.
    #[must_use]
    pub fn with_primary(mut self, primary: EndpointReference) -> Self {
        self.primary = Some(primary);
        self
    }

    /// Appends a participant.
    #[must_use]
    pub fn with_participant(mut self, participant: EndpointReference) -> Self {
        self.participants.push(participant);
        self
    }

    /// Returns true if there is nothing to write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.participants.is_empty()
    }
}
