//! Serializer configuration.

use serde::{Deserialize, Serialize};

use crate::version::ProtocolVersion;

/// Options controlling how messages are read and written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Version used by [`crate::WsTrustSerializer::default`].
    pub default_version: ProtocolVersion,

    /// Keep elements from non-WS-Trust namespaces as extension properties.
    /// When false they are rejected.
    pub capture_foreign_elements: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            default_version: ProtocolVersion::Trust13,
            capture_foreign_elements: true,
        }
    }
}
