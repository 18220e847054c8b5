//! Verbatim XML snapshots.

use std::fmt;

/// A namespace-qualified XML name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Namespace URI, empty for unqualified names.
    pub namespace: String,
    /// Local name.
    pub local: String,
}

impl QualifiedName {
    /// Creates a qualified name.
    #[must_use]
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Returns true if this name matches the given local name and namespace.
    #[must_use]
    pub fn is(&self, local: &str, namespace: &str) -> bool {
        self.local == local && self.namespace == namespace
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

/// A self-contained XML element captured verbatim.
///
/// Every namespace prefix used inside the snapshot is declared inside it,
/// so the text can be re-emitted anywhere without changing its meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XmlFragment {
    root: QualifiedName,
    xml: String,
}

impl XmlFragment {
    /// Creates a fragment from already self-contained XML text.
    ///
    /// The root name is taken on trust; use [`XmlFragment::parse`] to derive
    /// it from the text.
    #[must_use]
    pub fn new(root: QualifiedName, xml: impl Into<String>) -> Self {
        Self {
            root,
            xml: xml.into(),
        }
    }

    /// Parses a standalone element and captures it as a fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a single well-formed element.
    pub fn parse(xml: &str) -> crate::WsTrustResult<Self> {
        let mut cursor = super::XmlCursor::new(xml);
        let fragment = cursor.capture_element()?;
        cursor.expect_eof()?;
        Ok(fragment)
    }

    /// Returns the qualified name of the root element.
    #[must_use]
    pub fn root(&self) -> &QualifiedName {
        &self.root
    }

    /// Returns the XML text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.xml
    }

    /// Returns a cursor positioned before the root element.
    #[must_use]
    pub fn cursor(&self) -> super::XmlCursor<'_> {
        super::XmlCursor::new(&self.xml)
    }
}

impl fmt::Display for XmlFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.xml)
    }
}
