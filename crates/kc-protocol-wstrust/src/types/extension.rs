//! Ordered bag of unrecognised elements.

use crate::xml::{QualifiedName, XmlFragment};

/// Extension elements keyed by qualified name, in insertion order.
///
/// Read preserves document order, including repeated elements of the same
/// name; write emits the elements after every known element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionProperties {
    entries: Vec<(QualifiedName, XmlFragment)>,
}

impl ExtensionProperties {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fragment under its root name.
    ///
    /// An existing entry with the same name is replaced in place and its
    /// previous payload returned.
    pub fn insert(&mut self, fragment: XmlFragment) -> Option<XmlFragment> {
        let name = fragment.root().clone();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            return Some(std::mem::replace(existing, fragment));
        }
        self.entries.push((name, fragment));
        None
    }

    /// Appends a fragment, keeping any earlier entry with the same name.
    pub fn append(&mut self, fragment: XmlFragment) {
        self.entries.push((fragment.root().clone(), fragment));
    }

    /// Returns the first payload stored for `name`.
    #[must_use]
    pub fn get(&self, name: &QualifiedName) -> Option<&XmlFragment> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, fragment)| fragment)
    }

    /// Iterates every payload stored for `name`.
    pub fn get_all<'a>(
        &'a self,
        name: &'a QualifiedName,
    ) -> impl Iterator<Item = &'a XmlFragment> + 'a {
        self.entries
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, fragment)| fragment)
    }

    /// Removes and returns the first payload stored for `name`.
    pub fn remove(&mut self, name: &QualifiedName) -> Option<XmlFragment> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&QualifiedName, &XmlFragment)> {
        self.entries.iter().map(|(name, fragment)| (name, fragment))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
