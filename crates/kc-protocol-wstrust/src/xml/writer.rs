//! XML emitter.
//!
//! A thin layer over `quick_xml::Writer` that tracks namespace declarations
//! so each prefix is declared once, on the outermost element that needs it.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::fragment::XmlFragment;
use crate::error::{WsTrustError, WsTrustResult};

/// Streaming XML writer with namespace bookkeeping.
pub struct XmlEmitter {
    writer: Writer<Vec<u8>>,
    scopes: Vec<Vec<(String, String)>>,
    open: Vec<String>,
}

impl std::fmt::Debug for XmlEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlEmitter")
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl Default for XmlEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlEmitter {
    /// Creates an emitter writing into a fresh buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            scopes: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Opens an element in `namespace` using `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn start_element(
        &mut self,
        prefix: &str,
        local: &str,
        namespace: &str,
    ) -> WsTrustResult<()> {
        self.start_element_with(prefix, local, namespace, &[])
    }

    /// Opens an element with unqualified attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn start_element_with(
        &mut self,
        prefix: &str,
        local: &str,
        namespace: &str,
        attributes: &[(&str, &str)],
    ) -> WsTrustResult<()> {
        let (start, qname) = self.build_start(prefix, local, namespace, attributes);
        self.write(Event::Start(start))?;
        self.open.push(qname);
        Ok(())
    }

    /// Writes an element with no content.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn empty_element(
        &mut self,
        prefix: &str,
        local: &str,
        namespace: &str,
        attributes: &[(&str, &str)],
    ) -> WsTrustResult<()> {
        let (start, _) = self.build_start(prefix, local, namespace, attributes);
        self.scopes.pop();
        self.write(Event::Empty(start))
    }

    /// Closes the innermost open element.
    ///
    /// # Errors
    ///
    /// Returns an error if no element is open or the writer fails.
    pub fn end_element(&mut self) -> WsTrustResult<()> {
        let qname = self
            .open
            .pop()
            .ok_or_else(|| WsTrustError::Xml("end element without start".to_string()))?;
        self.scopes.pop();
        self.write(Event::End(BytesEnd::new(qname)))
    }

    /// Writes escaped text content.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn text(&mut self, value: &str) -> WsTrustResult<()> {
        self.write(Event::Text(BytesText::new(value)))
    }

    /// Writes `<prefix:local>value</prefix:local>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn element_string(
        &mut self,
        prefix: &str,
        local: &str,
        namespace: &str,
        value: &str,
    ) -> WsTrustResult<()> {
        self.start_element(prefix, local, namespace)?;
        self.text(value)?;
        self.end_element()
    }

    /// Writes a captured fragment verbatim.
    pub fn raw(&mut self, fragment: &XmlFragment) {
        self.writer
            .get_mut()
            .extend_from_slice(fragment.as_str().as_bytes());
    }

    /// Finishes writing and returns the document text.
    ///
    /// # Errors
    ///
    /// Returns an error if elements are still open.
    pub fn into_string(self) -> WsTrustResult<String> {
        if let Some(unclosed) = self.open.last() {
            return Err(WsTrustError::Xml(format!("element {unclosed} was not closed")));
        }
        Ok(String::from_utf8(self.writer.into_inner())?)
    }

    fn build_start(
        &mut self,
        prefix: &str,
        local: &str,
        namespace: &str,
        attributes: &[(&str, &str)],
    ) -> (BytesStart<'static>, String) {
        let qname = if prefix.is_empty() {
            local.to_string()
        } else {
            format!("{prefix}:{local}")
        };
        let mut start = BytesStart::new(qname.clone());
        let mut scope = Vec::new();
        if self.bound(prefix) != Some(namespace) {
            let key = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{prefix}")
            };
            start.push_attribute((key.as_str(), namespace));
            scope.push((prefix.to_string(), namespace.to_string()));
        }
        for attribute in attributes {
            start.push_attribute(*attribute);
        }
        self.scopes.push(scope);
        (start, qname)
    }

    fn bound(&self, prefix: &str) -> Option<&str> {
        let found = self
            .scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str());
        match found {
            None if prefix.is_empty() => Some(""),
            other => other,
        }
    }

    fn write(&mut self, event: Event<'_>) -> WsTrustResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| WsTrustError::Xml(e.to_string()))
    }
}
