//! Forward-only, namespace-aware XML cursor.
//!
//! Built on `quick_xml::Reader`. The cursor keeps its own namespace scope
//! stack so that it can resolve qualified names and, when capturing a
//! subtree verbatim, declare any prefix the subtree borrows from its
//! ancestors.

use std::collections::{BTreeMap, BTreeSet};

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::fragment::{QualifiedName, XmlFragment};
use crate::error::{WsTrustError, WsTrustResult};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// An attribute of a start element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Resolved attribute name. Unprefixed attributes have no namespace.
    pub name: QualifiedName,
    /// Unescaped value.
    pub value: String,
    prefix: String,
}

/// A start element read from the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    /// Resolved element name.
    pub name: QualifiedName,
    prefix: String,
    attributes: Vec<XmlAttribute>,
    declared: Vec<String>,
    empty: bool,
}

impl StartElement {
    /// Returns the value of an unqualified attribute.
    #[must_use]
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attribute_ns(local, "")
    }

    /// Returns the value of a namespace-qualified attribute.
    #[must_use]
    pub fn attribute_ns(&self, local: &str, namespace: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.is(local, namespace))
            .map(|a| a.value.as_str())
    }

    /// Returns all attributes except namespace declarations.
    #[must_use]
    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    /// Returns true if the element was written as `<x/>`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.empty
    }
}

#[derive(Debug)]
enum Token {
    Start {
        element: StartElement,
        offset: usize,
        end: usize,
    },
    End {
        end: usize,
    },
    Text(String),
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Start { element, .. } => element.name.to_string(),
            Self::End { .. } => "end element".to_string(),
            Self::Text(text) => format!("text '{}'", text.trim()),
            Self::Eof => "end of document".to_string(),
        }
    }
}

/// Forward-only cursor over an XML document.
pub struct XmlCursor<'a> {
    input: &'a str,
    reader: Reader<&'a [u8]>,
    scopes: Vec<Vec<(String, String)>>,
    peeked: Option<Token>,
    // The last consumed start element was `<x/>`; its end has not been consumed yet.
    pending_end: bool,
}

impl std::fmt::Debug for XmlCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlCursor")
            .field("depth", &self.scopes.len())
            .field("pending_end", &self.pending_end)
            .finish_non_exhaustive()
    }
}

impl<'a> XmlCursor<'a> {
    /// Creates a cursor positioned before the first node of `input`.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            reader: Reader::from_str(input),
            scopes: Vec::new(),
            peeked: None,
            pending_end: false,
        }
    }

    /// Returns the next start element without consuming it.
    ///
    /// Returns `None` when the cursor is at an end element, non-whitespace
    /// text or the end of the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying XML is not well-formed.
    pub fn peek_start(&mut self) -> WsTrustResult<Option<&StartElement>> {
        if self.pending_end {
            return Ok(None);
        }
        self.skip_whitespace()?;
        match &self.peeked {
            Some(Token::Start { element, .. }) => Ok(Some(element)),
            _ => Ok(None),
        }
    }

    /// Returns true if the cursor is at any start element.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying XML is not well-formed.
    pub fn is_start_element(&mut self) -> WsTrustResult<bool> {
        Ok(self.peek_start()?.is_some())
    }

    /// Returns true if the cursor is at the named start element.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying XML is not well-formed.
    pub fn is_start_element_named(&mut self, local: &str, namespace: &str) -> WsTrustResult<bool> {
        Ok(self
            .peek_start()?
            .is_some_and(|element| element.name.is(local, namespace)))
    }

    /// Describes the node at the cursor, for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying XML is not well-formed.
    pub fn describe_current(&mut self) -> WsTrustResult<String> {
        if self.pending_end {
            return Ok("end element".to_string());
        }
        self.skip_whitespace()?;
        Ok(self
            .peeked
            .as_ref()
            .map_or_else(|| "end of document".to_string(), Token::describe))
    }

    /// Consumes any start element.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::MalformedWireFormat`] if the cursor is not at a
    /// start element.
    pub fn read_start(&mut self) -> WsTrustResult<StartElement> {
        if self.pending_end {
            return Err(WsTrustError::malformed("start element", "end element"));
        }
        self.skip_whitespace()?;
        match self.take()? {
            Token::Start { element, .. } => {
                self.pending_end = element.empty;
                Ok(element)
            }
            other => Err(WsTrustError::malformed("start element", other.describe())),
        }
    }

    /// Consumes the named start element.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::MalformedWireFormat`] citing the expected and
    /// actual names if the cursor is elsewhere.
    pub fn read_start_element(
        &mut self,
        local: &str,
        namespace: &str,
    ) -> WsTrustResult<StartElement> {
        if !self.is_start_element_named(local, namespace)? {
            let actual = self.describe_current()?;
            return Err(WsTrustError::malformed(
                QualifiedName::new(namespace, local).to_string(),
                actual,
            ));
        }
        self.read_start()
    }

    /// Consumes the end element of the element most recently started.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::MalformedWireFormat`] if the cursor is at
    /// another node.
    pub fn read_end_element(&mut self) -> WsTrustResult<()> {
        if self.pending_end {
            self.pending_end = false;
            return Ok(());
        }
        self.skip_whitespace()?;
        match self.take()? {
            Token::End { .. } => Ok(()),
            other => Err(WsTrustError::malformed("end element", other.describe())),
        }
    }

    /// Reads the text content of the current element up to its end element.
    ///
    /// The end element itself is not consumed.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::MalformedWireFormat`] if a child element is
    /// found instead of text.
    pub fn read_text(&mut self) -> WsTrustResult<String> {
        if self.pending_end {
            return Ok(String::new());
        }
        let mut text = String::new();
        loop {
            self.fill()?;
            match &self.peeked {
                Some(Token::Text(chunk)) => {
                    text.push_str(chunk);
                    self.peeked = None;
                }
                Some(Token::End { .. }) => return Ok(text),
                Some(other) => {
                    return Err(WsTrustError::malformed("text content", other.describe()));
                }
                None => return Ok(text),
            }
        }
    }

    /// Reads the current element, which must contain only text.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor is not at a start element or the
    /// element has child elements.
    pub fn read_element_content_as_string(&mut self) -> WsTrustResult<String> {
        self.read_start()?;
        let text = self.read_text()?;
        self.read_end_element()?;
        Ok(text)
    }

    /// Reads the current element as an `xs:boolean`.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::MalformedWireFormat`] for anything other than
    /// `true`, `false`, `1` or `0`.
    pub fn read_element_content_as_bool(&mut self) -> WsTrustResult<bool> {
        let text = self.read_element_content_as_string()?;
        parse_bool(&text)
    }

    /// Reads the current element as an `xs:int`.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::MalformedWireFormat`] if the content is not an
    /// integer.
    pub fn read_element_content_as_int(&mut self) -> WsTrustResult<i32> {
        let text = self.read_element_content_as_string()?;
        text.trim()
            .parse()
            .map_err(|_| WsTrustError::malformed("xs:int", text.trim()))
    }

    /// Reads the named element, which must contain only text.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor is elsewhere or the element has child
    /// elements.
    pub fn read_element_text(&mut self, local: &str, namespace: &str) -> WsTrustResult<String> {
        self.read_start_element(local, namespace)?;
        let text = self.read_text()?;
        self.read_end_element()?;
        Ok(text)
    }

    /// Consumes the element at the cursor and its whole subtree.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor is not at a start element.
    pub fn skip_element(&mut self) -> WsTrustResult<()> {
        self.capture_element().map(|_| ())
    }

    /// Consumes the element at the cursor and returns it verbatim.
    ///
    /// Namespace prefixes the subtree uses but inherits from its ancestors
    /// are declared on the captured root, so the fragment stands alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor is not at a start element or the
    /// subtree is not well-formed.
    pub fn capture_element(&mut self) -> WsTrustResult<XmlFragment> {
        if self.pending_end {
            return Err(WsTrustError::malformed("start element", "end element"));
        }
        self.skip_whitespace()?;
        let in_scope = self.in_scope();
        let (root, offset, mut end) = match self.take()? {
            Token::Start {
                element,
                offset,
                end,
            } => (element, offset, end),
            other => return Err(WsTrustError::malformed("start element", other.describe())),
        };

        // Declarations made inside the subtree, one frame per open element.
        let mut local_scopes: Vec<Vec<String>> = Vec::new();
        let mut inherited = BTreeSet::new();
        record_inherited(&root, &mut local_scopes, &mut inherited);

        if root.empty {
            local_scopes.pop();
        } else {
            while !local_scopes.is_empty() {
                match self.take()? {
                    Token::Start { element, .. } => {
                        record_inherited(&element, &mut local_scopes, &mut inherited);
                        if element.empty {
                            local_scopes.pop();
                        }
                    }
                    Token::End { end: close } => {
                        local_scopes.pop();
                        end = close;
                    }
                    Token::Text(_) => {}
                    Token::Eof => {
                        return Err(WsTrustError::malformed(
                            format!("end of {}", root.name),
                            "end of document",
                        ));
                    }
                }
            }
        }

        let raw = self
            .input
            .get(offset..end)
            .ok_or_else(|| WsTrustError::Xml("captured element is out of bounds".to_string()))?;

        let mut injected = String::new();
        for prefix in &inherited {
            let Some(uri) = in_scope.get(prefix.as_str()) else {
                continue;
            };
            if prefix.is_empty() {
                if !uri.is_empty() {
                    injected.push_str(&format!(" xmlns=\"{}\"", escape(uri.as_str())));
                }
            } else {
                injected.push_str(&format!(" xmlns:{prefix}=\"{}\"", escape(uri.as_str())));
            }
        }

        let xml = if injected.is_empty() {
            raw.to_string()
        } else {
            let name_len = if root.prefix.is_empty() {
                root.name.local.len()
            } else {
                root.prefix.len() + 1 + root.name.local.len()
            };
            let split = 1 + name_len;
            format!("{}{}{}", &raw[..split], injected, &raw[split..])
        };

        tracing::trace!(element = %root.name, bytes = xml.len(), "captured element");
        Ok(XmlFragment::new(root.name, xml))
    }

    /// Asserts that only whitespace remains in the document.
    ///
    /// # Errors
    ///
    /// Returns [`WsTrustError::MalformedWireFormat`] if more content follows.
    pub fn expect_eof(&mut self) -> WsTrustResult<()> {
        self.skip_whitespace()?;
        match &self.peeked {
            Some(Token::Eof) | None => Ok(()),
            Some(other) => Err(WsTrustError::malformed("end of document", other.describe())),
        }
    }

    fn fill(&mut self) -> WsTrustResult<()> {
        if self.peeked.is_none() {
            self.peeked = Some(self.read_token()?);
        }
        Ok(())
    }

    fn take(&mut self) -> WsTrustResult<Token> {
        self.fill()?;
        Ok(self.peeked.take().unwrap_or(Token::Eof))
    }

    fn skip_whitespace(&mut self) -> WsTrustResult<()> {
        loop {
            self.fill()?;
            match &self.peeked {
                Some(Token::Text(text)) if text.trim().is_empty() => self.peeked = None,
                _ => return Ok(()),
            }
        }
    }

    fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    fn read_token(&mut self) -> WsTrustResult<Token> {
        loop {
            let offset = self.position();
            let event = self.reader.read_event()?;
            match event {
                Event::Start(start) => {
                    let element = self.open(&start, false)?;
                    return Ok(Token::Start {
                        element,
                        offset,
                        end: self.position(),
                    });
                }
                Event::Empty(start) => {
                    let element = self.open(&start, true)?;
                    self.scopes.pop();
                    return Ok(Token::Start {
                        element,
                        offset,
                        end: self.position(),
                    });
                }
                Event::End(_) => {
                    self.scopes.pop();
                    return Ok(Token::End {
                        end: self.position(),
                    });
                }
                Event::Text(text) => {
                    let raw = std::str::from_utf8(&text)
                        .map_err(|e| WsTrustError::Xml(e.to_string()))?;
                    let value = unescape(raw).map_err(|e| WsTrustError::Xml(e.to_string()))?;
                    return Ok(Token::Text(value.into_owned()));
                }
                Event::CData(data) => {
                    let value = String::from_utf8(data.into_inner().into_owned())?;
                    return Ok(Token::Text(value));
                }
                Event::Eof => return Ok(Token::Eof),
                _ => {}
            }
        }
    }

    fn open(&mut self, start: &BytesStart<'_>, empty: bool) -> WsTrustResult<StartElement> {
        let qname = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| WsTrustError::Xml(e.to_string()))?
            .to_string();

        let mut raw_attributes = Vec::new();
        let mut declarations = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| WsTrustError::Xml(e.to_string()))?;
            let key = std::str::from_utf8(attribute.key.as_ref())
                .map_err(|e| WsTrustError::Xml(e.to_string()))?
                .to_string();
            let raw = std::str::from_utf8(&attribute.value)
                .map_err(|e| WsTrustError::Xml(e.to_string()))?;
            let value = unescape(raw)
                .map_err(|e| WsTrustError::Xml(e.to_string()))?
                .into_owned();
            if key == "xmlns" {
                declarations.push((String::new(), value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declarations.push((prefix.to_string(), value));
            } else {
                raw_attributes.push((key, value));
            }
        }

        let declared = declarations.iter().map(|(p, _)| p.clone()).collect();
        self.scopes.push(declarations);

        let (prefix, local) = split_qname(&qname);
        let namespace = self.resolve_prefix(prefix)?;

        let mut attributes = Vec::with_capacity(raw_attributes.len());
        for (key, value) in raw_attributes {
            let (attr_prefix, attr_local) = split_qname(&key);
            let attr_namespace = if attr_prefix.is_empty() {
                String::new()
            } else {
                self.resolve_prefix(attr_prefix)?
            };
            attributes.push(XmlAttribute {
                name: QualifiedName::new(attr_namespace, attr_local),
                value,
                prefix: attr_prefix.to_string(),
            });
        }

        Ok(StartElement {
            name: QualifiedName::new(namespace, local),
            prefix: prefix.to_string(),
            attributes,
            declared,
            empty,
        })
    }

    fn resolve_prefix(&self, prefix: &str) -> WsTrustResult<String> {
        if prefix == "xml" {
            return Ok(XML_NS.to_string());
        }
        let bound = self
            .scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.clone());
        match bound {
            Some(uri) => Ok(uri),
            None if prefix.is_empty() => Ok(String::new()),
            None => Err(WsTrustError::malformed(
                "declared namespace prefix",
                format!("unbound prefix '{prefix}'"),
            )),
        }
    }

    fn in_scope(&self) -> BTreeMap<String, String> {
        let mut bindings = BTreeMap::new();
        for scope in &self.scopes {
            for (prefix, uri) in scope {
                bindings.insert(prefix.clone(), uri.clone());
            }
        }
        bindings
    }
}

fn split_qname(qname: &str) -> (&str, &str) {
    qname.split_once(':').unwrap_or(("", qname))
}

/// Opens a capture scope for `element` and records the prefixes it uses
/// that no enclosing element of the subtree declares.
fn record_inherited(
    element: &StartElement,
    local_scopes: &mut Vec<Vec<String>>,
    inherited: &mut BTreeSet<String>,
) {
    local_scopes.push(element.declared.clone());
    let attribute_prefixes = element
        .attributes
        .iter()
        .map(|attribute| attribute.prefix.as_str())
        .filter(|prefix| !prefix.is_empty() && *prefix != "xml");
    for prefix in std::iter::once(element.prefix.as_str()).chain(attribute_prefixes) {
        let bound_locally = local_scopes
            .iter()
            .any(|scope| scope.iter().any(|declared| declared == prefix));
        if !bound_locally {
            inherited.insert(prefix.to_string());
        }
    }
}

/// Parses an `xs:boolean` lexical value.
///
/// # Errors
///
/// Returns [`WsTrustError::MalformedWireFormat`] for anything other than
/// `true`, `false`, `1` or `0`.
pub fn parse_bool(text: &str) -> WsTrustResult<bool> {
    match text.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(WsTrustError::malformed("xs:boolean", other)),
    }
}
