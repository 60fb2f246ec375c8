//! Owned XML element tree.
//!
//! Both inputs this crate works with, the uncompressed draw.io document and
//! the SVG exported per page, are read into an [`Element`] tree, patched in
//! memory and written back. The tree is deliberately small: elements keep
//! their qualified name verbatim together with the namespace it resolved to,
//! attributes keep document order, and character data is stored in its raw
//! escaped form so that entity references survive a round trip untouched.
//!
//! Parsing and serialization are delegated to [`quick_xml`].
//!
//! # Example
//!
//! ```
//! # use pagelayer::xml::Element;
//! let mut root = Element::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="a"/></svg>"#)
//!     .expect("valid XML");
//! let group = root.child_elements().next().expect("one child");
//! assert_eq!(group.attribute("id"), Some("a"));
//! assert_eq!(group.namespace(), Some("http://www.w3.org/2000/svg"));
//!
//! root.set_attribute("width", "10");
//! let text = root.to_document_string().expect("serializable");
//! assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
//! ```

use std::str;

use quick_xml::{
    NsReader, Writer,
    escape::escape,
    events::{
        BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event,
        attributes::{AttrError, Attribute},
    },
    name::{Namespace, ResolveResult},
};
use thiserror::Error;

/// Namespace URI of SVG elements.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Errors raised while reading or writing an XML tree.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] str::Utf8Error),

    #[error("document has no root element")]
    MissingRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("closing tag `{0}` has no matching opening tag")]
    UnmatchedEnd(String),

    #[error("element `{0}` is never closed")]
    Unclosed(String),

    #[error("failed to write XML: {0}")]
    Write(#[from] std::io::Error),
}

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data, still escaped.
    Text(String),
    CData(String),
    Comment(String),
}

/// An XML element with its attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an element with no namespace, attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Parses a complete document and returns its root element.
    ///
    /// The XML declaration, processing instructions and any document type
    /// declaration are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] when the text is not well-formed XML.
    pub fn parse(text: &str) -> Result<Self, XmlError> {
        let mut reader = NsReader::from_str(text);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (resolved, event) = reader.read_resolved_event()?;
            match event {
                Event::Start(start) => {
                    stack.push(Self::from_start(&start, resolved)?);
                }
                Event::Empty(start) => {
                    let element = Self::from_start(&start, resolved)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(end) => {
                    let element = stack.pop().ok_or_else(|| {
                        XmlError::UnmatchedEnd(String::from_utf8_lossy(end.name().as_ref()).into_owned())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(content) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Text(str::from_utf8(&content)?.to_owned()));
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::CData(str::from_utf8(&data)?.to_owned()));
                    }
                }
                Event::Comment(comment) => {
                    if let Some(parent) = stack.last_mut() {
                        parent
                            .children
                            .push(Node::Comment(str::from_utf8(&comment)?.to_owned()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Unclosed(open.name));
        }
        root.ok_or(XmlError::MissingRoot)
    }

    fn from_start(start: &BytesStart<'_>, resolved: ResolveResult<'_>) -> Result<Self, XmlError> {
        let name = str::from_utf8(start.name().as_ref())?.to_owned();
        let namespace = match resolved {
            ResolveResult::Bound(Namespace(uri)) => Some(str::from_utf8(uri)?.to_owned()),
            _ => None,
        };

        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = str::from_utf8(attribute.key.as_ref())?.to_owned();
            let value = attribute.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            namespace,
            attributes,
            children: Vec::new(),
        })
    }

    /// Qualified name as written in the document, prefix included.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Namespace URI the element name resolved to, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns `true` if the element has the given namespace and local name.
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace() == Some(namespace) && self.local_name() == local_name
    }

    /// Returns the unescaped value of an attribute, looked up by qualified name.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing its value in place if it already exists.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(name, _)| *name == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Iterates over the child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First child element with the given local name, in any namespace.
    pub fn child_named(&self, local_name: &str) -> Option<&Element> {
        self.child_elements()
            .find(|element| element.local_name() == local_name)
    }

    /// Appends a child node.
    pub fn push_child(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    /// Removes and returns the first child element matching `predicate`.
    pub fn take_child(&mut self, mut predicate: impl FnMut(&Element) -> bool) -> Option<Element> {
        let index = self.children.iter().position(|node| match node {
            Node::Element(element) => predicate(element),
            _ => false,
        })?;
        match self.children.remove(index) {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Consumes the element and returns its children.
    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// Serializes the element as a standalone document with an XML declaration.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] if the writer fails.
    pub fn to_document_string(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|err| XmlError::Utf8(err.utf8_error()))
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            let value = escape_attribute_value(value);
            start.push_attribute(Attribute::from((key.as_bytes(), value.as_bytes())));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_to(writer)?,
                Node::Text(text) => {
                    writer.write_event(Event::Text(BytesText::from_escaped(text.as_str())))?
                }
                Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str())))?,
                Node::Comment(comment) => {
                    writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// Escapes an attribute value, including the whitespace characters a parser
/// would otherwise normalize to spaces.
fn escape_attribute_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in escape(value).chars() {
        match c {
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Attaches a finished element to its parent, or makes it the document root.
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_some() => return Err(XmlError::MultipleRoots),
        None => *root = Some(element),
    }
    Ok(())
}
