//! Owned markup tree built from a quick-xml event stream.
//!
//! The tree keeps every text node, including whitespace between elements,
//! because inline spacing inside paragraphs is significant for citation
//! reconstruction. Callers that only care about structure skip whitespace
//! text themselves.

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;

use crate::tei::ConvertError;

/// A node of the parsed document: an element or a run of character data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element(Element),
    Text(String),
}

impl MarkupNode {
    /// Returns the element if this node is one
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            MarkupNode::Element(element) => Some(element),
            MarkupNode::Text(_) => None,
        }
    }

    /// Returns the raw text if this node is a text node
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MarkupNode::Element(_) => None,
            MarkupNode::Text(text) => Some(text),
        }
    }

    /// True for text nodes made only of whitespace (indentation between elements)
    pub fn is_blank_text(&self) -> bool {
        matches!(self, MarkupNode::Text(text) if text.trim().is_empty())
    }

    /// Concatenated text content of this node and all its descendants
    pub fn text(&self) -> String {
        match self {
            MarkupNode::Element(element) => element.text(),
            MarkupNode::Text(text) => text.clone(),
        }
    }
}

/// An element with its local tag name, attributes and ordered children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Local tag name as written in the document (namespace prefix removed)
    pub name: String,

    /// Attributes keyed by their qualified name (`xml:id` keeps its prefix)
    pub attributes: HashMap<String, String>,

    /// Child nodes in document order
    pub children: Vec<MarkupNode>,
}

impl Element {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set an attribute (builder style)
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Append a child element (builder style)
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(MarkupNode::Element(child));
        self
    }

    /// Append a text child (builder style)
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(MarkupNode::Text(text.into()));
        self
    }

    /// Case-insensitive tag name comparison
    pub fn is_named(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
    }

    /// Attribute value by exact key
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// True when the tag matches and every requested attribute is present with
    /// exactly the requested value
    pub fn matches(&self, tag: &str, attrs: &[(&str, &str)]) -> bool {
        self.is_named(tag)
            && attrs
                .iter()
                .all(|(key, value)| self.attr(key) == Some(*value))
    }

    /// Child elements, skipping text nodes
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(MarkupNode::as_element)
    }

    /// First descendant (excluding `self`) matching the query, in document order
    pub fn find_first(&self, tag: &str, attrs: &[(&str, &str)]) -> Option<&Element> {
        for child in self.child_elements() {
            if child.matches(tag, attrs) {
                return Some(child);
            }
            if let Some(found) = child.find_first(tag, attrs) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants (excluding `self`) matching the query, in document order
    pub fn find_all(&self, tag: &str, attrs: &[(&str, &str)]) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_matching(tag, attrs, &mut found);
        found
    }

    fn collect_matching<'a>(&'a self, tag: &str, attrs: &[(&str, &str)], out: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.matches(tag, attrs) {
                out.push(child);
            }
            child.collect_matching(tag, attrs, out);
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.append_text(&mut out);
        out
    }

    fn append_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                MarkupNode::Element(element) => element.append_text(out),
                MarkupNode::Text(text) => out.push_str(text),
            }
        }
    }
}

/// Parse a markup document into its root element.
///
/// Character data outside the root element (the XML declaration, comments,
/// processing instructions, surrounding whitespace) is discarded.
pub fn parse(markup: &str) -> Result<Element, ConvertError> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                ensure_single_root(&root, position)?;
                stack.push(start_element(e, position)?);
            }
            Ok(Event::Empty(ref e)) => {
                ensure_single_root(&root, position)?;
                let element = start_element(e, position)?;
                attach(element, &mut stack, &mut root);
            }
            Ok(Event::End(ref e)) => {
                let element = stack.pop().ok_or_else(|| {
                    ConvertError::malformed(
                        position,
                        format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.local_name().as_ref())
                        ),
                    )
                })?;
                attach(element, &mut stack, &mut root);
            }
            Ok(Event::Text(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(e.as_ref());
                    let text = unescape_with(&raw, resolve_html5_entity)
                        .map_err(|err| ConvertError::malformed(position, err.to_string()))?;
                    push_text(parent, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(parent) = stack.last_mut() {
                    push_text(parent, &String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, doctypes
            Ok(_) => {}
            Err(e) => {
                return Err(ConvertError::malformed(
                    reader.error_position() as u64,
                    e.to_string(),
                ))
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(ConvertError::malformed(
            reader.buffer_position() as u64,
            format!("unclosed element <{}>", open.name),
        ));
    }

    root.ok_or_else(|| ConvertError::malformed(0, "document has no root element"))
}

fn ensure_single_root(root: &Option<Element>, position: u64) -> Result<(), ConvertError> {
    match root {
        Some(existing) => Err(ConvertError::malformed(
            position,
            format!("content after root element <{}>", existing.name),
        )),
        None => Ok(()),
    }
}

fn start_element(e: &BytesStart<'_>, position: u64) -> Result<Element, ConvertError> {
    let mut element = Element::new(String::from_utf8_lossy(e.local_name().as_ref()));
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ConvertError::malformed(position, err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape_with(&raw, resolve_html5_entity)
            .map_err(|err| ConvertError::malformed(position, err.to_string()))?;
        element.attributes.insert(key, value.into_owned());
    }
    Ok(element)
}

fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(MarkupNode::Element(element)),
        None => *root = Some(element),
    }
}

/// Merge adjacent character data so each text run is a single node
fn push_text(parent: &mut Element, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(MarkupNode::Text(last)) = parent.children.last_mut() {
        last.push_str(text);
    } else {
        parent.children.push(MarkupNode::Text(text.to_string()));
    }
}
