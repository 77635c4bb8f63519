//! Owned XML element tree for E-utilities responses.
//!
//! Bodies are read with `quick-xml`'s pull reader into a small tree so the
//! parsed document can outlive the response buffer and be handed between
//! tasks. Attributes are not kept; nothing downstream reads them.
//!
//! Nesting is capped at [`MAX_DEPTH`]. The tree queries recurse, and so do
//! the derived `Drop` and `Debug`, so a deeper body is a parse error rather
//! than a stack overflow.

use crate::error::{PubmedError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Deepest element nesting accepted. PubMed records stay under twenty.
pub const MAX_DEPTH: usize = 256;

/// One node of element content, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its mixed content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    content: Vec<Node>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            content: Vec::new(),
        }
    }

    /// Child elements, skipping text nodes.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.content.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children().find(|e| e.name == name)
    }

    /// First descendant named `name` in document order, excluding `self`.
    pub fn find_first(&self, name: &str) -> Option<&Element> {
        for child in self.children() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find_first(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants named `name` in document order, excluding `self`.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in self.children() {
            if child.name == name {
                found.push(child);
            }
            child.collect_named(name, found);
        }
    }

    /// Concatenated text of the element and its descendants, trimmed.
    ///
    /// Inline markup such as `<i>` inside a title is flattened into the text.
    pub fn text(&self) -> String {
        let mut buf = String::new();
        self.push_text(&mut buf);
        buf.trim().to_string()
    }

    fn push_text(&self, buf: &mut String) {
        for node in &self.content {
            match node {
                Node::Text(t) => buf.push_str(t),
                Node::Element(e) => e.push_text(buf),
            }
        }
    }

    /// Trimmed text, or `None` when the element is blank.
    pub fn non_empty_text(&self) -> Option<String> {
        let text = self.text();
        (!text.is_empty()).then_some(text)
    }
}

/// A parsed E-utilities response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDetailDocument {
    root: Element,
}

impl RawDetailDocument {
    /// Parse a response body.
    ///
    /// # Errors
    ///
    /// `PubmedError::Parse` for malformed markup, mismatched or unclosed
    /// tags, stray text outside the root, or a body without a root element.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().check_end_names = true;

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| PubmedError::Parse(format!("XML error: {}", e)))?;

            match event {
                Event::Start(start) => {
                    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                    if stack.is_empty() && root.is_some() {
                        return Err(PubmedError::Parse(format!(
                            "Unexpected second root element <{}>",
                            name
                        )));
                    }
                    check_depth(stack.len() + 1)?;
                    stack.push(Element::new(name));
                }
                Event::Empty(empty) => {
                    let name = String::from_utf8_lossy(empty.local_name().as_ref()).into_owned();
                    check_depth(stack.len() + 1)?;
                    attach(&mut stack, &mut root, Element::new(name))?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| PubmedError::Parse("Unmatched end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| PubmedError::Parse(format!("Bad entity: {}", e)))?;
                    push_text(&mut stack, &text)?;
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8_lossy(&cdata).into_owned();
                    push_text(&mut stack, &text)?;
                }
                Event::Eof => break,
                // Declarations, doctypes, comments and processing instructions
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(PubmedError::Parse(format!(
                "Unexpected end of document inside <{}>",
                open.name
            )));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| PubmedError::Parse("Document has no root element".to_string()))
    }

    /// First element named `name`, the root included.
    pub fn find_first(&self, name: &str) -> Option<&Element> {
        if self.root.name == name {
            return Some(&self.root);
        }
        self.root.find_first(name)
    }

    /// All elements named `name`, the root included.
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        if self.root.name == name {
            found.push(&self.root);
        }
        found.extend(self.root.find_all(name));
        found
    }
}

fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(PubmedError::Parse(format!(
            "Elements nested deeper than {} levels",
            MAX_DEPTH
        )));
    }
    Ok(())
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.content.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(PubmedError::Parse(format!(
                "Unexpected second root element <{}>",
                element.name
            )))
        }
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.content.push(Node::Text(text.to_string()));
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(PubmedError::Parse(
            "Text outside of the root element".to_string(),
        )),
    }
}
