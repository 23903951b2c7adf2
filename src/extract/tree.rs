//! Parsed markup tree capability.
//!
//! The extractor never touches a parsing library directly. It walks any
//! tree that implements [`MarkupNode`], which keeps it testable against
//! hand-built trees.

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::ExtractionError;

/// A node in a parsed markup tree.
pub trait MarkupNode: Sized {
    /// Lowercase element name, or `None` for text, comments and the root.
    fn tag_name(&self) -> Option<&str>;

    /// Attribute value by name.
    fn attr(&self, name: &str) -> Option<String>;

    /// Child nodes in document order.
    fn children(&self) -> Vec<Self>;

    /// Text of a text node, `None` for every other kind of node.
    fn text(&self) -> Option<String>;

    fn is_element(&self, tag: &str) -> bool {
        self.tag_name() == Some(tag)
    }

    /// Concatenated text of this node and all its descendants.
    fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// First descendant element with the given tag, in pre-order.
    fn find_descendant(&self, tag: &str) -> Option<Self> {
        for child in self.children() {
            if child.is_element(tag) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(tag) {
                return Some(found);
            }
        }
        None
    }

    /// All descendant elements with the given tag, in pre-order.
    fn find_all(&self, tag: &str) -> Vec<Self> {
        let mut found = Vec::new();
        collect_all(self, tag, &mut found);
        found
    }
}

fn collect_text<N: MarkupNode>(node: &N, out: &mut String) {
    if let Some(text) = node.text() {
        out.push_str(&text);
        return;
    }
    for child in node.children() {
        collect_text(&child, out);
    }
}

fn collect_all<N: MarkupNode>(node: &N, tag: &str, found: &mut Vec<N>) {
    for child in node.children() {
        let position = found.len();
        collect_all(&child, tag, found);
        if child.is_element(tag) {
            found.insert(position, child);
        }
    }
}

/// Turns raw markup bytes into a walkable tree.
pub trait MarkupParser {
    type Node: MarkupNode;

    /// Parse markup into its root node.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError`] when no tree can be built at all.
    fn parse(&self, markup: &[u8]) -> Result<Self::Node, ExtractionError>;
}

/// HTML5 parser backed by html5ever.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl MarkupParser for HtmlParser {
    type Node = DomNode;

    fn parse(&self, markup: &[u8]) -> Result<DomNode, ExtractionError> {
        let opts = ParseOpts {
            tree_builder: TreeBuilderOpts {
                drop_doctype: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let dom = parse_document(RcDom::default(), opts)
            .from_utf8()
            .read_from(&mut &markup[..])?;
        Ok(DomNode(dom.document))
    }
}

/// A node of an html5ever `RcDom`.
#[derive(Clone)]
pub struct DomNode(Handle);

impl MarkupNode for DomNode {
    fn tag_name(&self) -> Option<&str> {
        match &self.0.data {
            NodeData::Element { name, .. } => Some(&*name.local),
            _ => None,
        }
    }

    fn attr(&self, name: &str) -> Option<String> {
        match &self.0.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|attr| &*attr.name.local == name)
                .map(|attr| String::from(&*attr.value)),
            _ => None,
        }
    }

    fn children(&self) -> Vec<Self> {
        self.0
            .children
            .borrow()
            .iter()
            .map(|child| Self(child.clone()))
            .collect()
    }

    fn text(&self) -> Option<String> {
        match &self.0.data {
            NodeData::Text { contents } => Some(String::from(&**contents.borrow())),
            _ => None,
        }
    }
}
