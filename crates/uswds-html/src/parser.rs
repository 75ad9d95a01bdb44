//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it into the arena DOM.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use uswds_dom::{Document, DomResult, DomTree, NodeId};

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut document = Document::empty(url);
        let root = document.tree().root();
        if let Err(err) = self.convert_node(&dom.document, document.tree_mut(), root) {
            tracing::warn!("Dropping malformed subtree: {}", err);
        }

        // Find html, head, body elements
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }

    /// Parse `html` as body content and append it under `parent`.
    /// Returns the appended top-level nodes in order.
    pub fn append_fragment(
        &self,
        doc: &mut Document,
        parent: NodeId,
        html: &str,
    ) -> DomResult<Vec<NodeId>> {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let Some(body) = find_element(&dom.document, &["html", "body"]) else {
            return Ok(Vec::new());
        };

        let tree = doc.tree_mut();
        let before: Vec<NodeId> = tree.children(parent).map(|(c, _)| c).collect();
        for child in body.children.borrow().iter() {
            self.convert_node(child, tree, parent)?;
        }

        Ok(tree
            .children(parent)
            .map(|(c, _)| c)
            .filter(|c| !before.contains(c))
            .collect())
    }

    /// Convert an RcDom node into the arena under `parent`
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> DomResult<()> {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent)?;
                }
            }
            RcNodeData::Doctype { name, .. } => {
                let id = tree.create_doctype(name);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                // Inter-element whitespace carries no content here
                if !text.trim().is_empty() || keeps_whitespace(tree, parent) {
                    let id = tree.create_text(&text);
                    tree.append_child(parent, id)?;
                }
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    tree.set_attribute(id, &attr.name.local, &attr.value)?;
                }
                tree.append_child(parent, id)?;

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id)?;
                }
            }
            RcNodeData::ProcessingInstruction { .. } => {}
        }
        Ok(())
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Whitespace-only text is kept inside phrasing content, where it
/// separates words.
fn keeps_whitespace(tree: &DomTree, parent: NodeId) -> bool {
    !matches!(
        tree.tag_name(parent),
        None | Some(
            "html" | "head" | "body" | "table" | "thead" | "tbody" | "tfoot" | "tr" | "ul" | "ol"
                | "div" | "section" | "main" | "nav"
        )
    )
}

fn find_element(handle: &Handle, path: &[&str]) -> Option<Handle> {
    let Some((first, rest)) = path.split_first() else {
        return Some(handle.clone());
    };
    let child = handle.children.borrow().iter().find_map(|child| match &child.data {
        RcNodeData::Element { name, .. } if &*name.local == *first => Some(child.clone()),
        _ => None,
    })?;
    find_element(&child, rest)
}
