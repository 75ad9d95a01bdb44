//! Selector utility

use uswds_css::{ElementQuery, SelectorError, SelectorList};
use uswds_dom::{Document, NodeId};

/// Elements under `root` (exclusive) matching `selector`, in document
/// order. A missing or non-element root means the whole document.
pub fn select(
    doc: &Document,
    selector: &str,
    root: Option<NodeId>,
) -> Result<Vec<NodeId>, SelectorError> {
    let list = SelectorList::parse(selector)?;
    Ok(select_compiled(doc, &list, root))
}

/// `select` with an already compiled selector
pub fn select_compiled(doc: &Document, selector: &SelectorList, root: Option<NodeId>) -> Vec<NodeId> {
    let root = resolve_root(doc, root.unwrap_or(NodeId::ROOT));
    doc.tree.query_selector_all(root, selector)
}

/// Map `root` to a node that can host listeners and queries
pub(crate) fn resolve_root(doc: &Document, root: NodeId) -> NodeId {
    match doc.tree.get(root) {
        Some(node) if node.is_element() || node.is_document() => root,
        _ => doc.tree.root(),
    }
}
