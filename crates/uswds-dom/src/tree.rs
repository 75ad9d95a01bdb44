//! DOM Tree (arena-based allocation)
//!
//! Nodes are never freed: removing a node only unlinks it, so a `NodeId`
//! held by a handler stays valid (if disconnected) after the subtree is
//! taken out of the document.

use crate::{DOMTokenList, DomError, DomResult, ElementData, Node, NodeData, NodeId};

/// Elements whose text never renders
const NON_RENDERED: &[&str] = &["script", "style", "template", "head", "title"];

/// Elements whose rendered text is separated from its neighbours
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "caption", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "ul",
];

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::comment(text.to_string()))
    }

    /// Create a detached doctype node
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(Node {
            data: NodeData::Doctype {
                name: name.to_string(),
            },
            ..Node::document()
        })
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already in the tree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<NodeId> {
        let parent_node = self.node(parent)?;
        if !(parent_node.is_element() || parent_node.is_document()) {
            return Err(DomError::InvalidNodeType(parent));
        }
        if self.node(child)?.is_document() {
            return Err(DomError::InvalidNodeType(child));
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if self.node(reference)?.parent != parent {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
            if reference == child {
                return Ok(child);
            }
        }

        self.detach(child);

        let (prev, next) = match reference {
            Some(reference) => (self.nodes[reference.index()].prev_sibling, reference),
            None => (self.nodes[parent.index()].last_child, NodeId::NONE),
        };

        let node = &mut self.nodes[child.index()];
        node.parent = parent;
        node.prev_sibling = prev;
        node.next_sibling = next;

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = child;
        } else {
            self.nodes[parent.index()].last_child = child;
        }

        Ok(child)
    }

    /// Remove `child` from `parent`
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.node(parent)?;
        if self.node(child)?.parent != parent {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(child)
    }

    /// Unlink a node from its parent. No-op for detached nodes.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent.to_option()
    }

    /// Iterate direct children
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        ChildIter {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Direct element children, in order
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .filter(|(_, node)| node.is_element())
            .map(|(child, _)| child)
            .collect()
    }

    /// Ancestors from the parent up to the topmost node
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// All descendants in document (pre-)order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
        stack.reverse();

        while let Some(current) = stack.pop() {
            out.push(current);
            let start = stack.len();
            stack.extend(self.children(current).map(|(c, _)| c));
            stack[start..].reverse();
        }
        out
    }

    /// Inclusive containment check
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether the node is reachable from the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some() && self.contains(NodeId::ROOT, id)
    }

    /// Index among the parent's element children
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.element_children(parent).iter().position(|&c| c == id)
    }

    // ------------------------------------------------------------------
    // Elements and attributes
    // ------------------------------------------------------------------

    /// Check if the node is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Element data for a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id)?.as_element()
    }

    fn element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.get_mut(id)
            .ok_or(DomError::NotFound(id))?
            .as_element_mut()
            .ok_or(DomError::InvalidNodeType(id))
    }

    /// Lowercased tag name
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Attribute value
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.get_attr(name)
    }

    /// Attribute presence
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        self.element_mut(id)?.set_attr(name, value.to_string());
        Ok(())
    }

    /// Remove an attribute, returning the previous value
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.element_mut(id).ok()?.remove_attr(name)
    }

    /// Parsed class list (empty for non-elements)
    pub fn class_list(&self, id: NodeId) -> DOMTokenList {
        DOMTokenList::from_string(self.attribute(id, "class").unwrap_or(""))
    }

    /// Class membership test
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.classes().any(|c| c == class))
    }

    fn update_classes<R>(
        &mut self,
        id: NodeId,
        update: impl FnOnce(&mut DOMTokenList) -> R,
    ) -> DomResult<R> {
        let mut list = self.class_list(id);
        let result = update(&mut list);
        self.element_mut(id)?.set_attr("class", list.value());
        Ok(result)
    }

    /// classList.add
    pub fn add_class(&mut self, id: NodeId, class: &str) -> DomResult<()> {
        self.update_classes(id, |list| list.add(&[class]))
    }

    /// classList.remove
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> DomResult<()> {
        if !self.has_class(id, class) {
            return Ok(());
        }
        self.update_classes(id, |list| list.remove(&[class]))
    }

    /// classList.toggle
    pub fn toggle_class(&mut self, id: NodeId, class: &str, force: Option<bool>) -> DomResult<bool> {
        self.update_classes(id, |list| list.toggle(class, force))
    }

    /// classList.replace
    pub fn replace_class(&mut self, id: NodeId, old: &str, new: &str) -> DomResult<bool> {
        self.update_classes(id, |list| list.replace(old, new))
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Concatenated text of all descendant text nodes (`textContent`)
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.get(id).and_then(Node::as_text) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.get(n).and_then(Node::as_text))
            .collect()
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        self.element_mut(id)?;
        let children: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
        for child in children {
            self.detach(child);
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node)?;
        }
        Ok(())
    }

    /// Rendered text (`innerText`): skips hidden and non-rendered
    /// elements, collapses whitespace runs and trims.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut raw = String::new();
        self.collect_rendered_text(id, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_rendered_text(&self, id: NodeId, out: &mut String) {
        for (child, node) in self.children(id) {
            match &node.data {
                NodeData::Text(text) => out.push_str(&text.content),
                NodeData::Element(elem) => {
                    if elem.get_attr("hidden").is_some() || NON_RENDERED.contains(&elem.tag.as_str()) {
                        continue;
                    }
                    let block = BLOCK_ELEMENTS.contains(&elem.tag.as_str());
                    if block {
                        out.push(' ');
                    }
                    self.collect_rendered_text(child, out);
                    if block {
                        out.push(' ');
                    }
                }
                _ => {}
            }
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node's direct children
pub struct ChildIter<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.to_option()?;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(tree: &DomTree, parent: NodeId) -> Vec<NodeId> {
        tree.children(parent).map(|(c, _)| c).collect()
    }

    #[test]
    fn test_insert_before_and_move() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        let a = tree.create_element("li");
        let b = tree.create_element("li");
        let c = tree.create_element("li");
        tree.append_child(tree.root(), ul).unwrap();
        tree.append_child(ul, a).unwrap();
        tree.append_child(ul, c).unwrap();
        tree.insert_before(ul, b, Some(c)).unwrap();
        assert_eq!(list(&tree, ul), vec![a, b, c]);

        // Appending an existing child moves it
        tree.append_child(ul, a).unwrap();
        assert_eq!(list(&tree, ul), vec![b, c, a]);
        assert_eq!(tree.get(ul).unwrap().first_child, b);
        assert_eq!(tree.get(ul).unwrap().last_child, a);
    }

    #[test]
    fn test_hierarchy_request() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("div");
        tree.append_child(outer, inner).unwrap();

        assert_eq!(
            tree.append_child(inner, outer),
            Err(DomError::HierarchyRequest { parent: inner, child: outer })
        );
        assert!(tree.append_child(outer, outer).is_err());
    }

    #[test]
    fn test_remove_child_not_a_child() {
        let mut tree = DomTree::new();
        let a = tree.create_element("div");
        let b = tree.create_element("div");
        tree.append_child(tree.root(), a).unwrap();

        assert!(matches!(tree.remove_child(a, b), Err(DomError::NotAChild { .. })));
        assert_eq!(tree.remove_child(tree.root(), a), Ok(a));
        assert!(!tree.is_connected(a));
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let p1 = tree.create_element("p");
        let span = tree.create_element("span");
        let p2 = tree.create_element("p");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, p1).unwrap();
        tree.append_child(p1, span).unwrap();
        tree.append_child(div, p2).unwrap();

        assert_eq!(tree.descendants(tree.root()), vec![div, p1, span, p2]);
        assert_eq!(tree.index_in_parent(p2), Some(1));
    }

    #[test]
    fn test_inner_text_collapses_whitespace() {
        let mut tree = DomTree::new();
        let td = tree.create_element("td");
        let t1 = tree.create_text("\n   Zebra\n  ");
        let hidden = tree.create_element("span");
        let t2 = tree.create_text("ignored");
        tree.append_child(td, t1).unwrap();
        tree.append_child(td, hidden).unwrap();
        tree.set_attribute(hidden, "hidden", "").unwrap();
        tree.append_child(hidden, t2).unwrap();

        assert_eq!(tree.inner_text(td), "Zebra");
        assert_eq!(tree.text_content(td), "\n   Zebra\n  ignored");
    }

    #[test]
    fn test_inner_text_joins_inline_and_separates_blocks() {
        let mut tree = DomTree::new();
        let td = tree.create_element("td");
        let one = tree.create_text("1");
        let span = tree.create_element("span");
        let zero = tree.create_text("0");
        tree.append_child(td, one).unwrap();
        tree.append_child(td, span).unwrap();
        tree.append_child(span, zero).unwrap();
        assert_eq!(tree.inner_text(td), "10");

        let div = tree.create_element("div");
        let line = tree.create_text("Line");
        let br = tree.create_element("br");
        let next = tree.create_element("p");
        let two = tree.create_text("two");
        tree.append_child(div, line).unwrap();
        tree.append_child(div, br).unwrap();
        tree.append_child(div, next).unwrap();
        tree.append_child(next, two).unwrap();
        assert_eq!(tree.inner_text(div), "Line two");
    }

    #[test]
    fn test_class_helpers() {
        let mut tree = DomTree::new();
        let el = tree.create_element("span");

        tree.add_class(el, "usa-tooltip__body").unwrap();
        assert!(tree.toggle_class(el, "is-set", None).unwrap());
        assert_eq!(tree.attribute(el, "class"), Some("usa-tooltip__body is-set"));

        tree.remove_class(el, "is-set").unwrap();
        assert!(!tree.has_class(el, "is-set"));

        let text = tree.create_text("x");
        assert_eq!(tree.add_class(text, "a"), Err(DomError::InvalidNodeType(text)));
    }
}
