//! Query helpers over `DomTree`

use crate::{SelectorError, SelectorList};
use uswds_dom::{DomTree, NodeId};

/// `querySelector`-style lookups
pub trait ElementQuery {
    /// First descendant of `root` matching `selector`, in document order
    fn query_selector(&self, root: NodeId, selector: &SelectorList) -> Option<NodeId>;

    /// All descendants of `root` matching `selector`, in document order.
    /// `root` itself is never included.
    fn query_selector_all(&self, root: NodeId, selector: &SelectorList) -> Vec<NodeId>;

    /// Nearest inclusive ancestor element matching `selector`
    fn closest(&self, node: NodeId, selector: &SelectorList) -> Option<NodeId>;

    /// Check if `node` is an element matching `selector`
    fn matches(&self, node: NodeId, selector: &SelectorList) -> bool;

    /// Descendant elements carrying every class in `names`
    fn get_elements_by_class_name(&self, root: NodeId, names: &str) -> Vec<NodeId>;

    /// Parse `selector` and run `query_selector_all`
    fn select_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.query_selector_all(root, &list))
    }
}

impl ElementQuery for DomTree {
    fn query_selector(&self, root: NodeId, selector: &SelectorList) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&n| selector.matches(self, n))
    }

    fn query_selector_all(&self, root: NodeId, selector: &SelectorList) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&n| selector.matches(self, n))
            .collect()
    }

    fn closest(&self, node: NodeId, selector: &SelectorList) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .take_while(|&n| self.is_element(n))
            .find(|&n| selector.matches(self, n))
    }

    fn matches(&self, node: NodeId, selector: &SelectorList) -> bool {
        selector.matches(self, node)
    }

    fn get_elements_by_class_name(&self, root: NodeId, names: &str) -> Vec<NodeId> {
        let wanted: Vec<&str> = names.split_whitespace().collect();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.descendants(root)
            .into_iter()
            .filter(|&n| wanted.iter().all(|class| self.has_class(n, class)))
            .collect()
    }
}
