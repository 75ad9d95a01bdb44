//! CSS Selectors
//!
//! Selector data model and matching against `DomTree`. Complex selectors
//! match right to left, backtracking over descendant and sibling
//! combinators.

use crate::SelectorError;
use uswds_dom::{DomTree, NodeId};

/// A comma-separated selector list, compiled once
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    pub(crate) source: String,
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector list
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        crate::parser::parse_selector_list(source)
    }

    /// Original selector text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check if any selector in the list matches `node`
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.is_element(node) && self.selectors.iter().any(|s| s.matches(tree, node))
    }
}

impl std::str::FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for SelectorList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Combinator between two compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// Compound selectors joined by combinators.
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    /// Check if this selector matches `node`
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self.compounds.len() {
            0 => false,
            n => self.matches_at(tree, node, n - 1),
        }
    }

    fn matches_at(&self, tree: &DomTree, node: NodeId, idx: usize) -> bool {
        if !self.compounds[idx].matches(tree, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match self.combinators[idx - 1] {
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|p| self.matches_at(tree, p, idx - 1)),
            Combinator::Descendant => tree
                .ancestors(node)
                .take_while(|&a| tree.is_element(a))
                .any(|a| self.matches_at(tree, a, idx - 1)),
            Combinator::NextSibling => previous_element_siblings(tree, node)
                .next()
                .is_some_and(|s| self.matches_at(tree, s, idx - 1)),
            Combinator::SubsequentSibling => {
                previous_element_siblings(tree, node).any(|s| self.matches_at(tree, s, idx - 1))
            }
        }
    }
}

/// Sequence of simple selectors applying to one element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    /// Check every component against `node`
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        tree.is_element(node) && self.components.iter().all(|c| match_component(c, tree, node))
    }
}

/// A component of a selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    /// Pseudo-class :first-child, :not(), etc.
    PseudoClass(PseudoClass),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(val)) = (&self.matcher, value) else {
            return self.matcher.is_none() && value.is_some();
        };

        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let val = fold(val);

        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                val.split_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{expected}-"))
            }
            // Empty needles never match for the substring family
            AttributeMatcher::Prefix(expected) => !expected.is_empty() && val.starts_with(&fold(expected)),
            AttributeMatcher::Suffix(expected) => !expected.is_empty() && val.ends_with(&fold(expected)),
            AttributeMatcher::Substring(expected) => !expected.is_empty() && val.contains(&fold(expected)),
        }
    }
}

/// Pseudo-class type
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    // Tree-structural pseudo-classes
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),

    // Logical pseudo-classes
    Not(SelectorList),
    Is(SelectorList),
    Where(SelectorList),
    Has(SelectorList),

    // Other
    Lang(String),
    Disabled,
    Enabled,
    Checked,
}

/// An+B expression for :nth-* selectors
#[derive(Debug, Clone, PartialEq)]
pub struct NthExpression {
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl NthExpression {
    /// Create "odd" expression (2n+1)
    pub fn odd() -> Self {
        Self { a: 2, b: 1 }
    }

    /// Create "even" expression (2n)
    pub fn even() -> Self {
        Self { a: 2, b: 0 }
    }

    /// Create a simple index (0n+b)
    pub fn index(n: i32) -> Self {
        Self { a: 0, b: n }
    }

    /// Create An+B expression
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse from string like "2n+1", "odd", "even", "3"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();

        match s.as_str() {
            "odd" => return Some(Self::odd()),
            "even" => return Some(Self::even()),
            _ => {}
        }

        if let Ok(n) = s.parse::<i32>() {
            return Some(Self::index(n));
        }

        let s = s.replace(' ', "");
        let n_pos = s.find('n')?;
        let a = match &s[..n_pos] {
            "" | "+" => 1,
            "-" => -1,
            a_str => a_str.parse().ok()?,
        };
        let rest = &s[n_pos + 1..];
        let b = if rest.is_empty() { 0 } else { rest.parse().ok()? };

        Some(Self::new(a, b))
    }

    /// Check if index n (1-based) matches this expression
    pub fn matches(&self, n: i32) -> bool {
        if self.a == 0 {
            return n == self.b;
        }

        // Widened so extreme `b` values cannot overflow
        let (a, diff) = (i64::from(self.a), i64::from(n) - i64::from(self.b));
        if a > 0 {
            diff >= 0 && diff % a == 0
        } else {
            diff <= 0 && diff % a == 0
        }
    }
}

fn previous_element_siblings(tree: &DomTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    let step = move |&n: &NodeId| tree.get(n).and_then(|node| node.prev_sibling.to_option());
    std::iter::successors(tree.get(node).and_then(|n| n.prev_sibling.to_option()), step)
        .filter(move |&n| tree.is_element(n))
}

/// Position among element siblings: (index 1-based, count)
fn sibling_position(tree: &DomTree, node: NodeId, same_type: bool) -> (usize, usize) {
    let Some(parent) = tree.parent(node) else {
        return (1, 1);
    };
    let tag = tree.tag_name(node);
    let siblings: Vec<NodeId> = tree
        .element_children(parent)
        .into_iter()
        .filter(|&s| !same_type || tree.tag_name(s) == tag)
        .collect();
    let index = siblings.iter().position(|&s| s == node).map_or(1, |i| i + 1);
    (index, siblings.len())
}

/// Match a selector component against an element
pub fn match_component(component: &SelectorComponent, tree: &DomTree, node: NodeId) -> bool {
    let Some(element) = tree.element(node) else {
        return false;
    };

    match component {
        SelectorComponent::Universal => true,
        SelectorComponent::Type(tag) => element.tag.eq_ignore_ascii_case(tag),
        SelectorComponent::Id(id) => element.id() == Some(id.as_str()),
        SelectorComponent::Class(class) => element.classes().any(|c| c == class),
        SelectorComponent::Attribute(attr) => attr.matches(element.get_attr(&attr.name)),
        SelectorComponent::PseudoClass(pseudo) => match_pseudo_class(pseudo, tree, node),
    }
}

/// Match a pseudo-class against an element
pub fn match_pseudo_class(pseudo: &PseudoClass, tree: &DomTree, node: NodeId) -> bool {
    match pseudo {
        PseudoClass::Root => tree.parent(node).is_some_and(|p| !tree.is_element(p)) && tree.is_connected(node),
        PseudoClass::Empty => tree
            .children(node)
            .all(|(_, child)| !(child.is_element() || child.is_text())),
        PseudoClass::FirstChild => sibling_position(tree, node, false).0 == 1,
        PseudoClass::LastChild => {
            let (index, count) = sibling_position(tree, node, false);
            index == count
        }
        PseudoClass::OnlyChild => sibling_position(tree, node, false).1 == 1,
        PseudoClass::FirstOfType => sibling_position(tree, node, true).0 == 1,
        PseudoClass::LastOfType => {
            let (index, count) = sibling_position(tree, node, true);
            index == count
        }
        PseudoClass::OnlyOfType => sibling_position(tree, node, true).1 == 1,
        PseudoClass::NthChild(expr) => expr.matches(sibling_position(tree, node, false).0 as i32),
        PseudoClass::NthLastChild(expr) => {
            let (index, count) = sibling_position(tree, node, false);
            expr.matches((count - index + 1) as i32)
        }
        PseudoClass::NthOfType(expr) => expr.matches(sibling_position(tree, node, true).0 as i32),
        PseudoClass::NthLastOfType(expr) => {
            let (index, count) = sibling_position(tree, node, true);
            expr.matches((count - index + 1) as i32)
        }

        PseudoClass::Not(list) => !list.matches(tree, node),
        PseudoClass::Is(list) | PseudoClass::Where(list) => list.matches(tree, node),
        PseudoClass::Has(list) => tree
            .descendants(node)
            .into_iter()
            .any(|d| list.matches(tree, d)),

        PseudoClass::Lang(lang) => std::iter::once(node)
            .chain(tree.ancestors(node))
            .find_map(|n| tree.attribute(n, "lang"))
            .is_some_and(|l| {
                l.eq_ignore_ascii_case(lang)
                    || l.to_ascii_lowercase().starts_with(&format!("{}-", lang.to_ascii_lowercase()))
            }),
        PseudoClass::Disabled => tree.has_attribute(node, "disabled"),
        PseudoClass::Enabled => !tree.has_attribute(node, "disabled"),
        PseudoClass::Checked => tree.has_attribute(node, "checked"),
    }
}
