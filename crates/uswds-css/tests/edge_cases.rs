//! Edge case tests for uswds-css
//!
//! Selector parsing corners and matching against hand-built trees.

use uswds_css::{ElementQuery, SelectorError, SelectorList};
use uswds_dom::{DomTree, NodeId};

fn element(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let id = tree.create_element(tag);
    for (name, value) in attrs {
        tree.set_attribute(id, name, value).unwrap();
    }
    tree.append_child(parent, id).unwrap();
    id
}

fn sel(s: &str) -> SelectorList {
    SelectorList::parse(s).unwrap()
}

// ============================================================================
// PARSING
// ============================================================================

#[test]
fn test_parse_preserves_source() {
    let list: SelectorList = " .usa-tooltip ".parse().unwrap();
    assert_eq!(list.source(), ".usa-tooltip");
    assert_eq!(list.to_string(), ".usa-tooltip");
}

#[test]
fn test_parse_rejects_dangling_comma() {
    assert!(matches!(
        SelectorList::parse(".a,"),
        Err(SelectorError::UnexpectedEnd { .. })
    ));
}

#[test]
fn test_parse_escaped_class() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let div = element(&mut tree, root, "div", &[("class", "md:flex")]);
    assert_eq!(tree.query_selector(root, &sel(".md\\:flex")), Some(div));
}

#[test]
fn test_parse_type_is_case_insensitive() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let th = element(&mut tree, root, "th", &[]);
    assert!(tree.matches(th, &sel("TH")));
}

// ============================================================================
// MATCHING
// ============================================================================

#[test]
fn test_descendant_backtracks() {
    // <section class="a"><div class="a"><p/></div></section>, `.a > div p`
    let mut tree = DomTree::new();
    let root = tree.root();
    let section = element(&mut tree, root, "section", &[("class", "a")]);
    let div = element(&mut tree, section, "div", &[("class", "a")]);
    let p = element(&mut tree, div, "p", &[]);

    assert!(tree.matches(p, &sel(".a > div p")));
    assert!(tree.matches(p, &sel("section p")));
    assert!(!tree.matches(p, &sel("article p")));
}

#[test]
fn test_sibling_combinators_skip_text() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let ul = element(&mut tree, root, "ul", &[]);
    let first = element(&mut tree, ul, "li", &[("id", "first")]);
    let text = tree.create_text("  ");
    tree.append_child(ul, text).unwrap();
    let second = element(&mut tree, ul, "li", &[]);
    let third = element(&mut tree, ul, "li", &[]);

    assert_eq!(tree.query_selector_all(ul, &sel("#first + li")), vec![second]);
    assert_eq!(tree.query_selector_all(ul, &sel("#first ~ li")), vec![second, third]);
    assert!(!tree.matches(first, &sel("li + li")));
}

#[test]
fn test_structural_pseudo_classes() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let tbody = element(&mut tree, root, "tbody", &[]);
    let rows: Vec<NodeId> = (0..4).map(|_| element(&mut tree, tbody, "tr", &[])).collect();

    assert_eq!(tree.query_selector_all(tbody, &sel("tr:nth-child(odd)")), vec![rows[0], rows[2]]);
    assert_eq!(tree.query_selector_all(tbody, &sel("tr:nth-last-child(1)")), vec![rows[3]]);
    assert!(tree.query_selector_all(tbody, &sel("tr:nth-child(-n-2147483648)")).is_empty());
    assert_eq!(tree.query_selector_all(tbody, &sel("tr:nth-last-child(n-2147483648)")).len(), 4);
    assert_eq!(tree.query_selector_all(tbody, &sel(":first-child")), vec![rows[0]]);
    assert_eq!(tree.query_selector_all(tbody, &sel("tr:empty")).len(), 4);
    assert!(tree.query_selector_all(tbody, &sel(":only-child")).is_empty());
}

#[test]
fn test_logical_pseudo_classes() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let wrapper = element(&mut tree, root, "span", &[("class", "usa-tooltip")]);
    let trigger = element(&mut tree, wrapper, "button", &[("class", "usa-tooltip__trigger")]);
    let plain = element(&mut tree, root, "button", &[("class", "usa-tooltip")]);

    let not_wrapper = sel(".usa-tooltip:not(:has(.usa-tooltip__trigger))");
    assert_eq!(tree.query_selector_all(root, &not_wrapper), vec![plain]);
    assert!(!tree.matches(wrapper, &not_wrapper));
    // Relative selectors inside :has() are not supported
    assert!(SelectorList::parse(":has(> .x)").is_err());

    assert!(tree.matches(trigger, &sel(":is(a, button)")));
    assert!(tree.matches(trigger, &sel(":where(.usa-tooltip) > button")));
}

#[test]
fn test_attribute_operators() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let th = element(
        &mut tree,
        root,
        "th",
        &[("aria-sort", "ascending"), ("lang", "en-US"), ("class", "usa-table__header usa-table__header--sortable")],
    );

    assert!(tree.matches(th, &sel("[aria-sort]")));
    assert!(tree.matches(th, &sel("[aria-sort=ascending]")));
    assert!(tree.matches(th, &sel("[aria-sort^=asc]")));
    assert!(tree.matches(th, &sel("[aria-sort$='ing']")));
    assert!(tree.matches(th, &sel("[aria-sort*=cend]")));
    assert!(tree.matches(th, &sel("[lang|=en]")));
    assert!(tree.matches(th, &sel("[class~=usa-table__header]")));
    assert!(tree.matches(th, &sel("[aria-sort=ASCENDING i]")));
    assert!(!tree.matches(th, &sel("[aria-sort=descending]")));
}

#[test]
fn test_lang_inherits_from_ancestors() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let html = element(&mut tree, root, "html", &[("lang", "tr-TR")]);
    let td = element(&mut tree, html, "td", &[]);

    assert!(tree.matches(td, &sel(":lang(tr)")));
    assert!(!tree.matches(td, &sel(":lang(en)")));
    assert!(tree.matches(html, &sel(":root")));
    assert!(!tree.matches(td, &sel(":root")));
}

#[test]
fn test_non_elements_never_match() {
    let mut tree = DomTree::new();
    let root = tree.root();
    let text = tree.create_text("hello");
    tree.append_child(root, text).unwrap();

    assert!(!tree.matches(text, &sel("*")));
    assert!(!tree.matches(root, &sel("*")));
    assert_eq!(tree.closest(text, &sel("*")), None);
}

#[test]
fn test_select_all_reports_parse_errors() {
    let tree = DomTree::new();
    assert_eq!(tree.select_all(tree.root(), ""), Err(SelectorError::Empty));
    assert_eq!(tree.select_all(tree.root(), "div").unwrap(), Vec::<NodeId>::new());
}
