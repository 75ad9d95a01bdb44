//! Shared fixtures for component integration tests

#![allow(dead_code)]

use std::sync::Once;
use uswds_css::{ElementQuery, SelectorList};
use uswds_dom::{Document, NodeId};

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
/// `RUST_LOG=uswds_components=trace` shows delegation decisions.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Parse a page with `body` as its body markup
pub fn page(body: &str) -> Document {
    init_tracing();
    uswds_html::parse(&format!("<!DOCTYPE html><html lang=\"en\"><head></head><body>{body}</body></html>"))
}

/// All elements in the document matching `selector`
pub fn all(doc: &Document, selector: &str) -> Vec<NodeId> {
    let list = SelectorList::parse(selector).expect("test selector");
    doc.tree.query_selector_all(doc.tree.root(), &list)
}

/// The single element matching `selector`
pub fn one(doc: &Document, selector: &str) -> NodeId {
    let found = all(doc, selector);
    assert_eq!(found.len(), 1, "expected exactly one `{selector}`, found {}", found.len());
    found[0]
}
