//! Edge case tests for uswds-html
//!
//! Malformed markup and parse/serialize agreement.

use uswds_html::{HtmlParser, HtmlSerializer, append_fragment, parse};

// ============================================================================
// EMPTY AND MALFORMED INPUT
// ============================================================================

#[test]
fn test_parse_empty_still_has_structure() {
    let doc = parse("");
    assert!(doc.document_element().is_valid());
    assert!(doc.head().is_valid());
    assert!(doc.body().is_valid());
}

#[test]
fn test_parse_unclosed_tags() {
    let doc = parse("<div><p><span>text");
    assert_eq!(doc.tree().text_content(doc.body()), "text");
}

#[test]
fn test_table_rows_get_implied_tbody() {
    let doc = parse("<table><tr><td>1</td></tr><tr><td>2</td></tr></table>");
    let tree = doc.tree();
    let table = tree.element_children(doc.body())[0];
    let tbody = tree.element_children(table)[0];
    assert_eq!(tree.tag_name(tbody), Some("tbody"));
    assert_eq!(tree.element_children(tbody).len(), 2);
}

#[test]
fn test_parse_with_url() {
    let doc = HtmlParser::new().parse_with_url("<p>x</p>", "https://designsystem.digital.gov/");
    assert_eq!(doc.url(), "https://designsystem.digital.gov/");
}

// ============================================================================
// SERIALIZATION
// ============================================================================

#[test]
fn test_outer_html_roundtrips_attributes() {
    let doc = parse(r#"<button class="usa-button usa-tooltip" data-position="bottom" title="Tip &amp; more">B</button>"#);
    let tree = doc.tree();
    let button = tree.element_children(doc.body())[0];

    assert_eq!(tree.attribute(button, "title"), Some("Tip & more"));
    assert_eq!(
        HtmlSerializer::new().serialize_outer(tree, button),
        r#"<button class="usa-button usa-tooltip" data-position="bottom" title="Tip &amp; more">B</button>"#
    );
}

#[test]
fn test_skip_comments() {
    let doc = parse("<p>a<!-- note -->b</p>");
    let p = doc.tree().element_children(doc.body())[0];

    let serializer = HtmlSerializer { skip_comments: true };
    assert_eq!(serializer.serialize_inner(doc.tree(), p), "ab");
    assert_eq!(HtmlSerializer::new().serialize_inner(doc.tree(), p), "a<!-- note -->b");
}

#[test]
fn test_append_fragment_into_existing_document() {
    let mut doc = parse("<main id=\"m\"><p>first</p></main>");
    let main = doc.get_element_by_id("m").unwrap();

    let added = append_fragment(&mut doc, main, "<p>second</p>text").unwrap();
    assert_eq!(added.len(), 2);
    assert_eq!(doc.tree().text_content(main), "firstsecondtext");
    assert_eq!(doc.tree().parent(added[0]), Some(main));
}
