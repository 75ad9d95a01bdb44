//! uswds HTML
//!
//! HTML5 parsing built on html5ever, converted into the arena DOM, plus
//! `innerHTML`/`outerHTML` serialization.

mod parser;
mod serializer;

pub use parser::HtmlParser;
pub use serializer::HtmlSerializer;

use uswds_dom::{Document, DomResult, NodeId};

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Parse `html` as body content and append the resulting nodes to `parent`
pub fn append_fragment(doc: &mut Document, parent: NodeId, html: &str) -> DomResult<Vec<NodeId>> {
    HtmlParser::new().append_fragment(doc, parent, html)
}
