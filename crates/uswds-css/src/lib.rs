//! uswds CSS - Selector engine
//!
//! Parses selector lists once into a matchable form and runs them
//! against a `DomTree`.

mod parser;
mod query;
mod selectors;

pub use query::ElementQuery;
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList,
};

/// Selector parse error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected '{found}' at offset {offset} in `{selector}`")]
    Unexpected {
        selector: String,
        found: char,
        offset: usize,
    },

    #[error("Unexpected end of selector `{selector}`")]
    UnexpectedEnd { selector: String },

    #[error("Unsupported pseudo-class or pseudo-element: {0}")]
    UnsupportedPseudo(String),

    #[error("Invalid :nth-* argument `{0}`")]
    InvalidNth(String),
}
