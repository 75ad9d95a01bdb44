//! Component errors

use uswds_css::SelectorError;
use uswds_dom::{DomError, ListenerError, NodeId};

/// Behavior construction and lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum BehaviorError {
    #[error("Behavior `{behavior}` has an invalid selector `{selector}`: {source}")]
    InvalidSelector {
        behavior: String,
        selector: String,
        #[source]
        source: SelectorError,
    },

    #[error("Behavior `{behavior}` {hook} hook failed on {root}: {source}")]
    Hook {
        behavior: String,
        hook: &'static str,
        root: NodeId,
        #[source]
        source: ListenerError,
    },
}

/// Sortable table errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("Sortable header {0} is missing an outer sortable table")]
    MissingTable(NodeId),

    #[error(transparent)]
    Dom(#[from] DomError),
}
