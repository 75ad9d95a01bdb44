//! uswds DOM - Document Object Model
//!
//! Arena-backed DOM tree plus the host services behaviors rely on:
//! event listeners and dispatch, focus tracking, a virtual timer queue
//! and element geometry.

mod classlist;
mod document;
mod error;
mod events;
mod geometry;
mod node;
mod timers;
mod tree;

pub use classlist::DOMTokenList;
pub use document::{Document, DispatchOutcome};
pub use error::{DomError, DomResult, ListenerError};
pub use events::{
    Event, EventPhase, EventType, Listener, ListenerId, ListenerOptions, ListenerRegistry,
};
pub use geometry::DOMRect;
pub use node::{Attribute, ElementData, Node, NodeData, TextData};
pub use timers::{TimerCallback, TimerId, TimerQueue};
pub use tree::{ChildIter, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this is not the sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Convert the sentinel into `None`
    #[inline]
    pub fn to_option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            write!(f, "#none")
        }
    }
}
