//! DOM Events
//!
//! Event types, the event object, and the per-target listener registry.
//! Dispatch itself lives on `Document` because listeners receive the
//! document mutably.

use crate::{Document, ListenerError, NodeId};
use std::collections::HashMap;
use std::rc::Rc;

/// Event type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    Focus,
    Blur,
    FocusIn,
    FocusOut,
    MouseOver,
    MouseOut,
    MouseEnter,
    MouseLeave,
    KeyDown,
    KeyUp,
    TouchStart,
    TouchEnd,
    TouchCancel,
    /// Fired on an element, before it is detached, when
    /// `Document::remove_child` takes it out of its parent
    NodeRemoved,
}

impl EventType {
    /// Check if this event type can bubble
    pub fn bubbles(&self) -> bool {
        !matches!(
            self,
            EventType::Focus | EventType::Blur | EventType::MouseEnter | EventType::MouseLeave
        )
    }

    /// Whether `prevent_default` has any effect
    pub fn cancelable(&self) -> bool {
        !matches!(
            self,
            EventType::Focus
                | EventType::Blur
                | EventType::FocusIn
                | EventType::FocusOut
                | EventType::MouseEnter
                | EventType::MouseLeave
                | EventType::TouchCancel
                | EventType::NodeRemoved
        )
    }

    /// DOM event name
    pub fn name(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::Focus => "focus",
            EventType::Blur => "blur",
            EventType::FocusIn => "focusin",
            EventType::FocusOut => "focusout",
            EventType::MouseOver => "mouseover",
            EventType::MouseOut => "mouseout",
            EventType::MouseEnter => "mouseenter",
            EventType::MouseLeave => "mouseleave",
            EventType::KeyDown => "keydown",
            EventType::KeyUp => "keyup",
            EventType::TouchStart => "touchstart",
            EventType::TouchEnd => "touchend",
            EventType::TouchCancel => "touchcancel",
            EventType::NodeRemoved => "DOMNodeRemoved",
        }
    }

    /// Parse a DOM event name
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "click" => EventType::Click,
            "focus" => EventType::Focus,
            "blur" => EventType::Blur,
            "focusin" => EventType::FocusIn,
            "focusout" => EventType::FocusOut,
            "mouseover" => EventType::MouseOver,
            "mouseout" => EventType::MouseOut,
            "mouseenter" => EventType::MouseEnter,
            "mouseleave" => EventType::MouseLeave,
            "keydown" => EventType::KeyDown,
            "keyup" => EventType::KeyUp,
            "touchstart" => EventType::TouchStart,
            "touchend" => EventType::TouchEnd,
            "touchcancel" => EventType::TouchCancel,
            "DOMNodeRemoved" => EventType::NodeRemoved,
            _ => return None,
        })
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Dispatch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// DOM event
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    pub target: NodeId,
    pub current_target: NodeId,
    pub related_target: Option<NodeId>,
    /// `KeyboardEvent.key` for key events
    pub key: Option<String>,
    pub phase: EventPhase,
    pub bubbles: bool,
    pub cancelable: bool,
    /// Virtual clock time (ms) at dispatch
    pub timestamp: u64,
    default_prevented: bool,
    propagation_stopped: bool,
    in_passive_listener: bool,
}

impl Event {
    /// Create an event with the type's default bubbling/cancelable flags
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            current_target: NodeId::NONE,
            related_target: None,
            key: None,
            phase: EventPhase::None,
            bubbles: event_type.bubbles(),
            cancelable: event_type.cancelable(),
            timestamp: 0,
            default_prevented: false,
            propagation_stopped: false,
            in_passive_listener: false,
        }
    }

    /// Key event with `key`
    pub fn keyboard(event_type: EventType, target: NodeId, key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            ..Self::new(event_type, target)
        }
    }

    /// Set the related target (focus/blur, mouseover/mouseout)
    pub fn with_related_target(mut self, related: NodeId) -> Self {
        self.related_target = related.to_option();
        self
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable && !self.in_passive_listener {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// Copy of this event whose target is `target`; used by delegation so
    /// a handler sees the element its selector matched.
    pub fn rebased(&self, target: NodeId) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }

    /// Take over cancellation state from a rebased copy
    pub fn absorb(&mut self, other: &Event) {
        self.default_prevented |= other.default_prevented;
        self.propagation_stopped |= other.propagation_stopped;
    }

    pub(crate) fn set_passive(&mut self, passive: bool) {
        self.in_passive_listener = passive;
    }
}

/// Event listener callback
pub type Listener = Rc<dyn Fn(&mut Document, &mut Event) -> Result<(), ListenerError>>;

/// Listener registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Listener options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
    pub passive: bool,
    pub once: bool,
}

impl ListenerOptions {
    /// Capture-phase listener
    pub fn capture() -> Self {
        Self {
            capture: true,
            ..Self::default()
        }
    }
}

#[derive(Clone)]
struct RegisteredListener {
    id: ListenerId,
    options: ListenerOptions,
    callback: Listener,
}

/// Snapshot entry handed to dispatch
#[derive(Clone)]
pub(crate) struct ListenerEntry {
    pub id: ListenerId,
    pub options: ListenerOptions,
    pub callback: Listener,
}

/// Listener registry keyed by (target, event type), preserving
/// registration order per key.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: HashMap<(NodeId, EventType), Vec<RegisteredListener>>,
    index: HashMap<ListenerId, (NodeId, EventType)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn add(
        &mut self,
        target: NodeId,
        event_type: EventType,
        options: ListenerOptions,
        callback: Listener,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners
            .entry((target, event_type))
            .or_default()
            .push(RegisteredListener {
                id,
                options,
                callback,
            });
        self.index.insert(id, (target, event_type));
        id
    }

    /// Remove a listener by handle
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let Some(key) = self.index.remove(&id) else {
            return false;
        };
        if let Some(list) = self.listeners.get_mut(&key) {
            list.retain(|l| l.id != id);
            if list.is_empty() {
                self.listeners.remove(&key);
            }
        }
        true
    }

    /// Check if a handle is still registered
    pub fn contains(&self, id: ListenerId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of listeners registered on `target`
    pub fn count_for(&self, target: NodeId) -> usize {
        self.index.values().filter(|(t, _)| *t == target).count()
    }

    /// Number of listeners registered on `target` for `event_type`
    pub fn count_for_type(&self, target: NodeId, event_type: EventType) -> usize {
        self.listeners
            .get(&(target, event_type))
            .map_or(0, Vec::len)
    }

    /// Total registered listeners
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Listeners for one phase of one target, in registration order
    pub(crate) fn snapshot(
        &self,
        target: NodeId,
        event_type: EventType,
        capture: bool,
    ) -> Vec<ListenerEntry> {
        self.listeners
            .get(&(target, event_type))
            .map(|list| {
                list.iter()
                    .filter(|l| l.options.capture == capture)
                    .map(|l| ListenerEntry {
                        id: l.id,
                        options: l.options,
                        callback: Rc::clone(&l.callback),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.index.len())
            .finish()
    }
}
