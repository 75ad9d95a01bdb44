//! Document - High-level document API
//!
//! Owns the tree together with the host state behaviors observe: focus,
//! listeners, timers, layout boxes, viewport and preferred languages.

use crate::{
    DOMRect, DomResult, DomTree, Event, EventPhase, EventType, Listener, ListenerError,
    ListenerId, ListenerOptions, ListenerRegistry, NodeId, TimerCallback, TimerId, TimerQueue,
};
use std::collections::HashMap;

const DEFAULT_LANGUAGE: &str = "en-US";

/// Result of dispatching one event
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// A listener called `prevent_default` on a cancelable event
    pub default_prevented: bool,
    /// Errors returned by listeners; dispatch continued past each one
    pub errors: Vec<ListenerError>,
}

impl DispatchOutcome {
    /// No listener failed
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn merge(&mut self, other: DispatchOutcome) {
        self.default_prevented |= other.default_prevented;
        self.errors.extend(other.errors);
    }
}

/// HTML Document
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
    focused: NodeId,
    listeners: ListenerRegistry,
    timers: TimerQueue,
    layout: HashMap<NodeId, DOMRect>,
    viewport: DOMRect,
    languages: Vec<String>,
    next_generated_id: u32,
}

impl Document {
    /// Create a new document with html/head/body
    pub fn new(url: &str) -> Self {
        let mut doc = Self::empty(url);
        let root = doc.tree.root();
        let html = doc.tree.create_element("html");
        let head = doc.tree.create_element("head");
        let body = doc.tree.create_element("body");

        for (parent, child) in [(root, html), (html, head), (html, body)] {
            // Fresh detached elements always append cleanly
            let _ = doc.tree.append_child(parent, child);
        }

        doc.html_element = html;
        doc.head_element = head;
        doc.body_element = body;
        doc
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
            focused: NodeId::NONE,
            listeners: ListenerRegistry::new(),
            timers: TimerQueue::new(),
            layout: HashMap::new(),
            viewport: DOMRect::from_xywh(0.0, 0.0, 1024.0, 768.0),
            languages: vec![DEFAULT_LANGUAGE.to_string()],
            next_generated_id: 0,
        }
    }

    /// Locate html/head/body after the tree was built externally
    pub fn finalize(&mut self) {
        let find = |tree: &DomTree, parent: NodeId, tag: &str| {
            tree.element_children(parent)
                .into_iter()
                .find(|&c| tree.tag_name(c) == Some(tag))
                .unwrap_or(NodeId::NONE)
        };
        self.html_element = find(&self.tree, self.tree.root(), "html");
        self.head_element = find(&self.tree, self.html_element, "head");
        self.body_element = find(&self.tree, self.html_element, "body");
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Get connected element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .into_iter()
            .find(|&n| self.tree.attribute(n, "id") == Some(id))
    }

    /// Produce an id of the form `{prefix}-{n}` not used in the document
    pub fn generate_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_generated_id += 1;
            let candidate = format!("{prefix}-{}", self.next_generated_id);
            if self.get_element_by_id(&candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Remove a child, blurring the focused element first if it is inside
    /// the removed subtree. Element children then receive `DOMNodeRemoved`
    /// (related target: `parent`) while still attached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.tree.parent(child) != Some(parent) {
            // Reports NotFound / NotAChild
            return self.tree.remove_child(parent, child);
        }

        if self.focused.is_valid() && self.tree.contains(child, self.focused) {
            let focused = self.focused;
            tracing::debug!("Focused node {} removed, blurring", focused);
            self.blur(focused);
        }
        if self.tree.is_element(child) {
            self.dispatch_event(Event::new(EventType::NodeRemoved, child).with_related_target(parent));
        }
        self.tree.remove_child(parent, child)
    }

    // ------------------------------------------------------------------
    // Listeners and dispatch
    // ------------------------------------------------------------------

    /// Register a listener on `target`
    pub fn add_event_listener(
        &mut self,
        target: NodeId,
        event_type: EventType,
        options: ListenerOptions,
        callback: Listener,
    ) -> ListenerId {
        self.listeners.add(target, event_type, options, callback)
    }

    /// Remove a listener by handle
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Listener registry (read-only)
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Number of listeners registered on `target`
    pub fn listener_count(&self, target: NodeId) -> usize {
        self.listeners.count_for(target)
    }

    /// Dispatch through capture, target and bubble phases.
    ///
    /// The propagation path is fixed before any listener runs, so
    /// listeners that move or remove nodes do not change who is notified.
    /// Listeners removed mid-dispatch do not fire. A failing listener is
    /// logged and recorded; the rest still run.
    pub fn dispatch_event(&mut self, mut event: Event) -> DispatchOutcome {
        let target = event.target;
        let mut outcome = DispatchOutcome::default();
        if self.tree.get(target).is_none() {
            return outcome;
        }

        event.timestamp = self.timers.now();
        let mut path = vec![target];
        path.extend(self.tree.ancestors(target));

        tracing::trace!("Dispatching {} to {} ({} nodes)", event.event_type, target, path.len());

        event.phase = EventPhase::Capturing;
        for &node in path.iter().skip(1).rev() {
            self.invoke(node, &mut event, true, &mut outcome);
            if event.is_propagation_stopped() {
                return Self::finish(event, outcome);
            }
        }

        event.phase = EventPhase::AtTarget;
        self.invoke(target, &mut event, true, &mut outcome);
        if !event.is_propagation_stopped() {
            self.invoke(target, &mut event, false, &mut outcome);
        }

        if event.bubbles {
            event.phase = EventPhase::Bubbling;
            for &node in path.iter().skip(1) {
                if event.is_propagation_stopped() {
                    break;
                }
                self.invoke(node, &mut event, false, &mut outcome);
            }
        }

        Self::finish(event, outcome)
    }

    fn invoke(&mut self, node: NodeId, event: &mut Event, capture: bool, outcome: &mut DispatchOutcome) {
        for entry in self.listeners.snapshot(node, event.event_type, capture) {
            if !self.listeners.contains(entry.id) {
                continue;
            }
            if entry.options.once {
                self.listeners.remove(entry.id);
            }

            event.current_target = node;
            event.set_passive(entry.options.passive);
            let result = (entry.callback)(self, event);
            event.set_passive(false);

            if let Err(err) = result {
                tracing::warn!("{} listener on {} failed: {}", event.event_type, node, err);
                outcome.errors.push(err);
            }
        }
    }

    fn finish(event: Event, mut outcome: DispatchOutcome) -> DispatchOutcome {
        outcome.default_prevented = event.is_default_prevented();
        outcome
    }

    /// Dispatch a click on `node`
    pub fn click(&mut self, node: NodeId) -> DispatchOutcome {
        self.dispatch_event(Event::new(EventType::Click, node))
    }

    /// Pointer starts hovering `node`
    pub fn mouse_over(&mut self, node: NodeId) -> DispatchOutcome {
        self.dispatch_event(Event::new(EventType::MouseOver, node))
    }

    /// Pointer leaves `node`
    pub fn mouse_out(&mut self, node: NodeId) -> DispatchOutcome {
        self.dispatch_event(Event::new(EventType::MouseOut, node))
    }

    /// Touch begins on `node`
    pub fn touch_start(&mut self, node: NodeId) -> DispatchOutcome {
        self.dispatch_event(Event::new(EventType::TouchStart, node))
    }

    /// Touch ends on `node`
    pub fn touch_end(&mut self, node: NodeId) -> DispatchOutcome {
        self.dispatch_event(Event::new(EventType::TouchEnd, node))
    }

    /// Touch interrupted on `node`
    pub fn touch_cancel(&mut self, node: NodeId) -> DispatchOutcome {
        self.dispatch_event(Event::new(EventType::TouchCancel, node))
    }

    /// Key press on `node`
    pub fn key_down(&mut self, node: NodeId, key: &str) -> DispatchOutcome {
        self.dispatch_event(Event::keyboard(EventType::KeyDown, node, key))
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    /// Currently focused element
    pub fn active_element(&self) -> Option<NodeId> {
        self.focused.to_option()
    }

    /// Move focus to `node`, blurring the previous element first.
    /// Ignored for non-elements, disconnected nodes and the focused node.
    pub fn focus(&mut self, node: NodeId) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        if self.focused == node || !self.tree.is_element(node) || !self.tree.is_connected(node) {
            return outcome;
        }

        let previous = self.focused;
        if previous.is_valid() {
            outcome.merge(self.blur_with_related(previous, node));
        }

        self.focused = node;
        outcome.merge(self.dispatch_event(Event::new(EventType::Focus, node).with_related_target(previous)));
        outcome.merge(self.dispatch_event(Event::new(EventType::FocusIn, node).with_related_target(previous)));
        outcome
    }

    /// Blur `node` if it has focus
    pub fn blur(&mut self, node: NodeId) -> DispatchOutcome {
        if self.focused != node || !node.is_valid() {
            return DispatchOutcome::default();
        }
        self.blur_with_related(node, NodeId::NONE)
    }

    fn blur_with_related(&mut self, node: NodeId, related: NodeId) -> DispatchOutcome {
        self.focused = NodeId::NONE;
        let mut outcome = self.dispatch_event(Event::new(EventType::Blur, node).with_related_target(related));
        outcome.merge(self.dispatch_event(Event::new(EventType::FocusOut, node).with_related_target(related)));
        outcome
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    /// Schedule `callback` after `delay_ms` of virtual time
    pub fn set_timeout(&mut self, delay_ms: u64, callback: TimerCallback) -> TimerId {
        self.timers.set_timeout(delay_ms, callback)
    }

    /// Cancel a pending timer
    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        self.timers.clear(id)
    }

    /// Whether a timer has yet to fire
    pub fn is_timer_pending(&self, id: TimerId) -> bool {
        self.timers.is_pending(id)
    }

    /// Number of pending timers
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Current virtual time in ms
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    /// Advance the virtual clock, running due timers in order.
    /// Returns how many fired.
    pub fn advance_time(&mut self, ms: u64) -> usize {
        let deadline = self.timers.now().saturating_add(ms);
        let mut fired = 0;
        while let Some(callback) = self.timers.pop_due(deadline) {
            callback(self);
            fired += 1;
        }
        self.timers.set_now(deadline);
        fired
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Visible viewport in document coordinates
    pub fn viewport(&self) -> DOMRect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: DOMRect) {
        self.viewport = viewport;
    }

    /// Record the layout box of `node`
    pub fn set_layout_rect(&mut self, node: NodeId, rect: DOMRect) {
        self.layout.insert(node, rect);
    }

    /// Layout box of `node`; empty when the host never laid it out
    pub fn bounding_client_rect(&self, node: NodeId) -> DOMRect {
        self.layout.get(&node).copied().unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Languages
    // ------------------------------------------------------------------

    /// `navigator.languages`
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn set_languages(&mut self, languages: Vec<String>) {
        self.languages = languages;
    }

    /// First preferred language, falling back to `en-US`
    pub fn preferred_language(&self) -> &str {
        self.languages
            .first()
            .map(String::as_str)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("url", &self.url)
            .field("nodes", &self.tree.len())
            .field("focused", &self.focused)
            .field("listeners", &self.listeners)
            .field("timers", &self.timers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, label: &str) -> Listener {
        let log = Rc::clone(log);
        let label = label.to_string();
        Rc::new(move |_, event| {
            log.borrow_mut().push(format!("{label}:{:?}", event.phase));
            Ok(())
        })
    }

    #[test]
    fn test_new_document_structure() {
        let doc = Document::new("https://example.gov");
        assert_eq!(doc.url(), "https://example.gov");
        assert_eq!(doc.tree().tag_name(doc.body()), Some("body"));
        assert_eq!(doc.tree().parent(doc.body()), Some(doc.document_element()));
    }

    #[test]
    fn test_capture_target_bubble_order() {
        let mut doc = Document::default();
        let body = doc.body();
        let button = doc.tree.create_element("button");
        doc.tree.append_child(body, button).unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        doc.add_event_listener(body, EventType::Click, ListenerOptions::default(), recorder(&log, "body"));
        doc.add_event_listener(body, EventType::Click, ListenerOptions::capture(), recorder(&log, "body-capture"));
        doc.add_event_listener(button, EventType::Click, ListenerOptions::default(), recorder(&log, "button"));

        doc.click(button);
        assert_eq!(
            *log.borrow(),
            vec!["body-capture:Capturing", "button:AtTarget", "body:Bubbling"]
        );
    }

    #[test]
    fn test_focus_does_not_bubble() {
        let mut doc = Document::default();
        let body = doc.body();
        let input = doc.tree.create_element("input");
        doc.tree.append_child(body, input).unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        doc.add_event_listener(body, EventType::Focus, ListenerOptions::default(), recorder(&log, "bubble"));
        doc.add_event_listener(body, EventType::Focus, ListenerOptions::capture(), recorder(&log, "capture"));

        doc.focus(input);
        assert_eq!(*log.borrow(), vec!["capture:Capturing"]);
        assert_eq!(doc.active_element(), Some(input));
    }

    #[test]
    fn test_failing_listener_does_not_stop_others() {
        let mut doc = Document::default();
        let body = doc.body();
        let log = Rc::new(RefCell::new(Vec::new()));

        doc.add_event_listener(
            body,
            EventType::Click,
            ListenerOptions::default(),
            Rc::new(|_, _| Err("broken markup".into())),
        );
        doc.add_event_listener(body, EventType::Click, ListenerOptions::default(), recorder(&log, "second"));

        let outcome = doc.click(body);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_once_listener() {
        let mut doc = Document::default();
        let body = doc.body();
        let log = Rc::new(RefCell::new(Vec::new()));
        let options = ListenerOptions { once: true, ..Default::default() };
        doc.add_event_listener(body, EventType::Click, options, recorder(&log, "once"));

        doc.click(body);
        doc.click(body);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(doc.listener_count(body), 0);
    }

    #[test]
    fn test_passive_listener_cannot_prevent_default() {
        let mut doc = Document::default();
        let body = doc.body();
        let options = ListenerOptions { passive: true, ..Default::default() };
        doc.add_event_listener(
            body,
            EventType::Click,
            options,
            Rc::new(|_, event| {
                event.prevent_default();
                Ok(())
            }),
        );

        assert!(!doc.click(body).default_prevented);
    }

    #[test]
    fn test_advance_time_runs_due_timers() {
        let mut doc = Document::default();
        let fired = Rc::new(RefCell::new(Vec::new()));

        let f = Rc::clone(&fired);
        doc.set_timeout(200, Box::new(move |_| f.borrow_mut().push(200)));
        let f = Rc::clone(&fired);
        let cancelled = doc.set_timeout(100, Box::new(move |_| f.borrow_mut().push(100)));
        assert!(doc.clear_timeout(cancelled));

        assert_eq!(doc.advance_time(150), 0);
        assert_eq!(doc.now(), 150);
        assert_eq!(doc.advance_time(100), 1);
        assert_eq!(*fired.borrow(), vec![200]);
    }

    #[test]
    fn test_remove_focused_subtree_blurs() {
        let mut doc = Document::default();
        let body = doc.body();
        let wrapper = doc.tree.create_element("div");
        let button = doc.tree.create_element("button");
        doc.tree.append_child(body, wrapper).unwrap();
        doc.tree.append_child(wrapper, button).unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        doc.add_event_listener(button, EventType::Blur, ListenerOptions::default(), recorder(&log, "blur"));

        doc.focus(button);
        doc.remove_child(body, wrapper).unwrap();
        assert_eq!(doc.active_element(), None);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_remove_child_fires_node_removed_before_detaching() {
        let mut doc = Document::default();
        let body = doc.body();
        let list = doc.tree.create_element("ul");
        let item = doc.tree.create_element("li");
        doc.tree.append_child(body, list).unwrap();
        doc.tree.append_child(list, item).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let listener: Listener = Rc::new(move |doc: &mut Document, event: &mut Event| {
            sink.borrow_mut()
                .push((event.target, event.related_target, doc.tree.is_connected(event.target)));
            Ok(())
        });
        doc.add_event_listener(body, EventType::NodeRemoved, ListenerOptions::default(), listener);

        doc.remove_child(list, item).unwrap();
        assert_eq!(*seen.borrow(), vec![(item, Some(list), true)]);
        assert!(!doc.tree.is_connected(item));

        // Not a child: error, and no event
        assert!(doc.remove_child(list, item).is_err());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_generate_id_skips_existing() {
        let mut doc = Document::default();
        let body = doc.body();
        let taken = doc.tree.create_element("span");
        doc.tree.append_child(body, taken).unwrap();
        doc.tree.set_attribute(taken, "id", "tooltip-1").unwrap();

        assert_eq!(doc.generate_id("tooltip"), "tooltip-2");
    }

    #[test]
    fn test_preferred_language_fallback() {
        let mut doc = Document::default();
        assert_eq!(doc.preferred_language(), "en-US");
        doc.set_languages(vec!["tr-TR".into(), "en".into()]);
        assert_eq!(doc.preferred_language(), "tr-TR");
        doc.set_languages(Vec::new());
        assert_eq!(doc.preferred_language(), "en-US");
    }
}
