//! Behavior binder
//!
//! A behavior is a fixed table of (event type, selector, handler) entries
//! plus optional `init`/`teardown` hooks. Binding it to a root installs one
//! delegating listener per event type on that root; the listener walks from
//! the event target up to the root and hands the event to the handler of
//! the first node matching a selector registered for that event type.

use crate::BehaviorError;
use crate::select::resolve_root;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use uswds_css::SelectorList;
use uswds_dom::{Document, Event, EventType, Listener, ListenerError, ListenerId, ListenerOptions, NodeId};

/// Delegated event handler. `event.target` is the element that matched.
pub type Handler = Rc<dyn Fn(&mut Document, &mut Event) -> Result<(), ListenerError>>;

/// Lifecycle hook receiving the bound root
pub type Hook = Rc<dyn Fn(&mut Document, NodeId) -> Result<(), ListenerError>>;

struct Delegate {
    selector: SelectorList,
    handler: Handler,
}

/// Builder for [`Behavior`]
pub struct BehaviorBuilder {
    name: String,
    entries: Vec<(EventType, String, Handler)>,
    init: Option<Hook>,
    teardown: Option<Hook>,
}

impl BehaviorBuilder {
    /// Handle `event_type` for elements matching `selector`
    pub fn on<F>(mut self, event_type: EventType, selector: &str, handler: F) -> Self
    where
        F: Fn(&mut Document, &mut Event) -> Result<(), ListenerError> + 'static,
    {
        let handler: Handler = Rc::new(handler);
        self.entries.push((event_type, selector.to_string(), handler));
        self
    }

    /// Run after every successful attach
    pub fn init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Document, NodeId) -> Result<(), ListenerError> + 'static,
    {
        self.init = Some(Rc::new(hook));
        self
    }

    /// Run after every detach
    pub fn teardown<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Document, NodeId) -> Result<(), ListenerError> + 'static,
    {
        self.teardown = Some(Rc::new(hook));
        self
    }

    /// Compile every selector and freeze the table
    pub fn build(self) -> Result<Behavior, BehaviorError> {
        let mut events: Vec<(EventType, Vec<Delegate>)> = Vec::new();

        for (event_type, selector, handler) in self.entries {
            let selector =
                SelectorList::parse(&selector).map_err(|source| BehaviorError::InvalidSelector {
                    behavior: self.name.clone(),
                    selector,
                    source,
                })?;
            let delegate = Delegate { selector, handler };

            match events.iter_mut().find(|(ty, _)| *ty == event_type) {
                Some((_, delegates)) => delegates.push(delegate),
                None => events.push((event_type, vec![delegate])),
            }
        }

        Ok(Behavior {
            inner: Rc::new(Inner {
                name: self.name,
                events: events
                    .into_iter()
                    .map(|(ty, delegates)| (ty, Rc::new(delegates)))
                    .collect(),
                init: self.init,
                teardown: self.teardown,
                attached: RefCell::new(HashMap::new()),
            }),
        })
    }
}

struct Inner {
    name: String,
    events: Vec<(EventType, Rc<Vec<Delegate>>)>,
    init: Option<Hook>,
    teardown: Option<Hook>,
    /// Listeners installed per bound root
    attached: RefCell<HashMap<NodeId, Vec<ListenerId>>>,
}

/// A bindable set of delegated handlers. Clones share attachment state.
#[derive(Clone)]
pub struct Behavior {
    inner: Rc<Inner>,
}

impl Behavior {
    /// Start building a behavior called `name`
    pub fn builder(name: &str) -> BehaviorBuilder {
        BehaviorBuilder {
            name: name.to_string(),
            entries: Vec::new(),
            init: None,
            teardown: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Event types this behavior listens for
    pub fn event_types(&self) -> impl Iterator<Item = EventType> + '_ {
        self.inner.events.iter().map(|(ty, _)| *ty)
    }

    /// Check if the behavior is bound to `root`
    pub fn is_attached(&self, doc: &Document, root: NodeId) -> bool {
        let root = resolve_root(doc, root);
        self.inner.attached.borrow().contains_key(&root)
    }

    /// Bind to `root` and run `init`. Binding an already bound root does
    /// nothing.
    pub fn on(&self, doc: &mut Document, root: NodeId) -> Result<(), BehaviorError> {
        let root = resolve_root(doc, root);
        if self.inner.attached.borrow().contains_key(&root) {
            tracing::trace!("{} already attached to {}", self.inner.name, root);
            return Ok(());
        }

        let ids: Vec<ListenerId> = self
            .inner
            .events
            .iter()
            .map(|(event_type, delegates)| {
                // Non-bubbling events only reach the root while capturing
                let options = if event_type.bubbles() {
                    ListenerOptions::default()
                } else {
                    ListenerOptions::capture()
                };
                let listener = delegating_listener(&self.inner.name, root, Rc::clone(delegates));
                doc.add_event_listener(root, *event_type, options, listener)
            })
            .collect();

        tracing::debug!("Attached {} to {} ({} listeners)", self.inner.name, root, ids.len());
        self.inner.attached.borrow_mut().insert(root, ids);

        self.run_hook(self.inner.init.as_ref(), "init", doc, root)
    }

    /// Remove this behavior's listeners from `root` and run `teardown`.
    /// Unbound roots are ignored.
    pub fn off(&self, doc: &mut Document, root: NodeId) -> Result<(), BehaviorError> {
        let root = resolve_root(doc, root);
        let Some(ids) = self.inner.attached.borrow_mut().remove(&root) else {
            return Ok(());
        };

        for id in ids {
            doc.remove_event_listener(id);
        }
        tracing::debug!("Detached {} from {}", self.inner.name, root);

        self.run_hook(self.inner.teardown.as_ref(), "teardown", doc, root)
    }

    fn run_hook(
        &self,
        hook: Option<&Hook>,
        name: &'static str,
        doc: &mut Document,
        root: NodeId,
    ) -> Result<(), BehaviorError> {
        let Some(hook) = hook else {
            return Ok(());
        };
        hook(doc, root).map_err(|source| BehaviorError::Hook {
            behavior: self.inner.name.clone(),
            hook: name,
            root,
            source,
        })
    }
}

impl std::fmt::Debug for Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Behavior")
            .field("name", &self.inner.name)
            .field("events", &self.event_types().collect::<Vec<_>>())
            .field("roots", &self.inner.attached.borrow().len())
            .finish()
    }
}

fn delegating_listener(name: &str, root: NodeId, delegates: Rc<Vec<Delegate>>) -> Listener {
    let name = name.to_string();
    Rc::new(move |doc: &mut Document, event: &mut Event| {
        let mut current = Some(event.target);

        while let Some(node) = current {
            let matched = delegates
                .iter()
                .find(|d| d.selector.matches(&doc.tree, node));

            if let Some(delegate) = matched {
                tracing::trace!(
                    "{}: {} on {} matched `{}` at {}",
                    name,
                    event.event_type,
                    event.target,
                    delegate.selector,
                    node
                );
                let handler = Rc::clone(&delegate.handler);
                let mut delegated = event.rebased(node);
                let result = handler(doc, &mut delegated);
                event.absorb(&delegated);
                return result;
            }

            if node == root {
                break;
            }
            current = doc.tree.parent(node);
        }
        Ok(())
    })
}
