//! Tooltip component
//!
//! Moves a trigger's `title` into a generated body element and shows that
//! body while the trigger is focused, hovered or touched. Every signal
//! feeds the same two transitions, expand and collapse; visibility is read
//! back from the body's `is-set` class.

mod position;

pub use position::Side;

use crate::{Behavior, BehaviorError, Config};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use uswds_css::{ElementQuery, SelectorList};
use uswds_dom::{Document, DomResult, Event, EventType, ListenerError, NodeId, TimerId};

const VISIBLE_CLASS: &str = "is-set";
const ESCAPE: &str = "Escape";
const FOCUSABLE_TAGS: &[&str] = &["a", "button", "input", "select", "textarea"];

/// Tooltip visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipState {
    Collapsed,
    Expanded,
}

/// Class names derived from the configured prefix
struct Classes {
    tooltip: String,
    trigger: String,
    body: String,
}

struct Shared {
    classes: Classes,
    tooltip_selector: SelectorList,
    trigger_selector: SelectorList,
    body_selector: SelectorList,
    hover_delay_ms: u64,
    gap: f64,
    /// Pending hover-dwell timers per trigger
    hover_timers: RefCell<HashMap<NodeId, TimerId>>,
}

/// Tooltip behavior
#[derive(Clone)]
pub struct Tooltip {
    behavior: Behavior,
    shared: Rc<Shared>,
}

impl Tooltip {
    pub fn new(config: &Config) -> Result<Self, BehaviorError> {
        let classes = Classes {
            tooltip: config.class("tooltip"),
            trigger: config.class("tooltip__trigger"),
            body: config.class("tooltip__body"),
        };
        let compile = |selector: String| {
            SelectorList::parse(&selector).map_err(|source| BehaviorError::InvalidSelector {
                behavior: "tooltip".to_string(),
                selector,
                source,
            })
        };

        let shared = Rc::new(Shared {
            tooltip_selector: compile(format!(".{}", classes.tooltip))?,
            trigger_selector: compile(format!(".{}", classes.trigger))?,
            body_selector: compile(format!(".{}", classes.body))?,
            classes,
            hover_delay_ms: config.hover_delay_ms,
            gap: config.tooltip_gap_px,
            hover_timers: RefCell::new(HashMap::new()),
        });

        let trigger = shared.trigger_selector.source().to_string();
        let handler = |f: fn(&Rc<Shared>, &mut Document, NodeId) -> DomResult<()>| {
            let shared = Rc::clone(&shared);
            move |doc: &mut Document, event: &mut Event| -> Result<(), ListenerError> {
                Ok(f(&shared, doc, event.target)?)
            }
        };

        let behavior = Behavior::builder("tooltip")
            .on(EventType::Focus, &trigger, handler(|s, doc, t| s.expand(doc, t)))
            .on(EventType::Blur, &trigger, handler(|s, doc, t| s.collapse(doc, t)))
            .on(EventType::MouseOver, &trigger, handler(Shared::schedule_hover))
            .on(EventType::TouchStart, &trigger, handler(|s, doc, t| s.expand(doc, t)))
            .on(EventType::TouchEnd, &trigger, handler(|s, doc, t| s.collapse(doc, t)))
            .on(EventType::TouchCancel, &trigger, handler(|s, doc, t| s.collapse(doc, t)))
            .on(EventType::MouseOut, &trigger, {
                let shared = Rc::clone(&shared);
                move |doc, event| {
                    // Moving between the trigger's own children is not leaving it
                    if event
                        .related_target
                        .is_some_and(|related| doc.tree.contains(event.target, related))
                    {
                        return Ok(());
                    }
                    shared.cancel_hover(doc, event.target);
                    Ok(shared.collapse(doc, event.target)?)
                }
            })
            .on(EventType::KeyDown, &trigger, {
                let shared = Rc::clone(&shared);
                move |doc, event| {
                    if event.key.as_deref() == Some(ESCAPE) {
                        shared.collapse(doc, event.target)?;
                    }
                    Ok(())
                }
            })
            .on(EventType::NodeRemoved, "*", handler(Shared::release_subtree))
            .init({
                let shared = Rc::clone(&shared);
                move |doc, root| Ok(shared.setup(doc, root)?)
            })
            .teardown({
                let shared = Rc::clone(&shared);
                move |doc, root| Ok(shared.teardown(doc, root)?)
            })
            .build()?;

        Ok(Self { behavior, shared })
    }

    /// Underlying delegated behavior
    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Attach to `root` and set up every trigger under it
    pub fn on(&self, doc: &mut Document, root: NodeId) -> Result<(), BehaviorError> {
        self.behavior.on(doc, root)
    }

    /// Detach from `root`, cancelling hover timers and collapsing every
    /// expanded body under it
    pub fn off(&self, doc: &mut Document, root: NodeId) -> Result<(), BehaviorError> {
        self.behavior.off(doc, root)
    }

    /// Body element generated for `trigger`
    pub fn body_for(&self, doc: &Document, trigger: NodeId) -> Option<NodeId> {
        self.shared.body_for(doc, trigger)
    }

    /// Current state of `trigger`'s tooltip
    pub fn state(&self, doc: &Document, trigger: NodeId) -> Option<TooltipState> {
        let body = self.body_for(doc, trigger)?;
        Some(if doc.tree.has_class(body, VISIBLE_CLASS) {
            TooltipState::Expanded
        } else {
            TooltipState::Collapsed
        })
    }
}

impl Shared {
    /// Turn every eligible `.usa-tooltip` under `root` into a trigger
    fn setup(&self, doc: &mut Document, root: NodeId) -> DomResult<()> {
        let candidates = doc.tree.query_selector_all(root, &self.tooltip_selector);
        let mut count = 0;

        for candidate in candidates {
            if self.is_wrapper(doc, candidate) {
                continue;
            }
            let title = doc.tree.attribute(candidate, "title").unwrap_or_default();
            if title.trim().is_empty() {
                tracing::trace!("Tooltip {} has no title, skipping", candidate);
                continue;
            }
            let title = title.to_string();
            self.setup_trigger(doc, candidate, &title)?;
            count += 1;
        }

        tracing::debug!("Set up {} tooltips under {}", count, root);
        Ok(())
    }

    /// Wrappers are generated `span.usa-tooltip` holding a trigger
    fn is_wrapper(&self, doc: &Document, node: NodeId) -> bool {
        doc.tree
            .element_children(node)
            .into_iter()
            .any(|child| self.trigger_selector.matches(&doc.tree, child))
    }

    fn setup_trigger(&self, doc: &mut Document, trigger: NodeId, title: &str) -> DomResult<()> {
        let Some(parent) = doc.tree.parent(trigger) else {
            return Ok(());
        };
        let body_id = doc.generate_id(&self.classes.body);
        let tree = &mut doc.tree;

        let wrapper = tree.create_element("span");
        tree.set_attribute(wrapper, "class", &self.classes.tooltip)?;
        tree.insert_before(parent, wrapper, Some(trigger))?;
        tree.append_child(wrapper, trigger)?;

        let body = tree.create_element("span");
        tree.set_attribute(body, "class", &self.classes.body)?;
        tree.set_attribute(body, "id", &body_id)?;
        tree.set_attribute(body, "role", "tooltip")?;
        tree.set_attribute(body, "aria-hidden", "true")?;
        tree.set_text_content(body, title)?;
        tree.append_child(wrapper, body)?;

        tree.set_attribute(trigger, "title", "")?;
        tree.replace_class(trigger, &self.classes.tooltip, &self.classes.trigger)?;
        tree.set_attribute(trigger, "aria-describedby", &body_id)?;

        let tag = tree.tag_name(trigger).unwrap_or_default().to_string();
        if tag != "button" {
            tree.set_attribute(trigger, "role", "button")?;
        }
        let focusable = FOCUSABLE_TAGS.contains(&tag.as_str()) || tree.has_attribute(trigger, "tabindex");
        if !focusable {
            tree.set_attribute(trigger, "tabindex", "0")?;
        }
        Ok(())
    }

    fn body_for(&self, doc: &Document, trigger: NodeId) -> Option<NodeId> {
        let wrapper = doc.tree.parent(trigger)?;
        doc.tree
            .element_children(wrapper)
            .into_iter()
            .find(|&child| self.body_selector.matches(&doc.tree, child))
    }

    fn expand(&self, doc: &mut Document, trigger: NodeId) -> DomResult<()> {
        let Some(body) = self.body_for(doc, trigger) else {
            return Ok(());
        };
        self.cancel_hover(doc, trigger);

        doc.tree.add_class(body, VISIBLE_CLASS)?;
        doc.tree.set_attribute(body, "aria-hidden", "false")?;
        self.position(doc, trigger, body)
    }

    fn collapse(&self, doc: &mut Document, trigger: NodeId) -> DomResult<()> {
        match self.body_for(doc, trigger) {
            Some(body) => self.hide_body(doc, body),
            None => Ok(()),
        }
    }

    fn hide_body(&self, doc: &mut Document, body: NodeId) -> DomResult<()> {
        doc.tree.remove_class(body, VISIBLE_CLASS)?;
        doc.tree.set_attribute(body, "aria-hidden", "true")?;
        for side in Side::ORDER {
            doc.tree.remove_class(body, &self.side_class(side))?;
        }
        Ok(())
    }

    fn side_class(&self, side: Side) -> String {
        format!("{}--{}", self.classes.body, side.name())
    }

    fn position(&self, doc: &mut Document, trigger: NodeId, body: NodeId) -> DomResult<()> {
        let preferred = doc
            .tree
            .attribute(trigger, "data-position")
            .and_then(Side::parse)
            .unwrap_or(Side::Top);
        let anchor = doc.bounding_client_rect(trigger);
        let size = doc.bounding_client_rect(body);

        let (side, rect) = position::choose(
            anchor,
            size.width,
            size.height,
            doc.viewport(),
            preferred,
            self.gap,
        );
        tracing::trace!("Tooltip {} placed {} at ({}, {})", body, side.name(), rect.x, rect.y);

        for other in Side::ORDER {
            if other != side {
                doc.tree.remove_class(body, &self.side_class(other))?;
            }
        }
        doc.tree.add_class(body, &self.side_class(side))?;
        doc.tree
            .set_attribute(body, "style", &format!("left: {}px; top: {}px;", rect.x, rect.y))
    }

    /// Expand after the hover dwell unless the pointer leaves first
    fn schedule_hover(self: &Rc<Self>, doc: &mut Document, trigger: NodeId) -> DomResult<()> {
        if self.hover_timers.borrow().contains_key(&trigger) {
            return Ok(());
        }

        let shared = Rc::clone(self);
        let timer = doc.set_timeout(
            self.hover_delay_ms,
            Box::new(move |doc: &mut Document| {
                shared.hover_timers.borrow_mut().remove(&trigger);
                if !doc.tree.is_connected(trigger) {
                    return;
                }
                if let Err(err) = shared.expand(doc, trigger) {
                    tracing::warn!("Hover expand of {} failed: {}", trigger, err);
                }
            }),
        );
        self.hover_timers.borrow_mut().insert(trigger, timer);
        Ok(())
    }

    fn cancel_hover(&self, doc: &mut Document, trigger: NodeId) {
        if let Some(timer) = self.hover_timers.borrow_mut().remove(&trigger) {
            doc.clear_timeout(timer);
        }
    }

    /// Collapse and stop the hover dwell of every trigger in a subtree
    /// about to be removed
    fn release_subtree(self: &Rc<Self>, doc: &mut Document, removed: NodeId) -> DomResult<()> {
        let mut triggers = doc.tree.query_selector_all(removed, &self.trigger_selector);
        if self.trigger_selector.matches(&doc.tree, removed) {
            triggers.insert(0, removed);
        }
        if !triggers.is_empty() {
            tracing::debug!("Releasing {} tooltip triggers under removed {}", triggers.len(), removed);
        }
        for trigger in triggers {
            self.cancel_hover(doc, trigger);
            self.collapse(doc, trigger)?;
        }
        Ok(())
    }

    fn teardown(&self, doc: &mut Document, root: NodeId) -> DomResult<()> {
        let pending: Vec<NodeId> = self
            .hover_timers
            .borrow()
            .keys()
            .copied()
            .filter(|&trigger| doc.tree.contains(root, trigger))
            .collect();
        for trigger in pending {
            self.cancel_hover(doc, trigger);
        }

        let expanded: Vec<NodeId> = doc
            .tree
            .query_selector_all(root, &self.body_selector)
            .into_iter()
            .filter(|&body| doc.tree.has_class(body, VISIBLE_CLASS))
            .collect();
        tracing::debug!("Collapsing {} tooltips under {}", expanded.len(), root);
        for body in expanded {
            self.hide_body(doc, body)?;
        }
        Ok(())
    }
}
