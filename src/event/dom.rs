//! DOM event bindings owned by controls, and bubbling dispatch.
//!
//! A control subscribes to `(node, type)` pairs through its [`DomEvents`]
//! store; the document keeps a reverse index of which controls listen on
//! which node. [`dispatch`] walks the bubble path from the target up to the
//! root and hands the event to every bound control on each node.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::dom::{Document, Dom, NodeId};
use crate::registry;
use crate::value::Properties;
use crate::widget::Control;

/// A DOM event handler bound by a control.
pub type DomHandler = Rc<dyn Fn(&mut Control, &DomEvent)>;

/// Handle returned by `add_dom_event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomHandlerId(u64);

/// A DOM-level event in flight.
#[derive(Debug, Clone)]
pub struct DomEvent {
    /// Event type, e.g. `"click"`.
    pub kind: String,
    /// The node the event was dispatched on.
    pub target: NodeId,
    /// The node whose binding is currently running.
    pub current_target: NodeId,
    /// Free-form payload (pointer position, key, ...).
    pub data: Properties,
    stopped: Rc<Cell<bool>>,
    prevented: Rc<Cell<bool>>,
}

impl DomEvent {
    pub fn new(kind: impl Into<String>, target: NodeId) -> Self {
        Self {
            kind: kind.into(),
            target,
            current_target: target,
            data: Properties::new(),
            stopped: Rc::default(),
            prevented: Rc::default(),
        }
    }

    pub fn with_data(mut self, data: Properties) -> Self {
        self.data = data;
        self
    }

    /// Stop bubbling after the current node.
    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn prevent_default(&self) {
        self.prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.prevented.get()
    }
}

/// Compute the bubble path from `start` up to the root (inclusive).
///
/// Returns `[start, parent, grandparent, ..., root]`.
/// If `start` does not exist in the DOM, returns an empty vec.
pub fn bubble_path(dom: &Dom, start: NodeId) -> Vec<NodeId> {
    if !dom.contains(start) {
        return Vec::new();
    }
    let mut path = vec![start];
    path.extend(dom.ancestors(start));
    path
}

/// Dispatch `event` on `doc`, bubbling from `event.target`.
///
/// Controls are resolved through the instance registry at delivery time, so
/// a disposed control (already unregistered) never sees the event. A control
/// that is mid-callback (already borrowed) is skipped.
pub fn dispatch(doc: &Document, mut event: DomEvent) -> DomEvent {
    let path = doc.read(|dom| bubble_path(dom, event.target));
    for node in path {
        event.current_target = node;
        for binding in doc.bindings(node, &event.kind) {
            let Some(control) = registry::get(&binding.control) else {
                continue;
            };
            let Ok(mut control) = control.try_borrow_mut() else {
                tracing::trace!(control = %binding.control, kind = %event.kind, "skipping busy control");
                continue;
            };
            control.trigger_dom_event(node, &event);
        }
        if event.stopped.get() {
            break;
        }
    }
    event
}

/// Per-control store of DOM handlers, keyed by node then event type.
#[derive(Default)]
pub struct DomEvents {
    handlers: IndexMap<NodeId, IndexMap<String, Vec<(DomHandlerId, DomHandler)>>>,
    next_id: u64,
}

impl DomEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a handler. Returns its id and whether this is the first
    /// handler for `(node, kind)` (the document binding must be created).
    pub fn add(&mut self, node: NodeId, kind: &str, handler: DomHandler) -> (DomHandlerId, bool) {
        self.next_id += 1;
        let id = DomHandlerId(self.next_id);
        let list = self
            .handlers
            .entry(node)
            .or_default()
            .entry(kind.to_owned())
            .or_default();
        let first = list.is_empty();
        list.push((id, handler));
        (id, first)
    }

    /// Remove one handler (or all for `(node, kind)` when `id` is `None`).
    /// Returns whether no handlers remain for `(node, kind)`.
    pub fn remove(&mut self, node: NodeId, kind: &str, id: Option<DomHandlerId>) -> bool {
        let Some(by_kind) = self.handlers.get_mut(&node) else {
            return true;
        };
        let empty = match (by_kind.get_mut(kind), id) {
            (Some(list), Some(id)) => {
                list.retain(|(hid, _)| *hid != id);
                list.is_empty()
            }
            _ => true,
        };
        if empty {
            by_kind.shift_remove(kind);
        }
        if by_kind.is_empty() {
            self.handlers.shift_remove(&node);
        }
        empty
    }

    /// Drop every handler on `node`; returns the event types it had.
    pub fn clear_node(&mut self, node: NodeId) -> Vec<String> {
        self.handlers
            .shift_remove(&node)
            .map(|by_kind| by_kind.into_keys().collect())
            .unwrap_or_default()
    }

    /// Nodes that currently carry handlers.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.handlers.keys().copied().collect()
    }

    /// Snapshot of handlers for `(node, kind)`.
    pub fn handlers(&self, node: NodeId, kind: &str) -> Vec<DomHandler> {
        self.handlers
            .get(&node)
            .and_then(|by_kind| by_kind.get(kind))
            .map(|list| list.iter().map(|(_, h)| Rc::clone(h)).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for DomEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomEvents")
            .field("nodes", &self.handlers.len())
            .finish()
    }
}
