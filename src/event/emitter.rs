//! Control-level events: the event record, listener lists, direct handlers.
//!
//! Every emission builds one [`Event`] (`type` + target id + detail), runs the
//! control's direct handler for that type if one is set, then every listener
//! registered with `on`, in registration order. Listeners get the emitting
//! control mutably, so they may call back into it.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::{Changes, Value};
use crate::widget::Control;

/// A listener callback. Shared so that emission can snapshot the list before
/// invoking it.
pub type Listener = Rc<dyn Fn(&mut Control, &Event)>;

/// Handle returned by `on`, used to detach one listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Payload carried by an [`Event`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EventDetail {
    #[default]
    None,
    /// `propertychange` carries the change map.
    Changes(Changes),
    /// Positional arguments (e.g. `change` carries `from`, `to`).
    Args(Vec<Value>),
    /// Named fields (e.g. Tab `add` carries `index` and `tab`).
    Fields(IndexMap<String, Value>),
}

/// The record every listener receives.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event type, e.g. `"propertychange"`.
    pub kind: String,
    /// Id of the control that emitted the event.
    pub target: String,
    pub detail: EventDetail,
}

impl Event {
    pub fn new(kind: impl Into<String>, target: impl Into<String>, detail: EventDetail) -> Self {
        Self {
            kind: kind.into(),
            target: target.into(),
            detail,
        }
    }

    /// The change map, for `propertychange`.
    pub fn changes(&self) -> Option<&Changes> {
        match &self.detail {
            EventDetail::Changes(changes) => Some(changes),
            _ => None,
        }
    }

    /// Positional argument `index`, or `Null`.
    pub fn arg(&self, index: usize) -> Value {
        match &self.detail {
            EventDetail::Args(args) => args.get(index).cloned().unwrap_or_default(),
            _ => Value::Null,
        }
    }

    /// Named field `name`, or `Null`.
    pub fn field(&self, name: &str) -> Value {
        match &self.detail {
            EventDetail::Fields(fields) => fields.get(name).cloned().unwrap_or_default(),
            _ => Value::Null,
        }
    }
}

/// Per-control listener storage.
#[derive(Default)]
pub struct Emitter {
    listeners: IndexMap<String, Vec<(ListenerId, Listener)>>,
    direct: HashMap<String, Listener>,
    next_id: u64,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for events of type `kind`.
    pub fn on(&mut self, kind: &str, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners
            .entry(kind.to_owned())
            .or_default()
            .push((id, listener));
        id
    }

    /// Detach one listener. Returns whether it was registered.
    pub fn off(&mut self, kind: &str, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(lid, _)| *lid != id);
        before != list.len()
    }

    /// Detach every listener of `kind`.
    pub fn off_kind(&mut self, kind: &str) {
        self.listeners.shift_remove(kind);
    }

    /// Detach every listener of every kind. Direct handlers stay.
    pub fn off_all(&mut self) {
        self.listeners.clear();
    }

    /// Snapshot of the listeners for `kind`.
    pub fn listeners(&self, kind: &str) -> Vec<Listener> {
        self.listeners
            .get(kind)
            .map(|list| list.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default()
    }

    pub fn listener_count(&self, kind: &str) -> usize {
        self.listeners.get(kind).map_or(0, Vec::len)
    }

    /// Install (or clear) the direct `on<Type>` handler for `kind`.
    pub fn set_direct(&mut self, kind: &str, handler: Option<Listener>) {
        match handler {
            Some(handler) => {
                self.direct.insert(kind.to_owned(), handler);
            }
            None => {
                self.direct.remove(kind);
            }
        }
    }

    pub fn direct(&self, kind: &str) -> Option<Listener> {
        self.direct.get(kind).cloned()
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(&str, usize)> = self
            .listeners
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        f.debug_struct("Emitter")
            .field("listeners", &counts)
            .field("direct", &self.direct.keys().collect::<Vec<_>>())
            .finish()
    }
}
