//! Construction options: plain values, `onXxx` listeners, root node, document.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::dom::{Document, NodeId};
use crate::event::{Event, Listener};
use crate::value::{Properties, Value};

use super::control::Control;

/// One option entry.
#[derive(Clone)]
pub enum OptionValue {
    Value(Value),
    /// A callback given under an `onXxx` key.
    Listener(Listener),
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "Value({v:?})"),
            Self::Listener(_) => write!(f, "Listener(<fn>)"),
        }
    }
}

/// Options handed to a control constructor.
///
/// `main` and `document` are structural; everything else is an ordered
/// entry map that becomes the control's initial properties.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub main: Option<NodeId>,
    pub document: Option<Document>,
    entries: IndexMap<String, OptionValue>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a plain value (builder).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set an `onXxx` listener (builder), e.g. `.listener("onInit", f)`.
    pub fn listener(
        mut self,
        key: impl Into<String>,
        listener: impl Fn(&mut Control, &Event) + 'static,
    ) -> Self {
        self.entries
            .insert(key.into(), OptionValue::Listener(Rc::new(listener)));
        self
    }

    /// Use an existing node as the control's root (builder).
    pub fn main(mut self, node: NodeId) -> Self {
        self.main = Some(node);
        self
    }

    /// Build in `doc` instead of the thread's default document (builder).
    pub fn document(mut self, doc: Document) -> Self {
        self.document = Some(doc);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries
            .insert(key.into(), OptionValue::Value(value.into()));
    }

    /// Plain value under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.entries.get(key) {
            Some(OptionValue::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.entries.shift_remove(key)
    }

    /// Insert `key` only when absent.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries
            .entry(key.into())
            .or_insert_with(|| OptionValue::Value(value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> IndexMap<String, OptionValue> {
        self.entries
    }
}

impl From<Properties> for Options {
    fn from(props: Properties) -> Self {
        Self {
            main: None,
            document: None,
            entries: props
                .into_iter()
                .map(|(k, v)| (k, OptionValue::Value(v)))
                .collect(),
        }
    }
}

/// `onFooBar` -> `fooBar`; `None` when `key` is not `on` + uppercase letter.
pub(crate) fn listener_event(key: &str) -> Option<String> {
    let rest = key.strip_prefix("on")?;
    let mut chars = rest.chars();
    let first = chars.next().filter(char::is_ascii_uppercase)?;
    Some(first.to_ascii_lowercase().to_string() + chars.as_str())
}
