//! Pilot: programmatic interaction with a headless document.
//!
//! The `Pilot` resets this thread's toolkit state, registers the built-in
//! widgets, and provides methods to build markup, run declarative init,
//! simulate DOM events, and advance the timer queue.

use std::time::Duration;

use crate::dom::{Document, NodeData, NodeId};
use crate::event::{dispatch, DomEvent};
use crate::init::{init, InitOptions};
use crate::registry;
use crate::timer;
use crate::value::Properties;
use crate::widget::ControlRef;
use crate::widgets::register_builtins;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless driver for tests.
///
/// # Examples
///
/// ```
/// use gilt_ui::dom::NodeData;
/// use gilt_ui::testing::Pilot;
///
/// let pilot = Pilot::new();
/// let node = pilot.mount(NodeData::new("div").with_attr("data-ui", "type:Button;id:ok"));
/// let controls = pilot.init();
/// assert_eq!(controls.len(), 1);
/// pilot.click(node);
/// ```
pub struct Pilot {
    doc: Document,
}

impl Pilot {
    /// Reset thread state and register the built-in widgets.
    pub fn new() -> Self {
        crate::reset();
        if let Err(err) = register_builtins() {
            tracing::warn!(%err, "built-in registration failed");
        }
        Self {
            doc: Document::global(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn body(&self) -> NodeId {
        self.doc.body()
    }

    /// Append a node to the body.
    pub fn mount(&self, data: NodeData) -> NodeId {
        self.doc.append(self.doc.body(), data)
    }

    /// Append a node under `parent`.
    pub fn append(&self, parent: NodeId, data: NodeData) -> NodeId {
        self.doc.append(parent, data)
    }

    /// Append a node with text content under `parent`.
    pub fn append_text(&self, parent: NodeId, data: NodeData, text: &str) -> NodeId {
        let node = self.doc.append(parent, data);
        self.doc.set_text(node, text);
        node
    }

    /// Run declarative init over the whole body.
    pub fn init(&self) -> Vec<ControlRef> {
        init(None, InitOptions::new())
    }

    /// Run declarative init under `root` with per-id overrides.
    pub fn init_with(&self, root: NodeId, properties: impl IntoIterator<Item = (String, Properties)>) -> Vec<ControlRef> {
        let mut options = InitOptions::new();
        options.properties.extend(properties);
        init(Some(root), options)
    }

    /// Dispatch a `click` on `node`.
    pub fn click(&self, node: NodeId) -> DomEvent {
        self.dispatch("click", node)
    }

    /// Dispatch a DOM event of `kind` on `node`.
    pub fn dispatch(&self, kind: &str, node: NodeId) -> DomEvent {
        dispatch(&self.doc, DomEvent::new(kind, node))
    }

    /// Advance the timer queue; returns how many callbacks ran.
    pub fn advance(&self, by: Duration) -> usize {
        timer::advance(by)
    }

    pub fn control(&self, id: &str) -> Option<ControlRef> {
        registry::get(id)
    }

    /// Find an element by id anywhere in the document.
    pub fn node(&self, id: &str) -> Option<NodeId> {
        self.doc.read(|dom| dom.query_by_id(id))
    }

    /// Markup of the body's children.
    pub fn html(&self) -> String {
        self.doc.inner_html(self.doc.body())
    }
}

impl Default for Pilot {
    fn default() -> Self {
        Self::new()
    }
}
