//! Shared document handle: the arena, its `body`, and DOM event bindings.
//!
//! Controls, the declarative initializer, and plugins all mutate the same
//! tree, so the arena sits behind `Rc<RefCell<..>>`. Borrows are always
//! scoped to a closure (`read` / `write`) and never held across callbacks.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use slotmap::SecondaryMap;

use super::node::{NodeData, NodeId};
use super::tree::Dom;

/// A control's subscription to one DOM event type on one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Binding {
    pub control: String,
    pub event: String,
}

#[derive(Debug)]
struct Inner {
    dom: Dom,
    body: NodeId,
    bindings: SecondaryMap<NodeId, Vec<Binding>>,
}

/// Cheap-to-clone handle to a document.
#[derive(Debug, Clone)]
pub struct Document {
    inner: Rc<RefCell<Inner>>,
}

thread_local! {
    static GLOBAL: RefCell<Document> = RefCell::new(Document::new());
}

impl Document {
    /// Create a fresh document with an empty `body`.
    pub fn new() -> Self {
        let mut dom = Dom::new();
        let body = dom.create(NodeData::new("body"));
        Self {
            inner: Rc::new(RefCell::new(Inner {
                dom,
                body,
                bindings: SecondaryMap::new(),
            })),
        }
    }

    /// The thread's default document.
    pub fn global() -> Self {
        GLOBAL.with(|doc| doc.borrow().clone())
    }

    /// Replace the thread's default document with an empty one.
    pub fn reset_global() {
        GLOBAL.with(|doc| *doc.borrow_mut() = Document::new());
    }

    /// Whether two handles point at the same document.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The `body` element.
    pub fn body(&self) -> NodeId {
        self.inner.borrow().body
    }

    /// Run `f` with shared access to the arena.
    pub fn read<R>(&self, f: impl FnOnce(&Dom) -> R) -> R {
        f(&self.inner.borrow().dom)
    }

    /// Run `f` with exclusive access to the arena.
    pub fn write<R>(&self, f: impl FnOnce(&mut Dom) -> R) -> R {
        f(&mut self.inner.borrow_mut().dom)
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.write(|dom| dom.create(NodeData::new(tag)))
    }

    /// Insert a detached node built elsewhere.
    pub fn create(&self, data: NodeData) -> NodeId {
        self.write(|dom| dom.create(data))
    }

    /// Append a new node under `parent` and return it.
    pub fn append(&self, parent: NodeId, data: NodeData) -> NodeId {
        self.write(|dom| dom.append_new(parent, data))
    }

    /// Whether `node` is attached beneath `body`.
    pub fn is_attached(&self, node: NodeId) -> bool {
        let body = self.body();
        self.read(|dom| dom.contains_node(body, node))
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.read(|dom| dom.get(node).and_then(|d| d.attribute(name)))
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        self.write(|dom| {
            if let Some(data) = dom.get_mut(node) {
                data.set_attribute(name, value);
            }
        });
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        self.write(|dom| {
            if let Some(data) = dom.get_mut(node) {
                data.remove_attribute(name);
            }
        });
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.read(|dom| dom.get(node).is_some_and(|d| d.has_class(class)))
    }

    pub fn add_class(&self, node: NodeId, class: &str) {
        self.write(|dom| {
            if let Some(data) = dom.get_mut(node) {
                data.add_class(class);
            }
        });
    }

    pub fn remove_class(&self, node: NodeId, class: &str) {
        self.write(|dom| {
            if let Some(data) = dom.get_mut(node) {
                data.remove_class(class);
            }
        });
    }

    pub fn style(&self, node: NodeId, name: &str) -> Option<String> {
        self.read(|dom| dom.get(node).and_then(|d| d.style(name).map(str::to_owned)))
    }

    pub fn set_style(&self, node: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        self.write(|dom| {
            if let Some(data) = dom.get_mut(node) {
                data.set_style(name, value);
            }
        });
    }

    /// `display: none`.
    pub fn hide(&self, node: NodeId) {
        self.set_style(node, "display", "none");
    }

    /// Clear a `display: none`.
    pub fn show(&self, node: NodeId) {
        self.write(|dom| {
            if let Some(data) = dom.get_mut(node) {
                data.styles.shift_remove("display");
            }
        });
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.read(|dom| dom.text_content(node))
    }

    pub fn set_text(&self, node: NodeId, text: impl Into<String>) {
        self.write(|dom| dom.set_text(node, text));
    }

    // -- event bindings ----------------------------------------------------

    pub(crate) fn bind(&self, node: NodeId, binding: Binding) {
        let mut inner = self.inner.borrow_mut();
        if !inner.dom.contains(node) {
            return;
        }
        let list = inner
            .bindings
            .entry(node)
            .map(|entry| entry.or_default());
        if let Some(list) = list {
            if !list.contains(&binding) {
                list.push(binding);
            }
        }
    }

    pub(crate) fn unbind(&self, node: NodeId, control: &str, event: &str) {
        let mut inner = self.inner.borrow_mut();
        if let Some(list) = inner.bindings.get_mut(node) {
            list.retain(|b| !(b.control == control && b.event == event));
        }
    }

    /// Bindings on `node` for `event`, in subscription order.
    pub(crate) fn bindings(&self, node: NodeId, event: &str) -> Vec<Binding> {
        self.inner
            .borrow()
            .bindings
            .get(node)
            .map(|list| list.iter().filter(|b| b.event == event).cloned().collect())
            .unwrap_or_default()
    }

    // -- serialization -----------------------------------------------------

    /// Serialize `node` and its subtree to markup.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.read(|dom| write_node(dom, node, &mut out));
        out
    }

    /// Serialize only the children of `node`.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.read(|dom| {
            for &child in dom.children(node) {
                write_node(dom, child, &mut out);
            }
        });
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn write_node(dom: &Dom, node: NodeId, out: &mut String) {
    let Some(data) = dom.get(node) else {
        return;
    };
    if let Some(text) = &data.text {
        out.push_str(&escape_html(text));
        return;
    }
    let _ = write!(out, "<{}", data.tag);
    for (name, value) in data.attribute_list() {
        let _ = write!(out, " {}=\"{}\"", name, escape_html(&value));
    }
    if !data.styles.is_empty() {
        let css: Vec<String> = data.styles.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        let _ = write!(out, " style=\"{}\"", escape_html(&css.join("; ")));
    }
    out.push('>');
    for &child in dom.children(node) {
        write_node(dom, child, out);
    }
    let _ = write!(out, "</{}>", data.tag);
}

/// Escape `&`, `<`, `>`, `"` and `'`.
pub fn escape_html(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for c in source.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
