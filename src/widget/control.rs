//! Control: one live widget instance and its property/state engine.
//!
//! Lifecycle: `create` -> (registered, `init` emitted) -> `render` (one-time
//! structure and events, then a full repaint) -> incremental `repaint` on
//! every property change -> `dispose` (idempotent) -> `destroy` (drops the
//! root node and runtime scratch).
//!
//! Property writes go through one diff step: new values are compared to the
//! current ones, the changes are recorded from a single snapshot, applied,
//! repainted (once rendered), and announced as `propertychange`.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::config::{self, INSTANCE_ATTR};
use crate::dom::{Document, NodeId};
use crate::event::dom::DomHandlerId;
use crate::event::{DomEvent, DomEvents, Emitter, Event, EventDetail, Listener, ListenerId};
use crate::plugin::Plugin;
use crate::registry;
use crate::value::{Change, Changes, Properties, Value};

use super::helper::{guid, DomHelper, TemplateHelper};
use super::lifecycle::{self, Phase};
use super::options::{listener_event, OptionValue, Options};
use super::traits::{Accessor, Widget};

/// Shared handle to a live control.
pub type ControlRef = Rc<RefCell<Control>>;

/// The two built-in states.
pub const DISABLED: &str = "disabled";
pub const HIDDEN: &str = "hidden";

/// Accessors every control has, consulted after the widget's own table.
static BASE_ACCESSORS: &[Accessor] = &[
    Accessor::setter(DISABLED, set_disabled),
    Accessor::setter(HIDDEN, set_hidden),
];

fn set_disabled(control: &mut Control, value: Value) {
    control.set_disabled(value.is_truthy());
}

fn set_hidden(control: &mut Control, value: Value) {
    control.set_hidden(value.is_truthy());
}

/// Scratch store for values that are not part of the public property set.
#[derive(Default)]
pub struct Runtime {
    pub values: Properties,
    state: Option<Box<dyn Any>>,
}

/// One live widget instance.
pub struct Control {
    id: String,
    skin: Option<String>,
    widget: Rc<dyn Widget>,
    document: Document,
    main: Option<NodeId>,
    main_supplied: bool,
    options: Properties,
    properties: Properties,
    states: BTreeSet<String>,
    rendered: bool,
    disposed: bool,
    runtime: Option<Runtime>,
    emitter: Emitter,
    dom_events: DomEvents,
    pub(crate) plugins: IndexMap<String, Box<dyn Plugin>>,
    template: TemplateHelper,
}

impl Control {
    /// Construct, register, and announce a control.
    ///
    /// Runs the widget's `init_options`, adds the control to the instance
    /// registry, then emits `init`, all before returning.
    pub fn create(widget: impl Widget, options: Options) -> ControlRef {
        let widget: Rc<dyn Widget> = Rc::new(widget);
        let document = options.document.clone().unwrap_or_else(Document::global);
        let main_supplied = options.main.is_some();
        let main = options
            .main
            .unwrap_or_else(|| widget.create_main(&document));

        let mut properties = Properties::new();
        properties.insert(DISABLED.to_owned(), Value::Bool(false));
        properties.insert(HIDDEN.to_owned(), Value::Bool(false));
        properties.extend(widget.defaults());

        let id = if options.get("id").is_some_and(Value::is_truthy) {
            String::new()
        } else {
            guid()
        };

        let mut control = Control {
            id,
            skin: None,
            runtime: Some(Runtime {
                values: Properties::new(),
                state: widget.create_state(),
            }),
            widget: Rc::clone(&widget),
            document,
            main: Some(main),
            main_supplied,
            options: Properties::new(),
            properties,
            states: BTreeSet::new(),
            rendered: false,
            disposed: false,
            emitter: Emitter::new(),
            dom_events: DomEvents::new(),
            plugins: IndexMap::new(),
            template: TemplateHelper::default(),
        };

        widget.init_options(&mut control, options);

        tracing::debug!(id = %control.id, kind = control.kind(), "control created");
        let control = Rc::new(RefCell::new(control));
        registry::add(&control);
        control.borrow_mut().emit("init", EventDetail::None);
        control
    }

    // -- identity & accessors ----------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The widget type tag.
    pub fn kind(&self) -> &'static str {
        self.widget.kind()
    }

    pub fn skin(&self) -> Option<&str> {
        self.skin.as_deref()
    }

    pub fn main(&self) -> Option<NodeId> {
        self.main
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The normalized construction options (without `id` and `skin`).
    pub fn options(&self) -> &Properties {
        &self.options
    }

    /// Plugin configuration for `name` from `options.plugin`.
    pub fn plugin_options(&self, name: &str) -> Properties {
        self.options
            .get("plugin")
            .and_then(Value::as_map)
            .and_then(|plugins| plugins.get(name))
            .and_then(Value::as_map)
            .cloned()
            .unwrap_or_default()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Current value of property `name` without accessor dispatch.
    pub fn property(&self, name: &str) -> Value {
        self.properties.get(name).cloned().unwrap_or_default()
    }

    pub fn states(&self) -> &BTreeSet<String> {
        &self.states
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn phase(&self) -> Phase {
        lifecycle::phase_of(self.rendered, self.disposed, self.main.is_some())
    }

    /// Runtime scratch values; `None` after `destroy`.
    pub fn runtime(&self) -> Option<&Properties> {
        self.runtime.as_ref().map(|r| &r.values)
    }

    pub fn runtime_mut(&mut self) -> Option<&mut Properties> {
        self.runtime.as_mut().map(|r| &mut r.values)
    }

    /// Widget-private typed state.
    pub fn state<T: 'static>(&self) -> Option<&T> {
        self.runtime
            .as_ref()
            .and_then(|r| r.state.as_ref())
            .and_then(|s| s.downcast_ref())
    }

    pub fn state_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.runtime
            .as_mut()
            .and_then(|r| r.state.as_mut())
            .and_then(|s| s.downcast_mut())
    }

    /// DOM naming and class helper.
    pub fn helper(&self) -> DomHelper<'_> {
        DomHelper::new(self)
    }

    fn widget(&self) -> Rc<dyn Widget> {
        Rc::clone(&self.widget)
    }

    fn accessor(&self, name: &str) -> Option<Accessor> {
        self.widget
            .accessors()
            .iter()
            .chain(BASE_ACCESSORS)
            .find(|a| a.name == name)
            .copied()
    }

    // -- options & properties ----------------------------------------------

    /// Default option normalization.
    ///
    /// `onXxx` listeners are bound and dropped from the option set; the
    /// `plugin` entry is held aside while the rest is snapshotted and
    /// applied as properties, then stored back on `options`.
    pub fn base_init_options(&mut self, options: Options) {
        let mut plain = Properties::new();
        for (key, value) in options.into_entries() {
            match (listener_event(&key), value) {
                (Some(event), OptionValue::Listener(listener)) => {
                    self.emitter.on(&event, listener);
                }
                (_, OptionValue::Value(value)) => {
                    plain.insert(key, value);
                }
                (None, OptionValue::Listener(_)) => {
                    tracing::trace!(key = %key, "ignoring callback under a non-listener key");
                }
            }
        }

        let plugin = plain.shift_remove("plugin");

        self.options = plain.clone();
        self.set_properties(plain);
        self.options.shift_remove("id");
        self.options.shift_remove("skin");

        if let Some(plugin) = plugin {
            self.options.insert("plugin".to_owned(), plugin);
        }
    }

    /// Apply `properties` through the widget's filter and the diff engine.
    pub fn set_properties(&mut self, properties: Properties) {
        let widget = self.widget();
        widget.set_properties(self, properties);
    }

    /// The diff engine.
    ///
    /// `id` and `skin` may only change before the first render; afterwards
    /// they are dropped silently.
    pub fn base_set_properties(&mut self, mut properties: Properties) {
        let id = properties.shift_remove("id");
        let skin = properties.shift_remove("skin");
        if !self.rendered {
            if let Some(id) = id {
                self.change_id(id.to_string());
            }
            if let Some(skin) = skin {
                self.skin = skin.is_truthy().then(|| skin.to_string());
            }
        }

        let changes: Changes = properties
            .into_iter()
            .filter_map(|(name, new_value)| {
                let old_value = self.property(&name);
                (old_value != new_value).then(|| {
                    let change = Change {
                        name: name.clone(),
                        old_value,
                        new_value,
                    };
                    (name, change)
                })
            })
            .collect();

        if changes.is_empty() {
            return;
        }
        for change in changes.values() {
            self.properties
                .insert(change.name.clone(), change.new_value.clone());
        }

        if self.rendered {
            self.repaint(Some(&changes));
        }
        self.emit("propertychange", EventDetail::Changes(changes));
    }

    /// Assign a property without diffing, repainting or emitting.
    pub(crate) fn put_property(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_owned(), value);
    }

    fn change_id(&mut self, id: String) {
        if id == self.id {
            return;
        }
        let old = std::mem::replace(&mut self.id, id);
        if !old.is_empty() {
            registry::rename(&old, &self.id);
        }
    }

    /// Read one property, preferring a widget accessor.
    pub fn get(&self, name: &str) -> Value {
        if let Some(get) = self.accessor(name).and_then(|a| a.get) {
            return get(self);
        }
        match name {
            "id" => Value::from(self.id.as_str()),
            "type" => Value::from(self.kind()),
            "skin" => self.skin.as_deref().map_or(Value::Null, Value::from),
            _ => self.property(name),
        }
    }

    /// Write one property, preferring a widget accessor.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.accessor(name).and_then(|a| a.set) {
            Some(set) => set(self, value),
            None => {
                let mut properties = Properties::new();
                properties.insert(name.to_owned(), value);
                self.set_properties(properties);
            }
        }
    }

    // -- render & repaint --------------------------------------------------

    /// Render: one-time structure/event setup, then a full repaint.
    pub fn render(&mut self) {
        let first = !self.rendered;
        if first {
            self.rendered = true;
            self.emit("beforerender", EventDetail::None);

            let widget = self.widget();
            widget.init_structure(self);
            widget.init_event(self);

            if let Some(main) = self.main {
                let doc = self.document.clone();
                if !self.main_supplied && !doc.is_attached(main) {
                    let body = doc.body();
                    doc.write(|dom| dom.append_child(body, main));
                }
                if doc.attribute(main, "id").is_none() {
                    doc.set_attribute(main, "id", self.helper().get_id(None));
                }
                doc.set_attribute(main, &config::setting(INSTANCE_ATTR), self.id.clone());
                self.helper().add_base_classes();
            }
            tracing::debug!(id = %self.id, kind = self.kind(), "control rendered");
        }

        self.repaint(None);

        if first {
            self.emit("afterrender", EventDetail::None);
        }
    }

    /// Reconcile the DOM; `None` means a full paint.
    pub fn repaint(&mut self, changes: Option<&Changes>) {
        let widget = self.widget();
        widget.repaint(self, changes);
    }

    /// Project `disabled` and `hidden` into the state set.
    pub fn base_repaint(&mut self, changes: Option<&Changes>) {
        for state in [DISABLED, HIDDEN] {
            if changes.map_or(true, |c| c.contains_key(state)) {
                if self.property(state).is_truthy() {
                    self.add_state(state);
                } else {
                    self.remove_state(state);
                }
            }
        }
    }

    /// Move `main` under `parent`, then render.
    pub fn append_to(&mut self, parent: NodeId) {
        if let Some(main) = self.main {
            self.document.write(|dom| dom.append_child(parent, main));
        }
        self.render();
    }

    /// Move `main` before `reference` (same parent), then render.
    pub fn insert_before(&mut self, reference: NodeId) {
        if let Some(main) = self.main {
            self.document.write(|dom| {
                if let Some(parent) = dom.parent(reference) {
                    dom.insert_before(parent, main, Some(reference));
                }
            });
        }
        self.render();
    }

    // -- states ------------------------------------------------------------

    pub fn has_state(&self, state: &str) -> bool {
        self.states.contains(state)
    }

    /// Enter `state`: project it on the DOM and set the matching property.
    pub fn add_state(&mut self, state: &str) {
        if !self.states.insert(state.to_owned()) {
            return;
        }
        if let Some(main) = self.main {
            if state == DISABLED {
                self.document.set_attribute(main, DISABLED, DISABLED);
            }
        }
        self.helper().add_state_classes(state);

        let mut properties = Properties::new();
        properties.insert(state.to_owned(), Value::Bool(true));
        self.set_properties(properties);
    }

    /// Leave `state`: the inverse of [`Control::add_state`].
    pub fn remove_state(&mut self, state: &str) {
        if !self.states.remove(state) {
            return;
        }
        if let Some(main) = self.main {
            if state == DISABLED {
                self.document.remove_attribute(main, DISABLED);
            }
        }
        self.helper().remove_state_classes(state);

        let mut properties = Properties::new();
        properties.insert(state.to_owned(), Value::Bool(false));
        self.set_properties(properties);
    }

    pub fn toggle_state(&mut self, state: &str) {
        if self.has_state(state) {
            self.remove_state(state);
        } else {
            self.add_state(state);
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.has_state(DISABLED)
    }

    pub fn is_hidden(&self) -> bool {
        self.has_state(HIDDEN)
    }

    pub fn enable(&mut self) {
        if !self.is_disabled() {
            return;
        }
        self.remove_state(DISABLED);
        self.emit("enable", EventDetail::None);
    }

    pub fn disable(&mut self) {
        if self.is_disabled() {
            return;
        }
        self.add_state(DISABLED);
        self.emit("disable", EventDetail::None);
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        if disabled {
            self.disable();
        } else {
            self.enable();
        }
    }

    pub fn show(&mut self) {
        if !self.is_hidden() {
            return;
        }
        self.remove_state(HIDDEN);
        self.emit("show", EventDetail::None);
    }

    pub fn hide(&mut self) {
        if self.is_hidden() {
            return;
        }
        self.add_state(HIDDEN);
        self.emit("hide", EventDetail::None);
    }

    /// Show when hidden, hide otherwise.
    pub fn toggle(&mut self) {
        if self.is_hidden() {
            self.show();
        } else {
            self.hide();
        }
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        if hidden {
            self.hide();
        } else {
            self.show();
        }
    }

    // -- events ------------------------------------------------------------

    /// Listen for `kind` events.
    pub fn on(&mut self, kind: &str, listener: impl Fn(&mut Control, &Event) + 'static) -> ListenerId {
        self.emitter.on(kind, Rc::new(listener))
    }

    pub fn off(&mut self, kind: &str, id: ListenerId) -> bool {
        self.emitter.off(kind, id)
    }

    /// Remove every listener.
    pub fn off_all(&mut self) {
        self.emitter.off_all();
    }

    pub fn listener_count(&self, kind: &str) -> usize {
        self.emitter.listener_count(kind)
    }

    /// Install the direct `on<Kind>` handler, which runs before listeners.
    pub fn set_handler(&mut self, kind: &str, handler: Option<Listener>) {
        self.emitter.set_direct(kind, handler);
    }

    /// Emit `kind`: direct handler first, then listeners.
    pub fn emit(&mut self, kind: &str, detail: EventDetail) {
        let event = Event::new(kind, self.id.clone(), detail);
        if let Some(handler) = self.emitter.direct(kind) {
            handler(self, &event);
        }
        for listener in self.emitter.listeners(kind) {
            listener(self, &event);
        }
    }

    /// Emit with positional arguments.
    pub fn emit_args(&mut self, kind: &str, args: Vec<Value>) {
        self.emit(kind, EventDetail::Args(args));
    }

    // -- DOM events --------------------------------------------------------

    /// Bind `handler` to `kind` events reaching `node`.
    pub fn add_dom_event(
        &mut self,
        node: NodeId,
        kind: &str,
        handler: impl Fn(&mut Control, &DomEvent) + 'static,
    ) -> DomHandlerId {
        let (id, first) = self.dom_events.add(node, kind, Rc::new(handler));
        if first {
            self.document.bind(
                node,
                crate::dom::document::Binding {
                    control: self.id.clone(),
                    event: kind.to_owned(),
                },
            );
        }
        id
    }

    /// Unbind one handler, or every handler of `kind` on `node`.
    pub fn remove_dom_event(&mut self, node: NodeId, kind: &str, id: Option<DomHandlerId>) {
        if self.dom_events.remove(node, kind, id) {
            self.document.unbind(node, &self.id, kind);
        }
    }

    /// Unbind everything on `node`, or on every node when `None`.
    pub fn clear_dom_events(&mut self, node: Option<NodeId>) {
        let nodes = match node {
            Some(node) => vec![node],
            None => self.dom_events.nodes(),
        };
        for node in nodes {
            for kind in self.dom_events.clear_node(node) {
                self.document.unbind(node, &self.id, &kind);
            }
        }
    }

    pub(crate) fn trigger_dom_event(&mut self, node: NodeId, event: &DomEvent) {
        for handler in self.dom_events.handlers(node, &event.kind) {
            handler(self, event);
        }
    }

    // -- templates ---------------------------------------------------------

    pub fn set_template_engine(&mut self, engine: impl Fn(&str, &Properties) -> String + 'static) {
        self.template.set_engine(Rc::new(engine));
    }

    pub fn render_template(&self, template: &str, data: &Properties) -> String {
        self.template.render(template, data)
    }

    pub fn render_template_text(&self, template: &str, data: &Properties) -> String {
        self.template.render_text(template, data)
    }

    // -- plugins -----------------------------------------------------------

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Active plugin `name`, downcast to its concrete type.
    pub fn plugin<T: Plugin>(&self, name: &str) -> Option<&T> {
        self.plugins
            .get(name)
            .and_then(|p| p.as_any().downcast_ref())
    }

    pub fn plugin_mut<T: Plugin>(&mut self, name: &str) -> Option<&mut T> {
        self.plugins
            .get_mut(name)
            .and_then(|p| p.as_any_mut().downcast_mut())
    }

    // -- teardown ----------------------------------------------------------

    /// Detach events, registry entry and plugins. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let widget = self.widget();
        widget.dispose(self);
    }

    /// Shared teardown, run by every widget's `dispose`.
    pub fn base_dispose(&mut self) {
        if self.disposed {
            return;
        }
        lifecycle::dispose(self);
        self.disposed = true;
    }

    /// Dispose, then drop the runtime scratch and remove `main` from the
    /// document.
    pub fn destroy(&mut self) {
        self.dispose();
        self.runtime = None;
        if let Some(main) = self.main.take() {
            self.document.write(|dom| dom.remove(main));
        }
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("main", &self.main)
            .field("states", &self.states)
            .field("rendered", &self.rendered)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::value::props;
    use crate::widget::BaseControl;

    fn control(options: Options) -> ControlRef {
        crate::reset();
        Control::create(BaseControl, options)
    }

    fn counter(c: &mut Control, kind: &str) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        c.on(kind, move |_, _| seen.set(seen.get() + 1));
        count
    }

    #[test]
    fn generates_id_when_absent() {
        let c = control(Options::new());
        let c = c.borrow();
        assert!(c.id().starts_with("ui"));
        assert_eq!(c.kind(), "Control");
        assert!(registry::get(c.id()).is_some());
    }

    #[test]
    fn explicit_id_and_skin_are_consumed() {
        let c = control(Options::new().with("id", "foo").with("skin", "dark").with("name", "x"));
        let c = c.borrow();
        assert_eq!(c.id(), "foo");
        assert_eq!(c.skin(), Some("dark"));
        assert!(!c.options().contains_key("id"));
        assert!(!c.options().contains_key("skin"));
        assert_eq!(c.options().get("name"), Some(&Value::from("x")));
        assert_eq!(c.property("name"), Value::from("x"));
        assert!(!c.properties().contains_key("id"));
    }

    #[test]
    fn on_init_fires_once_during_construction() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let c = control(Options::new().listener("onInit", move |c, ev| {
            assert_eq!(ev.kind, "init");
            assert_eq!(ev.target, c.id());
            seen.set(seen.get() + 1);
        }));
        assert_eq!(calls.get(), 1);
        assert!(!c.borrow().options().contains_key("onInit"));
    }

    #[test]
    fn plugin_entry_is_kept_out_of_properties() {
        let plugin = props([("scroll", Value::Map(props([("speed", Value::from(3))])))]);
        let c = control(Options::new().with("plugin", Value::Map(plugin)));
        let c = c.borrow();
        assert!(!c.properties().contains_key("plugin"));
        assert_eq!(c.plugin_options("scroll").get("speed"), Some(&Value::from(3)));
        assert!(c.plugin_options("missing").is_empty());
    }

    #[test]
    fn identical_values_do_not_fire_propertychange() {
        let c = control(Options::new());
        let mut c = c.borrow_mut();
        let changes = counter(&mut c, "propertychange");
        c.set_properties(props([("a", Value::from(1))]));
        c.set_properties(props([("a", Value::from(1))]));
        assert_eq!(changes.get(), 1);
    }

    #[test]
    fn propertychange_carries_old_and_new_values() {
        let c = control(Options::new().with("a", 1));
        let mut c = c.borrow_mut();
        let seen: Rc<RefCell<Option<Changes>>> = Rc::default();
        let sink = Rc::clone(&seen);
        c.on("propertychange", move |_, ev| {
            *sink.borrow_mut() = ev.changes().cloned();
        });
        c.set_properties(props([("a", Value::from(2)), ("b", Value::from("x"))]));
        let changes = seen.borrow().clone().unwrap();
        assert_eq!(changes["a"].old_value, Value::from(1));
        assert_eq!(changes["a"].new_value, Value::from(2));
        assert_eq!(changes["b"].old_value, Value::Null);
    }

    #[test]
    fn listeners_observe_consistent_old_values() {
        let c = control(Options::new().with("a", 1).with("b", 1));
        let mut c = c.borrow_mut();
        c.on("propertychange", |c, ev| {
            let changes = ev.changes().unwrap();
            assert_eq!(changes["a"].old_value, Value::from(1));
            assert_eq!(changes["b"].old_value, Value::from(1));
            assert_eq!(c.property("a"), Value::from(2));
            assert_eq!(c.property("b"), Value::from(3));
        });
        c.set_properties(props([("a", Value::from(2)), ("b", Value::from(3))]));
    }

    #[test]
    fn id_is_frozen_after_render() {
        let c = control(Options::new().with("id", "first"));
        let mut c = c.borrow_mut();
        c.set("id", "second");
        assert_eq!(c.id(), "second");
        assert!(registry::get("second").is_some());
        assert!(registry::get("first").is_none());
        c.render();
        c.set("id", "third");
        c.set("skin", "x");
        assert_eq!(c.id(), "second");
        assert_eq!(c.skin(), None);
    }

    #[test]
    fn render_runs_once_and_projects_markers() {
        let c = control(Options::new().with("id", "r1"));
        let mut c = c.borrow_mut();
        let before = counter(&mut c, "beforerender");
        let after = counter(&mut c, "afterrender");
        c.render();
        c.render();
        assert_eq!(before.get(), 1);
        assert_eq!(after.get(), 1);
        assert!(c.is_rendered());

        let doc = c.document().clone();
        let main = c.main().unwrap();
        assert!(doc.is_attached(main));
        assert_eq!(doc.attribute(main, "id").as_deref(), Some("ctrl-r1"));
        assert_eq!(doc.attribute(main, "data-ctrl-id").as_deref(), Some("r1"));
        assert!(doc.has_class(main, "ui-ctrl"));
        assert!(doc.has_class(main, "ui-control"));
    }

    #[test]
    fn supplied_main_is_not_force_attached() {
        crate::reset();
        let doc = Document::global();
        let node = doc.create_element("section");
        let c = Control::create(BaseControl, Options::new().main(node));
        c.borrow_mut().render();
        assert!(!doc.is_attached(node));
        assert_eq!(c.borrow().main(), Some(node));
    }

    #[test]
    fn add_then_remove_state_is_net_noop_with_two_changes() {
        let c = control(Options::new());
        let mut c = c.borrow_mut();
        c.render();
        let doc = c.document().clone();
        let main = c.main().unwrap();
        let html_before = doc.to_html(main);
        let states_before = c.states().clone();

        let changes = counter(&mut c, "propertychange");
        c.add_state(DISABLED);
        assert_eq!(changes.get(), 1);
        assert!(doc.has_class(main, "state-disabled"));
        assert_eq!(doc.attribute(main, "disabled").as_deref(), Some("disabled"));
        c.remove_state(DISABLED);
        assert_eq!(changes.get(), 2);

        assert_eq!(c.states(), &states_before);
        assert_eq!(doc.to_html(main), html_before);
    }

    #[test]
    fn add_state_is_idempotent() {
        let c = control(Options::new());
        let mut c = c.borrow_mut();
        let changes = counter(&mut c, "propertychange");
        c.add_state("active");
        c.add_state("active");
        assert_eq!(changes.get(), 1);
        assert_eq!(c.property("active"), Value::Bool(true));
        c.toggle_state("active");
        assert!(!c.has_state("active"));
    }

    #[test]
    fn disable_enable_emit_only_on_transition() {
        let c = control(Options::new());
        let mut c = c.borrow_mut();
        let disabled = counter(&mut c, "disable");
        let enabled = counter(&mut c, "enable");
        c.enable();
        assert_eq!(enabled.get(), 0);
        c.disable();
        c.disable();
        assert_eq!(disabled.get(), 1);
        assert!(c.is_disabled());
        assert_eq!(c.get(DISABLED), Value::Bool(true));
        c.set(DISABLED, false);
        assert_eq!(enabled.get(), 1);
        assert!(!c.is_disabled());
    }

    #[test]
    fn show_hide_toggle() {
        let c = control(Options::new());
        let mut c = c.borrow_mut();
        let hides = counter(&mut c, "hide");
        let shows = counter(&mut c, "show");
        c.show();
        c.toggle();
        assert!(c.is_hidden());
        c.set_hidden(true);
        c.toggle();
        assert!(!c.is_hidden());
        assert_eq!((hides.get(), shows.get()), (1, 1));
    }

    #[test]
    fn initial_disabled_is_projected_on_first_paint() {
        let c = control(Options::new().with(DISABLED, true));
        let mut c = c.borrow_mut();
        assert!(!c.is_disabled());
        c.render();
        assert!(c.is_disabled());
        let main = c.main().unwrap();
        assert!(c.document().has_class(main, "ui-control-disabled"));
    }

    #[test]
    fn direct_handler_runs_before_listeners() {
        let c = control(Options::new());
        let mut c = c.borrow_mut();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        c.on("ping", move |_, _| o1.borrow_mut().push("listener"));
        let o2 = Rc::clone(&order);
        c.set_handler("ping", Some(Rc::new(move |_: &mut Control, _: &Event| o2.borrow_mut().push("direct"))));
        c.emit("ping", EventDetail::None);
        assert_eq!(*order.borrow(), vec!["direct", "listener"]);
    }

    #[test]
    fn dispose_is_idempotent() {
        let c = control(Options::new().with("id", "d1"));
        let mut c = c.borrow_mut();
        let before = counter(&mut c, "beforedispose");
        let seen_after = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen_after);
        c.on("afterdispose", move |_, _| s.set(s.get() + 1));
        c.dispose();
        c.dispose();
        assert_eq!(before.get(), 1);
        assert_eq!(seen_after.get(), 1);
        assert!(c.is_disposed());
        assert!(registry::get("d1").is_none());
        assert_eq!(c.listener_count("beforedispose"), 0);
    }

    #[test]
    fn destroy_drops_main_and_runtime() {
        let c = control(Options::new());
        let mut c = c.borrow_mut();
        c.render();
        let doc = c.document().clone();
        let main = c.main().unwrap();
        c.destroy();
        assert!(c.main().is_none());
        assert!(c.runtime().is_none());
        assert!(!doc.read(|dom| dom.contains(main)));
        assert_eq!(c.phase(), Phase::Destroyed);
    }

    #[test]
    fn append_to_moves_and_renders() {
        let c = control(Options::new());
        let mut c = c.borrow_mut();
        let doc = c.document().clone();
        let host = doc.append(doc.body(), crate::dom::NodeData::new("div"));
        c.append_to(host);
        assert!(c.is_rendered());
        assert_eq!(doc.read(|dom| dom.parent(c.main().unwrap())), Some(host));
    }

    #[test]
    fn insert_before_places_main_and_renders() {
        let c = control(Options::new());
        let mut c = c.borrow_mut();
        let doc = c.document().clone();
        let host = doc.append(doc.body(), crate::dom::NodeData::new("div"));
        let first = doc.append(host, crate::dom::NodeData::new("p"));
        let second = doc.append(host, crate::dom::NodeData::new("p"));
        c.insert_before(second);
        assert!(c.is_rendered());
        let main = c.main().unwrap();
        assert_eq!(doc.read(|dom| dom.children(host).to_vec()), vec![first, main, second]);
    }

    #[derive(Default)]
    struct Counter;

    fn read_count(control: &Control) -> Value {
        let n = control.property("count").to_int().unwrap_or(0);
        Value::from(format!("{n} items"))
    }

    static COUNTER_ACCESSORS: &[Accessor] = &[Accessor::getter("label", read_count)];

    impl Widget for Counter {
        fn kind(&self) -> &'static str {
            "Counter"
        }

        fn accessors(&self) -> &'static [Accessor] {
            COUNTER_ACCESSORS
        }
    }

    #[test]
    fn getter_accessor_shadows_stored_property() {
        crate::reset();
        let c = Control::create(Counter, Options::new().with("count", 3).with("label", "raw"));
        let mut c = c.borrow_mut();
        assert_eq!(c.get("label"), Value::from("3 items"));
        assert_eq!(c.property("label"), Value::from("raw"));

        // Without a setter the write goes through the diff engine.
        c.set("label", "other");
        assert_eq!(c.property("label"), Value::from("other"));
        c.set("count", 5);
        assert_eq!(c.get("label"), Value::from("5 items"));
        assert_eq!(c.get("count"), Value::from(5));
    }

    #[test]
    fn remove_dom_event_by_id_and_by_kind() {
        let c = control(Options::new().with("id", "d"));
        let (doc, main, first, second, one) = {
            let mut c = c.borrow_mut();
            c.render();
            let main = c.main().unwrap();
            let first = Rc::new(Cell::new(0));
            let second = Rc::new(Cell::new(0));
            let (a, b) = (Rc::clone(&first), Rc::clone(&second));
            let one = c.add_dom_event(main, "click", move |_, _| a.set(a.get() + 1));
            c.add_dom_event(main, "click", move |_, _| b.set(b.get() + 1));
            (c.document().clone(), main, first, second, one)
        };
        let click = || crate::event::dispatch(&doc, DomEvent::new("click", main));

        click();
        assert_eq!((first.get(), second.get()), (1, 1));

        c.borrow_mut().remove_dom_event(main, "click", Some(one));
        click();
        assert_eq!((first.get(), second.get()), (1, 2));
        assert_eq!(doc.bindings(main, "click").len(), 1);

        c.borrow_mut().remove_dom_event(main, "click", None);
        click();
        assert_eq!((first.get(), second.get()), (1, 2));
        assert!(doc.bindings(main, "click").is_empty());
    }

    #[test]
    fn template_engine_is_replaceable() {
        let c = control(Options::new());
        let mut c = c.borrow_mut();
        let data = props([("name", Value::from("<b>"))]);
        assert_eq!(c.render_template("hi ${name}!", &data), "hi &lt;b&gt;!");
        assert_eq!(c.render_template_text("hi ${name}!", &data), "hi <b>!");

        c.set_template_engine(|template, data| {
            format!("{}|{}", template.to_uppercase(), data.len())
        });
        assert_eq!(c.render_template("hi ${name}", &data), "HI ${NAME}|1");
        assert_eq!(c.render_template_text("x", &data), "X|1");
    }

    #[test]
    fn runtime_scratch() {
        let c = control(Options::new());
        let mut c = c.borrow_mut();
        c.runtime_mut().unwrap().insert("width".into(), Value::from(100));
        assert_eq!(c.runtime().unwrap().get("width"), Some(&Value::from(100)));
        assert!(c.state::<u32>().is_none());
    }
}
