//! Tab widget: a navigator of triggers, each optionally bound to a panel.
//!
//! The navigator is an existing `[data-role=navigator]` (or first `ul`) under
//! the root, read into `tabs` at construction, or a fresh `ul` built on first
//! render. Each trigger is an `li` with `data-role=trigger`; `data-for` names
//! the id of the panel it shows.
//!
//! Properties: `tabs`, `activeIndex`, `orientation`, `itemTemplate`,
//! `scroll`. Events: `change`, `add`, `remove`.

use std::rc::Rc;

use crate::dom::{NodeData, NodeId};
use crate::event::{DomEvent, EventDetail};
use crate::plugin::{active_plugin, dispose_plugin};
use crate::plugins::TabScroll;
use crate::value::{props, Changes, Properties, Value};
use crate::widget::{Component, Control, Options, Widget};

const ROLE: &str = "data-role";
const ACTIVE: &str = "active";

// ---------------------------------------------------------------------------
// TabItem
// ---------------------------------------------------------------------------

/// One tab: its title and the id of the panel it controls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TabItem {
    pub title: String,
    pub panel: Option<String>,
}

impl TabItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            panel: None,
        }
    }

    pub fn with_panel(mut self, panel: impl Into<String>) -> Self {
        self.panel = Some(panel.into());
        self
    }

    fn from_value(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .as_map()
                .and_then(|m| m.get(name))
                .filter(|v| !v.is_null())
                .map(Value::to_string)
        };
        Self {
            title: field("title").unwrap_or_default(),
            panel: field("panel").filter(|p| !p.is_empty()),
        }
    }
}

impl From<TabItem> for Value {
    fn from(item: TabItem) -> Self {
        let mut map = props([("title", Value::from(item.title))]);
        if let Some(panel) = item.panel {
            map.insert("panel".to_owned(), Value::from(panel));
        }
        Value::Map(map)
    }
}

// ---------------------------------------------------------------------------
// Tab
// ---------------------------------------------------------------------------

/// Veto hook consulted before `activeIndex` changes: `(control, from, to)`.
pub type BeforeChange = Rc<dyn Fn(&Control, i64, i64) -> bool>;

#[derive(Default)]
struct TabState {
    navigator: Option<NodeId>,
    /// The navigator came from markup rather than being built here.
    prebuilt: bool,
    triggers: Vec<NodeId>,
    before_change: Option<BeforeChange>,
}

/// A tab strip.
#[derive(Debug, Default, Clone, Copy)]
pub struct Tab;

impl Tab {
    /// Current tab list.
    pub fn tabs(control: &Control) -> Vec<TabItem> {
        control
            .property("tabs")
            .as_list()
            .map(|list| list.iter().map(TabItem::from_value).collect())
            .unwrap_or_default()
    }

    pub fn active_index(control: &Control) -> i64 {
        control.property("activeIndex").to_int().unwrap_or(0)
    }

    /// Trigger nodes, in tab order.
    pub fn triggers(control: &Control) -> Vec<NodeId> {
        state(control).map(|s| s.triggers.clone()).unwrap_or_default()
    }

    pub fn navigator(control: &Control) -> Option<NodeId> {
        state(control).and_then(|s| s.navigator)
    }

    /// Install a veto consulted before every `activeIndex` change.
    pub fn set_before_change(
        control: &mut Control,
        hook: impl Fn(&Control, i64, i64) -> bool + 'static,
    ) {
        if let Some(state) = control.state_mut::<TabState>() {
            state.before_change = Some(Rc::new(hook));
        }
    }

    /// Append a tab.
    pub fn add(control: &mut Control, item: TabItem) {
        let len = Self::tabs(control).len();
        Self::insert(control, item, len);
    }

    /// Insert a tab at `index` (clamped). The active tab stays active.
    pub fn insert(control: &mut Control, item: TabItem, index: usize) {
        if control.is_disabled() {
            return;
        }
        let mut tabs = Self::tabs(control);
        let index = index.min(tabs.len());
        tabs.insert(index, item.clone());
        put_tabs(control, &tabs);

        if let Some(navigator) = Self::navigator(control) {
            let node = create_trigger(control, &item, false);
            let triggers = Self::triggers(control);
            let reference = triggers.get(index).copied();
            control
                .document()
                .write(|dom| dom.insert_before(navigator, node, reference));
            if let Some(state) = control.state_mut::<TabState>() {
                let at = index.min(state.triggers.len());
                state.triggers.insert(at, node);
            }
        }

        if tabs.len() == 1 {
            control.put_property("activeIndex", Value::from(0));
            activate(control, 0);
        } else {
            let active = Self::active_index(control);
            if index as i64 <= active {
                control.put_property("activeIndex", Value::from(active + 1));
            }
            hide_panel(control, &item);
        }

        control.emit("add", fields(index as i64, item));
    }

    /// Remove every tab equal to `item`.
    pub fn remove(control: &mut Control, item: &TabItem) {
        if control.is_disabled() {
            return;
        }
        while let Some(index) = Self::tabs(control).iter().position(|t| t == item) {
            Self::remove_by_index(control, index);
        }
    }

    /// Remove the tab at `index`. Out-of-range indexes are ignored.
    pub fn remove_by_index(control: &mut Control, index: usize) {
        if control.is_disabled() {
            return;
        }
        let mut tabs = Self::tabs(control);
        if index >= tabs.len() {
            return;
        }
        let removed = tabs.remove(index);
        put_tabs(control, &tabs);

        let node = control.state_mut::<TabState>().and_then(|state| {
            (index < state.triggers.len()).then(|| state.triggers.remove(index))
        });
        if let Some(node) = node {
            control.document().write(|dom| dom.remove(node));
        }

        let active = Self::active_index(control);
        let index = index as i64;
        if index < active {
            control.put_property("activeIndex", Value::from(active - 1));
        } else if index == active {
            let active = active.min(tabs.len() as i64 - 1);
            control.put_property("activeIndex", Value::from(active));
            activate(control, active);
        }
        hide_panel(control, &removed);

        control.emit("remove", fields(index, removed));
    }

    /// Activate the tab at `index` through the property path.
    pub fn select(control: &mut Control, index: usize) {
        if control.is_disabled() {
            return;
        }
        let has_trigger = index < Self::triggers(control).len();
        if index as i64 != Self::active_index(control) && has_trigger {
            control.set("activeIndex", index);
        }
    }
}

impl Widget for Tab {
    fn kind(&self) -> &'static str {
        Self::TYPE
    }

    fn defaults(&self) -> Properties {
        props([
            ("activeIndex", Value::from(0)),
            ("orientation", Value::from("horizontal")),
            ("itemTemplate", Value::from("${title}")),
            ("scroll", Value::from(false)),
            ("tabs", Value::List(Vec::new())),
        ])
    }

    fn create_state(&self) -> Option<Box<dyn std::any::Any>> {
        Some(Box::new(TabState::default()))
    }

    fn init_options(&self, control: &mut Control, mut options: Options) {
        if let Some(main) = control.main() {
            let doc = control.document().clone();
            let found = doc.read(|dom| {
                let navigator = dom
                    .query_attr(main, ROLE, "navigator")
                    .or_else(|| dom.query_tag(main, "ul"))?;
                let triggers = dom.query_all_tag(navigator, "li");
                let tabs: Vec<Value> = triggers
                    .iter()
                    .map(|&li| {
                        let text = dom.text_content(li);
                        let data = dom.get(li);
                        let title = if text.is_empty() {
                            data.and_then(|d| d.attribute("title")).unwrap_or_default()
                        } else {
                            text
                        };
                        TabItem {
                            title,
                            panel: data.and_then(|d| d.attribute("data-for")),
                        }
                        .into()
                    })
                    .collect();
                Some((navigator, triggers, tabs))
            });
            if let Some((navigator, triggers, tabs)) = found {
                options.set("tabs", Value::List(tabs));
                if let Some(state) = control.state_mut::<TabState>() {
                    state.navigator = Some(navigator);
                    state.prebuilt = true;
                    state.triggers = triggers;
                }
            }
        }
        control.base_init_options(options);
    }

    fn init_structure(&self, control: &mut Control) {
        let Some(main) = control.main() else {
            return;
        };
        let doc = control.document().clone();
        let prebuilt = state(control).is_some_and(|s| s.prebuilt);
        let navigator = match Tab::navigator(control).filter(|_| prebuilt) {
            Some(navigator) => navigator,
            None => {
                let navigator = doc.create_element("ul");
                doc.write(|dom| {
                    let first = dom.children(main).first().copied();
                    dom.insert_before(main, navigator, first);
                });
                navigator
            }
        };
        doc.set_attribute(navigator, ROLE, "navigator");
        if let Some(state) = control.state_mut::<TabState>() {
            state.navigator = Some(navigator);
        }
        control.add_dom_event(navigator, "click", click_tab);

        if prebuilt {
            for trigger in Tab::triggers(control) {
                doc.set_attribute(trigger, ROLE, "trigger");
            }
        } else {
            rebuild(control);
        }

        if control.property("scroll").is_truthy() {
            let options = control.plugin_options("scroll");
            active_plugin(control, TabScroll::NAME, options);
        }
    }

    fn set_properties(&self, control: &mut Control, mut properties: Properties) {
        if control.property("disabled").is_truthy() && control.is_rendered() {
            properties.shift_remove("tabs");
            properties.shift_remove("activeIndex");
        }

        if let Some(index) = properties.get_mut("activeIndex") {
            if let Value::Str(_) = index {
                *index = Value::from(index.to_int().unwrap_or(0));
            }
        }

        let new_tabs = properties
            .get("tabs")
            .filter(|t| t.is_truthy())
            .and_then(Value::as_list)
            .map(<[Value]>::to_vec);
        if let Some(new_tabs) = new_tabs {
            if !properties.contains_key("activeIndex") {
                let current = control
                    .property("tabs")
                    .as_list()
                    .and_then(|tabs| usize::try_from(Tab::active_index(control)).ok().and_then(|i| tabs.get(i)))
                    .cloned();
                match current.and_then(|cur| new_tabs.iter().position(|t| *t == cur)) {
                    Some(i) => control.put_property("activeIndex", Value::from(i)),
                    None => {
                        control.put_property("activeIndex", Value::from(-1));
                        properties.insert("activeIndex".to_owned(), Value::from(0));
                    }
                }
            }
        }

        if let Some(to) = properties.get("activeIndex").and_then(Value::to_int) {
            let hook = state(control).and_then(|s| s.before_change.clone());
            if let Some(hook) = hook {
                if !hook(control, Tab::active_index(control), to) {
                    properties.shift_remove("activeIndex");
                }
            }
        }

        control.base_set_properties(properties);
    }

    fn repaint(&self, control: &mut Control, changes: Option<&Changes>) {
        let touched = |name: &str| changes.map_or(true, |c| c.contains_key(name));

        if changes.is_some_and(|c| c.contains_key("tabs")) {
            rebuild(control);
        }
        if touched("activeIndex") {
            activate(control, Tab::active_index(control));
        }
        if touched("orientation") {
            control.remove_state("vertical");
            control.remove_state("horizontal");
            let orientation = control.property("orientation").to_string();
            if !orientation.is_empty() {
                control.add_state(&orientation);
            }
        }
        if changes.is_some_and(|c| c.contains_key("scroll")) {
            if control.property("scroll").is_truthy() {
                let options = control.plugin_options("scroll");
                active_plugin(control, TabScroll::NAME, options);
            } else {
                dispose_plugin(control, TabScroll::NAME.into());
            }
        }

        control.base_repaint(changes);
    }
}

impl Component for Tab {
    const TYPE: &'static str = "Tab";
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn state(control: &Control) -> Option<&TabState> {
    control.state::<TabState>()
}

fn put_tabs(control: &mut Control, tabs: &[TabItem]) {
    let list = tabs.iter().cloned().map(Value::from).collect();
    control.put_property("tabs", Value::List(list));
}

fn fields(index: i64, tab: TabItem) -> EventDetail {
    EventDetail::Fields(props([("index", Value::from(index)), ("tab", Value::from(tab))]))
}

fn panel_node(control: &Control, item: &TabItem) -> Option<NodeId> {
    let panel = item.panel.as_deref()?;
    control.document().read(|dom| dom.query_by_id(panel))
}

fn hide_panel(control: &Control, item: &TabItem) {
    if let Some(panel) = panel_node(control, item) {
        control.document().hide(panel);
    }
}

/// Show the panel of `index`, hide the rest, mark the trigger, emit `change`.
fn activate(control: &mut Control, index: i64) {
    let tabs = Tab::tabs(control);
    let triggers = Tab::triggers(control);
    let doc = control.document().clone();
    for (i, item) in tabs.iter().enumerate() {
        let on = i as i64 == index;
        if let Some(panel) = panel_node(control, item) {
            if on {
                doc.show(panel);
            } else {
                doc.hide(panel);
            }
        }
        if let Some(&trigger) = triggers.get(i) {
            if on {
                doc.add_class(trigger, ACTIVE);
            } else {
                doc.remove_class(trigger, ACTIVE);
            }
        }
    }
    let tab = usize::try_from(index)
        .ok()
        .and_then(|i| tabs.get(i).cloned())
        .map_or(Value::Null, Value::from);
    control.emit(
        "change",
        EventDetail::Fields(props([("index", Value::from(index)), ("tab", tab)])),
    );
}

/// Rebuild every trigger from `tabs`.
fn rebuild(control: &mut Control) {
    let Some(navigator) = Tab::navigator(control) else {
        return;
    };
    control.document().write(|dom| dom.clear_children(navigator));
    let active = Tab::active_index(control);
    let mut triggers = Vec::new();
    for (i, item) in Tab::tabs(control).iter().enumerate() {
        let node = create_trigger(control, item, i as i64 == active);
        control
            .document()
            .write(|dom| dom.append_child(navigator, node));
        triggers.push(node);
    }
    if let Some(state) = control.state_mut::<TabState>() {
        state.triggers = triggers;
    }
}

fn create_trigger(control: &Control, item: &TabItem, active: bool) -> NodeId {
    let mut data = NodeData::new("li").with_attr(ROLE, "trigger");
    if active {
        data = data.with_class(ACTIVE);
    }
    if let Some(panel) = &item.panel {
        data = data.with_attr("data-for", panel.clone());
    }
    let template = control.property("itemTemplate").to_string();
    let text = control.render_template_text(
        &template,
        &props([("title", Value::from(item.title.as_str()))]),
    );
    let doc = control.document();
    let node = doc.create(data);
    doc.set_text(node, text);
    node
}

/// Navigator click: select the clicked trigger, or remove it when the click
/// landed on a `data-role=close` element inside it.
fn click_tab(control: &mut Control, event: &DomEvent) {
    if control.is_disabled() {
        return;
    }
    let Some(main) = control.main() else {
        return;
    };
    let doc = control.document().clone();
    let trigger = doc.read(|dom| {
        let mut node = Some(event.target);
        while let Some(current) = node {
            if current == main {
                return None;
            }
            if dom.get(current).is_some_and(|d| d.tag == "li") {
                return Some(current);
            }
            node = dom.parent(current);
        }
        None
    });
    let Some(trigger) = trigger else {
        return;
    };
    let Some(index) = Tab::triggers(control).iter().position(|&t| t == trigger) else {
        return;
    };
    if doc.attribute(event.target, ROLE).as_deref() == Some("close") {
        Tab::remove_by_index(control, index);
    } else {
        control.set("activeIndex", index);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::Document;
    use crate::event::{dispatch, Event};
    use crate::widget::ControlRef;

    fn markup(doc: &Document) -> NodeId {
        let main = doc.append(doc.body(), NodeData::new("div"));
        let nav = doc.append(main, NodeData::new("ul"));
        for (title, panel) in [("One", "p1"), ("Two", "p2"), ("Three", "p3")] {
            let li = doc.append(nav, NodeData::new("li").with_attr("data-for", panel));
            doc.set_text(li, title);
        }
        for panel in ["p1", "p2", "p3"] {
            doc.append(doc.body(), NodeData::new("div").with_id(panel));
        }
        main
    }

    fn tab_from_markup() -> (Document, ControlRef) {
        crate::reset();
        let doc = Document::global();
        let main = markup(&doc);
        let tab = Control::create(Tab, Options::new().main(main).with("id", "t"));
        tab.borrow_mut().render();
        (doc, tab)
    }

    fn panel_hidden(doc: &Document, id: &str) -> bool {
        let node = doc.read(|dom| dom.query_by_id(id)).unwrap();
        doc.style(node, "display").as_deref() == Some("none")
    }

    fn record(tab: &ControlRef, kind: &str) -> Rc<RefCell<Vec<i64>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        tab.borrow_mut().on(kind, move |_, ev: &Event| {
            sink.borrow_mut().push(ev.field("index").to_int().unwrap_or(-99));
        });
        seen
    }

    #[test]
    fn reads_tabs_from_markup() {
        let (doc, tab) = tab_from_markup();
        let tab = tab.borrow();
        let titles: Vec<_> = Tab::tabs(&tab).into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
        assert_eq!(Tab::triggers(&tab).len(), 3);

        let nav = Tab::navigator(&tab).unwrap();
        assert_eq!(doc.attribute(nav, "data-role").as_deref(), Some("navigator"));
        assert!(doc.has_class(Tab::triggers(&tab)[0], "active"));
        assert!(!panel_hidden(&doc, "p1"));
        assert!(panel_hidden(&doc, "p2"));
        assert!(tab.has_state("horizontal"));
    }

    #[test]
    fn builds_navigator_when_missing() {
        crate::reset();
        let tabs = Value::List(vec![TabItem::new("A").into(), TabItem::new("B").into()]);
        let tab = Control::create(Tab, Options::new().with("tabs", tabs));
        let mut tab = tab.borrow_mut();
        tab.render();
        let doc = tab.document().clone();
        let nav = Tab::navigator(&tab).unwrap();
        assert_eq!(doc.read(|dom| dom.children(tab.main().unwrap()).first().copied()), Some(nav));
        assert_eq!(
            doc.inner_html(nav),
            r#"<li class="active" data-role="trigger">A</li><li data-role="trigger">B</li>"#
        );
    }

    #[test]
    fn select_and_click_change_active_tab() {
        let (doc, tab) = tab_from_markup();
        let changes = record(&tab, "change");
        Tab::select(&mut tab.borrow_mut(), 1);
        Tab::select(&mut tab.borrow_mut(), 1);
        Tab::select(&mut tab.borrow_mut(), 7);
        assert_eq!(*changes.borrow(), vec![1]);
        assert!(panel_hidden(&doc, "p1"));
        assert!(!panel_hidden(&doc, "p2"));

        let third = Tab::triggers(&tab.borrow())[2];
        dispatch(&doc, DomEvent::new("click", third));
        assert_eq!(Tab::active_index(&tab.borrow()), 2);
        assert_eq!(*changes.borrow(), vec![1, 2]);
    }

    #[test]
    fn string_active_index_is_coerced() {
        let (_, tab) = tab_from_markup();
        tab.borrow_mut().set("activeIndex", "2");
        assert_eq!(tab.borrow().property("activeIndex"), Value::from(2));
    }

    #[test]
    fn disabled_tab_ignores_changes() {
        let (_, tab) = tab_from_markup();
        let mut tab = tab.borrow_mut();
        tab.disable();
        tab.set("activeIndex", 2);
        Tab::add(&mut tab, TabItem::new("Four"));
        assert_eq!(Tab::active_index(&tab), 0);
        assert_eq!(Tab::tabs(&tab).len(), 3);
    }

    #[test]
    fn before_change_can_veto() {
        let (_, tab) = tab_from_markup();
        let mut tab = tab.borrow_mut();
        Tab::set_before_change(&mut tab, |_, _, to| to != 2);
        tab.set("activeIndex", 2);
        assert_eq!(Tab::active_index(&tab), 0);
        tab.set("activeIndex", 1);
        assert_eq!(Tab::active_index(&tab), 1);
    }

    #[test]
    fn add_and_insert_keep_active_tab() {
        let (doc, tab) = tab_from_markup();
        let added = record(&tab, "add");
        let mut tab = tab.borrow_mut();
        tab.set("activeIndex", 1);
        Tab::insert(&mut tab, TabItem::new("Zero"), 0);
        assert_eq!(Tab::active_index(&tab), 2);
        Tab::add(&mut tab, TabItem::new("Last"));
        assert_eq!(*added.borrow(), vec![0, 4]);

        let nav = Tab::navigator(&tab).unwrap();
        let texts: Vec<_> = doc
            .read(|dom| dom.element_children(nav))
            .into_iter()
            .map(|li| doc.text_content(li))
            .collect();
        assert_eq!(texts, vec!["Zero", "One", "Two", "Three", "Last"]);
        assert!(doc.has_class(Tab::triggers(&tab)[2], "active"));
    }

    #[test]
    fn remove_active_tab_moves_selection() {
        let (doc, tab) = tab_from_markup();
        let removed = record(&tab, "remove");
        let mut tab = tab.borrow_mut();
        tab.set("activeIndex", 2);
        Tab::remove_by_index(&mut tab, 2);
        assert_eq!(Tab::active_index(&tab), 1);
        assert!(!panel_hidden(&doc, "p2"));
        assert!(panel_hidden(&doc, "p3"));

        Tab::remove(&mut tab, &TabItem::new("One").with_panel("p1"));
        assert_eq!(Tab::active_index(&tab), 0);
        Tab::remove_by_index(&mut tab, 9);
        assert_eq!(*removed.borrow(), vec![2, 0]);
        assert_eq!(Tab::triggers(&tab).len(), 1);
    }

    #[test]
    fn close_target_removes_tab() {
        let (doc, tab) = tab_from_markup();
        let second = Tab::triggers(&tab.borrow())[1];
        let close = doc.append(second, NodeData::new("span").with_attr("data-role", "close"));
        dispatch(&doc, DomEvent::new("click", close));
        assert_eq!(Tab::tabs(&tab.borrow()).len(), 2);
    }

    #[test]
    fn replacing_tabs_keeps_active_item() {
        let (_, tab) = tab_from_markup();
        let mut tab = tab.borrow_mut();
        tab.set("activeIndex", 1);
        let two = TabItem::new("Two").with_panel("p2");
        tab.set("tabs", Value::List(vec![TabItem::new("New").into(), two.into()]));
        assert_eq!(Tab::active_index(&tab), 1);

        tab.set("tabs", Value::List(vec![TabItem::new("X").into()]));
        assert_eq!(Tab::active_index(&tab), 0);
        assert_eq!(Tab::triggers(&tab).len(), 1);
    }

    #[test]
    fn orientation_state_follows_property() {
        let (_, tab) = tab_from_markup();
        let mut tab = tab.borrow_mut();
        tab.set("orientation", "vertical");
        assert!(tab.has_state("vertical"));
        assert!(!tab.has_state("horizontal"));
    }
}
