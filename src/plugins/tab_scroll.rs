//! TabScroll: makes a Tab's navigator scrollable.
//!
//! Wraps the navigator in a `data-role=scroll` node (id `get_id("scroller")`)
//! placed first under the root, clips the root with `overflow: hidden`, and
//! tracks the scroller's enabled state and extent from the Tab's events.

use std::any::Any;

use crate::dom::NodeData;
use crate::event::ListenerId;
use crate::plugin::{Plugin, PluginConstructor};
use crate::value::Properties;
use crate::widget::Control;
use crate::widgets::Tab;

/// Scroll state attached to one Tab.
#[derive(Debug)]
pub struct TabScroll {
    options: Properties,
    rendered: bool,
    enabled: bool,
    /// Number of triggers the scroller spans.
    extent: usize,
    /// Scroll offset in pixels.
    offset: i64,
    listeners: Vec<(&'static str, ListenerId)>,
}

impl TabScroll {
    pub const NAME: &'static str = "TabScroll";

    pub fn constructor() -> PluginConstructor {
        PluginConstructor {
            name: Self::NAME,
            build,
        }
    }

    pub fn options(&self) -> &Properties {
        &self.options
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn extent(&self) -> usize {
        self.extent
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn scroll_to(&mut self, offset: i64) {
        self.offset = offset;
    }

    fn render(&mut self, tab: &mut Control) {
        if self.rendered {
            return;
        }
        self.rendered = true;
        init_structure(tab);
        self.extent = Tab::triggers(tab).len();
        self.attach(tab);
    }

    fn attach(&mut self, tab: &mut Control) {
        for kind in ["add", "remove"] {
            let id = tab.on(kind, |tab, _| {
                let extent = Tab::triggers(tab).len();
                if let Some(scroll) = tab.plugin_mut::<TabScroll>(TabScroll::NAME) {
                    scroll.extent = extent;
                }
            });
            self.listeners.push((kind, id));
        }
        for (kind, enabled) in [("enable", true), ("show", true), ("disable", false), ("hide", false)] {
            let id = tab.on(kind, move |tab, _| {
                if let Some(scroll) = tab.plugin_mut::<TabScroll>(TabScroll::NAME) {
                    scroll.enabled = enabled;
                }
            });
            self.listeners.push((kind, id));
        }
    }
}

fn build(tab: &mut Control, options: Properties) -> Box<dyn Plugin> {
    let mut scroll = TabScroll {
        options,
        rendered: false,
        enabled: !tab.is_disabled() && !tab.is_hidden(),
        extent: 0,
        offset: 0,
        listeners: Vec::new(),
    };
    if tab.is_rendered() {
        scroll.render(tab);
    } else {
        let id = tab.on("afterrender", |tab, _| {
            let Some(mut scroll) = tab.plugins.shift_remove(TabScroll::NAME) else {
                return;
            };
            if let Some(scroll) = scroll.as_any_mut().downcast_mut::<TabScroll>() {
                scroll.render(tab);
            }
            tab.plugins.insert(TabScroll::NAME.to_owned(), scroll);
        });
        scroll.listeners.push(("afterrender", id));
    }
    Box::new(scroll)
}

/// Ensure `root > scroller > navigator`, each first in its parent.
fn init_structure(tab: &Control) {
    let (Some(main), Some(navigator)) = (tab.main(), Tab::navigator(tab)) else {
        return;
    };
    let doc = tab.document().clone();
    let scroller = doc.write(|dom| {
        let first = dom.children(main).first().copied();
        let existing = dom.query_attr(main, "data-role", "scroll");
        let scroller = match existing {
            Some(scroller) if first == Some(scroller) => scroller,
            found => {
                let scroller = found.unwrap_or_else(|| dom.create(NodeData::new("div")));
                dom.insert_before(main, scroller, first.filter(|&f| f != scroller));
                dom.append_child(scroller, navigator);
                scroller
            }
        };
        if dom.children(scroller).first() != Some(&navigator) {
            let first = dom.children(scroller).first().copied();
            dom.insert_before(scroller, navigator, first);
        }
        scroller
    });
    doc.set_attribute(scroller, "id", tab.helper().get_id(Some("scroller")));
    doc.set_attribute(scroller, "data-role", "scroll");
    doc.set_style(main, "overflow", "hidden");
}

impl Plugin for TabScroll {
    fn dispose(&mut self, control: &mut Control) {
        for (kind, id) in self.listeners.drain(..) {
            control.off(kind, id);
        }
        self.scroll_to(0);
        self.enabled = false;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::plugin::register_plugin;
    use crate::registry::register_component;
    use crate::value::Value;
    use crate::widget::{ControlRef, Options};
    use crate::widgets::TabItem;

    fn scrolling_tab(scroll: bool) -> ControlRef {
        crate::reset();
        register_component::<Tab>().unwrap();
        register_plugin(TabScroll::constructor()).unwrap();
        let tabs = Value::List(vec![TabItem::new("A").into(), TabItem::new("B").into()]);
        let plugin = crate::value::props([(
            "scroll",
            Value::Map(crate::value::props([("speed", Value::from(3))])),
        )]);
        let tab = Control::create(
            Tab,
            Options::new()
                .with("id", "t")
                .with("tabs", tabs)
                .with("scroll", scroll)
                .with("plugin", Value::Map(plugin)),
        );
        tab.borrow_mut().render();
        tab
    }

    #[test]
    fn wraps_navigator_in_scroller() {
        let tab = scrolling_tab(true);
        let tab = tab.borrow();
        let doc = tab.document().clone();
        let main = tab.main().unwrap();
        let scroller = doc.read(|dom| dom.children(main)[0]);
        assert_eq!(doc.attribute(scroller, "id").as_deref(), Some("ctrl-t-scroller"));
        assert_eq!(doc.attribute(scroller, "data-role").as_deref(), Some("scroll"));
        assert_eq!(doc.read(|dom| dom.children(scroller)[0]), Tab::navigator(&tab).unwrap());
        assert_eq!(doc.style(main, "overflow").as_deref(), Some("hidden"));

        let scroll = tab.plugin::<TabScroll>(TabScroll::NAME).unwrap();
        assert_eq!(scroll.options().get("speed"), Some(&Value::from(3)));
        assert_eq!(scroll.extent(), 2);
        assert!(scroll.is_enabled());
    }

    #[test]
    fn follows_tab_events() {
        let tab = scrolling_tab(true);
        let mut tab = tab.borrow_mut();
        Tab::add(&mut tab, TabItem::new("C"));
        assert_eq!(tab.plugin::<TabScroll>(TabScroll::NAME).unwrap().extent(), 3);
        tab.disable();
        assert!(!tab.plugin::<TabScroll>(TabScroll::NAME).unwrap().is_enabled());
        tab.enable();
        assert!(tab.plugin::<TabScroll>(TabScroll::NAME).unwrap().is_enabled());
    }

    #[test]
    fn scroll_property_toggles_plugin() {
        let tab = scrolling_tab(false);
        let mut tab = tab.borrow_mut();
        assert!(!tab.has_plugin(TabScroll::NAME));
        tab.set("scroll", true);
        assert!(tab.has_plugin(TabScroll::NAME));
        let listeners = tab.listener_count("add");
        tab.set("scroll", false);
        assert!(!tab.has_plugin(TabScroll::NAME));
        assert_eq!(tab.listener_count("add"), listeners - 1);
    }
}
