//! Slider widget: a horizontal carousel with optional dots and autoplay.
//!
//! On first render the root's item children are wrapped in a
//! `data-role=wrapper` node and, when `dot` is set, a `data-role=dot` bar
//! with one `b` per item is appended. Moving is expressed as a `transform`
//! on the wrapper. Autoplay runs on the cooperative timer queue and stops
//! whenever the slider is inactive, disabled, or disposed.

use std::time::Duration;

use crate::dom::{NodeData, NodeId};
use crate::event::EventDetail;
use crate::registry;
use crate::timer::{self, TimerId};
use crate::value::{props, Changes, Properties, Value};
use crate::widget::{Component, Control, Widget};

const ROLE: &str = "data-role";

#[derive(Debug, Default)]
struct SliderState {
    wrapper: Option<NodeId>,
    dot: Option<NodeId>,
    length: usize,
    width: i64,
    x: i64,
    active: bool,
    timer: Option<TimerId>,
}

/// A carousel of item nodes.
///
/// Properties: `animate`, `loop`, `loopDelay` (ms), `dot`, `index`, `speed`
/// (ms), `dotActiveCls`. Events: `active`, `inactive`, `change` (from, to),
/// `resize` (old width, new width).
#[derive(Debug, Default, Clone, Copy)]
pub struct Slider;

impl Slider {
    pub fn index(control: &Control) -> i64 {
        control.property("index").to_int().unwrap_or(0)
    }

    /// Number of items found on first render.
    pub fn len(control: &Control) -> usize {
        state(control).map_or(0, |s| s.length)
    }

    pub fn is_active(control: &Control) -> bool {
        state(control).is_some_and(|s| s.active)
    }

    pub fn wrapper(control: &Control) -> Option<NodeId> {
        state(control).and_then(|s| s.wrapper)
    }

    /// Current item width in pixels.
    pub fn width(control: &Control) -> i64 {
        state(control).map_or(0, |s| s.width)
    }

    /// Start responding to navigation and start autoplay.
    pub fn active(control: &mut Control) {
        let Some(state) = control.state_mut::<SliderState>() else {
            return;
        };
        if state.active {
            return;
        }
        state.active = true;
        if control.property("loop").is_truthy() {
            schedule(control);
        }
        control.emit("active", EventDetail::None);
    }

    /// Stop responding to navigation and stop autoplay.
    pub fn inactive(control: &mut Control) {
        let Some(state) = control.state_mut::<SliderState>() else {
            return;
        };
        if !state.active {
            return;
        }
        state.active = false;
        stop(control);
        control.emit("inactive", EventDetail::None);
    }

    /// Move to item `index`, clamped to the item range. No-op while inactive.
    pub fn to(control: &mut Control, index: i64) {
        let speed = control.property("speed").to_int().unwrap_or(0);
        let from = Self::index(control);
        let Some(state) = control.state_mut::<SliderState>() else {
            return;
        };
        if !state.active {
            return;
        }
        let last = state.length.saturating_sub(1) as i64;
        let index = index.clamp(0, last);
        state.x = -state.width * index;
        let x = state.x;
        control.put_property("index", Value::from(index));
        move_to(control, x, speed);
        if from != index {
            control.emit_args("change", vec![Value::from(from), Value::from(index)]);
        }
    }

    pub fn prev(control: &mut Control) {
        Self::to(control, Self::index(control) - 1);
    }

    pub fn next(control: &mut Control) {
        Self::to(control, Self::index(control) + 1);
    }

    /// Lay items out at `width` pixels each; `None` reads the root's
    /// `width` style and does nothing when it is unchanged.
    pub fn resize(control: &mut Control, width: Option<i64>) {
        let old = Self::width(control);
        let width = match width {
            Some(width) if width != 0 => width,
            _ => {
                let measured = control
                    .main()
                    .map_or(0, |main| style_number(control, main, "width"));
                if measured == old {
                    return;
                }
                measured
            }
        };
        let Some(wrapper) = Self::wrapper(control) else {
            return;
        };
        let doc = control.document().clone();
        let items = doc.read(|dom| dom.element_children(wrapper));
        for &item in &items {
            doc.set_style(item, "width", format!("{width}px"));
        }
        doc.set_style(wrapper, "width", format!("{}px", width * items.len() as i64));
        if let Some(state) = control.state_mut::<SliderState>() {
            state.width = width;
        }
        control.emit_args("resize", vec![Value::from(old), Value::from(width)]);
    }
}

impl Widget for Slider {
    fn kind(&self) -> &'static str {
        Self::TYPE
    }

    fn defaults(&self) -> Properties {
        props([
            ("animate", Value::from(true)),
            ("loop", Value::from(true)),
            ("loopDelay", Value::from(2000)),
            ("dot", Value::from(true)),
            ("index", Value::from(0)),
            ("speed", Value::from(400)),
            ("dotActiveCls", Value::from("active")),
        ])
    }

    fn create_state(&self) -> Option<Box<dyn std::any::Any>> {
        Some(Box::new(SliderState::default()))
    }

    fn init_structure(&self, control: &mut Control) {
        let Some(main) = control.main() else {
            return;
        };
        let doc = control.document().clone();
        let existing = doc.read(|dom| dom.query_attr(main, ROLE, "wrapper"));
        let items: Vec<NodeId> = doc.read(|dom| {
            dom.element_children(existing.unwrap_or(main))
                .into_iter()
                .filter(|&node| {
                    dom.get(node)
                        .and_then(|d| d.attribute(ROLE))
                        .map_or(true, |role| role == "item")
                })
                .collect()
        });

        let wrapper = match existing {
            Some(wrapper) => wrapper,
            None => {
                let wrapper = doc.create(NodeData::new("div").with_attr(ROLE, "wrapper"));
                doc.write(|dom| {
                    for &item in &items {
                        dom.append_child(wrapper, item);
                    }
                    dom.append_child(main, wrapper);
                });
                wrapper
            }
        };
        for &item in &items {
            doc.set_attribute(item, ROLE, "item");
        }

        let mut dot = None;
        if control.property("dot").is_truthy() {
            let found = doc.read(|dom| dom.query_attr(main, ROLE, "dot"));
            dot = Some(found.unwrap_or_else(|| {
                let active_cls = control.property("dotActiveCls").to_string();
                let bar = doc.append(main, NodeData::new("div").with_attr(ROLE, "dot"));
                for i in 0..items.len() {
                    let mut b = NodeData::new("b");
                    if i == 0 {
                        b = b.with_class(active_cls.clone());
                    }
                    doc.append(bar, b);
                }
                bar
            }));
        }

        if let Some(state) = control.state_mut::<SliderState>() {
            state.length = items.len();
            state.wrapper = Some(wrapper);
            state.dot = dot;
        }
    }

    fn init_event(&self, control: &mut Control) {
        if let Some(state) = control.state_mut::<SliderState>() {
            state.x = 0;
        }
        if control.property("dot").is_truthy() {
            control.on("change", |slider, event| {
                let to = event.arg(1).to_int().unwrap_or(0);
                let Some(dot) = state(slider).and_then(|s| s.dot) else {
                    return;
                };
                let active_cls = slider.property("dotActiveCls").to_string();
                let doc = slider.document().clone();
                let dots = doc.read(|dom| dom.element_children(dot));
                for (i, node) in dots.into_iter().enumerate() {
                    if i as i64 == to {
                        doc.add_class(node, &active_cls);
                    } else {
                        doc.remove_class(node, &active_cls);
                    }
                }
            });
        }
    }

    fn repaint(&self, control: &mut Control, changes: Option<&Changes>) {
        if changes.is_none() {
            let width = Slider::width(control);
            Slider::resize(control, Some(width));
            Slider::active(control);
        }
        control.base_repaint(changes);
    }

    fn set_properties(&self, control: &mut Control, properties: Properties) {
        if control.is_rendered() {
            if let Some(disabled) = properties.get("disabled") {
                if disabled.is_truthy() {
                    Slider::inactive(control);
                } else {
                    Slider::active(control);
                }
            }
        }
        control.base_set_properties(properties);
    }

    fn dispose(&self, control: &mut Control) {
        Slider::inactive(control);
        control.base_dispose();
    }
}

impl Component for Slider {
    const TYPE: &'static str = "Slider";
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn state(control: &Control) -> Option<&SliderState> {
    control.state::<SliderState>()
}

fn stop(control: &mut Control) {
    if let Some(id) = control.state_mut::<SliderState>().and_then(|s| s.timer.take()) {
        timer::clear_timeout(id);
    }
}

/// (Re)arm the autoplay timer.
fn schedule(control: &mut Control) {
    stop(control);
    let delay = control.property("loopDelay").to_int().unwrap_or(0);
    if Slider::len(control) < 2 || delay <= 0 {
        return;
    }
    let id = control.id().to_owned();
    let timer = timer::set_timeout(Duration::from_millis(delay as u64), move || {
        autoplay(&id);
    });
    if let Some(state) = control.state_mut::<SliderState>() {
        state.timer = Some(timer);
    }
}

fn autoplay(id: &str) {
    let Some(control) = registry::get(id) else {
        return;
    };
    let Ok(mut control) = control.try_borrow_mut() else {
        tracing::trace!(id, "slider busy, skipping autoplay tick");
        return;
    };
    if control.is_disposed() || !Slider::is_active(&control) {
        return;
    }
    if let Some(state) = control.state_mut::<SliderState>() {
        state.timer = None;
    }
    let next = Slider::index(&control) + 1;
    let next = if next < Slider::len(&control) as i64 { next } else { 0 };
    Slider::to(&mut control, next);
    schedule(&mut control);
}

fn move_to(control: &Control, x: i64, speed: i64) {
    let Some(wrapper) = Slider::wrapper(control) else {
        return;
    };
    let doc = control.document();
    if control.property("animate").is_truthy() {
        doc.set_style(wrapper, "transition-duration", format!("{speed}ms"));
    }
    doc.set_style(wrapper, "transform", format!("translate({x}px, 0) translateZ(0)"));
}

fn style_number(control: &Control, node: NodeId, name: &str) -> i64 {
    control
        .document()
        .style(node, name)
        .and_then(|v| Value::from(v).to_int())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::Document;
    use crate::widget::{ControlRef, Options};

    fn slider(items: usize, options: Options) -> (Document, ControlRef) {
        crate::reset();
        let doc = Document::global();
        let main = doc.append(doc.body(), NodeData::new("div").with_style("width", "300px"));
        for i in 0..items {
            let item = doc.append(main, NodeData::new("div"));
            doc.set_text(item, format!("item {i}"));
        }
        let c = Control::create(Slider, options.main(main).with("id", "s"));
        c.borrow_mut().render();
        (doc, c)
    }

    fn changes(c: &ControlRef) -> Rc<RefCell<Vec<(i64, i64)>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        c.borrow_mut().on("change", move |_, ev| {
            let (from, to) = (ev.arg(0).to_int(), ev.arg(1).to_int());
            sink.borrow_mut().push((from.unwrap_or(-1), to.unwrap_or(-1)));
        });
        seen
    }

    #[test]
    fn wraps_items_and_builds_dots() {
        let (doc, c) = slider(3, Options::new().with("loop", false));
        let c = c.borrow();
        let main = c.main().unwrap();
        let wrapper = Slider::wrapper(&c).unwrap();
        assert_eq!(Slider::len(&c), 3);
        assert_eq!(doc.read(|dom| dom.element_children(wrapper).len()), 3);
        assert_eq!(doc.style(wrapper, "width").as_deref(), Some("900px"));

        let dot = doc.read(|dom| dom.query_attr(main, "data-role", "dot")).unwrap();
        assert_eq!(doc.inner_html(dot), r#"<b class="active"></b><b></b><b></b>"#);
        assert!(Slider::is_active(&c));
    }

    #[test]
    fn navigation_clamps_and_emits_change() {
        let (doc, c) = slider(3, Options::new().with("loop", false));
        let seen = changes(&c);
        let mut c = c.borrow_mut();
        Slider::next(&mut c);
        Slider::next(&mut c);
        Slider::next(&mut c);
        Slider::prev(&mut c);
        Slider::to(&mut c, -5);
        assert_eq!(*seen.borrow(), vec![(0, 1), (1, 2), (2, 1), (1, 0)]);

        let wrapper = Slider::wrapper(&c).unwrap();
        assert_eq!(
            doc.style(wrapper, "transform").as_deref(),
            Some("translate(0px, 0) translateZ(0)")
        );
        let dot = doc.read(|dom| dom.query_attr(c.main().unwrap(), "data-role", "dot")).unwrap();
        let first = doc.read(|dom| dom.element_children(dot)[0]);
        assert!(doc.has_class(first, "active"));
    }

    #[test]
    fn inactive_slider_ignores_navigation() {
        let (_, c) = slider(3, Options::new().with("loop", false));
        let mut c = c.borrow_mut();
        Slider::inactive(&mut c);
        Slider::next(&mut c);
        assert_eq!(Slider::index(&c), 0);
    }

    #[test]
    fn autoplay_advances_and_wraps() {
        let (_, c) = slider(2, Options::new().with("loopDelay", 100));
        let seen = changes(&c);
        timer::advance(Duration::from_millis(350));
        assert_eq!(*seen.borrow(), vec![(0, 1), (1, 0), (0, 1)]);
    }

    #[test]
    fn disabling_stops_autoplay() {
        let (_, c) = slider(2, Options::new().with("loopDelay", 100));
        c.borrow_mut().disable();
        assert!(!Slider::is_active(&c.borrow()));
        assert_eq!(timer::pending(), 0);
        timer::advance(Duration::from_millis(500));
        assert_eq!(Slider::index(&c.borrow()), 0);

        c.borrow_mut().enable();
        assert_eq!(timer::pending(), 1);
    }

    #[test]
    fn dispose_cancels_timer() {
        let (_, c) = slider(3, Options::new());
        assert_eq!(timer::pending(), 1);
        c.borrow_mut().dispose();
        assert_eq!(timer::pending(), 0);
        assert_eq!(timer::advance(Duration::from_secs(10)), 0);
    }

    #[test]
    fn resize_reads_root_width() {
        let (doc, c) = slider(2, Options::new().with("loop", false));
        let mut c = c.borrow_mut();
        let main = c.main().unwrap();
        doc.set_style(main, "width", "200px");
        Slider::resize(&mut c, None);
        assert_eq!(Slider::width(&c), 200);
        let wrapper = Slider::wrapper(&c).unwrap();
        assert_eq!(doc.style(wrapper, "width").as_deref(), Some("400px"));
    }
}
