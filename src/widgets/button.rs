//! Button widget: a clickable `<button>` with text content.
//!
//! `content` defaults to the root node's existing text, so markup such as
//! `<button data-ui="type:Button">OK</button>` keeps its label. Child markup
//! stays in place until `content` is set to something other than the text it
//! already shows.

use crate::dom::{Document, NodeId};
use crate::event::EventDetail;
use crate::value::{Changes, Properties, Value};
use crate::widget::{Accessor, Component, Control, Options, Widget};

use super::css_length;

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

/// A clickable button.
///
/// Properties: `content`, `width`, `height`. Emits `click` when the root
/// node is clicked while the button is neither disabled nor hidden.
#[derive(Debug, Default, Clone, Copy)]
pub struct Button;

static ACCESSORS: &[Accessor] = &[Accessor::setter("content", set_content)];

impl Button {
    /// Replace the label.
    pub fn set_content(control: &mut Control, content: impl Into<Value>) {
        set_content(control, content.into());
    }
}

fn set_content(control: &mut Control, content: Value) {
    let mut properties = Properties::new();
    properties.insert("content".to_owned(), content);
    control.set_properties(properties);
}

impl Widget for Button {
    fn kind(&self) -> &'static str {
        Self::TYPE
    }

    fn defaults(&self) -> Properties {
        let mut defaults = Properties::new();
        defaults.insert("content".to_owned(), Value::from(""));
        defaults
    }

    fn create_main(&self, doc: &Document) -> NodeId {
        doc.create_element("button")
    }

    fn init_options(&self, control: &mut Control, mut options: Options) {
        if let Some(main) = control.main() {
            let text = control.document().text_content(main);
            options.set_default("content", text);
        }
        control.base_init_options(options);
    }

    fn init_event(&self, control: &mut Control) {
        let Some(main) = control.main() else {
            return;
        };
        control.add_dom_event(main, "click", |button, event| {
            if !button.is_disabled() && !button.is_hidden() {
                button.emit("click", EventDetail::Fields(event.data.clone()));
            }
        });
    }

    fn repaint(&self, control: &mut Control, changes: Option<&Changes>) {
        let touched = |name: &str| changes.map_or(true, |c| c.contains_key(name));
        if let Some(main) = control.main() {
            let doc = control.document().clone();
            for name in ["height", "width"] {
                if touched(name) {
                    let value = control.property(name);
                    if !value.is_null() {
                        doc.set_style(main, name, css_length(&value));
                    }
                }
            }
            if touched("content") {
                let content = control.property("content").to_string();
                if doc.text_content(main) != content {
                    doc.set_text(main, content);
                }
            }
        }
        control.base_repaint(changes);
    }

    fn accessors(&self) -> &'static [Accessor] {
        ACCESSORS
    }
}

impl Component for Button {
    const TYPE: &'static str = "Button";
}
