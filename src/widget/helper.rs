//! Naming and class helpers, the template engine, and id generation.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::config::{
    self, ID_ATTR_PREFIX, SKIN_CLASS_PREFIX, STATE_CLASS_PREFIX, UI_CLASS_CONTROL,
    UI_CLASS_PREFIX,
};
use crate::dom::{escape_html, NodeId};
use crate::value::Properties;

use super::control::Control;

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

const GUID_SEED: u64 = 0x861005;

thread_local! {
    static COUNTER: Cell<u64> = const { Cell::new(GUID_SEED) };
}

/// Next generated control id: `ui` followed by a per-thread counter.
pub fn guid() -> String {
    let n = COUNTER.with(|c| {
        let n = c.get();
        c.set(n + 1);
        n
    });
    format!("ui{n}")
}

/// Restart the id counter.
pub fn reset_guid() {
    COUNTER.with(|c| c.set(GUID_SEED));
}

// ---------------------------------------------------------------------------
// DomHelper
// ---------------------------------------------------------------------------

/// Derives DOM ids and class names for one control and applies them.
pub struct DomHelper<'a> {
    control: &'a Control,
}

impl<'a> DomHelper<'a> {
    pub fn new(control: &'a Control) -> Self {
        Self { control }
    }

    /// `{idAttrPrefix}-{id}[-{part}]`.
    pub fn get_id(&self, part: Option<&str>) -> String {
        join([
            Some(config::setting(ID_ATTR_PREFIX)),
            Some(self.control.id().to_owned()),
            part.map(str::to_owned),
        ])
    }

    /// `{uiClassPrefix}-{type}[-{part}]`, lowercased type.
    pub fn get_class(&self, part: Option<&str>) -> String {
        join([
            Some(config::setting(UI_CLASS_PREFIX)),
            Some(self.type_name()),
            part.map(str::to_owned),
        ])
    }

    /// Part classes: `get_class(part)` plus the skin variant when skinned.
    pub fn part_classes(&self, part: Option<&str>) -> Vec<String> {
        let mut classes = vec![self.get_class(part)];
        if let Some(skin) = self.skin_class() {
            classes.push(join([Some(skin), Some(self.type_name()), part.map(str::to_owned)]));
        }
        classes
    }

    /// Add the part classes of `part` to `node` (default: the root node).
    pub fn add_class(&self, part: Option<&str>, node: Option<NodeId>) {
        let Some(node) = node.or(self.control.main()) else {
            return;
        };
        let doc = self.control.document();
        for class in self.part_classes(part) {
            doc.add_class(node, &class);
        }
    }

    pub fn remove_class(&self, part: Option<&str>, node: Option<NodeId>) {
        let Some(node) = node.or(self.control.main()) else {
            return;
        };
        let doc = self.control.document();
        for class in self.part_classes(part) {
            doc.remove_class(node, &class);
        }
    }

    /// Classes every rendered root carries.
    pub fn base_classes(&self) -> Vec<String> {
        let ui = config::setting(UI_CLASS_PREFIX);
        let mut classes = vec![
            format!("{ui}-{}", config::setting(UI_CLASS_CONTROL)),
            format!("{ui}-{}", self.type_name()),
        ];
        if let Some(skin) = self.skin_class() {
            classes.push(format!("{skin}-{}", self.type_name()));
            classes.push(skin);
        }
        classes
    }

    /// Classes projected for `state`.
    pub fn state_classes(&self, state: &str) -> Vec<String> {
        let mut classes = vec![
            format!("{}-{state}", self.get_class(None)),
            format!("{}-{state}", config::setting(STATE_CLASS_PREFIX)),
        ];
        if let Some(skin) = self.skin_class() {
            classes.push(format!("{skin}-{state}"));
        }
        classes
    }

    pub(crate) fn add_base_classes(&self) {
        self.apply(self.base_classes(), true);
    }

    pub(crate) fn add_state_classes(&self, state: &str) {
        self.apply(self.state_classes(state), true);
    }

    pub(crate) fn remove_state_classes(&self, state: &str) {
        self.apply(self.state_classes(state), false);
    }

    fn apply(&self, classes: Vec<String>, add: bool) {
        let Some(main) = self.control.main() else {
            return;
        };
        let doc = self.control.document();
        for class in classes {
            if add {
                doc.add_class(main, &class);
            } else {
                doc.remove_class(main, &class);
            }
        }
    }

    fn type_name(&self) -> String {
        self.control.kind().to_lowercase()
    }

    /// `{skinClassPrefix}-{skin}` for a skinned control.
    fn skin_class(&self) -> Option<String> {
        let skin = self.control.skin()?;
        Some(format!("{}-{skin}", config::setting(SKIN_CLASS_PREFIX)))
    }
}

fn join<const N: usize>(parts: [Option<String>; N]) -> String {
    parts
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

// ---------------------------------------------------------------------------
// TemplateHelper
// ---------------------------------------------------------------------------

/// A replaceable template renderer.
pub type TemplateEngine = Rc<dyn Fn(&str, &Properties) -> String>;

/// Renders `${name}` placeholders from a property map.
#[derive(Clone, Default)]
pub struct TemplateHelper {
    engine: Option<TemplateEngine>,
}

impl TemplateHelper {
    pub fn set_engine(&mut self, engine: TemplateEngine) {
        self.engine = Some(engine);
    }

    /// Render markup: default placeholders are HTML-escaped.
    pub fn render(&self, template: &str, data: &Properties) -> String {
        match &self.engine {
            Some(engine) => engine(template, data),
            None => substitute(template, data),
        }
    }

    /// Render for a text node: default placeholders are inserted verbatim.
    pub fn render_text(&self, template: &str, data: &Properties) -> String {
        match &self.engine {
            Some(engine) => engine(template, data),
            None => fill(template, data, false),
        }
    }
}

impl fmt::Debug for TemplateHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateHelper")
            .field("custom_engine", &self.engine.is_some())
            .finish()
    }
}

/// Default engine: `${key}` becomes the escaped value; unknown keys render
/// empty; an unterminated `${` is copied through.
pub fn substitute(template: &str, data: &Properties) -> String {
    fill(template, data, true)
}

fn fill(template: &str, data: &Properties, escape: bool) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = after[..end].trim();
        if let Some(value) = data.get(key) {
            let value = value.to_string();
            if escape {
                out.push_str(&escape_html(&value));
            } else {
                out.push_str(&value);
            }
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}
