//! Declarative initialization: build controls from marked-up nodes.
//!
//! Every element under the root is scanned in document order. Attributes
//! under the configured ui prefix become control options; attributes under
//! the plugin prefix become `options.plugin[name]`. Elements without a
//! `type` option, or already carrying the instance marker, are skipped.
//!
//! ```text
//! <div data-ui="type:Button;id:ok" data-ui-width="80"></div>
//!   -> { type: "Button", id: "ok", width: "80" }
//! <div data-ui-type="Tab" data-ui-plugin-scroll="speed:3"></div>
//!   -> { type: "Tab", plugin: { scroll: { speed: "3" } } }
//! ```

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::config::{self, INSTANCE_ATTR, PLUGIN_PREFIX, UI_PREFIX};
use crate::dom::{Document, NodeId};
use crate::parse::parse_attribute_with;
use crate::registry;
use crate::value::{Properties, Value};
use crate::widget::{ControlRef, Options};

/// Transform applied to every parsed attribute value and every override.
pub type ValueReplacer = Rc<dyn Fn(Value) -> Value>;

/// Receives each control created by [`init`], before it renders.
pub trait Container {
    fn add_child(&mut self, control: &ControlRef);
}

impl Container for Vec<ControlRef> {
    fn add_child(&mut self, control: &ControlRef) {
        self.push(Rc::clone(control));
    }
}

/// Options for [`init`].
#[derive(Default)]
pub struct InitOptions<'a> {
    pub value_replacer: Option<ValueReplacer>,
    /// Per-id property overrides, applied over the parsed attributes.
    pub properties: IndexMap<String, Properties>,
    pub parent: Option<&'a mut dyn Container>,
    /// Called once with every created control after the scan.
    pub success: Option<Box<dyn FnOnce(&[ControlRef]) + 'a>>,
    /// Document to scan; the thread's default document when `None`.
    pub document: Option<Document>,
}

impl<'a> InitOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value_replacer(mut self, replacer: impl Fn(Value) -> Value + 'static) -> Self {
        self.value_replacer = Some(Rc::new(replacer));
        self
    }

    /// Override properties for the control whose id is `id`.
    pub fn properties(mut self, id: impl Into<String>, properties: Properties) -> Self {
        self.properties.insert(id.into(), properties);
        self
    }

    pub fn parent(mut self, parent: &'a mut dyn Container) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn success(mut self, success: impl FnOnce(&[ControlRef]) + 'a) -> Self {
        self.success = Some(Box::new(success));
        self
    }

    pub fn document(mut self, doc: Document) -> Self {
        self.document = Some(doc);
        self
    }
}

impl fmt::Debug for InitOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitOptions")
            .field("properties", &self.properties)
            .field("parent", &self.parent.is_some())
            .field("success", &self.success.is_some())
            .finish_non_exhaustive()
    }
}

/// Scan `root` (default: the document body) and build a control for every
/// marked element, in document order. Each control is rendered as soon as
/// it is created.
pub fn init(root: Option<NodeId>, options: InitOptions<'_>) -> Vec<ControlRef> {
    let InitOptions {
        value_replacer,
        properties,
        mut parent,
        success,
        document,
    } = options;
    let doc = document.unwrap_or_else(Document::global);
    let root = root.unwrap_or_else(|| doc.body());
    let replace = |value: Value| match &value_replacer {
        Some(replacer) => replacer(value),
        None => value,
    };

    let scanner = Scanner {
        instance_attr: config::setting(INSTANCE_ATTR),
        ui_prefix: config::setting(UI_PREFIX),
        plugin_prefix: config::setting(PLUGIN_PREFIX),
    };

    let nodes = doc.read(|dom| dom.descendant_elements(root));
    let mut controls = Vec::new();
    for node in nodes {
        // A control built earlier in this scan may have removed the node.
        let Some(attributes) = doc.read(|dom| dom.get(node).map(|n| n.attribute_list())) else {
            continue;
        };
        if attributes.iter().any(|(name, _)| *name == scanner.instance_attr) {
            continue;
        }

        let mut control_options = scanner.collect(&attributes, &replace);
        let Some(kind) = control_options.get("type").map(Value::to_string) else {
            continue;
        };

        let id = control_options.get("id").map(Value::to_string);
        if let Some(overrides) = id.and_then(|id| properties.get(&id)) {
            for (key, value) in overrides {
                control_options.insert(key.clone(), replace(value.clone()));
            }
        }

        let mut create_options = Options::from(control_options)
            .main(node)
            .document(doc.clone());
        create_options.remove("type");

        let Some(control) = registry::create(&kind, create_options) else {
            tracing::debug!(kind = %kind, "skipping element of unregistered type");
            continue;
        };
        if let Some(parent) = parent.as_deref_mut() {
            parent.add_child(&control);
        }
        control.borrow_mut().render();
        controls.push(control);
    }

    tracing::debug!(count = controls.len(), "declarative init finished");
    if let Some(success) = success {
        success(&controls);
    }
    controls
}

struct Scanner {
    instance_attr: String,
    ui_prefix: String,
    plugin_prefix: String,
}

impl Scanner {
    /// Fold every prefixed attribute into one option map.
    fn collect(&self, attributes: &[(String, String)], replace: &dyn Fn(Value) -> Value) -> Properties {
        let mut options = Properties::new();
        let mut plugins = Properties::new();

        for (name, value) in attributes {
            if let Some(terms) = suffix_terms(name, &self.plugin_prefix) {
                let Some((plugin, terms)) = terms.split_first() else {
                    continue;
                };
                let Value::Map(entry) = plugins
                    .entry((*plugin).to_owned())
                    .or_insert_with(|| Value::Map(Properties::new()))
                else {
                    continue;
                };
                extend(entry, terms, value, replace);
            } else if let Some(terms) = suffix_terms(name, &self.ui_prefix) {
                extend(&mut options, &terms, value, replace);
            }
        }

        if !plugins.is_empty() {
            options.insert("plugin".to_owned(), Value::Map(plugins));
        }
        options
    }
}

/// `prefix` -> `[]`, `prefix-a-b` -> `["a", "b"]`, anything else -> `None`.
fn suffix_terms<'n>(name: &'n str, prefix: &str) -> Option<Vec<&'n str>> {
    let rest = name.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some(Vec::new());
    }
    let rest = rest.strip_prefix('-')?;
    Some(rest.split('-').filter(|t| !t.is_empty()).collect())
}

/// Bare prefix: parse and merge without overwriting. Suffixed: set the
/// camel-cased key.
fn extend(target: &mut Properties, terms: &[&str], value: &str, replace: &dyn Fn(Value) -> Value) {
    if terms.is_empty() {
        for (key, value) in parse_attribute_with(value, |v| replace(Value::from(v))) {
            target.entry(key).or_insert(value);
        }
    } else {
        target.insert(camel_case(terms), replace(Value::from(value)));
    }
}

/// `["loop", "delay"]` -> `"loopDelay"`.
fn camel_case(terms: &[&str]) -> String {
    let mut out = String::new();
    for (i, term) in terms.iter().enumerate() {
        let mut chars = term.chars();
        match chars.next() {
            Some(first) if i > 0 && first.is_ascii_lowercase() => {
                out.push(first.to_ascii_uppercase());
                out.push_str(chars.as_str());
            }
            _ => out.push_str(term),
        }
    }
    out
}
