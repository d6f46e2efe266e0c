//! Global toolkit configuration.
//!
//! A per-thread key/value store seeded with the toolkit defaults. Known keys
//! drive attribute prefixes and class naming; unknown keys are kept verbatim
//! so applications can stash their own settings alongside.

use std::cell::RefCell;

use indexmap::IndexMap;

/// Prefix for generated DOM ids (`{idAttrPrefix}-{controlId}`).
pub const ID_ATTR_PREFIX: &str = "idAttrPrefix";
/// Attribute prefix carrying declarative control options.
pub const UI_PREFIX: &str = "uiPrefix";
/// Attribute prefix carrying declarative plugin options.
pub const PLUGIN_PREFIX: &str = "pluginPrefix";
/// Attribute marking a node as the root of a live control.
pub const INSTANCE_ATTR: &str = "instanceAttr";
pub const UI_CLASS_PREFIX: &str = "uiClassPrefix";
pub const SKIN_CLASS_PREFIX: &str = "skinClassPrefix";
pub const STATE_CLASS_PREFIX: &str = "stateClassPrefix";
pub const UI_CLASS_CONTROL: &str = "uiClassControl";

const DEFAULTS: &[(&str, &str)] = &[
    (ID_ATTR_PREFIX, "ctrl"),
    (UI_PREFIX, "data-ui"),
    (PLUGIN_PREFIX, "data-ui-plugin"),
    (INSTANCE_ATTR, "data-ctrl-id"),
    (UI_CLASS_PREFIX, "ui"),
    (SKIN_CLASS_PREFIX, "skin"),
    (STATE_CLASS_PREFIX, "state"),
    (UI_CLASS_CONTROL, "ctrl"),
];

fn defaults() -> IndexMap<String, String> {
    DEFAULTS
        .iter()
        .map(|&(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

thread_local! {
    static CONFIG: RefCell<IndexMap<String, String>> = RefCell::new(defaults());
}

/// Merge `entries` into the configuration, overwriting existing keys.
pub fn config<K, V, I>(entries: I)
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    CONFIG.with(|cfg| {
        let mut cfg = cfg.borrow_mut();
        for (key, value) in entries {
            cfg.insert(key.into(), value.into());
        }
    });
}

/// Read one configuration entry.
pub fn get_config(name: &str) -> Option<String> {
    CONFIG.with(|cfg| cfg.borrow().get(name).cloned())
}

/// Read a key that always has a default. Falls back to `""` if an
/// application removed it by resetting to a custom table.
pub(crate) fn setting(name: &str) -> String {
    get_config(name).unwrap_or_default()
}

/// Restore the default configuration.
pub fn reset_config() {
    CONFIG.with(|cfg| *cfg.borrow_mut() = defaults());
}
