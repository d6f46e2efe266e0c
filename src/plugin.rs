//! Plugin manager.
//!
//! Plugins are named add-ons attached to a single control. Constructors are
//! registered once per thread; activating a plugin on a control builds an
//! instance and stores it on the control until it is disposed.

use std::any::Any;
use std::cell::RefCell;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::value::Properties;
use crate::widget::Control;

/// An active plugin instance.
pub trait Plugin: Any {
    /// Release everything the plugin attached to `control`.
    fn dispose(&mut self, control: &mut Control);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Registry entry: a plugin name and the function that activates it.
#[derive(Debug, Clone, Copy)]
pub struct PluginConstructor {
    pub name: &'static str,
    pub build: fn(&mut Control, Properties) -> Box<dyn Plugin>,
}

/// Which active plugins `dispose_plugin` targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSelector {
    One(String),
    Many(Vec<String>),
    All,
}

impl From<&str> for PluginSelector {
    fn from(name: &str) -> Self {
        Self::One(name.to_owned())
    }
}

thread_local! {
    static PLUGINS: RefCell<IndexMap<&'static str, PluginConstructor>> = RefCell::new(IndexMap::new());
}

/// Register a plugin constructor. Fails with [`Error::DuplicatePlugin`] when
/// the name is taken.
pub fn register_plugin(constructor: PluginConstructor) -> Result<()> {
    PLUGINS.with(|plugins| {
        let mut plugins = plugins.borrow_mut();
        if plugins.contains_key(constructor.name) {
            tracing::warn!(plugin = constructor.name, "plugin already registered");
            return Err(Error::DuplicatePlugin(constructor.name.to_owned()));
        }
        plugins.insert(constructor.name, constructor);
        Ok(())
    })
}

pub fn is_plugin_registered(name: &str) -> bool {
    PLUGINS.with(|plugins| plugins.borrow().contains_key(name))
}

/// Activate plugin `name` on `control`.
///
/// No-op when the plugin is already active on the control or unknown.
pub fn active_plugin(control: &mut Control, name: &str, options: Properties) {
    if control.plugins.contains_key(name) {
        return;
    }
    let Some(constructor) = PLUGINS.with(|plugins| plugins.borrow().get(name).copied()) else {
        tracing::debug!(plugin = name, "unknown plugin");
        return;
    };
    let plugin = (constructor.build)(control, options);
    control.plugins.insert(constructor.name.to_owned(), plugin);
    tracing::debug!(id = %control.id(), plugin = name, "plugin activated");
}

/// Dispose the selected active plugins. Names that are not active are
/// skipped.
pub fn dispose_plugin(control: &mut Control, selector: PluginSelector) {
    let names = match selector {
        PluginSelector::One(name) => vec![name],
        PluginSelector::Many(names) => names,
        PluginSelector::All => control.plugins.keys().cloned().collect(),
    };
    for name in names {
        if let Some(mut plugin) = control.plugins.shift_remove(&name) {
            plugin.dispose(control);
            tracing::debug!(id = %control.id(), plugin = %name, "plugin disposed");
        }
    }
}

/// Forget every registered plugin constructor.
pub fn reset_plugins() {
    PLUGINS.with(|plugins| plugins.borrow_mut().clear());
}
