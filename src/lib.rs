//! # gilt-ui
//!
//! An attribute-driven widget toolkit over a retained DOM.
//!
//! Controls are created from markup annotations such as
//! `data-ui="type:Tab;id:main"`, kept in a per-thread registry by id, and
//! extended at runtime with plugins. Everything runs against a headless
//! [`dom::Document`], so the whole lifecycle can be driven from tests.
//!
//! ## Core Systems
//!
//! - **[`parse`]**: `key:value;key:value` attribute parsing
//! - **[`config`]**: attribute prefixes and class prefixes
//! - **[`registry`]**: component types and live instances
//! - **[`plugin`]**: named plugin constructors, activation, disposal
//! - **[`widget`]**: the [`Control`] base: properties, states, render, events
//! - **[`init`]**: declarative creation from annotated markup
//! - **[`widgets`]**: built-in Button, Tab, Slider
//! - **[`plugins`]**: built-in plugins (TabScroll)
//! - **[`dom`]**: slotmap-backed DOM arena and the shared document
//! - **[`event`]**: control events and DOM event dispatch
//! - **[`timer`]**: virtual timer queue for deferred callbacks
//! - **[`testing`]**: headless Pilot and snapshot outlines
//!
//! ## Example
//!
//! ```
//! use gilt_ui::dom::NodeData;
//! use gilt_ui::{init, register_builtins, InitOptions};
//!
//! gilt_ui::reset();
//! register_builtins().unwrap();
//! let doc = gilt_ui::dom::Document::global();
//! doc.append(doc.body(), NodeData::new("button").with_attr("data-ui", "type:Button;id:ok"));
//! let controls = init(None, InitOptions::new());
//! assert_eq!(controls[0].borrow().id(), "ok");
//! ```

// Foundation
pub mod config;
pub mod error;
pub mod parse;
pub mod value;

// Document and events
pub mod dom;
pub mod event;
pub mod timer;

// Control system
pub mod init;
pub mod plugin;
pub mod registry;
pub mod widget;

// Built-ins
pub mod plugins;
pub mod widgets;

// Headless tooling
pub mod testing;

pub use config::{config, get_config};
pub use error::{Error, Result};
pub use init::{init, Container, InitOptions};
pub use parse::{parse_attribute, parse_attribute_with};
pub use plugin::{active_plugin, dispose_plugin, register_plugin, Plugin, PluginConstructor, PluginSelector};
pub use registry::{create, get, register, register_component};
pub use value::{props, Properties, Value};
pub use widget::{Component, Control, ControlRef, Options, Widget};
pub use widgets::register_builtins;

/// Clear every per-thread table: registry, plugins, config, the global
/// document, timers, and the id counter.
pub fn reset() {
    registry::reset_registry();
    plugin::reset_plugins();
    config::reset_config();
    dom::Document::reset_global();
    timer::reset_timers();
    widget::reset_guid();
    tracing::trace!("toolkit state reset");
}
