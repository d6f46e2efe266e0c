//! Widget trait: the capability interface every control variant implements.
//!
//! A [`Control`] owns all mutable data (properties, states, DOM root, runtime
//! scratch). The [`Widget`] behind it is an immutable behavior object whose
//! hooks receive the control mutably. Each hook has a default that delegates
//! to the control's `base_*` method, so a widget only overrides what it
//! changes and calls the base explicitly when it wants the shared behavior.

use std::any::Any;

use crate::dom::{Document, NodeId};
use crate::value::{Changes, Properties, Value};

use super::control::{Control, ControlRef};
use super::options::Options;

// ---------------------------------------------------------------------------
// Widget trait
// ---------------------------------------------------------------------------

/// Behavior of one control type.
pub trait Widget: 'static {
    /// Type tag (e.g. "Button"), used as the registry key and in class names.
    fn kind(&self) -> &'static str;

    /// Default property values, consulted by the diff engine as the "old"
    /// value of a property that was never set.
    fn defaults(&self) -> Properties {
        Properties::new()
    }

    /// Build the root node when the caller supplies none.
    fn create_main(&self, doc: &Document) -> NodeId {
        doc.create_element("div")
    }

    /// Widget-private typed state, stored in the control's runtime.
    fn create_state(&self) -> Option<Box<dyn Any>> {
        None
    }

    /// Normalize construction options.
    fn init_options(&self, control: &mut Control, options: Options) {
        control.base_init_options(options);
    }

    /// Build or locate DOM substructure. Runs once, on first render.
    fn init_structure(&self, _control: &mut Control) {}

    /// Bind DOM events. Runs once, on first render, after `init_structure`.
    fn init_event(&self, _control: &mut Control) {}

    /// Reconcile the DOM with properties. `None` means full first paint.
    ///
    /// Overrides should end with `control.base_repaint(changes)` so state
    /// classes reflect the final property values.
    fn repaint(&self, control: &mut Control, changes: Option<&Changes>) {
        control.base_repaint(changes);
    }

    /// Filter or coerce incoming properties before diffing.
    fn set_properties(&self, control: &mut Control, properties: Properties) {
        control.base_set_properties(properties);
    }

    /// Property accessors consulted by `get`/`set` before the generic path.
    fn accessors(&self) -> &'static [Accessor] {
        &[]
    }

    /// Tear down. Overrides must call `control.base_dispose()`.
    fn dispose(&self, control: &mut Control) {
        control.base_dispose();
    }
}

// ---------------------------------------------------------------------------
// Accessor table
// ---------------------------------------------------------------------------

/// Override for one property's `get` and/or `set` path.
#[derive(Clone, Copy)]
pub struct Accessor {
    pub name: &'static str,
    pub get: Option<fn(&Control) -> Value>,
    pub set: Option<fn(&mut Control, Value)>,
}

impl Accessor {
    pub const fn setter(name: &'static str, set: fn(&mut Control, Value)) -> Self {
        Self {
            name,
            get: None,
            set: Some(set),
        }
    }

    pub const fn getter(name: &'static str, get: fn(&Control) -> Value) -> Self {
        Self {
            name,
            get: Some(get),
            set: None,
        }
    }
}

impl std::fmt::Debug for Accessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessor")
            .field("name", &self.name)
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Component / Constructor
// ---------------------------------------------------------------------------

/// A widget that can be registered and created by type tag.
pub trait Component: Widget + Default {
    /// Static type tag. Must match [`Widget::kind`].
    const TYPE: &'static str;
}

/// Registry entry: a type tag and the function that builds its controls.
#[derive(Clone, Copy)]
pub struct Constructor {
    pub kind: &'static str,
    pub build: fn(Options) -> ControlRef,
}

impl Constructor {
    /// Constructor for a [`Component`].
    pub fn of<C: Component>() -> Self {
        Self {
            kind: C::TYPE,
            build: build_component::<C>,
        }
    }
}

fn build_component<C: Component>(options: Options) -> ControlRef {
    Control::create(C::default(), options)
}

impl std::fmt::Debug for Constructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constructor").field("kind", &self.kind).finish()
    }
}

// ---------------------------------------------------------------------------
// BaseControl
// ---------------------------------------------------------------------------

/// The bare control: base behavior only, type tag `"Control"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseControl;

impl Widget for BaseControl {
    fn kind(&self) -> &'static str {
        Self::TYPE
    }
}

impl Component for BaseControl {
    const TYPE: &'static str = "Control";
}
