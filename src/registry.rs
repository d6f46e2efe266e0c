//! Component and instance registries.
//!
//! Two per-thread tables: type tag -> [`Constructor`], and control id -> live
//! [`ControlRef`]. Controls enter the instance table at construction and
//! leave it on dispose. Lookups never hold a table borrow while user code
//! runs, so constructors and disposers may re-enter the registry.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::widget::{Component, Constructor, Control, ControlRef, Options};

#[derive(Default)]
struct Registry {
    components: IndexMap<String, Constructor>,
    instances: IndexMap<String, ControlRef>,
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

// ---------------------------------------------------------------------------
// Component registry
// ---------------------------------------------------------------------------

/// Register a constructor under its type tag.
///
/// Fails with [`Error::DuplicateType`] when the tag is taken; the existing
/// registration is left untouched.
pub fn register(constructor: Constructor) -> Result<()> {
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        if reg.components.contains_key(constructor.kind) {
            tracing::warn!(kind = constructor.kind, "component type already registered");
            return Err(Error::DuplicateType(constructor.kind.to_owned()));
        }
        reg.components
            .insert(constructor.kind.to_owned(), constructor);
        tracing::debug!(kind = constructor.kind, "component registered");
        Ok(())
    })
}

/// Register a [`Component`] type.
pub fn register_component<C: Component>() -> Result<()> {
    register(Constructor::of::<C>())
}

pub fn is_registered(kind: &str) -> bool {
    REGISTRY.with(|reg| reg.borrow().components.contains_key(kind))
}

/// Registered type tags, in registration order.
pub fn registered_types() -> Vec<String> {
    REGISTRY.with(|reg| reg.borrow().components.keys().cloned().collect())
}

/// Build a control of type `kind`. The `type` option is consumed.
///
/// Returns `None` for an unknown type.
pub fn create(kind: &str, mut options: Options) -> Option<ControlRef> {
    let build = REGISTRY.with(|reg| reg.borrow().components.get(kind).map(|c| c.build));
    let Some(build) = build else {
        tracing::debug!(kind, "no component registered for type");
        return None;
    };
    options.remove("type");
    Some(build(options))
}

// ---------------------------------------------------------------------------
// Instance registry
// ---------------------------------------------------------------------------

/// Record `control` under its current id, replacing any other entry.
pub fn add(control: &ControlRef) {
    let id = control.borrow().id().to_owned();
    add_with_id(id, control);
}

pub(crate) fn add_with_id(id: String, control: &ControlRef) {
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        if let Some(existing) = reg.instances.get(&id) {
            if Rc::ptr_eq(existing, control) {
                return;
            }
            tracing::debug!(id = %id, "replacing registered instance");
        }
        reg.instances.insert(id, Rc::clone(control));
    });
}

/// Forget `control`. Another instance registered under the same id is left
/// in place.
pub fn remove(control: &Control) -> Option<ControlRef> {
    let id = control.id();
    let removed = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let stored = reg.instances.get(id)?;
        if !std::ptr::eq(stored.as_ptr().cast_const(), control) {
            return None;
        }
        reg.instances.shift_remove(id)
    });
    if removed.is_some() {
        tracing::trace!(id, "instance removed");
    }
    removed
}

/// Live control registered under `id`.
pub fn get(id: &str) -> Option<ControlRef> {
    REGISTRY.with(|reg| reg.borrow().instances.get(id).cloned())
}

/// Move an instance to a new id (a pre-render id change).
pub(crate) fn rename(old: &str, new: &str) {
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        if let Some(control) = reg.instances.shift_remove(old) {
            reg.instances.insert(new.to_owned(), control);
        }
    });
}

pub fn instance_count() -> usize {
    REGISTRY.with(|reg| reg.borrow().instances.len())
}

/// Ids of every live instance, in registration order.
pub fn instance_ids() -> Vec<String> {
    REGISTRY.with(|reg| reg.borrow().instances.keys().cloned().collect())
}

/// Drop every registered type and instance.
pub fn reset_registry() {
    let dropped = REGISTRY.with(|reg| std::mem::take(&mut *reg.borrow_mut()));
    drop(dropped);
}
