//! Event system: control events with listeners, DOM event bindings, dispatch.

pub mod dom;
pub mod emitter;

pub use dom::{bubble_path, dispatch, DomEvent, DomEvents, DomHandler, DomHandlerId};
pub use emitter::{Emitter, Event, EventDetail, Listener, ListenerId};
