//! Control lifecycle: phases and the shared teardown sequence.
//!
//! A control moves `Created -> Rendered -> Disposed -> Destroyed`; rendering
//! may be skipped. Teardown always runs in the same order:
//!
//! 1. emit `beforedispose`
//! 2. unbind every DOM event the control registered
//! 3. leave the instance registry
//! 4. dispose every active plugin
//! 5. emit `afterdispose`
//! 6. drop all listeners

use crate::event::EventDetail;
use crate::plugin::{self, PluginSelector};
use crate::registry;

use super::control::Control;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a control is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Constructed and registered; no DOM structure built yet.
    Created,
    /// Structure and events are in place; property changes repaint.
    Rendered,
    /// Detached from events, registry and plugins.
    Disposed,
    /// Disposed, and the root node has been removed.
    Destroyed,
}

pub(crate) fn phase_of(rendered: bool, disposed: bool, has_main: bool) -> Phase {
    match (disposed, has_main, rendered) {
        (true, false, _) => Phase::Destroyed,
        (true, true, _) => Phase::Disposed,
        (false, _, true) => Phase::Rendered,
        (false, _, false) => Phase::Created,
    }
}

// ---------------------------------------------------------------------------
// Teardown
// ---------------------------------------------------------------------------

/// Run the teardown sequence. The caller marks the control disposed.
pub(crate) fn dispose(control: &mut Control) {
    control.emit("beforedispose", EventDetail::None);
    control.clear_dom_events(None);
    registry::remove(control);
    plugin::dispose_plugin(control, PluginSelector::All);
    control.emit("afterdispose", EventDetail::None);
    control.off_all();
    tracing::debug!(id = %control.id(), kind = control.kind(), "control disposed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases() {
        assert_eq!(phase_of(false, false, true), Phase::Created);
        assert_eq!(phase_of(true, false, true), Phase::Rendered);
        assert_eq!(phase_of(true, true, true), Phase::Disposed);
        assert_eq!(phase_of(false, true, true), Phase::Disposed);
        assert_eq!(phase_of(true, true, false), Phase::Destroyed);
    }
}
