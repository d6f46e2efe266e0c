//! Headless testing helpers: Pilot, snapshot outlines.
//!
//! Use the [`Pilot`] to drive controls through a document without a browser.
//! Use [`outline`] to capture a subtree as plain text for snapshot-style
//! assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{outline, outline_children};
