//! Built-in plugins.

pub mod tab_scroll;

pub use tab_scroll::TabScroll;
