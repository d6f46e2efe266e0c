//! Widget system: the control engine, widget trait, options, helpers.

pub mod control;
pub mod helper;
pub mod lifecycle;
pub mod options;
pub mod traits;

pub use control::{Control, ControlRef, Runtime, DISABLED, HIDDEN};
pub use helper::{guid, reset_guid, DomHelper, TemplateEngine, TemplateHelper};
pub use lifecycle::Phase;
pub use options::{OptionValue, Options};
pub use traits::{Accessor, BaseControl, Component, Constructor, Widget};
