//! Built-in widgets: Button, Tab, Slider.

pub mod button;
pub mod slider;
pub mod tab;

pub use button::Button;
pub use slider::Slider;
pub use tab::{BeforeChange, Tab, TabItem};

use crate::error::Result;
use crate::plugin::register_plugin;
use crate::plugins::TabScroll;
use crate::registry::register_component;
use crate::value::Value;

/// Register the built-in widgets and plugins on this thread.
pub fn register_builtins() -> Result<()> {
    register_component::<Button>()?;
    register_component::<Tab>()?;
    register_component::<Slider>()?;
    register_plugin(TabScroll::constructor())?;
    Ok(())
}

/// CSS length for a property value: bare numbers get `px`.
pub(crate) fn css_length(value: &Value) -> String {
    match value {
        Value::Int(n) => format!("{n}px"),
        Value::Float(x) => format!("{x}px"),
        Value::Str(s) if !s.is_empty() && s.trim().parse::<f64>().is_ok() => {
            format!("{}px", s.trim())
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn lengths() {
        assert_eq!(css_length(&Value::from(80)), "80px");
        assert_eq!(css_length(&Value::from("12")), "12px");
        assert_eq!(css_length(&Value::from("50%")), "50%");
        assert_eq!(css_length(&Value::from("3em")), "3em");
    }

    #[test]
    fn builtins_register_once() {
        crate::reset();
        register_builtins().unwrap();
        assert!(crate::registry::is_registered("Tab"));
        assert!(crate::plugin::is_plugin_registered("TabScroll"));
        assert_eq!(
            register_builtins().unwrap_err(),
            Error::DuplicateType("Button".into())
        );
    }
}
