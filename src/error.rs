//! Crate-wide error type.
//!
//! Only registration can fail. Lookups that miss return `Option`, and the
//! attribute parser degrades instead of failing.

/// Errors raised synchronously by registration calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A component with this type tag is already registered.
    #[error("component type `{0}` is already registered")]
    DuplicateType(String),
    /// A plugin with this name is already registered.
    #[error("plugin `{0}` is already registered")]
    DuplicatePlugin(String),
}

/// Convenience alias used by fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
