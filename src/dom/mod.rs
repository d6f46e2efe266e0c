//! DOM arena: slotmap-backed node tree, queries, and the shared document.

pub mod document;
pub mod node;
pub mod query;
pub mod tree;

pub use document::{escape_html, Document};
pub use node::{NodeData, NodeId, TEXT_TAG};
pub use tree::Dom;
