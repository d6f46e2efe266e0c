//! Snapshot rendering helpers.
//!
//! Converts a document subtree into an indented outline that reads well in
//! inline snapshots: one element per line as `tag#id.class [attr=value]`,
//! text nodes quoted, inline styles in braces.

use std::fmt::Write as _;

use crate::dom::{Document, Dom, NodeId};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Outline of `node` and its subtree, two spaces per level.
///
/// # Examples
///
/// ```
/// use gilt_ui::dom::{Document, NodeData};
/// use gilt_ui::testing::outline;
///
/// let doc = Document::new();
/// let ul = doc.append(doc.body(), NodeData::new("ul").with_class("nav"));
/// doc.append(ul, NodeData::new("li").with_attr("data-role", "trigger"));
/// assert_eq!(outline(&doc, ul), "ul.nav\n  li [data-role=trigger]");
/// ```
pub fn outline(doc: &Document, node: NodeId) -> String {
    let mut lines = Vec::new();
    doc.read(|dom| write_outline(dom, node, 0, &mut lines));
    lines.join("\n")
}

/// Outline of every child of `node`.
pub fn outline_children(doc: &Document, node: NodeId) -> String {
    let mut lines = Vec::new();
    doc.read(|dom| {
        for &child in dom.children(node) {
            write_outline(dom, child, 0, &mut lines);
        }
    });
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn write_outline(dom: &Dom, node: NodeId, depth: usize, lines: &mut Vec<String>) {
    let Some(data) = dom.get(node) else {
        return;
    };
    let indent = "  ".repeat(depth);
    if let Some(text) = &data.text {
        lines.push(format!("{indent}{text:?}"));
        return;
    }

    let mut line = format!("{indent}{}", data.tag);
    if let Some(id) = &data.id {
        let _ = write!(line, "#{id}");
    }
    for class in &data.classes {
        let _ = write!(line, ".{class}");
    }
    if !data.attributes.is_empty() {
        let attrs: Vec<String> = data
            .attributes
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        let _ = write!(line, " [{}]", attrs.join(" "));
    }
    if !data.styles.is_empty() {
        let styles: Vec<String> = data
            .styles
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        let _ = write!(line, " {{{}}}", styles.join("; "));
    }
    lines.push(line);

    for &child in dom.children(node) {
        write_outline(dom, child, depth + 1, lines);
    }
}
