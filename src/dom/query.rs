//! DOM queries: by id, tag, attribute; generic predicate matching.
//!
//! Scoped queries search the descendants of a node in document order and
//! never match the node itself.

use super::node::{NodeData, NodeId};
use super::tree::Dom;

impl Dom {
    /// Find the first node whose `id` field matches the given string.
    ///
    /// Iterates all nodes in the arena, attached or not.
    pub fn query_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, data)| data.id.as_deref() == Some(id))
            .map(|(node_id, _)| node_id)
    }

    /// First descendant of `scope` matching `predicate`.
    pub fn query(&self, scope: NodeId, predicate: impl Fn(&NodeData) -> bool) -> Option<NodeId> {
        self.descendant_elements(scope)
            .into_iter()
            .find(|&id| self.get(id).is_some_and(&predicate))
    }

    /// Every descendant of `scope` matching `predicate`.
    pub fn query_all(&self, scope: NodeId, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.descendant_elements(scope)
            .into_iter()
            .filter(|&id| self.get(id).is_some_and(&predicate))
            .collect()
    }

    /// First descendant with the given tag.
    pub fn query_tag(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.query(scope, |data| data.tag == tag)
    }

    /// Every descendant with the given tag.
    pub fn query_all_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.query_all(scope, |data| data.tag == tag)
    }

    /// First descendant whose attribute `name` equals `value`
    /// (the `[name=value]` selector).
    pub fn query_attr(&self, scope: NodeId, name: &str, value: &str) -> Option<NodeId> {
        self.query(scope, |data| data.attribute(name).as_deref() == Some(value))
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::node::NodeData;
    use crate::dom::tree::Dom;

    /// ```text
    ///       root (div #root)
    ///      /    \
    ///    a       b
    ///  (ul        (div
    ///   #nav       data-role=panel)
    ///   role=navigator)
    ///   / \
    ///  c   d
    /// (li) (li)
    /// ```
    fn build_query_tree() -> (Dom, crate::dom::NodeId) {
        let mut dom = Dom::new();
        let root = dom.create(NodeData::new("div").with_id("root"));
        let a = dom.append_new(
            root,
            NodeData::new("ul")
                .with_id("nav")
                .with_attr("data-role", "navigator"),
        );
        dom.append_new(root, NodeData::new("div").with_attr("data-role", "panel"));
        dom.append_new(a, NodeData::new("li").with_id("first"));
        dom.append_new(a, NodeData::new("li").with_id("second"));
        (dom, root)
    }

    #[test]
    fn query_by_id_found_and_missing() {
        let (dom, _) = build_query_tree();
        let id = dom.query_by_id("nav").unwrap();
        assert_eq!(dom.get(id).unwrap().tag, "ul");
        assert!(dom.query_by_id("nonexistent").is_none());
    }

    #[test]
    fn query_tag_is_document_order() {
        let (dom, root) = build_query_tree();
        let li = dom.query_tag(root, "LI").unwrap();
        assert_eq!(dom.get(li).unwrap().id.as_deref(), Some("first"));
        assert_eq!(dom.query_all_tag(root, "li").len(), 2);
    }

    #[test]
    fn query_attr() {
        let (dom, root) = build_query_tree();
        let nav = dom.query_attr(root, "data-role", "navigator").unwrap();
        assert_eq!(dom.get(nav).unwrap().id.as_deref(), Some("nav"));
        assert!(dom.query_attr(root, "data-role", "wrapper").is_none());
    }

    #[test]
    fn scoped_query_excludes_scope() {
        let (dom, root) = build_query_tree();
        let nav = dom.query_by_id("nav").unwrap();
        assert!(dom.query_tag(nav, "ul").is_none());
        assert!(dom.query_tag(root, "div").is_some());
    }

    #[test]
    fn query_on_empty_dom() {
        let dom = Dom::new();
        assert!(dom.query_by_id("x").is_none());
    }
}
