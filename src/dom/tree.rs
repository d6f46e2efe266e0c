//! The node arena: create, attach, move, remove, walk.
//!
//! Nodes are created detached and attached explicitly. Moving a node keeps its
//! subtree; removing a node frees the whole subtree and invalidates every id
//! in it.

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};

/// Arena of element and text nodes.
///
/// Node data lives in one `SlotMap`; parent links and ordered child lists
/// live in secondary maps keyed by the same ids.
#[derive(Debug, Clone, Default)]
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a detached node.
    pub fn create(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Allocate a node as the last child of `parent`. The node stays
    /// detached when `parent` is stale.
    pub fn append_new(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.create(data);
        self.append_child(parent, id);
        id
    }

    /// Move `node` to the end of `new_parent`'s children.
    pub fn append_child(&mut self, new_parent: NodeId, node: NodeId) {
        self.insert_before(new_parent, node, None);
    }

    /// Move `node` under `new_parent`, before `reference` when it is one of
    /// `new_parent`'s children, otherwise last.
    ///
    /// Ignored when either node is stale or when `node` would end up inside
    /// its own subtree.
    pub fn insert_before(&mut self, new_parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        if !self.contains(node) || !self.contains(new_parent) {
            return;
        }
        if self.contains_node(node, new_parent) {
            return;
        }
        self.detach(node);
        self.parent.insert(node, new_parent);
        if let Some(list) = self.children.get_mut(new_parent) {
            let at = reference
                .and_then(|r| list.iter().position(|&c| c == r))
                .unwrap_or(list.len());
            list.insert(at, node);
        }
    }

    /// Unlink `node` from its parent. The subtree stays allocated.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent.remove(node) else {
            return;
        };
        if let Some(list) = self.children.get_mut(parent) {
            list.retain(|&c| c != node);
        }
    }

    /// Free `id` and its subtree, returning the data of `id` itself.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if !self.contains(id) {
            return None;
        }
        self.detach(id);
        let doomed = self.walk(id);
        for &node in doomed.iter().skip(1) {
            self.children.remove(node);
            self.parent.remove(node);
            self.nodes.remove(node);
        }
        self.children.remove(id);
        self.nodes.remove(id)
    }

    /// Free every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.remove(child);
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Ordered children; empty for leaves and stale ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Children that are elements.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.get(c).is_some_and(NodeData::is_element))
            .collect()
    }

    /// Parent, grandparent, and so on up to the top of the tree.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        std::iter::successors(self.parent(id), |&p| self.parent(p)).collect()
    }

    /// Whether `node` is `container` or one of its descendants.
    pub fn contains_node(&self, container: NodeId, node: NodeId) -> bool {
        self.contains(node)
            && (container == node
                || std::iter::successors(self.parent(node), |&p| self.parent(p))
                    .any(|p| p == container))
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// Allocated nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// `start` followed by its subtree in document order.
    pub fn walk(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = vec![start];
        while let Some(node) = pending.pop() {
            if !self.contains(node) {
                continue;
            }
            out.push(node);
            pending.extend(self.children(node).iter().rev());
        }
        out
    }

    /// Element descendants of `start` in document order, `start` excluded.
    pub fn descendant_elements(&self, start: NodeId) -> Vec<NodeId> {
        self.walk(start)
            .into_iter()
            .skip(1)
            .filter(|&id| self.get(id).is_some_and(NodeData::is_element))
            .collect()
    }

    /// Concatenated character data under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.walk(id)
            .into_iter()
            .filter_map(|n| self.get(n).and_then(|d| d.text.as_deref()))
            .collect()
    }

    /// Replace the children of an element with one text node (none for
    /// `""`). On a text node, replace its character data.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        let text = text.into();
        match self.get_mut(id) {
            Some(data) if !data.is_element() => data.text = Some(text),
            Some(_) => {
                self.clear_children(id);
                if !text.is_empty() {
                    self.append_new(id, NodeData::text(text));
                }
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// ```text
    /// div#tab
    /// ├── ul#nav
    /// │   ├── li#one
    /// │   └── li#two
    /// └── div#panel
    /// ```
    struct Fixture {
        dom: Dom,
        tab: NodeId,
        nav: NodeId,
        one: NodeId,
        two: NodeId,
        panel: NodeId,
    }

    fn fixture() -> Fixture {
        let mut dom = Dom::new();
        let tab = dom.create(NodeData::new("div").with_id("tab"));
        let nav = dom.append_new(tab, NodeData::new("ul").with_id("nav"));
        let one = dom.append_new(nav, NodeData::new("li").with_id("one"));
        let two = dom.append_new(nav, NodeData::new("li").with_id("two"));
        let panel = dom.append_new(tab, NodeData::new("div").with_id("panel"));
        Fixture { dom, tab, nav, one, two, panel }
    }

    #[test]
    fn structure_links() {
        let f = fixture();
        assert_eq!(f.dom.children(f.tab), &[f.nav, f.panel]);
        assert_eq!(f.dom.parent(f.one), Some(f.nav));
        assert_eq!(f.dom.parent(f.tab), None);
        assert_eq!(f.dom.ancestors(f.two), vec![f.nav, f.tab]);
        assert!(f.dom.contains_node(f.tab, f.two));
        assert!(f.dom.contains_node(f.two, f.two));
        assert!(!f.dom.contains_node(f.panel, f.two));
    }

    #[test]
    fn document_order() {
        let f = fixture();
        assert_eq!(f.dom.walk(f.tab), vec![f.tab, f.nav, f.one, f.two, f.panel]);
        assert_eq!(f.dom.descendant_elements(f.nav), vec![f.one, f.two]);
    }

    #[test]
    fn moving_nodes() {
        let mut f = fixture();
        f.dom.insert_before(f.nav, f.two, Some(f.one));
        assert_eq!(f.dom.children(f.nav), &[f.two, f.one]);

        f.dom.append_child(f.panel, f.one);
        assert_eq!(f.dom.children(f.nav), &[f.two]);
        assert_eq!(f.dom.parent(f.one), Some(f.panel));

        // A node cannot move under its own descendant.
        f.dom.append_child(f.two, f.tab);
        assert_eq!(f.dom.parent(f.tab), None);
    }

    #[test]
    fn detach_then_remove() {
        let mut f = fixture();
        f.dom.detach(f.nav);
        assert!(f.dom.contains(f.one));
        assert_eq!(f.dom.children(f.tab), &[f.panel]);

        let removed = f.dom.remove(f.nav);
        assert_eq!(removed.and_then(|d| d.id).as_deref(), Some("nav"));
        assert!(!f.dom.contains(f.one));
        assert!(!f.dom.contains(f.two));
        assert_eq!(f.dom.len(), 2);
        assert!(f.dom.remove(f.nav).is_none());
    }

    #[test]
    fn text_replaces_children() {
        let mut f = fixture();
        f.dom.set_text(f.one, "One");
        f.dom.set_text(f.two, "Two");
        assert_eq!(f.dom.text_content(f.nav), "OneTwo");

        f.dom.set_text(f.nav, "");
        assert!(f.dom.children(f.nav).is_empty());
        assert!(!f.dom.contains(f.one));
        assert_eq!(f.dom.element_children(f.tab), vec![f.panel]);
    }
}
