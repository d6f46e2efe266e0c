//! Node types: NodeId, NodeData.

use indexmap::IndexMap;
use slotmap::new_key_type;

new_key_type! {
    /// Unique identifier for a DOM node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Tag used for text nodes.
pub const TEXT_TAG: &str = "#text";

/// Data associated with a single DOM node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    /// Lowercase element tag (e.g. "div", "ul"), or [`TEXT_TAG`].
    pub tag: String,
    /// Optional element id.
    pub id: Option<String>,
    /// CSS classes, in insertion order.
    pub classes: Vec<String>,
    /// Markup attributes other than `id` and `class`, in insertion order.
    pub attributes: IndexMap<String, String>,
    /// Inline style declarations.
    pub styles: IndexMap<String, String>,
    /// Character data, for text nodes.
    pub text: Option<String>,
}

impl NodeData {
    /// Create a new element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attributes: IndexMap::new(),
            styles: IndexMap::new(),
            text: None,
        }
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            ..Self::new(TEXT_TAG)
        }
    }

    /// Whether this node is an element (not text).
    pub fn is_element(&self) -> bool {
        self.text.is_none()
    }

    /// Set the element id (builder).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a single CSS class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Set a markup attribute (builder). `id` and `class` are routed to their
    /// dedicated fields.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(&name.into(), value.into());
        self
    }

    /// Set an inline style (builder).
    pub fn with_style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(name.into(), value.into());
        self
    }

    /// Check whether this node has a given CSS class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a CSS class. No-op if already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Remove a CSS class. No-op if not present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Read an attribute, including the virtual `id` and `class` attributes.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" if !self.classes.is_empty() => Some(self.classes.join(" ")),
            "class" => None,
            _ => self.attributes.get(name).cloned(),
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Write an attribute. `class` replaces the whole class list.
    pub fn set_attribute(&mut self, name: &str, value: String) {
        match name {
            "id" => self.id = Some(value),
            "class" => {
                self.classes.clear();
                for class in value.split_whitespace() {
                    self.add_class(class);
                }
            }
            _ => {
                self.attributes.insert(name.to_owned(), value);
            }
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        match name {
            "id" => self.id = None,
            "class" => self.classes.clear(),
            _ => {
                self.attributes.shift_remove(name);
            }
        }
    }

    /// All attributes in markup order: `id`, `class`, then the rest.
    pub fn attribute_list(&self) -> Vec<(String, String)> {
        let mut list = Vec::with_capacity(self.attributes.len() + 2);
        if let Some(id) = &self.id {
            list.push(("id".to_owned(), id.clone()));
        }
        if !self.classes.is_empty() {
            list.push(("class".to_owned(), self.classes.join(" ")));
        }
        list.extend(self.attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        list
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles.get(name).map(String::as_str)
    }

    pub fn set_style(&mut self, name: &str, value: impl Into<String>) {
        self.styles.insert(name.to_owned(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults() {
        let data = NodeData::new("DIV");
        assert_eq!(data.tag, "div");
        assert!(data.id.is_none());
        assert!(data.classes.is_empty());
        assert!(data.attributes.is_empty());
        assert!(data.is_element());
    }

    #[test]
    fn text_node() {
        let data = NodeData::text("hello");
        assert_eq!(data.tag, TEXT_TAG);
        assert!(!data.is_element());
        assert_eq!(data.text.as_deref(), Some("hello"));
    }

    #[test]
    fn builder_with_class_dedup() {
        let data = NodeData::new("p").with_class("primary").with_class("primary");
        assert_eq!(data.classes, vec!["primary"]);
    }

    #[test]
    fn id_and_class_route_through_attributes() {
        let data = NodeData::new("i")
            .with_attr("id", "c1")
            .with_attr("class", "a  b a")
            .with_attr("data-ui", "type:Button");
        assert_eq!(data.id.as_deref(), Some("c1"));
        assert_eq!(data.classes, vec!["a", "b"]);
        assert_eq!(data.attribute("class").as_deref(), Some("a b"));
        assert_eq!(data.attribute("data-ui").as_deref(), Some("type:Button"));
        assert_eq!(
            data.attribute_list(),
            vec![
                ("id".to_owned(), "c1".to_owned()),
                ("class".to_owned(), "a b".to_owned()),
                ("data-ui".to_owned(), "type:Button".to_owned()),
            ]
        );
    }

    #[test]
    fn remove_attribute_keeps_order_of_rest() {
        let mut data = NodeData::new("div")
            .with_attr("a", "1")
            .with_attr("b", "2")
            .with_attr("c", "3");
        data.remove_attribute("b");
        let keys: Vec<_> = data.attributes.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert!(!data.has_attribute("b"));
    }

    #[test]
    fn class_add_remove_idempotent() {
        let mut data = NodeData::new("div");
        data.add_class("foo");
        data.add_class("foo");
        assert_eq!(data.classes.len(), 1);
        data.remove_class("foo");
        data.remove_class("foo");
        assert!(data.classes.is_empty());
    }

    #[test]
    fn styles() {
        let mut data = NodeData::new("div").with_style("width", "10px");
        assert_eq!(data.style("width"), Some("10px"));
        data.set_style("width", "20px");
        assert_eq!(data.style("width"), Some("20px"));
        assert_eq!(data.style("height"), None);
    }

    #[test]
    fn node_id_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<NodeId>();
    }
}
