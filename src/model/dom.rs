//! Arena-backed markup tree.
//!
//! Nodes live in a single `Vec` owned by the tree; parents hold child ids and
//! every node keeps a non-owning parent id for upward traversal. Removing a
//! node only detaches it from its parent, so ids stay valid for the lifetime
//! of the tree.

/// Index of a node inside an [`HtmlTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element tag, ordered class list and remaining attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag: String,

    /// Class labels in source order
    pub classes: Vec<String>,

    /// Attributes other than `class`, in source order
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    /// Create an element with no classes or attributes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attrs: Vec::new(),
        }
    }

    /// Set the class list from a whitespace-separated `class` value.
    pub fn with_class(mut self, class: &str) -> Self {
        self.classes = class.split_whitespace().map(str::to_string).collect();
        self
    }

    /// Add an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Check the tag name.
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Check whether the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Class list joined with single spaces.
    pub fn class_key(&self) -> String {
        self.classes.join(" ")
    }

    /// Get an attribute value (case-insensitive name).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Inline style declaration, or an empty string.
    pub fn style(&self) -> &str {
        self.attr("style").unwrap_or("")
    }

    /// Replace or insert an attribute.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attrs
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute; returns the old value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self
            .attrs
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(pos).1)
    }
}

/// Payload of a tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// Synthetic document (or fragment) root
    Root,
    /// Element node
    Element(ElementData),
    /// Text node (entities already decoded)
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A markup tree stored as an arena of nodes.
#[derive(Debug, Clone)]
pub struct HtmlTree {
    nodes: Vec<Node>,
}

impl HtmlTree {
    /// Create a tree containing only a root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append an element as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeId, element: ElementData) -> NodeId {
        self.push(parent, NodeData::Element(element))
    }

    /// Append a text node as the last child of `parent`.
    ///
    /// Adjacent text is merged into the previous text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        if let Some(&last) = self.nodes[parent.0].children.last() {
            if let NodeData::Text(existing) = &mut self.nodes[last.0].data {
                existing.push_str(text);
                return last;
            }
        }
        self.push(parent, NodeData::Text(text.to_string()))
    }

    /// Node payload.
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Element payload, if `id` is an element.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Mutable element payload, if `id` is an element.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Text payload, if `id` is a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Mutable text payload, if `id` is a text node.
    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.nodes[id.0].data {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Parent of a node (`None` for the root or a detached node).
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children in document order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| self.element(c).is_some())
    }

    /// Whether an element has any element children.
    pub fn has_element_children(&self, id: NodeId) -> bool {
        self.element_children(id).next().is_some()
    }

    /// Siblings that come after `id`, in document order.
    pub fn following_siblings(&self, id: NodeId) -> &[NodeId] {
        match self.parent(id) {
            Some(parent) => {
                let siblings = self.children(parent);
                match siblings.iter().position(|&s| s == id) {
                    Some(pos) => &siblings[pos + 1..],
                    None => &[],
                }
            }
            None => &[],
        }
    }

    /// Element siblings that come after `id`.
    pub fn following_element_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.following_siblings(id)
            .iter()
            .copied()
            .filter(move |&s| self.element(s).is_some())
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// All descendants of `id` in document (pre-)order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Element descendants of `id` in document order.
    pub fn element_descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(id).filter(move |&d| self.element(d).is_some())
    }

    /// First element in the tree with the given tag.
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        self.element_descendants(self.root())
            .find(|&id| self.element(id).is_some_and(|el| el.is(tag)))
    }

    /// The `<body>` element, or the root when the markup had none.
    pub fn body(&self) -> NodeId {
        self.find_element("body").unwrap_or_else(|| self.root())
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(t) = self.text(id) {
            return t.to_string();
        }
        self.descendants(id)
            .filter_map(|d| self.text(d))
            .collect()
    }

    /// Descendant text nodes of `id`, in document order.
    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .filter(|&d| self.text(d).is_some())
            .collect()
    }

    /// Detach a node (and its subtree) from its parent.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Replace a node by its children.
    pub fn unwrap(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        let siblings = &mut self.nodes[parent.0].children;
        if let Some(pos) = siblings.iter().position(|&c| c == id) {
            siblings.splice(pos..=pos, children);
        }
        self.nodes[id.0].parent = None;
    }

    /// Replace a node (and its subtree) by a text node.
    pub fn replace_with_text(&mut self, id: NodeId, text: &str) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let new_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data: NodeData::Text(text.to_string()),
            parent: Some(parent),
            children: Vec::new(),
        });
        let siblings = &mut self.nodes[parent.0].children;
        if let Some(pos) = siblings.iter().position(|&c| c == id) {
            siblings[pos] = new_id;
        }
        self.nodes[id.0].parent = None;
        Some(new_id)
    }

    /// Whether a node is still reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root() || self.ancestors(id).any(|a| a == self.root())
    }

    /// Number of arena slots (attached or not).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the root has no children.
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }
}

impl Default for HtmlTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the ancestors of a node.
pub struct Ancestors<'a> {
    tree: &'a HtmlTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct Descendants<'a> {
    tree: &'a HtmlTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (HtmlTree, NodeId, NodeId, NodeId) {
        let mut tree = HtmlTree::new();
        let root = tree.root();
        let page = tree.append_element(root, ElementData::new("div").with_class("hpa"));
        let a = tree.append_element(page, ElementData::new("div").with_class("hls ps0"));
        tree.append_text(a, "1) ");
        let b = tree.append_element(page, ElementData::new("span"));
        tree.append_text(b, "text");
        (tree, page, a, b)
    }

    #[test]
    fn test_descendants_order() {
        let (tree, page, a, b) = sample();
        let ids: Vec<_> = tree.descendants(tree.root()).collect();
        assert_eq!(ids[0], page);
        assert_eq!(ids[1], a);
        assert_eq!(ids[3], b);
        assert_eq!(tree.text_content(page), "1) text");
    }

    #[test]
    fn test_ancestors_and_siblings() {
        let (tree, page, a, b) = sample();
        let chain: Vec<_> = tree.ancestors(a).collect();
        assert_eq!(chain, vec![page, tree.root()]);
        assert_eq!(tree.following_siblings(a), &[b]);
        assert!(tree.following_siblings(b).is_empty());
    }

    #[test]
    fn test_unwrap_keeps_order() {
        let (mut tree, page, a, b) = sample();
        tree.unwrap(b);
        assert_eq!(tree.children(page).len(), 2);
        assert_eq!(tree.text_content(page), "1) text");
        assert!(!tree.is_attached(b));
        assert!(tree.is_attached(a));
    }

    #[test]
    fn test_detach_and_replace() {
        let (mut tree, page, a, b) = sample();
        tree.detach(a);
        assert_eq!(tree.children(page), &[b]);
        let t = tree.replace_with_text(b, "[image]").unwrap();
        assert_eq!(tree.children(page), &[t]);
        assert_eq!(tree.text_content(page), "[image]");
    }

    #[test]
    fn test_element_attrs() {
        let mut el = ElementData::new("DIV")
            .with_class(" hls  ps4 ")
            .with_attr("Style", "top:1mm");
        assert!(el.is("div"));
        assert_eq!(el.class_key(), "hls ps4");
        assert_eq!(el.style(), "top:1mm");
        el.set_attr("style", "top:2mm");
        assert_eq!(el.remove_attr("STYLE").as_deref(), Some("top:2mm"));
        assert_eq!(el.style(), "");
    }

    #[test]
    fn test_body_falls_back_to_root() {
        let tree = HtmlTree::new();
        assert_eq!(tree.body(), tree.root());
    }
}
