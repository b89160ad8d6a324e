//! The DOM arena: owner-owned node vectors addressed by integer `NodeId`,
//! per the design note in the crate root docs about avoiding ownership
//! cycles in parent/child/sibling graphs. A `DomFragment` is one arena plus
//! the per-fragment id and class indices built while the fragment is
//! constructed.

pub mod builder;
pub mod html;
pub mod jsx;

use std::collections::HashMap;
use std::sync::Arc;

use crate::location::SourceLocation;

/// Index into a `DomFragment`'s node arena. Never valid across fragments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Whether an attribute's value was statically known or is an unresolved
/// expression (JSX `attr={expr}`). Rules may inspect `Dynamic` attributes
/// to see that they are present and reactive, but the core never attempts
/// to evaluate the expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttributeValue {
    Static(String),
    Dynamic { expression: String },
}

impl AttributeValue {
    /// Returns the static string value, or `None` for a dynamic attribute.
    /// Most rules that inspect a specific attribute value (e.g. `role`,
    /// `aria-hidden`) only act when the value is statically known.
    pub fn as_static(&self) -> Option<&str> {
        match self {
            AttributeValue::Static(s) => Some(s),
            AttributeValue::Dynamic { .. } => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Static(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Static(s)
    }
}

/// Framework-specific metadata recorded on an `element` node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementMeta {
    /// True when the tag name began with an uppercase letter in JSX source
    /// (a component reference, not a DOM element). Rules that care only
    /// about DOM semantics should skip nodes where this is true.
    pub is_component: bool,
}

#[derive(Clone, Debug)]
pub struct ElementData {
    /// Lowercased tag name (components retain their original casing in
    /// `original_tag` since lowercasing a component name would be wrong).
    pub tag: String,
    pub original_tag: String,
    pub attributes: HashMap<String, AttributeValue>,
    pub meta: ElementMeta,
}

impl ElementData {
    pub fn attr(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(AttributeValue::as_static)
    }

    /// The whitespace-tokenized contents of the `class` attribute, or an
    /// empty vector when absent or dynamic.
    pub fn classes(&self) -> Vec<&str> {
        self.attr_str("class")
            .map(|s| s.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn id(&self) -> Option<&str> {
        self.attr_str("id")
    }
}

#[derive(Clone, Debug)]
pub enum DomNodeData {
    Element(ElementData),
    Text(String),
    FragmentRoot,
}

#[derive(Clone, Debug)]
pub struct DomNode {
    pub data: DomNodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub location: SourceLocation,
}

impl DomNode {
    pub fn is_element(&self) -> bool {
        matches!(self.data, DomNodeData::Element(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            DomNodeData::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// One DOM tree plus the indices built while scanning it. A plain HTML file
/// yields exactly one fragment; a JSX file yields one fragment per top-level
/// returned JSX tree.
#[derive(Clone, Debug)]
pub struct DomFragment {
    nodes: Vec<DomNode>,
    root: NodeId,
    ids: HashMap<String, NodeId>,
    classes: HashMap<String, Vec<NodeId>>,
    /// `(id, first_node, duplicate_node)` for every id attribute that
    /// repeats an id already claimed earlier in this same fragment. The
    /// index above only ever keeps the first node per id, so these would
    /// otherwise be invisible to a caller merging several fragments' ids.
    duplicate_ids: Vec<(String, NodeId, NodeId)>,
    pub source_file: Arc<str>,
}

impl DomFragment {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &DomNode {
        &self.nodes[id.0 as usize]
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.node(id).as_element()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    pub fn nodes_by_class(&self, class: &str) -> &[NodeId] {
        self.classes.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All ids defined in this fragment, for merging into the document-wide
    /// index (first occurrence across fragments wins).
    pub fn ids(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.ids.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// `(id, first_node, duplicate_node)` triples for ids that repeat
    /// within this fragment alone, before any cross-fragment merging.
    pub fn duplicate_ids(&self) -> impl Iterator<Item = (&str, NodeId, NodeId)> {
        self.duplicate_ids
            .iter()
            .map(|(id, first, dup)| (id.as_str(), *first, *dup))
    }

    /// Depth-first, document-order iteration over every element in the
    /// fragment, starting at the root.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root];
        let mut order = Vec::new();
        // Reverse-push children so we pop them in document order.
        while let Some(id) = stack.pop() {
            if self.node(id).is_element() {
                order.push(id);
            }
            for &child in self.node(id).children.iter().rev() {
                stack.push(child);
            }
        }
        order.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::builder::DomFragmentBuilder;
    use std::sync::Arc;

    fn loc(line: u32) -> crate::location::SourceLocation {
        crate::location::SourceLocation::new(Arc::from("test.html"), line, 0)
    }

    #[test]
    fn id_and_class_indices_are_populated() {
        let mut b = DomFragmentBuilder::new(Arc::from("test.html"));
        let root = b.root();
        let button = b.push_element(root, "button", loc(1));
        b.set_attr(button, "id", "submit".into());
        b.set_attr(button, "class", "btn primary".into());
        let frag = b.finish();

        assert_eq!(frag.node_by_id("submit"), Some(button));
        assert_eq!(frag.nodes_by_class("btn"), &[button]);
        assert_eq!(frag.nodes_by_class("primary"), &[button]);
        assert!(frag.nodes_by_class("missing").is_empty());
    }

    #[test]
    fn elements_are_visited_in_document_order() {
        let mut b = DomFragmentBuilder::new(Arc::from("test.html"));
        let root = b.root();
        let first = b.push_element(root, "div", loc(1));
        let second = b.push_element(root, "span", loc(2));
        let frag = b.finish();

        let visited: Vec<_> = frag.elements().collect();
        assert_eq!(visited, vec![first, second]);
    }
}
