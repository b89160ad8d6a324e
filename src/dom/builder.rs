//! Incremental construction of one `DomFragment`. Shared by the HTML parser
//! (driven by an `html5ever::TreeSink`) and the JSX extractor (driven by
//! direct AST recursion), so both end up with identically-shaped fragments.

use std::collections::HashMap;
use std::sync::Arc;

use super::{AttributeValue, DomFragment, DomNode, DomNodeData, ElementData, ElementMeta, NodeId};
use crate::location::SourceLocation;

pub struct DomFragmentBuilder {
    nodes: Vec<DomNode>,
    root: NodeId,
    ids: HashMap<String, NodeId>,
    classes: HashMap<String, Vec<NodeId>>,
    duplicate_ids: Vec<(String, NodeId, NodeId)>,
    source_file: Arc<str>,
}

impl DomFragmentBuilder {
    pub fn new(source_file: Arc<str>) -> Self {
        let root = DomNode {
            data: DomNodeData::FragmentRoot,
            parent: None,
            children: Vec::new(),
            location: SourceLocation::unknown(source_file.clone()),
        };
        DomFragmentBuilder {
            nodes: vec![root],
            root: NodeId(0),
            ids: HashMap::new(),
            classes: HashMap::new(),
            duplicate_ids: Vec::new(),
            source_file,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn push(&mut self, parent: NodeId, data: DomNodeData, location: SourceLocation) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(DomNode {
            data,
            parent: Some(parent),
            children: Vec::new(),
            location,
        });
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    pub fn push_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        location: SourceLocation,
    ) -> NodeId {
        self.push_element_with_meta(parent, tag, ElementMeta::default(), location)
    }

    pub fn push_element_with_meta(
        &mut self,
        parent: NodeId,
        tag: &str,
        meta: ElementMeta,
        location: SourceLocation,
    ) -> NodeId {
        let lowered = if meta.is_component {
            tag.to_string()
        } else {
            tag.to_ascii_lowercase()
        };
        let data = ElementData {
            tag: lowered,
            original_tag: tag.to_string(),
            attributes: HashMap::new(),
            meta,
        };
        self.push(parent, DomNodeData::Element(data), location)
    }

    pub fn push_text(&mut self, parent: NodeId, text: &str, location: SourceLocation) -> NodeId {
        self.push(parent, DomNodeData::Text(text.to_string()), location)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: AttributeValue) {
        let name = name.to_ascii_lowercase();
        if let DomNodeData::Element(el) = &mut self.nodes[node.0 as usize].data {
            if name == "id" {
                if let AttributeValue::Static(ref id_value) = value {
                    match self.ids.get(id_value) {
                        Some(&first) if first != node => {
                            self.duplicate_ids.push((id_value.clone(), first, node));
                        }
                        _ => {
                            self.ids.insert(id_value.clone(), node);
                        }
                    }
                }
            }
            if name == "class" {
                if let AttributeValue::Static(ref class_value) = value {
                    for class in class_value.split_ascii_whitespace() {
                        self.classes.entry(class.to_string()).or_default().push(node);
                    }
                }
            }
            el.attributes.insert(name, value);
        }
    }

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0 as usize].parent
    }

    /// Moves `node` from its current parent to `new_parent`. Used when the
    /// HTML tree-construction algorithm creates a node speculatively (under
    /// the fragment root) and only later learns its real parent.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        if let Some(old_parent) = self.nodes[node.0 as usize].parent {
            self.nodes[old_parent.0 as usize]
                .children
                .retain(|&c| c != node);
        }
        self.nodes[new_parent.0 as usize].children.push(node);
        self.nodes[node.0 as usize].parent = Some(new_parent);
    }

    pub fn finish(self) -> DomFragment {
        DomFragment {
            nodes: self.nodes,
            root: self.root,
            ids: self.ids,
            classes: self.classes,
            duplicate_ids: self.duplicate_ids,
            source_file: self.source_file,
        }
    }
}
