//! Host element tree for the Tracery runtime.
//!
//! This crate provides the arena-based element tree the state tracker walks
//! when it resolves ancestor and selector targets, and mutates when it toggles
//! synthesized data attributes.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all
//! relationships, providing O(1) access and traversal without borrow checker
//! issues. Unlike a full DOM it stores elements only: text and comments are
//! irrelevant to state tracking and selector targets.

use std::collections::{HashMap, HashSet};

pub mod selector;

pub use selector::{CompoundSelector, parse_compound_selector};

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// Class name that marks an element as a builder "block".
///
/// Ancestor levels in parent-relative state targets count only elements
/// carrying this class, so intermediate wrapper elements never shift the
/// level an author declared.
pub const BLOCK_MARKER_CLASS: &str = "tracery-block";

/// A type-safe index into the element tree.
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing
/// issues; the root document node is always index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// A node in the element tree.
///
/// Stores indices for parent/child relationships, enabling O(1) traversal
/// in either direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// The node's payload: the document root or an element.
    pub node_type: NodeType,
    /// The node's parent, or `None` for the root.
    pub parent: Option<NodeId>,
    /// The node's children, in document order.
    pub children: Vec<NodeId>,
}

/// The kind of node stored in the tree.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// The document root.
    Document,
    /// An element with a tag name and attributes.
    Element(ElementData),
}

/// Element-specific data: local name plus attribute list.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// The element's local name (`div`, `section`, ...).
    pub tag_name: String,
    /// The element's attribute list.
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data with a tag name and no attributes.
    #[must_use]
    pub fn new(tag_name: &str) -> Self {
        ElementData {
            tag_name: tag_name.to_string(),
            attrs: AttributesMap::new(),
        }
    }

    /// Returns the element's id attribute value if present.
    pub fn id(&self) -> Option<&String> {
        self.attrs.get("id")
    }

    /// Returns the set of class names from the class attribute.
    ///
    /// The class attribute is a set of space-separated tokens; an absent
    /// attribute yields the empty set.
    pub fn classes(&self) -> HashSet<&str> {
        match self.attrs.get("class") {
            Some(classlist) => classlist.split_ascii_whitespace().collect(),
            None => HashSet::new(),
        }
    }

    /// Check whether the element carries the given class name.
    #[must_use]
    pub fn has_class(&self, name: &str) -> bool {
        self.classes().contains(name)
    }
}

/// Arena-based element tree with O(1) node access and traversal.
///
/// All nodes live in a contiguous vector indexed by [`NodeId`]. This gives:
/// - O(1) access to any node by id
/// - O(1) parent traversal
/// - No borrowing issues (indices instead of references)
#[derive(Debug, Clone)]
pub struct DocTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
}

impl DocTree {
    /// Create a new tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        let document = Node {
            node_type: NodeType::Document,
            parent: None,
            children: Vec::new(),
        };
        DocTree {
            nodes: vec![document],
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get the number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new element node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, data: ElementData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type: NodeType::Element(data),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`, updating relationships.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            NodeType::Document => None,
        })
    }

    /// Iterate over all ancestors of a node, from parent to root.
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Set an attribute on an element node.
    ///
    /// Non-element nodes are left untouched.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            if let NodeType::Element(data) = &mut node.node_type {
                let _ = data.attrs.insert(name.to_string(), value.to_string());
            }
        }
    }

    /// Remove an attribute from an element node (no-op if absent).
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            if let NodeType::Element(data) = &mut node.node_type {
                let _ = data.attrs.remove(name);
            }
        }
    }

    /// Get an attribute value from an element node.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.as_element(id)
            .and_then(|data| data.attrs.get(name))
            .map(String::as_str)
    }

    /// Walk up from `id` counting only elements carrying
    /// [`BLOCK_MARKER_CLASS`], returning the ancestor at the given level.
    ///
    /// Level 1 is the nearest block ancestor. Returns `None` when fewer than
    /// `level` block ancestors exist — a normal condition for elements
    /// mounted outside any block, not an error.
    #[must_use]
    pub fn block_ancestor(&self, id: NodeId, level: u32) -> Option<NodeId> {
        if level == 0 {
            return None;
        }
        let mut remaining = level;
        for ancestor in self.ancestors(id) {
            if self
                .as_element(ancestor)
                .is_some_and(|data| data.has_class(BLOCK_MARKER_CLASS))
            {
                remaining -= 1;
                if remaining == 0 {
                    return Some(ancestor);
                }
            }
        }
        None
    }

    /// Find the first descendant of `from` (depth-first, document order)
    /// matching a compound selector.
    ///
    /// Returns `None` for an unparsable selector or when nothing matches.
    #[must_use]
    pub fn query_descendant(&self, from: NodeId, selector_text: &str) -> Option<NodeId> {
        let selector = parse_compound_selector(selector_text)?;
        self.query_descendant_recursive(from, &selector)
    }

    /// Depth-first search for the first element matching `selector`.
    fn query_descendant_recursive(&self, id: NodeId, selector: &CompoundSelector) -> Option<NodeId> {
        for &child in self.children(id) {
            if let Some(data) = self.as_element(child) {
                if selector.matches(data) {
                    return Some(child);
                }
            }
            if let Some(found) = self.query_descendant_recursive(child, selector) {
                return Some(found);
            }
        }
        None
    }
}

impl Default for DocTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DocTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
