//! Tree operations: insert, lookup, walk, describe.

use std::collections::HashMap;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{ElementData, NodeId};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The element tree, backed by a slotmap arena.
///
/// All elements live in a single `SlotMap`. Parent/child relationships are
/// stored in secondary maps, so a resolution pass is a walk over flat arrays.
/// The tree is built once at load; nothing is ever removed from it.
#[derive(Debug, Clone, Default)]
pub struct ElementTree {
    nodes: SlotMap<NodeId, ElementData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    roots: Vec<NodeId>,
    ids: HashMap<String, NodeId>,
}

impl ElementTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a root node (the tab pages root, or a popup).
    pub fn insert_root(&mut self, data: ElementData) -> NodeId {
        let id = self.insert_detached(data);
        self.roots.push(id);
        id
    }

    /// Insert a node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: NodeId, data: ElementData) -> NodeId {
        debug_assert!(
            self.nodes.contains_key(parent),
            "parent node does not exist"
        );
        let id = self.insert_detached(data);
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        id
    }

    fn insert_detached(&mut self, data: ElementData) -> NodeId {
        let global = data.global_id().map(str::to_owned);
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if let Some(name) = global {
            self.ids.entry(name).or_insert(id);
        }
        id
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no
    /// children or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Walk from `id` up to its root, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent and ends at the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&ElementData> {
        self.nodes.get(id)
    }

    /// Find an element by its global identifier.
    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Root nodes in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the tree contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Iterate over every node in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ElementData)> {
        self.nodes.iter()
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Human-readable name for error messages.
    ///
    /// Elements with a global identifier are named `Type#id`. Anonymous
    /// elements are named by their position below the nearest identified
    /// ancestor, e.g. `GridLayout#home > Button[2]`.
    pub fn describe(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = id;
        loop {
            let Some(data) = self.get(current) else {
                segments.push("<detached>".to_string());
                break;
            };
            if let Some(global) = data.global_id() {
                segments.push(format!("{}#{global}", data.kind.name()));
                break;
            }
            let segment = match (&data.id, self.parent(current)) {
                (Some(part), _) => part.clone(),
                (None, Some(parent)) => {
                    let index = self
                        .children(parent)
                        .iter()
                        .position(|&c| c == current)
                        .unwrap_or(0);
                    format!("{}[{index}]", data.kind.name())
                }
                (None, None) => {
                    let index = self.roots.iter().position(|&r| r == current).unwrap_or(0);
                    format!("{}[root {index}]", data.kind.name())
                }
            };
            segments.push(segment);
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        segments.reverse();
        segments.join(" > ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::kind::ElementKind;
    use crate::layout::grid::GridSpec;

    fn grid() -> ElementKind {
        ElementKind::GridLayout(GridSpec::new(1, 2))
    }

    /// Build a small test tree:
    /// ```text
    ///       root (#home)
    ///      /    \
    ///    a        b (#clock)
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (ElementTree, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = ElementTree::new();
        let root = tree.insert_root(ElementData::new(grid()).with_id("home"));
        let a = tree.insert_child(root, ElementData::new(grid()));
        let b = tree.insert_child(root, ElementData::new(ElementKind::Button).with_id("clock"));
        let c = tree.insert_child(a, ElementData::new(ElementKind::Icon));
        let d = tree.insert_child(a, ElementData::new(ElementKind::Button).with_part("name"));
        (tree, root, a, b, c, d)
    }

    #[test]
    fn insert_root_registers_root() {
        let (tree, root, ..) = build_tree();
        assert_eq!(tree.roots(), &[root]);
    }

    #[test]
    fn parent_relationship() {
        let (tree, root, a, _b, c, _d) = build_tree();
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree.parent(root), None);
    }

    #[test]
    fn children_list() {
        let (tree, root, a, b, c, d) = build_tree();
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.children(a), &[c, d]);
        assert!(tree.children(c).is_empty());
    }

    #[test]
    fn ancestors() {
        let (tree, root, a, _b, c, _d) = build_tree();
        assert_eq!(tree.ancestors(c), vec![a, root]);
        assert!(tree.ancestors(root).is_empty());
    }

    #[test]
    fn lookup_by_global_id_only() {
        let (tree, root, _a, b, _c, _d) = build_tree();
        assert_eq!(tree.lookup("home"), Some(root));
        assert_eq!(tree.lookup("clock"), Some(b));
        assert_eq!(tree.lookup("name"), None);
    }

    #[test]
    fn len_and_contains() {
        let (tree, root, ..) = build_tree();
        assert_eq!(tree.len(), 5);
        assert!(!tree.is_empty());
        assert!(tree.contains(root));
        assert!(ElementTree::new().is_empty());
    }

    #[test]
    fn walk_depth_first() {
        let (tree, root, a, b, c, d) = build_tree();
        assert_eq!(tree.walk_depth_first(root), vec![root, a, c, d, b]);
        assert_eq!(tree.walk_depth_first(a), vec![a, c, d]);
    }

    #[test]
    fn describe_names() {
        let (tree, root, a, b, c, d) = build_tree();
        assert_eq!(tree.describe(root), "GridLayout#home");
        assert_eq!(tree.describe(b), "Button#clock");
        assert_eq!(tree.describe(a), "GridLayout#home > GridLayout[0]");
        assert_eq!(tree.describe(c), "GridLayout#home > GridLayout[0] > Icon[0]");
        assert_eq!(tree.describe(d), "GridLayout#home > GridLayout[0] > name");
    }

    #[test]
    fn describe_anonymous_root() {
        let mut tree = ElementTree::new();
        let root = tree.insert_root(ElementData::new(grid()));
        assert_eq!(tree.describe(root), "GridLayout[root 0]");
    }
}
