//! Text dumps of resolved geometry.
//!
//! One line per element, indented two spaces per tree level:
//! `Type#id x,y WxH`. Scoped parts print as `Type.part`, anonymous elements
//! as the bare type name.

use crate::dashboard::Resolved;
use crate::dom::{ElementTree, NodeId};
use crate::layout::Geometry;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Dump the subtree under `root` with the boxes in `geometry`.
pub fn geometry_to_string(tree: &ElementTree, geometry: &Geometry, root: NodeId) -> String {
    let base = tree.ancestors(root).len();
    let lines: Vec<String> = tree
        .walk_depth_first(root)
        .into_iter()
        .map(|node| line(tree, geometry, node, base))
        .collect();
    lines.join("\n")
}

/// Dump every element the snapshot currently shows.
pub fn visible_to_string(tree: &ElementTree, resolved: &Resolved) -> String {
    let lines: Vec<String> = resolved
        .visible()
        .iter()
        .map(|&node| line(tree, resolved.geometry(), node, 0))
        .collect();
    lines.join("\n")
}

fn label(tree: &ElementTree, node: NodeId) -> String {
    let Some(data) = tree.get(node) else {
        return "<removed>".into();
    };
    match (&data.id, data.scoped) {
        (Some(id), false) => format!("{}#{id}", data.kind.name()),
        (Some(part), true) => format!("{}.{part}", data.kind.name()),
        (None, _) => data.kind.name().to_string(),
    }
}

fn line(tree: &ElementTree, geometry: &Geometry, node: NodeId, base: usize) -> String {
    let depth = tree.ancestors(node).len().saturating_sub(base);
    let indent = "  ".repeat(depth);
    match geometry.region(node) {
        Some(r) => {
            let name = label(tree, node);
            format!("{indent}{name} {},{} {}x{}", r.x, r.y, r.width, r.height)
        }
        None => format!("{indent}{} unresolved", label(tree, node)),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementData, ElementKind};
    use crate::geometry::Size;
    use crate::layout::GridSpec;

    #[test]
    fn dumps_grid_cells() {
        let mut tree = ElementTree::new();
        let root = tree.insert_root(
            ElementData::new(ElementKind::GridLayout(GridSpec::new(1, 2))).with_id("home"),
        );
        tree.insert_child(root, ElementData::new(ElementKind::Button).with_id("a"));
        tree.insert_child(root, ElementData::new(ElementKind::Icon));
        let geometry = Geometry::solve(&tree, Size::new(100, 50)).unwrap();

        insta::assert_snapshot!(geometry_to_string(&tree, &geometry, root), @r"
        GridLayout#home 0,0 100x50
          Button#a 0,0 50x50
          Icon 50,0 50x50
        ");
    }

    #[test]
    fn scoped_parts_use_dot() {
        let mut tree = ElementTree::new();
        let root = tree.insert_root(ElementData::new(ElementKind::Button).with_part("title"));
        assert_eq!(label(&tree, root), "Button.title");
    }

    #[test]
    fn subtree_dump_is_relative() {
        let mut tree = ElementTree::new();
        let root = tree.insert_root(ElementData::new(ElementKind::GridLayout(GridSpec::new(1, 1))));
        let child = tree.insert_child(root, ElementData::new(ElementKind::Icon).with_id("leaf"));
        let geometry = Geometry::solve(&tree, Size::new(10, 10)).unwrap();
        assert_eq!(geometry_to_string(&tree, &geometry, child), "Icon#leaf 0,0 10x10");
    }
}
