//! Geometry solving for the whole element tree.
//!
//! [`Geometry::solve`] walks every root of the tree (the tab pages root and
//! each popup) and assigns an absolute [`Region`] to every element. All tab
//! pages and all popups are laid out, so switching tabs or opening a popup
//! never re-derives geometry.

use slotmap::SecondaryMap;
use tracing::trace;

use crate::dom::{
    ElementKind, ElementTree, NavLocation, NodeId, Orientation, PopupSpec, TabPagesSpec, TileSpec,
};
use crate::error::{Error, Result};
use crate::expr::SizeSpec;
use crate::geometry::{Region, Size};

use super::grid::{GridSpec, LayoutError};

/// Resolved geometry of every element.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    surface: Size,
    regions: SecondaryMap<NodeId, Region>,
}

impl Geometry {
    /// Solve every root of `tree` against a display of size `surface`.
    pub fn solve(tree: &ElementTree, surface: Size) -> Result<Geometry> {
        let mut geometry = Geometry {
            surface,
            regions: SecondaryMap::new(),
        };
        let screen = surface.to_region();
        if !surface.is_positive() {
            let element = tree
                .roots()
                .first()
                .map(|&root| tree.describe(root))
                .unwrap_or_else(|| "<display>".into());
            return Err(Error::layout(
                element,
                LayoutError::NonPositiveBox {
                    property: "surface",
                    width: surface.width,
                    height: surface.height,
                },
            ));
        }

        for &root in tree.roots() {
            let region = match tree.get(root).map(|data| &data.kind) {
                Some(ElementKind::PopupMenu(spec)) => {
                    popup_region(spec, surface).map_err(|e| Error::layout(tree.describe(root), e))?
                }
                _ => screen,
            };
            geometry.solve_subtree(tree, root, region)?;
        }
        trace!(nodes = geometry.regions.len(), ?surface, "geometry solved");
        Ok(geometry)
    }

    fn solve_subtree(&mut self, tree: &ElementTree, root: NodeId, region: Region) -> Result<()> {
        let mut stack = vec![(root, region)];
        while let Some((node, region)) = stack.pop() {
            self.regions.insert(node, region);
            let Some(data) = tree.get(node) else {
                continue;
            };
            let children = tree.children(node);
            if children.is_empty() {
                continue;
            }
            let boxes = child_regions(&data.kind, region, children.len(), self.surface)
                .map_err(|e| Error::layout(tree.describe(node), e))?;
            for (&child, child_region) in children.iter().zip(boxes).rev() {
                stack.push((child, child_region));
            }
        }
        Ok(())
    }

    /// The display size this geometry was solved for.
    pub fn surface(&self) -> Size {
        self.surface
    }

    /// The resolved box of `node`.
    pub fn region(&self, node: NodeId) -> Option<Region> {
        self.regions.get(node).copied()
    }

    /// Every resolved box.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Region)> + '_ {
        self.regions.iter().map(|(node, region)| (node, *region))
    }

    /// Number of elements with a resolved box.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no element has been laid out.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Boxes for the children of a container, in child order.
fn child_regions(
    kind: &ElementKind,
    region: Region,
    count: usize,
    surface: Size,
) -> std::result::Result<Vec<Region>, LayoutError> {
    match kind {
        ElementKind::GridLayout(spec) => Ok(spec.solve(region)?.cells),
        ElementKind::Tile(spec) => tile_grid(spec)
            .solve(region)
            .map(|g| g.cells)
            .map_err(|e| rename(e, "icon_size")),
        ElementKind::PopupMenu(spec) => {
            if spec.has_title && count > 1 {
                let grid = GridSpec::new(2, 1)
                    .with_row_sizes(vec![spec.title_height.clone(), SizeSpec::Auto]);
                grid.solve(region)
                    .map(|g| g.cells)
                    .map_err(|e| rename(e, "title_height"))
            } else {
                Ok(vec![region; count])
            }
        }
        ElementKind::TabPages(spec) => tab_regions(spec, region, count, surface),
        ElementKind::Button | ElementKind::Icon | ElementKind::Picture(_) => Ok(Vec::new()),
    }
}

/// The two-track grid holding a tile's icon and name.
fn tile_grid(spec: &TileSpec) -> GridSpec {
    match spec.orientation {
        Orientation::Vertical => {
            GridSpec::new(2, 1).with_row_sizes(vec![spec.icon_size.clone(), SizeSpec::Auto])
        }
        Orientation::Horizontal => {
            GridSpec::new(1, 2).with_column_sizes(vec![spec.icon_size.clone(), SizeSpec::Auto])
        }
    }
}

/// Report errors of a generated grid under the property that sized it.
fn rename(err: LayoutError, property: &'static str) -> LayoutError {
    match err {
        LayoutError::Expression { source, .. } => LayoutError::Expression {
            property: property.into(),
            source,
        },
        other => LayoutError::Within {
            property,
            source: Box::new(other),
        },
    }
}

/// Navigation bar (if any) followed by one shared box per page.
fn tab_regions(
    spec: &TabPagesSpec,
    region: Region,
    count: usize,
    surface: Size,
) -> std::result::Result<Vec<Region>, LayoutError> {
    if !spec.has_navigation {
        return Ok(vec![region; count]);
    }
    let thickness = spec
        .navigation_size
        .pixels(surface)
        .map_err(|source| LayoutError::Expression {
            property: "navigation_size".into(),
            source,
        })?
        .unwrap_or_else(|| default_navigation_size(spec.location, surface));
    let available = if spec.location.is_horizontal() {
        region.height
    } else {
        region.width
    };
    if thickness <= 0 {
        return Err(LayoutError::NonPositiveBox {
            property: "navigation_size",
            width: if spec.location.is_horizontal() { region.width } else { thickness },
            height: if spec.location.is_horizontal() { thickness } else { region.height },
        });
    }
    if thickness >= available {
        return Err(LayoutError::Oversized {
            property: "navigation_size",
            required: thickness,
            available,
        });
    }

    let (navigation, pages) = match spec.location {
        NavLocation::Top => region.split_horizontal(thickness),
        NavLocation::Bottom => {
            let (pages, nav) = region.split_horizontal(region.height - thickness);
            (nav, pages)
        }
        NavLocation::Left => region.split_vertical(thickness),
        NavLocation::Right => {
            let (pages, nav) = region.split_vertical(region.width - thickness);
            (nav, pages)
        }
    };
    let mut regions = vec![navigation];
    regions.extend(std::iter::repeat(pages).take(count.saturating_sub(1)));
    Ok(regions)
}

/// Bar thickness when none is configured: a tenth of the height for a
/// horizontal bar, fifteen percent of the width for a vertical one.
pub fn default_navigation_size(location: NavLocation, surface: Size) -> i32 {
    if location.is_horizontal() {
        (surface.height as f64 * 0.1).round() as i32
    } else {
        (surface.width as f64 * 0.15).round() as i32
    }
}

/// Box of a popup on a display of size `surface`.
fn popup_region(spec: &PopupSpec, surface: Size) -> std::result::Result<Region, LayoutError> {
    let axis = |value: &SizeSpec, property: &'static str, available: i32| {
        let px = value
            .pixels(surface)
            .map_err(|source| LayoutError::Expression {
                property: property.into(),
                source,
            })?
            .unwrap_or(available);
        if px > available {
            return Err(LayoutError::Oversized {
                property,
                required: px,
                available,
            });
        }
        Ok(px)
    };
    let width = axis(&spec.width, "width", surface.width)?;
    let height = axis(&spec.height, "height", surface.height)?;
    if width <= 0 || height <= 0 {
        return Err(LayoutError::NonPositiveBox {
            property: if width <= 0 { "width" } else { "height" },
            width,
            height,
        });
    }
    Ok(surface
        .to_region()
        .place(Size::new(width, height), spec.horizontal, spec.vertical))
}
