//! Dashboard: configuration state, controllers, and resolution passes.
//!
//! [`Dashboard`] owns the element tree, the tab and popup controllers and the
//! variant state. Every event runs one resolution pass that either completes
//! and publishes a new [`Resolved`] snapshot, or fails and leaves the previous
//! snapshot and all state untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use slotmap::SecondaryMap;
use tracing::{debug, info};

use crate::config::{self, LoadedConfig};
use crate::dom::{ElementKind, ElementTree, Fit, NodeId};
use crate::error::{Error, Result};
use crate::geometry::{Region, Size};
use crate::layout::{fit_content, ContentBox, Geometry};
use crate::navigation::{DismissTrigger, PopupManager, TabChange, TabController};
use crate::style::{Cascade, ResolvedStyle, StyleMap, StyleProps, TokenTable, VariantState};
use crate::surface::{AssetInfo, AssetResolver, Surface};

/// Where each picture and icon asset is drawn.
pub type ContentMap = SecondaryMap<NodeId, ContentBox>;

// ---------------------------------------------------------------------------
// Resolved
// ---------------------------------------------------------------------------

/// An immutable snapshot of one completed resolution pass.
///
/// Geometry and styles cover every element, including hidden tab pages and
/// closed popups; [`Resolved::visible`] lists what is currently shown.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    generation: u64,
    geometry: Arc<Geometry>,
    styles: Arc<StyleMap>,
    content: Arc<ContentMap>,
    current_tab: usize,
    page: Option<NodeId>,
    active_popup: Option<String>,
    visible: Vec<NodeId>,
}

impl Resolved {
    /// Number of passes published before this one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    /// The display size of the pass.
    pub fn surface(&self) -> Size {
        self.geometry.surface()
    }

    pub fn region(&self, node: NodeId) -> Option<Region> {
        self.geometry.region(node)
    }

    pub fn style(&self, node: NodeId) -> Option<&ResolvedStyle> {
        self.styles.get(node)
    }

    /// The scaled asset inside a picture or icon element.
    pub fn content(&self, node: NodeId) -> Option<ContentBox> {
        self.content.get(node).copied()
    }

    pub fn current_tab(&self) -> usize {
        self.current_tab
    }

    /// Root element of the current tab's page.
    pub fn page(&self) -> Option<NodeId> {
        self.page
    }

    pub fn active_popup(&self) -> Option<&str> {
        self.active_popup.as_deref()
    }

    /// Shown elements, depth-first: the tab root, the navigation bar, the
    /// current page, then the active popup.
    pub fn visible(&self) -> &[NodeId] {
        &self.visible
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.visible.contains(&node)
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// A loaded dashboard drawn on a [`Surface`].
pub struct Dashboard<S> {
    surface: S,
    tree: ElementTree,
    tokens: TokenTable,
    defaults: StyleProps,
    tabs: TabController,
    popups: PopupManager,
    assets: BTreeMap<String, AssetInfo>,
    variants: VariantState,
    resolved: Arc<Resolved>,
}

impl<S: Surface> Dashboard<S> {
    /// Load a YAML configuration and run the first resolution pass.
    pub fn load(source: &str, surface: S, assets: &dyn AssetResolver) -> Result<Self> {
        let config = config::load(source, assets)?;
        Self::from_config(config, surface)
    }

    /// Build a dashboard from an already loaded configuration.
    pub fn from_config(config: LoadedConfig, surface: S) -> Result<Self> {
        let mut variants = VariantState::from_tree(&config.tree);
        let current = config.tabs.current();
        for (index, tab) in config.tabs.tabs().iter().enumerate() {
            if let Some(tile) = tab.tile {
                variants.set(tile, index == current);
            }
        }

        let mut dashboard = Dashboard {
            surface,
            tree: config.tree,
            tokens: config.tokens,
            defaults: config.defaults,
            tabs: config.tabs,
            popups: config.popups,
            assets: config.assets,
            variants,
            resolved: Arc::new(Resolved::default()),
        };
        let size = dashboard.surface.size();
        dashboard.resolve_all(size)?;
        info!(
            elements = dashboard.tree.len(),
            width = size.width,
            height = size.height,
            "dashboard ready"
        );
        Ok(dashboard)
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Arc<Resolved> {
        Arc::clone(&self.resolved)
    }

    /// Re-solve everything for the surface's current size.
    ///
    /// Returns `false` without a pass when the size has not changed.
    pub fn resize(&mut self) -> Result<bool> {
        let size = self.surface.size();
        if size == self.resolved.surface() {
            return Ok(false);
        }
        self.resolve_all(size)?;
        Ok(true)
    }

    /// Make tab `index` current. Returns `false` when it already is.
    pub fn select_tab(&mut self, index: usize) -> Result<bool> {
        let mut tabs = self.tabs.clone();
        match tabs.select(index)? {
            Some(change) => self.change_tab(tabs, change).map(|()| true),
            None => Ok(false),
        }
    }

    /// Make the tab called `name` current.
    pub fn select_tab_by_name(&mut self, name: &str) -> Result<bool> {
        let mut tabs = self.tabs.clone();
        match tabs.select_by_name(name)? {
            Some(change) => self.change_tab(tabs, change).map(|()| true),
            None => Ok(false),
        }
    }

    /// Step to the next tab, wrapping around.
    pub fn select_next_tab(&mut self) -> Result<bool> {
        self.select_tab(self.tabs.next_index())
    }

    /// Step to the previous tab, wrapping around.
    pub fn select_previous_tab(&mut self) -> Result<bool> {
        self.select_tab(self.tabs.previous_index())
    }

    /// Open popup `id`. Returns `false` when it is already open.
    pub fn open_popup(&mut self, id: &str) -> Result<bool> {
        let mut popups = self.popups.clone();
        let Some(node) = popups.open(id)? else {
            return Ok(false);
        };
        self.popups = popups;
        let dirty = self.resolved.region(node).unwrap_or(Region::EMPTY);
        debug!(popup = id, "popup opened");
        self.republish(dirty);
        Ok(true)
    }

    /// Close the active popup. Returns `false` when none is open.
    pub fn close_popup(&mut self) -> bool {
        self.dismiss_popup(DismissTrigger::Explicit)
    }

    /// Close the active popup if its dismiss policy allows `trigger`.
    pub fn dismiss_popup(&mut self, trigger: DismissTrigger) -> bool {
        let Some(node) = self.popups.dismiss(trigger) else {
            return false;
        };
        let dirty = self.resolved.region(node).unwrap_or(Region::EMPTY);
        debug!(?trigger, "popup closed");
        self.republish(dirty);
        true
    }

    /// Select the active or inactive variant of a stateful element and
    /// restyle its subtree. Returns `false` when the variant was already
    /// selected.
    ///
    /// Navigation tiles are owned by the tab controller and rejected here.
    pub fn set_variant(&mut self, node: NodeId, active: bool) -> Result<bool> {
        let data = self
            .tree
            .get(node)
            .ok_or_else(|| Error::schema("<unknown>", "active", "no such element"))?;
        if !data.is_stateful() {
            return Err(Error::schema(
                self.tree.describe(node),
                "active",
                "element has no active_properties or inactive_properties",
            ));
        }
        if self.tabs.tabs().iter().any(|tab| tab.tile == Some(node)) {
            return Err(Error::schema(
                self.tree.describe(node),
                "active",
                "navigation tiles follow the current tab; use select_tab",
            ));
        }
        let mut variants = self.variants.clone();
        if !variants.set(node, active) {
            return Ok(false);
        }
        let (styles, content, dirty) = self.restyle_subtrees(&variants, &[node])?;
        self.variants = variants;
        self.publish(Arc::clone(&self.resolved.geometry), styles, content, dirty);
        Ok(true)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, e.g. to change its size before
    /// [`Dashboard::resize`].
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    pub fn tokens(&self) -> &TokenTable {
        &self.tokens
    }

    pub fn tabs(&self) -> &TabController {
        &self.tabs
    }

    pub fn popups(&self) -> &PopupManager {
        &self.popups
    }

    /// Find an element by its global identifier.
    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.tree.lookup(id)
    }

    /// Whether a stateful element has its active variant selected.
    pub fn is_active(&self, node: NodeId) -> bool {
        self.variants.is_active(node)
    }

    // -- passes --------------------------------------------------------------

    fn resolve_all(&mut self, size: Size) -> Result<()> {
        let geometry = Geometry::solve(&self.tree, size)?;
        let nodes: Vec<NodeId> = self.tree.iter().map(|(node, _)| node).collect();
        let mut styles = StyleMap::new();
        let mut content = ContentMap::new();
        self.restyle(&geometry, &self.variants, &nodes, &mut styles, &mut content)?;
        self.publish(Arc::new(geometry), styles, content, size.to_region());
        Ok(())
    }

    fn change_tab(&mut self, tabs: TabController, change: TabChange) -> Result<()> {
        let mut variants = self.variants.clone();
        let mut tiles = Vec::new();
        for (index, active) in [(change.previous, false), (change.current, true)] {
            if let Some(tile) = tabs.get(index).and_then(|tab| tab.tile) {
                variants.set(tile, active);
                tiles.push(tile);
            }
        }
        let (styles, content, mut dirty) = self.restyle_subtrees(&variants, &tiles)?;
        for index in [change.previous, change.current] {
            if let Some(page) = tabs.get(index).and_then(|tab| self.resolved.region(tab.page)) {
                dirty = dirty.union(page);
            }
        }

        self.tabs = tabs;
        self.variants = variants;
        debug!(previous = change.previous, current = change.current, "tab changed");
        self.publish(Arc::clone(&self.resolved.geometry), styles, content, dirty);
        Ok(())
    }

    /// Restyle the subtrees under `roots` against the current geometry.
    /// Returns the new maps and the union of the boxes that changed.
    fn restyle_subtrees(
        &self,
        variants: &VariantState,
        roots: &[NodeId],
    ) -> Result<(StyleMap, ContentMap, Region)> {
        let nodes: Vec<NodeId> = roots
            .iter()
            .flat_map(|&root| self.tree.walk_depth_first(root))
            .collect();
        let mut styles = (*self.resolved.styles).clone();
        let mut content = (*self.resolved.content).clone();
        let changed = self.restyle(
            &self.resolved.geometry,
            variants,
            &nodes,
            &mut styles,
            &mut content,
        )?;
        let dirty = changed
            .into_iter()
            .filter_map(|node| self.resolved.region(node))
            .fold(Region::EMPTY, Region::union);
        Ok((styles, content, dirty))
    }

    /// Resolve `nodes` into `styles` and `content`, returning the nodes whose
    /// style or content box changed.
    fn restyle(
        &self,
        geometry: &Geometry,
        variants: &VariantState,
        nodes: &[NodeId],
        styles: &mut StyleMap,
        content: &mut ContentMap,
    ) -> Result<Vec<NodeId>> {
        let cascade = Cascade::new(&self.tree, &self.defaults, variants);
        let mut changed = Vec::new();
        for &node in nodes {
            let region = geometry.region(node).unwrap_or(Region::EMPTY);
            let style = cascade
                .resolve(node, region.size())
                .map_err(|e| Error::style(self.tree.describe(node), e))?;
            let boxed = self.content_box(node, region, &style);

            if styles.get(node) != Some(&style) || content.get(node).copied() != boxed {
                changed.push(node);
            }
            styles.insert(node, style);
            match boxed {
                Some(boxed) => {
                    content.insert(node, boxed);
                }
                None => {
                    content.remove(node);
                }
            }
        }
        Ok(changed)
    }

    fn content_box(
        &self,
        node: NodeId,
        region: Region,
        style: &ResolvedStyle,
    ) -> Option<ContentBox> {
        match &self.tree.get(node)?.kind {
            ElementKind::Picture(spec) => Some(fit_content(region, spec.intrinsic, spec.fit)),
            ElementKind::Icon => {
                let info = self.assets.get(style.icon.as_deref()?)?;
                Some(fit_content(region, info.size(), Fit::Contain))
            }
            _ => None,
        }
    }

    /// Publish a pass that only changed what is shown.
    fn republish(&mut self, dirty: Region) {
        let geometry = Arc::clone(&self.resolved.geometry);
        let styles = (*self.resolved.styles).clone();
        let content = (*self.resolved.content).clone();
        self.publish(geometry, styles, content, dirty);
    }

    fn publish(
        &mut self,
        geometry: Arc<Geometry>,
        styles: StyleMap,
        content: ContentMap,
        dirty: Region,
    ) {
        let current_tab = self.tabs.current();
        let page = self.tabs.current_tab().map(|tab| tab.page);
        let resolved = Resolved {
            generation: self.resolved.generation + 1,
            geometry,
            styles: Arc::new(styles),
            content: Arc::new(content),
            current_tab,
            page,
            active_popup: self.popups.active().map(str::to_string),
            visible: self.visible_nodes(page),
        };
        debug!(generation = resolved.generation, ?dirty, "resolution pass published");
        self.resolved = Arc::new(resolved);
        self.surface.set_dirty_region(dirty);
    }

    fn visible_nodes(&self, page: Option<NodeId>) -> Vec<NodeId> {
        let mut visible = Vec::new();
        for &root in self.tree.roots() {
            let Some(ElementKind::TabPages(spec)) = self.tree.get(root).map(|data| &data.kind)
            else {
                continue;
            };
            visible.push(root);
            if spec.has_navigation {
                if let Some(&navigation) = self.tree.children(root).first() {
                    visible.extend(self.tree.walk_depth_first(navigation));
                }
            }
            if let Some(page) = page {
                visible.extend(self.tree.walk_depth_first(page));
            }
        }
        if let Some(popup) = self.popups.active_node() {
            visible.extend(self.tree.walk_depth_first(popup));
        }
        visible
    }
}
