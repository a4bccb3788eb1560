//! In-memory collaborators for tests.

use std::collections::HashMap;

use crate::geometry::{Region, Size};
use crate::surface::{AssetInfo, AssetResolver, Surface};

// ---------------------------------------------------------------------------
// RecordingSurface
// ---------------------------------------------------------------------------

/// A surface that remembers every dirty region it is given.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: Size,
    dirty: Vec<Region>,
}

impl RecordingSurface {
    /// Create a surface of `width` x `height` pixels.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            size: Size::new(width, height),
            dirty: Vec::new(),
        }
    }

    /// Change the reported size. Takes effect on the next
    /// [`Dashboard::resize`](crate::dashboard::Dashboard::resize).
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Every dirty region reported so far, oldest first.
    pub fn dirty_regions(&self) -> &[Region] {
        &self.dirty
    }

    /// Drain the recorded dirty regions.
    pub fn take_dirty(&mut self) -> Vec<Region> {
        std::mem::take(&mut self.dirty)
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn set_dirty_region(&mut self, region: Region) {
        self.dirty.push(region);
    }
}

// ---------------------------------------------------------------------------
// FixedAssets
// ---------------------------------------------------------------------------

/// Resolves asset references from a fixed table.
#[derive(Debug, Clone, Default)]
pub struct FixedAssets {
    assets: HashMap<String, AssetInfo>,
    fallback: Option<AssetInfo>,
}

impl FixedAssets {
    /// An empty table: every reference fails to resolve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every reference not in the table to `info`.
    pub fn accept_all(info: AssetInfo) -> Self {
        Self {
            assets: HashMap::new(),
            fallback: Some(info),
        }
    }

    /// Add an asset (builder).
    pub fn with(mut self, reference: impl Into<String>, info: AssetInfo) -> Self {
        self.assets.insert(reference.into(), info);
        self
    }
}

impl AssetResolver for FixedAssets {
    fn resolve(&self, reference: &str) -> Option<AssetInfo> {
        self.assets.get(reference).copied().or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_dirty_regions() {
        let mut surface = RecordingSurface::new(10, 10);
        surface.set_dirty_region(Region::new(0, 0, 5, 5));
        surface.set_dirty_region(Region::new(5, 5, 5, 5));
        assert_eq!(surface.dirty_regions().len(), 2);
        assert_eq!(surface.take_dirty().len(), 2);
        assert!(surface.dirty_regions().is_empty());
    }

    #[test]
    fn fixed_assets_fallback() {
        let assets = FixedAssets::new().with("a.png", AssetInfo::new(4, 3));
        assert_eq!(assets.resolve("a.png"), Some(AssetInfo::new(4, 3)));
        assert_eq!(assets.resolve("b.png"), None);

        let assets =
            FixedAssets::accept_all(AssetInfo::new(1, 1)).with("a.png", AssetInfo::new(4, 3));
        assert_eq!(assets.resolve("a.png"), Some(AssetInfo::new(4, 3)));
        assert_eq!(assets.resolve("b.png"), Some(AssetInfo::new(1, 1)));
    }
}
