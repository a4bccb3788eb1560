//! Collaborator traits: the display surface and asset resolution.

use crate::geometry::{Region, Size};

/// The display the dashboard is drawn on.
pub trait Surface {
    /// Current display size in pixels.
    fn size(&self) -> Size;

    /// Called once after every resolution pass with the union of the boxes
    /// that changed.
    fn set_dirty_region(&mut self, region: Region);
}

/// Intrinsic metadata of an icon or picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetInfo {
    pub width: i32,
    pub height: i32,
}

impl AssetInfo {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Intrinsic size.
    pub const fn size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Resolves icon and picture references to drawable metadata.
///
/// Decoding happens outside the engine; only the intrinsic size is needed
/// here. Returning `None` makes the configuration fail to load.
pub trait AssetResolver {
    fn resolve(&self, reference: &str) -> Option<AssetInfo>;
}

impl<F> AssetResolver for F
where
    F: Fn(&str) -> Option<AssetInfo>,
{
    fn resolve(&self, reference: &str) -> Option<AssetInfo> {
        self(reference)
    }
}
