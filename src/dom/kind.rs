//! Element types and their type-specific layout properties.
//!
//! The property schema is closed: each [`ElementKind`] variant carries exactly
//! the layout fields its type accepts, parsed and validated at load.

use std::time::Duration;

use serde::Deserialize;

use crate::expr::SizeSpec;
use crate::geometry::{Align, Size};
use crate::layout::grid::GridSpec;

/// How a picture is scaled into its element box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Scale to fit entirely inside the box, keeping the aspect ratio.
    #[default]
    Contain,
    /// Scale to cover the whole box, keeping the aspect ratio.
    Cover,
    /// Scale each axis independently to the box.
    Stretch,
}

/// Picture source and scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct PictureSpec {
    /// Asset reference, as written in the configuration.
    pub source: String,
    /// Intrinsic pixel size reported by the asset resolver.
    pub intrinsic: Size,
    pub fit: Fit,
}

/// Arrangement of a tile's icon and name parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Icon above name.
    #[default]
    Vertical,
    /// Icon left of name.
    Horizontal,
}

/// A tile: an icon part and a name part sharing one box.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSpec {
    pub orientation: Orientation,
    /// Size of the icon track, evaluated against the tile box.
    pub icon_size: SizeSpec,
}

/// A popup: its placement on the display and how it is dismissed.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupSpec {
    /// Width, evaluated against the display surface.
    pub width: SizeSpec,
    /// Height, evaluated against the display surface.
    pub height: SizeSpec,
    pub horizontal: Align,
    pub vertical: Align,
    /// Height of the title row, evaluated against the popup box. Only used
    /// when the popup has a title.
    pub title_height: SizeSpec,
    pub has_title: bool,
    /// Whether a tap outside the popup closes it.
    pub close_on_background: bool,
    /// Close automatically after this long.
    pub auto_close: Option<Duration>,
}

/// Edge of the display the tab navigation bar sits on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavLocation {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl NavLocation {
    /// Whether the bar runs along the horizontal axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, NavLocation::Top | NavLocation::Bottom)
    }
}

/// The root of the tabbed base layout: navigation bar plus one page per tab.
#[derive(Debug, Clone, PartialEq)]
pub struct TabPagesSpec {
    pub location: NavLocation,
    /// Thickness of the navigation bar, evaluated against the display.
    pub navigation_size: SizeSpec,
    /// Whether the first child is the navigation bar.
    pub has_navigation: bool,
}

/// Type tag plus type-specific layout properties.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    GridLayout(GridSpec),
    Button,
    Icon,
    Picture(PictureSpec),
    Tile(TileSpec),
    PopupMenu(PopupSpec),
    TabPages(TabPagesSpec),
}

impl ElementKind {
    /// The configuration type name.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::GridLayout(_) => "GridLayout",
            ElementKind::Button => "Button",
            ElementKind::Icon => "Icon",
            ElementKind::Picture(_) => "Picture",
            ElementKind::Tile(_) => "Tile",
            ElementKind::PopupMenu(_) => "PopupMenu",
            ElementKind::TabPages(_) => "TabPages",
        }
    }

    /// Whether elements of this type hold children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ElementKind::GridLayout(_)
                | ElementKind::Tile(_)
                | ElementKind::PopupMenu(_)
                | ElementKind::TabPages(_)
        )
    }
}
