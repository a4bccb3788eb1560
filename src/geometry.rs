//! Core geometry types: Size, Region, Spacing.
//!
//! All values are in display pixels. Regions are absolute: their origin is the
//! top-left corner of the display surface.

use std::ops::Add;

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A 2D size in pixels (width x height).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0, height: 0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are strictly positive.
    #[inline]
    pub const fn is_positive(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Convert to a [`Region`] positioned at the origin.
    #[inline]
    pub const fn to_region(self) -> Region {
        Region { x: 0, y: 0, width: self.width, height: self.height }
    }
}

// ---------------------------------------------------------------------------
// Align
// ---------------------------------------------------------------------------

/// Placement of a smaller box along one axis of a larger one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Align {
    Start,
    #[default]
    Center,
    End,
}

impl Align {
    /// Offset of a span of `inner` pixels inside `outer` pixels.
    #[inline]
    pub const fn offset(self, outer: i32, inner: i32) -> i32 {
        match self {
            Align::Start => 0,
            Align::Center => (outer - inner) / 2,
            Align::End => outer - inner,
        }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A rectangular pixel region defined by position and size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    /// An empty region at the origin.
    pub const EMPTY: Region = Region { x: 0, y: 0, width: 0, height: 0 };

    /// Create a new region.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// The right edge (exclusive): `x + width`.
    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive): `y + height`.
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// The dimensions as a [`Size`].
    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Whether the region has no area.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether `other` is entirely contained within this region.
    #[inline]
    pub const fn contains_region(self, other: Region) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Compute the smallest region containing both `self` and `other`.
    ///
    /// An empty operand is ignored so that unions can start from
    /// [`Region::EMPTY`].
    #[inline]
    pub const fn union(self, other: Region) -> Region {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x1 = if self.x < other.x { self.x } else { other.x };
        let y1 = if self.y < other.y { self.y } else { other.y };

        let sr = self.right();
        let or = other.right();
        let x2 = if sr > or { sr } else { or };

        let sb = self.bottom();
        let ob = other.bottom();
        let y2 = if sb > ob { sb } else { ob };

        Region { x: x1, y: y1, width: x2 - x1, height: y2 - y1 }
    }

    /// Contract the region inward by the given [`Spacing`].
    ///
    /// Unlike a clamping shrink, the result may have a zero or negative size;
    /// callers check [`Region::is_empty`] to detect overflow. Arithmetic
    /// saturates, so margins beyond `i32` range still yield an empty region.
    #[inline]
    pub const fn inset(self, margin: Spacing) -> Region {
        Region {
            x: self.x.saturating_add(margin.left),
            y: self.y.saturating_add(margin.top),
            width: self.width.saturating_sub(margin.left).saturating_sub(margin.right),
            height: self.height.saturating_sub(margin.top).saturating_sub(margin.bottom),
        }
    }

    /// Split vertically at `offset` pixels from the left edge.
    ///
    /// Returns `(left, right)`. The offset is clamped to `[0, width]`.
    #[inline]
    pub const fn split_vertical(self, offset: i32) -> (Region, Region) {
        let clamped = if offset < 0 {
            0
        } else if offset > self.width {
            self.width
        } else {
            offset
        };
        let left = Region { x: self.x, y: self.y, width: clamped, height: self.height };
        let right = Region {
            x: self.x + clamped,
            y: self.y,
            width: self.width - clamped,
            height: self.height,
        };
        (left, right)
    }

    /// Split horizontally at `offset` pixels from the top edge.
    ///
    /// Returns `(top, bottom)`. The offset is clamped to `[0, height]`.
    #[inline]
    pub const fn split_horizontal(self, offset: i32) -> (Region, Region) {
        let clamped = if offset < 0 {
            0
        } else if offset > self.height {
            self.height
        } else {
            offset
        };
        let top = Region { x: self.x, y: self.y, width: self.width, height: clamped };
        let bottom = Region {
            x: self.x,
            y: self.y + clamped,
            width: self.width,
            height: self.height - clamped,
        };
        (top, bottom)
    }

    /// Place a box of `size` inside this region with the given alignment.
    #[inline]
    pub const fn place(self, size: Size, horizontal: Align, vertical: Align) -> Region {
        Region {
            x: self.x + horizontal.offset(self.width, size.width),
            y: self.y + vertical.offset(self.height, size.height),
            width: size.width,
            height: size.height,
        }
    }
}

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

/// Spacing around the four sides of a rectangle, used for outer margins.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Spacing {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Spacing {
    /// Zero spacing on all sides.
    pub const ZERO: Spacing = Spacing { top: 0, right: 0, bottom: 0, left: 0 };

    /// Create spacing with explicit values for each side.
    #[inline]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self { top, right, bottom, left }
    }

    /// All four sides set to the same value.
    #[inline]
    pub const fn all(value: i32) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// Total horizontal extent: `left + right`.
    #[inline]
    pub const fn width(self) -> i32 {
        self.left + self.right
    }

    /// Total vertical extent: `top + bottom`.
    #[inline]
    pub const fn height(self) -> i32 {
        self.top + self.bottom
    }
}

impl Add for Spacing {
    type Output = Spacing;
    #[inline]
    fn add(self, rhs: Spacing) -> Spacing {
        Spacing {
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
            left: self.left + rhs.left,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
