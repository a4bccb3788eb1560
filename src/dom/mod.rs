//! Element tree: slotmap-backed arena of dashboard elements.

pub mod kind;
pub mod node;
pub mod tree;

pub use kind::{
    ElementKind, Fit, NavLocation, Orientation, PictureSpec, PopupSpec, TabPagesSpec, TileSpec,
};
pub use node::{ElementData, NodeId, Overrides, StateVariants, VariantProps};
pub use tree::ElementTree;
