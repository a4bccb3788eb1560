//! Layout: grid solving, whole-tree geometry, asset fitting.

pub mod engine;
pub mod fit;
pub mod grid;

pub use engine::Geometry;
pub use fit::{fit_content, ContentBox};
pub use grid::{GridSpec, LayoutError, SolvedGrid, Track};
