//! # inkboard-layout
//!
//! Layout and style resolution for pixel-addressed inkBoard dashboards.
//!
//! A YAML configuration describes a tree of elements (grids, buttons, icons,
//! pictures, tiles), a tabbed base layout and a set of popups. The engine
//! turns it into absolute pixel boxes and fully resolved styles for every
//! element, and keeps them current as the display is resized, tabs change and
//! popups open and close.
//!
//! ## Core Systems
//!
//! - **[`expr`]**: size expressions over the container's `w`/`h`
//! - **[`style`]**: colors, tokens, typed style properties and the cascade
//! - **[`dom`]**: slotmap-backed element arena
//! - **[`layout`]**: grid solving, whole-tree geometry, asset fitting
//! - **[`navigation`]**: popup manager and tab controller
//! - **[`config`]**: document sections, templates, tree building
//! - **[`dashboard`]**: owned state and transactional resolution passes
//! - **[`surface`]**: display and asset collaborator traits
//! - **[`geometry`]**: Size, Region, Spacing primitives
//!
//! ```ignore
//! use inkboard_layout::dashboard::Dashboard;
//! use inkboard_layout::surface::AssetInfo;
//! use inkboard_layout::testing::{FixedAssets, RecordingSurface};
//!
//! let yaml = "layouts:\n  - {id: home, type: Button, text: Hello}\n";
//! let assets = FixedAssets::accept_all(AssetInfo::new(24, 24));
//! let dashboard = Dashboard::load(yaml, RecordingSurface::new(800, 480), &assets)?;
//! let home = dashboard.lookup("home").unwrap();
//! assert_eq!(dashboard.snapshot().region(home).unwrap().width, 800);
//! ```

// Foundation
pub mod error;
pub mod geometry;

// Core systems
pub mod dom;
pub mod expr;
pub mod layout;
pub mod style;

// Controllers
pub mod navigation;

// Loading and resolution
pub mod config;
pub mod dashboard;
pub mod surface;

// Headless testing
pub mod testing;

pub use dashboard::{Dashboard, Resolved};
pub use error::{Error, Result};
