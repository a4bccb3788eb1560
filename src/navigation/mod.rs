//! Overlay and tab navigation state.
//!
//! Both controllers hold explicit state only. They never touch geometry;
//! the dashboard turns their transitions into resolution passes.

pub mod popup;
pub mod tabs;

pub use popup::{DismissPolicy, DismissTrigger, PopupManager};
pub use tabs::{Tab, TabChange, TabController};

/// Errors from navigation transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("popup '{requested}' cannot open while popup '{active}' is active")]
    PopupConflict { active: String, requested: String },
    #[error("tab index {index} is out of range for {count} tabs")]
    InvalidTabIndex { index: usize, count: usize },
    #[error("no popup with id '{id}'")]
    UnknownPopup { id: String },
    #[error("no tab named '{name}'")]
    UnknownTab { name: String },
}
