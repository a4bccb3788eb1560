//! Headless testing helpers: a recording surface, a fixed asset resolver and
//! text dumps of resolved geometry.
//!
//! Use [`RecordingSurface`] to drive a [`Dashboard`](crate::dashboard::Dashboard)
//! without a display and inspect the dirty regions it reports. Use
//! [`geometry_to_string`] and [`visible_to_string`] for snapshot-style
//! assertions.

pub mod fixtures;
pub mod snapshot;

pub use fixtures::{FixedAssets, RecordingSurface};
pub use snapshot::{geometry_to_string, visible_to_string};
