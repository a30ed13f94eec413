//! Geometry engine for exploring high-dimensional parameter spaces
//! through a movable 2-D planar slice.
//!
//! Parameter vectors live in a D-dimensional box described by
//! [`Bounds`]; all geometry happens in the normalized unit cube. A
//! [`PlaneBasis`] embeds a 2-plane in that cube, [`geometry`] clips it
//! against the cube and measures marker distances, and [`SliceSpace`]
//! ties bounds, basis, presets and pointer gestures together behind
//! one mutation-safe surface.

pub mod basis;
pub mod bounds;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod space;
pub mod store;

pub use basis::{PlaneBasis, PlanePoint};
pub use bounds::{Bounds, Dimension};
pub use drag::{clamp_to_unit_cube, DragController, DragOutcome};
pub use error::{Result, SliceError};
pub use space::{ActiveMarker, FrameView, MarkerView, SliceSpace};
pub use store::{Focus, Preset, PresetStore, Rgb, Seed};
