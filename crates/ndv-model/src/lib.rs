#![forbid(unsafe_code)]

//! Display models for n-dimensional arrays.
//!
//! # Role in ndv
//! `ndv-model` describes *how* an array should be displayed, independently
//! of any data or view: which axes are visible, where the other axes are
//! positioned, how leftover axes are reduced, and which lookup table colors
//! each channel. Every field is observable (see `ndv-reactive`), so views
//! and controllers react to model edits instead of polling.
//!
//! # Primary types
//! - [`ArrayDisplayModel`]: the root model.
//! - [`LutModel`]: per-channel display settings.
//! - [`AxisKey`], [`CoordIndex`], [`IndexValue`], [`VisibleAxes`]: addressing.
//! - [`Colormap`], [`Reducer`]: value-level building blocks.

pub mod axis;
pub mod color;
pub mod display;
pub mod error;
pub mod index;
pub mod lut;
pub mod reducer;

pub use axis::{AxisKey, CoordIndex, VisibleAxes};
pub use color::{Colormap, Rgb};
pub use display::{ArrayDisplayModel, ArrayDisplaySnapshot};
pub use error::ModelError;
pub use index::{IndexValue, Slice};
pub use lut::{Autoscale, LutModel};
pub use reducer::Reducer;
