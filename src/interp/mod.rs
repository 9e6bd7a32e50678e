//! Curve interpolation and level-crossing search.
//!
//! - [`CubicSpline`]: Reinsch smoothing spline (natural boundary) with root
//!   extraction, the workhorse behind [`find_crossing`].
//! - [`interp`], [`linspace`]: linear resampling helpers.
//! - [`quadratic_column`]: three-point sampling of a band along its rows.

pub mod crossing;
pub mod sample;
pub mod spline;

pub use crossing::find_crossing;
pub use sample::{interp, linspace, quadratic_column};
pub use spline::CubicSpline;
