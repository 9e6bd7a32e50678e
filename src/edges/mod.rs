//! Edge localisation inside a rectified band.
//!
//! - [`sobel5_rows`]: 5-tap Sobel derivative across rows (reflect-101 borders).
//! - [`column_extrema`]: per-column rising/falling edge rows with optional
//!   parabolic sub-pixel refinement.
//!
//! Both V edges run roughly along the band's columns, so every column crosses
//! each edge once and the search is one-dimensional.

pub mod grad;
pub mod peaks;

pub use grad::sobel5_rows;
pub use peaks::{column_extrema, parabolic_offset, EdgeRows};
