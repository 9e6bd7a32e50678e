//! Grayscale image buffers, row views and file I/O.

pub mod f32;
pub mod io;
pub mod traits;
pub mod u8;

pub use self::f32::{ensure_same_shape, ImageF32};
pub use self::traits::{ImageView, ImageViewMut, Rows};
pub use self::u8::ImageU8;
