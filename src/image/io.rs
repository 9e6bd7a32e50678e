//! I/O helpers for grayscale images and JSON.
//!
//! - `load_grayscale_f32`: read a PNG/JPEG/TIFF/etc. into an owned float image
//!   (0..255 intensity scale for 8-bit sources, 0..65535 for 16-bit ones).
//! - `save_grayscale_f32`: write an `ImageF32` holding 0..1 values to a PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{ImageF32, ImageU8, ImageView};
use image::{DynamicImage, GrayImage, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk and convert to a single-channel float buffer.
///
/// 16-bit sources keep their full range; everything else goes through 8-bit
/// luma conversion.
pub fn load_grayscale_f32(path: &Path) -> Result<ImageF32, String> {
    let img = image::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    match img {
        DynamicImage::ImageLuma16(buf) => {
            let (w, h) = (buf.width() as usize, buf.height() as usize);
            let data = buf.into_raw().into_iter().map(|v| v as f32).collect();
            ImageF32::from_vec(w, h, data).map_err(|e| e.to_string())
        }
        other => {
            let gray = other.into_luma8();
            let (w, h) = (gray.width() as usize, gray.height() as usize);
            let raw = gray.into_raw();
            let view = ImageU8 {
                w,
                h,
                stride: w,
                data: &raw,
            };
            Ok(view.to_f32())
        }
    }
}

/// Save a float image to a grayscale PNG, mapping [0, 1] to [0, 255] with clamping.
pub fn save_grayscale_f32(image: &ImageF32, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = GrayImage::new(image.w as u32, image.h as u32);
    for (y, row) in image.rows().enumerate() {
        for (x, &px) in row.iter().enumerate() {
            let v = (px * 255.0).clamp(0.0, 255.0);
            out.put_pixel(x as u32, y as u32, Luma([v as u8]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
