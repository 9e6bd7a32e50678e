//! Discrete Gaussian point-spread functions and same-size convolution.

use crate::error::{Result, VcutError};
use crate::image::{ImageF32, ImageView, ImageViewMut};
use serde::Serialize;

/// Kernel size in multiples of the standard deviation.
pub const DEFAULT_PSF_K: f64 = 9.0;
/// Smallest kernel size produced by [`std_to_psf`].
pub const MIN_PSF_SIZE: usize = 5;
/// Gaussian support radius in standard deviations.
const GAUSS_TRUNCATE: f64 = 4.0;

/// Square, odd-sized convolution kernel normalized to unit sum.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Psf {
    pub size: usize,
    /// Row-major `size × size` weights.
    pub data: Vec<f64>,
    /// 1-D factor when `data` is its outer product with itself.
    #[serde(skip)]
    separable: Option<Vec<f64>>,
}

impl Psf {
    /// Arbitrary kernel; normalized to unit sum.
    pub fn from_kernel(size: usize, data: Vec<f64>) -> Result<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(VcutError::invalid("psf", format!("size {size} must be odd")));
        }
        if data.len() != size * size {
            return Err(VcutError::invalid(
                "psf",
                format!("{} weights for a {size}x{size} kernel", data.len()),
            ));
        }
        let sum: f64 = data.iter().sum();
        if !(sum.abs() > 0.0) || !sum.is_finite() {
            return Err(VcutError::invalid("psf", "weights must have a finite, non-zero sum"));
        }
        Ok(Self {
            size,
            data: data.into_iter().map(|v| v / sum).collect(),
            separable: None,
        })
    }

    fn from_profile(profile: Vec<f64>) -> Self {
        let size = profile.len();
        let mut data = Vec::with_capacity(size * size);
        for &a in &profile {
            data.extend(profile.iter().map(|&b| a * b));
        }
        Self {
            size,
            data,
            separable: Some(profile),
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.size + x]
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}

/// Gaussian PSF for blur `std`.
///
/// The size defaults to `round(k·std)`, made odd and at least
/// [`MIN_PSF_SIZE`]. The kernel is an impulse smoothed by a Gaussian
/// truncated at `round(4·std)` with zero borders, then normalized to unit sum.
pub fn std_to_psf(std: f64, k: f64, kernel_size: Option<usize>) -> Result<Psf> {
    if !(std > 0.0) || !std.is_finite() {
        return Err(VcutError::invalid("std", format!("{std} must be positive")));
    }
    let size = match kernel_size {
        Some(s) if s % 2 == 1 => s,
        Some(s) => {
            return Err(VcutError::invalid("kernel_size", format!("{s} must be odd")));
        }
        None => {
            if !(k > 0.0) || !k.is_finite() {
                return Err(VcutError::invalid("k", format!("{k} must be positive")));
            }
            let mut s = (k * std).round() as usize;
            s += 1 - s % 2;
            s.max(MIN_PSF_SIZE)
        }
    };

    let radius = (GAUSS_TRUNCATE * std).round() as isize;
    let weight = |d: isize| (-0.5 * (d as f64 / std).powi(2)).exp();
    let norm: f64 = (-radius..=radius).map(weight).sum();
    let center = (size / 2) as isize;
    let mut profile: Vec<f64> = (0..size as isize)
        .map(|i| {
            let d = i - center;
            if d.abs() <= radius {
                weight(d) / norm
            } else {
                0.0
            }
        })
        .collect();
    let sum: f64 = profile.iter().sum();
    for v in &mut profile {
        *v /= sum;
    }
    Ok(Psf::from_profile(profile))
}

/// Symmetric border index (`… 1 0 | 0 1 … n-1 | n-1 n-2 …`).
#[inline]
fn reflect_symmetric(mut i: isize, n: usize) -> usize {
    let n = n as isize;
    loop {
        if i < 0 {
            i = -i - 1;
        } else if i >= n {
            i = 2 * n - i - 1;
        } else {
            return i as usize;
        }
    }
}

/// Same-size 2-D convolution of `image` with `psf`, symmetric borders.
pub fn convolve_psf(image: &ImageF32, psf: &Psf) -> ImageF32 {
    if image.w == 0 || image.h == 0 {
        return image.clone();
    }
    match &psf.separable {
        Some(profile) => convolve_separable(image, profile),
        None => convolve_full(image, psf),
    }
}

fn convolve_separable(image: &ImageF32, profile: &[f64]) -> ImageF32 {
    let (w, h) = (image.w, image.h);
    let c = (profile.len() / 2) as isize;
    let mut tmp = ImageF32::new(w, h);
    for y in 0..h {
        let src = image.row(y);
        let dst = tmp.row_mut(y);
        for (x, d) in dst.iter_mut().enumerate() {
            let mut acc = 0.0f64;
            for (i, &k) in profile.iter().enumerate() {
                let xx = reflect_symmetric(x as isize + c - i as isize, w);
                acc += k * src[xx] as f64;
            }
            *d = acc as f32;
        }
    }
    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        let dst = out.row_mut(y);
        for (i, &k) in profile.iter().enumerate() {
            let src = tmp.row(reflect_symmetric(y as isize + c - i as isize, h));
            for (d, &s) in dst.iter_mut().zip(src) {
                *d += (k * s as f64) as f32;
            }
        }
    }
    out
}

fn convolve_full(image: &ImageF32, psf: &Psf) -> ImageF32 {
    let (w, h) = (image.w, image.h);
    let c = (psf.size / 2) as isize;
    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        let dst = out.row_mut(y);
        for (x, d) in dst.iter_mut().enumerate() {
            let mut acc = 0.0f64;
            for ky in 0..psf.size {
                let yy = reflect_symmetric(y as isize + c - ky as isize, h);
                let src = image.row(yy);
                for kx in 0..psf.size {
                    let xx = reflect_symmetric(x as isize + c - kx as isize, w);
                    acc += psf.get(kx, ky) * src[xx] as f64;
                }
            }
            *d = acc as f32;
        }
    }
    out
}
