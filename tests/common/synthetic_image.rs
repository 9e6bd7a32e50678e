use vcut_sharpness::image::ImageF32;

/// Subsamples per pixel along each axis.
const SUPERSAMPLE: usize = 8;

/// Noise-free V wedge of value 1 on 0, opening towards +x from `apex`.
///
/// Pixel `(x, y)` covers `[x-0.5, x+0.5] × [y-0.5, y+0.5]`; values are the
/// covered area fraction.
pub fn v_wedge(width: usize, height: usize, apex: [f64; 2], angle: f64) -> ImageF32 {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    assert!(angle > 0.0 && angle < std::f64::consts::PI, "opening angle out of range");

    let tan_half = (0.5 * angle).tan();
    let step = 1.0 / SUPERSAMPLE as f64;
    ImageF32::from_fn(width, height, |x, y| {
        let mut hits = 0usize;
        for j in 0..SUPERSAMPLE {
            let py = y as f64 - 0.5 + (j as f64 + 0.5) * step;
            for i in 0..SUPERSAMPLE {
                let px = x as f64 - 0.5 + (i as f64 + 0.5) * step;
                let along = px - apex[0];
                if along > 0.0 && (py - apex[1]).abs() <= tan_half * along {
                    hits += 1;
                }
            }
        }
        hits as f32 / (SUPERSAMPLE * SUPERSAMPLE) as f32
    })
}
