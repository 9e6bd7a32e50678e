mod common;

use common::init_logger;
use common::synthetic_image::v_wedge;
use vcut_sharpness::prelude::*;
use vcut_sharpness::VcutError;

const WIDTH: usize = 1200;
const HEIGHT: usize = 161;
const APEX: [f64; 2] = [60.3, 80.0];

fn wedge_4deg() -> ImageF32 {
    v_wedge(WIDTH, HEIGHT, APEX, 4f64.to_radians())
}

fn hint_line() -> Line {
    Line::new(40.0, APEX[1], 1190.0, APEX[1])
}

fn assert_geometry(m: &VcutMeasurement) {
    assert_geometry_with_angle(m, 4.0);
}

fn assert_geometry_with_angle(m: &VcutMeasurement, degrees: f64) {
    let angle_err = (m.angle_degrees() - degrees).abs();
    assert!(angle_err < 0.1, "angle {:.4}° (err {angle_err:.4}°)", m.angle_degrees());
    let apex_err = (m.apex_image[0] - APEX[0]).hypot(m.apex_image[1] - APEX[1]);
    assert!(
        apex_err < 1.0,
        "apex ({:.3}, {:.3}) is {apex_err:.3} px from ({}, {})",
        m.apex_image[0],
        m.apex_image[1],
        APEX[0],
        APEX[1]
    );
}

#[test]
fn noise_free_wedge_pair_recovers_angle_and_apex() {
    init_logger();
    let masked = wedge_4deg();
    let unmasked = ImageF32::filled(WIDTH, HEIGHT, 1.0);
    let input = VcutInput::single(&masked).with_unmasked(&unmasked);

    let m = VcutMeasurer::default()
        .measure(&input, &hint_line())
        .expect("measurement");

    assert_geometry(&m);
    assert!(!m.v_is_dark, "relative contrast of a bright gap is dark");
    assert_eq!(m.radii.len(), m.contrast.len());
    // Far from the apex the gap is fully open.
    let far: Vec<f64> = m
        .radii
        .iter()
        .zip(&m.contrast)
        .filter(|(r, _)| **r > 200.0)
        .map(|(_, c)| *c)
        .collect();
    assert!(!far.is_empty());
    assert!(far.iter().all(|c| (c - 1.0).abs() < 1e-3), "open gap contrast");
    assert_eq!(
        m.timing.stages.iter().map(|s| s.label.as_str()).collect::<Vec<_>>(),
        ["preprocess", "rectify", "contrast", "edges", "fit", "profile"]
    );
}

#[test]
fn noise_free_wedge_single_image_recovers_angle_and_apex() {
    init_logger();
    let masked = wedge_4deg();
    let m = VcutMeasurer::default()
        .measure(&VcutInput::single(&masked), &hint_line())
        .expect("measurement");

    assert_geometry(&m);
    assert!(m.v_is_dark);
    let max = m.contrast.iter().copied().fold(f64::MIN, f64::max);
    assert!((max - 1.0).abs() < 0.05, "normalized maximum {max}");
}

#[test]
fn background_level_is_removed_before_measuring() {
    init_logger();
    let mut masked = wedge_4deg();
    masked.map_inplace(|v| 0.8 * v + 0.1);
    let unmasked = ImageF32::filled(WIDTH, HEIGHT, 0.9);
    let input = VcutInput::single(&masked)
        .with_unmasked(&unmasked)
        .with_background(Background::Level(0.1));

    let m = VcutMeasurer::default()
        .measure(&input, &hint_line())
        .expect("measurement");
    assert_geometry(&m);
}

#[test]
fn hint_line_outside_the_image_is_rejected() {
    let masked = wedge_4deg();
    let err = VcutMeasurer::default()
        .measure(
            &VcutInput::single(&masked),
            &Line::new(-50.0, -10.0, -5.0, -40.0),
        )
        .unwrap_err();
    assert!(matches!(err, VcutError::DegenerateLine { .. }), "{err:?}");
}

#[test]
fn more_blur_gives_larger_equivalent_std() {
    init_logger();
    let cal = ResolutionCalibration::default();
    let recovered: Vec<f64> = [1.0, 2.5]
        .into_iter()
        .map(|std| {
            let target = VcutPattern {
                std: Some(std),
                angle: Some(6f64.to_radians()),
                phi: Some(0.4),
                snr: None,
                ..Default::default()
            }
            .generate()
            .expect("synthetic target");
            let input = VcutInput::single(&target.masked).with_unmasked(&target.unmasked);
            let m = VcutMeasurer::default()
                .measure(&input, &target.line)
                .expect("measurement");
            let fres = cal
                .to_resolution_factor(&m.radii, &m.contrast, m.angle)
                .expect("resolution factor");
            assert!(fres.is_finite() && fres > 0.0);
            cal.resolution_factor_to_std(fres).expect("equivalent std")
        })
        .collect();
    assert!(
        recovered[1] > recovered[0],
        "recovered std {recovered:?} should grow with blur"
    );
}

#[test]
fn hint_line_from_the_gap_to_behind_the_apex() {
    init_logger();
    let masked = wedge_4deg();
    let unmasked = ImageF32::filled(WIDTH, HEIGHT, 1.0);
    let line = Line::new(1190.0, APEX[1], 40.0, APEX[1]);

    let single = VcutMeasurer::default()
        .measure(&VcutInput::single(&masked), &line)
        .expect("single-image measurement");
    assert_geometry(&single);

    let pair = VcutMeasurer::default()
        .measure(&VcutInput::single(&masked).with_unmasked(&unmasked), &line)
        .expect("pair measurement");
    assert_geometry(&pair);
    // The open end of the V is at the start of the band.
    assert!(pair.fit_columns.0 < 5, "fit columns {:?}", pair.fit_columns);
}

#[test]
fn wide_wedge_fit_stops_where_edges_leave_the_band() {
    init_logger();
    let masked = v_wedge(WIDTH, HEIGHT, APEX, 6f64.to_radians());
    let unmasked = ImageF32::filled(WIDTH, HEIGHT, 1.0);
    // Half-opening 3°: both edges reach the band border (50 rows) near x = 1014.
    for input in [
        VcutInput::single(&masked),
        VcutInput::single(&masked).with_unmasked(&unmasked),
    ] {
        let m = VcutMeasurer::new(MeasureParams {
            max_width: 101,
            ..Default::default()
        })
        .measure(&input, &hint_line())
        .expect("measurement");
        assert_geometry_with_angle(&m, 6.0);
        let (start, end) = m.fit_columns;
        assert!(start > 0, "closed columns behind the apex are skipped");
        assert!(
            end < m.contrast_band.image.w && end > 850 && end < 950,
            "fit columns {start}..{end} of {}",
            m.contrast_band.image.w
        );
    }
}

/// 4° wedge with an unlit strip (rows `strip_from..`) where both images only
/// carry the background level plus a little noise.
fn wedge_with_dark_strip(width: usize, strip_from: usize) -> (ImageF32, ImageF32) {
    let wedge = v_wedge(width, HEIGHT, APEX, 4f64.to_radians());
    let dark = |x: usize, y: usize| 0.1 + (((x * 7 + y * 13) % 3) as f32 - 1.0) * 1e-3;
    let masked = ImageF32::from_fn(width, HEIGHT, |x, y| {
        if y >= strip_from {
            dark(x, y)
        } else {
            0.8 * wedge.get(x, y) + 0.1
        }
    });
    let unmasked =
        ImageF32::from_fn(width, HEIGHT, |x, y| if y >= strip_from { dark(x, y) } else { 0.9 });
    (masked, unmasked)
}

#[test]
fn dark_strip_inside_the_band_is_degenerate_contrast() {
    init_logger();
    let (masked, unmasked) = wedge_with_dark_strip(600, 120);
    let input = VcutInput::single(&masked)
        .with_unmasked(&unmasked)
        .with_background(Background::Level(0.1));
    let err = VcutMeasurer::default()
        .measure(&input, &Line::new(40.0, APEX[1], 590.0, APEX[1]))
        .unwrap_err();
    assert!(matches!(err, VcutError::DegenerateContrast { .. }), "{err:?}");
}

#[test]
fn dark_strip_outside_the_band_is_ignored() {
    init_logger();
    // The default band spans rows 30..=130 around the line.
    let (masked, unmasked) = wedge_with_dark_strip(600, 140);
    let input = VcutInput::single(&masked)
        .with_unmasked(&unmasked)
        .with_background(Background::Level(0.1));
    let m = VcutMeasurer::default()
        .measure(&input, &Line::new(40.0, APEX[1], 590.0, APEX[1]))
        .expect("measurement");
    assert_geometry(&m);
}

#[test]
fn leaky_mask_baseline_is_the_last_band_row() {
    init_logger();
    let mut masked = wedge_4deg();
    masked.map_inplace(|v| 0.8 * v + 0.2);
    let unmasked = ImageF32::filled(WIDTH, HEIGHT, 1.0);
    let input = VcutInput::single(&masked).with_unmasked(&unmasked);
    let m = VcutMeasurer::new(MeasureParams {
        mask_is_dark: false,
        ..Default::default()
    })
    .measure(&input, &hint_line())
    .expect("measurement");
    assert_geometry(&m);

    // The leak (0.2) is removed from both bands, so the mask reads as zero
    // contrast on both sides of the V. The last band column crosses the gap
    // and would leave a residual offset.
    let band = &m.contrast_band.image;
    for row in [0, band.h - 1] {
        let c = band.get(100, row);
        assert!(c.abs() < 1e-4, "mask contrast {c} on row {row}");
    }
}
