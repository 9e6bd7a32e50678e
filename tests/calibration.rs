use approx::{assert_abs_diff_eq, assert_relative_eq};
use vcut_sharpness::calibration::{
    std_to_psf, CalibrationCoeffs, ResolutionCalibration, DEFAULT_PSF_K,
};

#[test]
fn std_round_trips_through_resolution_factor() {
    let cal = ResolutionCalibration::default();
    for std in [0.65, 0.8, 0.95, 1.2, 2.0, 4.0, 8.0] {
        let fres = cal.std_to_resolution_factor(std).unwrap();
        let back = cal.resolution_factor_to_std(fres).unwrap();
        assert_relative_eq!(back, std, max_relative = 0.01);
    }
}

#[test]
fn alternate_coefficients_change_the_mapping() {
    let coeffs = CalibrationCoeffs {
        linear_slope: 3.0,
        ..Default::default()
    };
    let cal = ResolutionCalibration::new(coeffs).unwrap();
    assert_abs_diff_eq!(cal.std_to_resolution_factor(2.0).unwrap(), 6.0, epsilon = 1e-12);
    assert_relative_eq!(cal.resolution_factor_to_std(9.0).unwrap(), 3.0, max_relative = 0.01);
}

#[test]
fn psf_is_normalized_odd_and_point_symmetric() {
    for std in [0.3, 0.7, 1.0, 1.7, 2.5, 4.0] {
        let psf = std_to_psf(std, DEFAULT_PSF_K, None).unwrap();
        assert_eq!(psf.size % 2, 1, "std {std}: size {}", psf.size);
        assert_eq!(psf.data.len(), psf.size * psf.size);
        assert_abs_diff_eq!(psf.sum(), 1.0, epsilon = 1e-9);
        let n = psf.data.len();
        for i in 0..n {
            assert!(
                (psf.data[i] - psf.data[n - 1 - i]).abs() < 1e-15,
                "std {std}: asymmetric at {i}"
            );
        }
    }
}
