use serde::Serialize;
use std::env;
use std::path::Path;
use vcut_sharpness::calibration::ResolutionCalibration;
use vcut_sharpness::config::measure_tool::{load_config, BackgroundConfig};
use vcut_sharpness::image::io::{load_grayscale_f32, save_grayscale_f32, write_json_file};
use vcut_sharpness::image::ImageF32;
use vcut_sharpness::measure::{Background, MeasurementSummary, VcutInput, VcutMeasurer};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeasureReport {
    resolution_factor: f64,
    uncorrected_resolution_factor: f64,
    equivalent_std: f64,
    calibration_version: u32,
    intensity_scale: f32,
    measurement: MeasurementSummary,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let mut masked = load_grayscale_f32(&config.masked)?;
    let mut unmasked = match &config.unmasked {
        Some(path) => Some(load_grayscale_f32(path)?),
        None => None,
    };
    let mut background_image = match &config.background {
        Some(BackgroundConfig::Image(path)) => Some(load_grayscale_f32(path)?),
        _ => None,
    };

    let scale = match config.intensity_scale {
        Some(s) => s,
        None => auto_scale(unmasked.as_ref().unwrap_or(&masked))?,
    };
    for img in [Some(&mut masked), unmasked.as_mut(), background_image.as_mut()]
        .into_iter()
        .flatten()
    {
        img.map_inplace(|v| v * scale);
    }

    let background = match (&config.background, &background_image) {
        (Some(BackgroundConfig::Level(level)), _) => Some(Background::Level(level * scale)),
        (_, Some(img)) => Some(Background::Image(img)),
        _ => None,
    };
    let mut input = VcutInput::single(&masked);
    if let Some(img) = &unmasked {
        input = input.with_unmasked(img);
    }
    if let Some(bg) = background {
        input = input.with_background(bg);
    }

    let measurer = VcutMeasurer::new(config.params.clone());
    let measurement = measurer
        .measure(&input, &config.line)
        .map_err(|e| format!("Measurement failed: {e}"))?;

    let calibration =
        ResolutionCalibration::new(config.calibration.clone()).map_err(|e| e.to_string())?;
    let raw = calibration
        .uncorrected_resolution_factor(&measurement.radii, &measurement.contrast, measurement.angle)
        .map_err(|e| e.to_string())?;
    let fres = calibration.correct(raw);
    let std = calibration
        .resolution_factor_to_std(fres)
        .map_err(|e| e.to_string())?;

    println!(
        "apex = ({:.2}, {:.2}), angle = {:.3}°, {} profile samples",
        measurement.apex_image[0],
        measurement.apex_image[1],
        measurement.angle_degrees(),
        measurement.radii.len()
    );
    println!("resolution factor = {fres:.4} (uncorrected {raw:.4}), equivalent std = {std:.4} px");
    println!("timing: {:.2} ms total", measurement.timing.total_ms);
    for stage in &measurement.timing.stages {
        println!("  {:<12} {:>8.2} ms", stage.label, stage.elapsed_ms);
    }

    if let Some(path) = &config.output.contrast_image {
        save_grayscale_f32(&measurement.contrast_band.image, path)?;
        println!("Saved contrast band to {}", path.display());
    }
    if let Some(path) = &config.output.report_json {
        let report = MeasureReport {
            resolution_factor: fres,
            uncorrected_resolution_factor: raw,
            equivalent_std: std,
            calibration_version: calibration.coeffs().version,
            intensity_scale: scale,
            measurement: measurement.summary(),
        };
        write_json_file(path, &report)?;
        println!("Saved report to {}", path.display());
    }
    Ok(())
}

fn auto_scale(reference: &ImageF32) -> Result<f32, String> {
    let max = reference.data.iter().copied().fold(f32::MIN, f32::max);
    if max > 0.0 && max.is_finite() {
        Ok(1.0 / max)
    } else {
        Err("Cannot derive an intensity scale from an image without positive values".to_string())
    }
}

fn usage() -> String {
    "Usage: vcut_measure <config.json>".to_string()
}
