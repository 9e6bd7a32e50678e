use serde::Serialize;
use std::env;
use std::path::Path;
use std::time::Instant;
use vcut_sharpness::calibration::ResolutionCalibration;
use vcut_sharpness::config::validate_tool::{load_config, ValidateToolConfig};
use vcut_sharpness::image::io::write_json_file;
use vcut_sharpness::measure::{VcutInput, VcutMeasurer};
use vcut_sharpness::synthetic::VcutPattern;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One synthetic measurement of the sweep.
struct Job {
    std: f64,
    seed: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SweepPoint {
    std: f64,
    /// Recovered std, or `angle · r50` in uncorrected mode.
    mean: f64,
    std_dev: f64,
    values: Vec<f64>,
    failures: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidationReport {
    uncorrected: bool,
    single_image: bool,
    repetitions: usize,
    elapsed_ms: f64,
    points: Vec<SweepPoint>,
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
    config.params.validate().map_err(|e| e.to_string())?;
    let calibration =
        ResolutionCalibration::new(config.calibration.clone()).map_err(|e| e.to_string())?;
    let measurer = VcutMeasurer::new(config.params.clone());

    let stds = config.std.values();
    let repetitions = config.repetitions.max(1);
    let base_seed = config.seed;
    let jobs: Vec<Job> = stds
        .iter()
        .enumerate()
        .flat_map(|(i, &std)| {
            (0..repetitions).map(move |r| Job {
                std,
                seed: base_seed + (i * repetitions + r) as u64,
            })
        })
        .collect();

    let start = Instant::now();
    let run_job = |job: &Job| measure_job(&config, &measurer, &calibration, job);
    #[cfg(feature = "parallel")]
    let outcomes: Vec<Result<f64, String>> = jobs.par_iter().map(run_job).collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<Result<f64, String>> = jobs.iter().map(run_job).collect();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let points: Vec<SweepPoint> = stds
        .iter()
        .zip(outcomes.chunks(repetitions))
        .map(|(&std, chunk)| {
            let mut values = Vec::with_capacity(chunk.len());
            let mut failures = 0;
            for outcome in chunk {
                match outcome {
                    Ok(v) => values.push(*v),
                    Err(err) => {
                        log::warn!("std {std:.3}: {err}");
                        failures += 1;
                    }
                }
            }
            let (mean, std_dev) = mean_and_std(&values);
            SweepPoint {
                std,
                mean,
                std_dev,
                values,
                failures,
            }
        })
        .collect();

    let what = if config.uncorrected { "angle·r50" } else { "recovered std" };
    println!("{:>8}  {:>14}  {:>10}  {:>8}", "std", what, "± std", "failed");
    for p in &points {
        println!(
            "{:>8.3}  {:>14.4}  {:>10.4}  {:>8}",
            p.std, p.mean, p.std_dev, p.failures
        );
    }
    println!("{} measurements in {elapsed_ms:.1} ms", jobs.len());

    if let Some(path) = &config.output_json {
        let report = ValidationReport {
            uncorrected: config.uncorrected,
            single_image: config.single_image,
            repetitions,
            elapsed_ms,
            points,
        };
        write_json_file(path, &report)?;
        println!("Saved report to {}", path.display());
    }
    Ok(())
}

fn measure_job(
    config: &ValidateToolConfig,
    measurer: &VcutMeasurer,
    calibration: &ResolutionCalibration,
    job: &Job,
) -> Result<f64, String> {
    let pattern = VcutPattern {
        std: Some(job.std),
        seed: job.seed,
        ..config.pattern.clone()
    };
    let target = pattern.generate().map_err(|e| e.to_string())?;
    let mut input = VcutInput::single(&target.masked);
    if !config.single_image {
        input = input.with_unmasked(&target.unmasked);
    }
    let m = measurer
        .measure(&input, &target.line)
        .map_err(|e| e.to_string())?;
    let raw = calibration
        .uncorrected_resolution_factor(&m.radii, &m.contrast, m.angle)
        .map_err(|e| e.to_string())?;
    if config.uncorrected {
        return Ok(raw);
    }
    calibration
        .resolution_factor_to_std(calibration.correct(raw))
        .map_err(|e| e.to_string())
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

fn usage() -> String {
    "Usage: vcut_validate <config.json>".to_string()
}
