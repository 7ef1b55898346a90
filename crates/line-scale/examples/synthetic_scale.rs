//! Example: evaluate a synthetic stage micrometer.
//!
//! Renders `--profiles` scans of an equidistant scale with a small known
//! pitch error on every line, adds salt noise that a morphological opening
//! removes, and runs the full evaluation. The per-line deviations printed
//! at the end should reproduce the injected errors.
//!
//! Run from the workspace root:
//!   cargo run -p line-scale --example synthetic_scale -- --help
//!   cargo run -p line-scale --example synthetic_scale -- --lines 11 --filter 1

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use line_scale::{IntensityProfile, NominalSpec, ScaleEvalConfig, ScaleEvaluator, ScaleResult};
use serde::Serialize;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Evaluate a synthetic stage-micrometer scan")]
struct Args {
    /// Number of line marks on the scale
    #[arg(long, default_value_t = 11)]
    lines: usize,

    /// Nominal line pitch, in x units
    #[arg(long, default_value_t = 10.0)]
    division: f64,

    /// Sampling step along the profile
    #[arg(long, default_value_t = 0.05)]
    step: f64,

    /// Number of scanned profiles
    #[arg(long, default_value_t = 200)]
    profiles: usize,

    /// Morphology parameter (> 0 opens, < 0 closes)
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    filter: i32,

    /// Sample temperature in °C
    #[arg(long, default_value_t = 22.5)]
    temperature: f64,

    /// Output JSON path (default: print a table only)
    #[arg(long)]
    out: Option<String>,
}

// ── JSON DTOs ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct LineDto {
    tag: usize,
    injected: f64,
    measured: f64,
}

#[derive(Serialize)]
struct RunResult {
    elapsed_ms: f64,
    lines: Vec<LineDto>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Pitch error injected on line `tag`, in x units.
fn injected_error(tag: usize) -> f64 {
    0.05 * ((tag as f64) * 0.9).sin()
}

/// One scan of the scale: bright lines of width `division / 4` on a dark
/// background, with single-sample spikes every 97 samples.
fn render_profile(args: &Args, scan: usize) -> IntensityProfile {
    let shift = 0.013 * (scan % 17) as f64;
    let margin = args.division;
    let len = ((2.0 * margin + args.division * (args.lines - 1) as f64) / args.step) as usize;
    let half_width = args.division / 8.0;

    let x: Vec<f64> = (0..len).map(|i| i as f64 * args.step).collect();
    let z: Vec<f64> = x
        .iter()
        .enumerate()
        .map(|(i, &xi)| {
            let on_line = (0..args.lines).any(|tag| {
                let center = margin + shift + tag as f64 * args.division + injected_error(tag);
                (xi - center).abs() <= half_width
            });
            let spike = i % 97 == 48 + scan % 5;
            if on_line || spike {
                2400.0 + (i % 13) as f64
            } else {
                300.0 + (i % 11) as f64
            }
        })
        .collect();

    IntensityProfile::from_f64_intensities(x, &z)
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let args = Args::parse();

    let profiles: Vec<IntensityProfile> =
        (0..args.profiles).map(|k| render_profile(&args, k)).collect();

    let cfg = ScaleEvalConfig {
        expected_line_marks: args.lines,
        nominal: NominalSpec::Division(args.division),
        filter_parameter: args.filter,
        thermal_expansion_alpha: 11.5e-6,
        ..ScaleEvalConfig::default()
    };

    let t0 = Instant::now();
    let report = ScaleEvaluator::new(cfg)
        .evaluate(&profiles, args.temperature)
        .context("evaluating synthetic profiles")?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

    tracing::info!(
        "{} profiles, {} folded, {} mismatched ({elapsed_ms:.2} ms)",
        args.profiles,
        report.sample_size,
        report.mismatched_profiles
    );

    let ScaleResult::Calibrated { records, .. } = report.result else {
        tracing::warn!("no profile matched {} line marks; try --filter 1", args.lines);
        return Ok(());
    };

    println!("tag  injected  measured  std_dev");
    let mut lines = Vec::with_capacity(records.len());
    for rec in &records {
        let injected = injected_error(rec.tag) - injected_error(0);
        println!(
            "{:>3}  {:>8.4}  {:>8.4}  {:>7.4}",
            rec.tag, injected, rec.deviation, rec.center_std_dev
        );
        lines.push(LineDto {
            tag: rec.tag,
            injected,
            measured: rec.deviation,
        });
    }

    if let Some(out) = args.out {
        let json = serde_json::to_string_pretty(&RunResult { elapsed_ms, lines })
            .context("serializing results")?;
        std::fs::write(&out, json).with_context(|| format!("writing {out}"))?;
        tracing::info!("results written to {out}");
    }

    Ok(())
}
