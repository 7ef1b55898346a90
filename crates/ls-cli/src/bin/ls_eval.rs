use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use ls_core::{IntensityProfile, REFERENCE_TEMPERATURE_C};
use ls_scale::{
    EdgeListing, EvaluationReport, NominalSpec, PipelineSummary, ScaleEvalConfig, ScaleEvaluator,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ls_eval")]
#[command(about = "Evaluate stage-micrometer line scales from scanned intensity profiles")]
struct Cli {
    /// Only log warnings and errors (overridden by RUST_LOG)
    #[arg(long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fold every profile into per-line statistics
    #[command(name = "scale")]
    Scale(EvalArgs),
    /// Only list thermally corrected edge positions per profile
    #[command(name = "edges")]
    Edges(EvalArgs),
}

#[derive(Args, Debug, Clone)]
struct EvalArgs {
    /// Profile set JSON: `{"sample_temperature": .., "profiles": [{"x": [..], "z": [..]}]}`
    #[arg(long, required = true)]
    input: PathBuf,
    /// Optional `ScaleEvalConfig` JSON; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output JSON path (default: stdout)
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long)]
    threshold: Option<f64>,
    /// Morphology parameter: > 0 opens, < 0 closes
    #[arg(long, allow_hyphen_values = true)]
    filter: Option<i32>,
    /// Expected number of line marks per profile
    #[arg(long)]
    lines: Option<usize>,
    /// Nominal division of an equidistant scale
    #[arg(long)]
    division: Option<f64>,
    /// Place the reference line at nominal 0: `(tag - reference) * division`
    #[arg(long)]
    from_reference: bool,
    #[arg(long, allow_hyphen_values = true)]
    reference: Option<i64>,
    /// Linear thermal expansion coefficient, 1/K
    #[arg(long)]
    alpha: Option<f64>,
    /// Sample temperature in °C (overrides the input file)
    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<f64>,
    /// Include per-profile edge listings in the scale report
    #[arg(long)]
    edges: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ProfileSetDto {
    #[serde(default)]
    sample_temperature: Option<f64>,
    profiles: Vec<ProfileDto>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProfileDto {
    x: Vec<f64>,
    /// Brightness; fractional values are rounded half to even.
    z: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
struct EdgesReport {
    summary: PipelineSummary,
    sample_temperature: f64,
    invalid_profiles: usize,
    cancelled: bool,
    edges: Vec<EdgeListing>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match cli.cmd {
        Command::Scale(args) => run_scale(args),
        Command::Edges(args) => run_edges(args),
    }
}

fn init_tracing(quiet: bool) {
    let level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_scale(args: EvalArgs) -> Result<()> {
    let report = evaluate(&args, args.edges)?;
    if report.expected_line_marks == 0 {
        tracing::warn!("no expected line count given (--lines), nothing can be folded");
    }
    write_output(args.out.as_deref(), &report)
}

fn run_edges(args: EvalArgs) -> Result<()> {
    let report = evaluate(&args, true)?;
    let out = EdgesReport {
        summary: report.summary,
        sample_temperature: report.thermal.sample_temperature,
        invalid_profiles: report.invalid_profiles,
        cancelled: report.cancelled,
        edges: report.edges,
    };
    write_output(args.out.as_deref(), &out)
}

fn evaluate(args: &EvalArgs, collect_edges: bool) -> Result<EvaluationReport> {
    ensure_file_exists(&args.input, "input")?;
    let set: ProfileSetDto = read_json(&args.input)?;
    if set.profiles.is_empty() {
        bail!("input {} contains no profiles", args.input.display());
    }

    let mut cfg = match &args.config {
        Some(path) => {
            ensure_file_exists(path, "config")?;
            read_json::<ScaleEvalConfig>(path)?
        }
        None => ScaleEvalConfig::default(),
    };
    apply_overrides(&mut cfg, args);
    cfg.collect_edges |= collect_edges;

    let sample_temperature = args
        .temperature
        .or(set.sample_temperature)
        .unwrap_or(REFERENCE_TEMPERATURE_C);

    let profiles: Vec<IntensityProfile> = set
        .profiles
        .into_iter()
        .map(|p| IntensityProfile::from_f64_intensities(p.x, &p.z))
        .collect();
    tracing::info!(
        "loaded {} profiles from {}, sample at {sample_temperature} °C",
        profiles.len(),
        args.input.display()
    );

    ScaleEvaluator::new(cfg)
        .evaluate(&profiles, sample_temperature)
        .with_context(|| format!("evaluating profiles from {}", args.input.display()))
}

fn apply_overrides(cfg: &mut ScaleEvalConfig, args: &EvalArgs) {
    if let Some(v) = args.threshold {
        cfg.threshold_fraction = v;
    }
    if let Some(v) = args.filter {
        cfg.filter_parameter = v;
    }
    if let Some(v) = args.lines {
        cfg.expected_line_marks = v;
    }
    if let Some(v) = args.division {
        cfg.nominal = NominalSpec::Division(v);
    }
    if args.from_reference {
        cfg.nominal_from_reference = true;
    }
    if let Some(v) = args.reference {
        cfg.reference_line = v;
    }
    if let Some(v) = args.alpha {
        cfg.thermal_expansion_alpha = v;
    }
}

fn write_output(path: Option<&Path>, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    match path {
        Some(path) => {
            fs::write(path, bytes).with_context(|| format!("writing json {}", path.display()))?;
            tracing::info!("wrote {}", path.display());
        }
        None => println!("{}", String::from_utf8_lossy(&bytes)),
    }
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use ls_scale::{NominalSpec, ScaleEvalConfig, ScaleEvaluator};

    use crate::{Cli, Command, EvalArgs, apply_overrides};

    fn eval_args(argv: &[&str]) -> EvalArgs {
        let cli = Cli::try_parse_from(argv).expect("valid arguments");
        match cli.cmd {
            Command::Scale(args) | Command::Edges(args) => args,
        }
    }

    #[test]
    fn from_reference_centers_nominals_on_reference_line() {
        let args = eval_args(&[
            "ls_eval", "scale", "--input", "p.json", "--lines", "4", "--division", "10",
            "--reference", "2", "--from-reference",
        ]);
        let mut cfg = ScaleEvalConfig::default();
        apply_overrides(&mut cfg, &args);

        assert!(cfg.nominal_from_reference);
        assert_eq!(cfg.nominal, NominalSpec::Division(10.0));
        let scale = ScaleEvaluator::new(cfg).new_scale();
        assert_eq!(scale.nominal_positions(), vec![-20.0, -10.0, 0.0, 10.0]);
    }

    #[test]
    fn overrides_keep_config_values_unless_given() {
        let args = eval_args(&[
            "ls_eval", "edges", "--input", "p.json", "--filter", "-2", "--alpha", "1e-5",
        ]);
        let mut cfg = ScaleEvalConfig {
            nominal_from_reference: true,
            expected_line_marks: 7,
            ..ScaleEvalConfig::default()
        };
        apply_overrides(&mut cfg, &args);

        assert_eq!(cfg.filter_parameter, -2);
        assert_eq!(cfg.thermal_expansion_alpha, 1e-5);
        assert_eq!(cfg.expected_line_marks, 7);
        assert!(cfg.nominal_from_reference);
    }
}
