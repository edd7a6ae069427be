use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use trend_core::{AnalysisConfig, AnalysisOutcome, ReferenceRange};
use trend_intake::{analyze_request_str, outcome_to_value};

#[derive(Parser, Debug)]
#[command(
    name = "trend-cli",
    about = "Analyze clinical readings across visits from a JSON request file."
)]
struct Args {
    /// Path to the request JSON (`patient_info` + `reports`).
    #[arg(short, long)]
    input: PathBuf,

    /// JSON file mapping parameter names to `{ "low": .., "high": .. }`.
    #[arg(long)]
    ranges: Option<PathBuf>,

    /// Override a single range, e.g. `--range glucose=70:110`.
    #[arg(long = "range", value_name = "NAME=LOW:HIGH", value_parser = parse_range_arg)]
    range: Vec<(String, ReferenceRange)>,

    /// Print the full JSON response instead of a summary.
    #[arg(long)]
    json: bool,

    /// Log engine decisions to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = AnalysisConfig::default();
    if let Some(path) = &args.ranges {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read range file {path:?}"))?;
        let overrides: BTreeMap<String, ReferenceRange> = serde_json::from_str(&text)
            .with_context(|| format!("Range file {path:?} is not a name -> {{low, high}} map"))?;
        config = config.with_overrides(overrides)?;
    }
    config = config.with_overrides(args.range.clone())?;

    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Cannot read file {:?}", args.input))?;
    let outcome = analyze_request_str(&data, &config)?;

    if args.json {
        let body = outcome_to_value(&outcome)?;
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_summary(&outcome, &config);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_range_arg(raw: &str) -> anyhow::Result<(String, ReferenceRange)> {
    let (name, bounds) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=LOW:HIGH, got {raw:?}"))?;
    let (low, high) = bounds
        .split_once(':')
        .ok_or_else(|| anyhow!("expected LOW:HIGH after '=', got {bounds:?}"))?;
    let low: f64 = low
        .trim()
        .parse()
        .with_context(|| format!("invalid low bound {low:?}"))?;
    let high: f64 = high
        .trim()
        .parse()
        .with_context(|| format!("invalid high bound {high:?}"))?;
    Ok((name.trim().to_string(), ReferenceRange::new(low, high)))
}

fn print_summary(outcome: &AnalysisOutcome, config: &AnalysisConfig) {
    let report = &outcome.analysis;
    let patient = &report.patient_info;

    println!(
        "Patient: {} (ID {}) | Age {} | {}\nReport type: {}",
        patient.name, patient.id, patient.age, patient.gender, patient.report_type
    );
    println!(
        "Visits: {} | {} to {}",
        report.total_visits, report.date_range.start, report.date_range.end
    );

    for name in config.ranges.names() {
        let Some(analysis) = report.parameter(name) else {
            continue;
        };
        println!(
            "\n{name} [{}-{}]: {:?}, change {:+.2}, abnormal visits {}",
            analysis.normal_range.low,
            analysis.normal_range.high,
            analysis.trend.trend,
            analysis.trend.change,
            analysis.abnormal_count
        );
        for visit in &analysis.abnormalities {
            println!("  {}: {} ({:?})", visit.date, visit.value, visit.status);
        }
    }

    if outcome.guidance.is_empty() {
        println!("\nNo readings outside their reference ranges.");
        return;
    }

    for name in &outcome.abnormal_parameters {
        let Some(entry) = outcome.guidance.get(name) else {
            continue;
        };
        println!("\nGeneral guidance for {name}:");
        for item in &entry.care {
            println!("  + {item}");
        }
        for item in &entry.avoid {
            println!("  - avoid {item}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_argument_is_parsed() {
        let (name, range) = parse_range_arg("glucose=70:110.5").unwrap();
        assert_eq!(name, "glucose");
        assert_eq!(range, ReferenceRange::new(70.0, 110.5));
    }

    #[test]
    fn malformed_range_argument_is_rejected() {
        assert!(parse_range_arg("glucose").is_err());
        assert!(parse_range_arg("glucose=70").is_err());
        assert!(parse_range_arg("glucose=low:110").is_err());
    }

    #[test]
    fn args_accept_repeated_ranges() {
        let args = Args::try_parse_from([
            "trend-cli",
            "--input",
            "request.json",
            "--range",
            "glucose=60:110",
            "--range",
            "ldl=0:130",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.range.len(), 2);
        assert_eq!(args.range[1].0, "ldl");
        assert!(args.json);
    }
}
