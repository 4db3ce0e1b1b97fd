use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use capacity_planner::presets::{self, PRESET_NAMES};
use capacity_planner::{
    DauType, GrowthPeriod, RawInput, RequestPeriod, ValidationError, calculation_steps, estimate,
    export_json,
};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Human-readable report.
    #[default]
    Text,
    /// Export document: timestamp, inputs, metrics and calculation steps.
    Json,
}

/// Command-line arguments for the System Capacity Planner.
///
/// Values are layered: preset, then `--input` file, then individual flags.
#[derive(Debug, Parser)]
#[command(name = "capacity-planner", version, about)]
struct Args {
    /// Start from a named workload template (social, video, photo, ecommerce, messaging).
    #[arg(long, env = "CAPACITY_PRESET")]
    preset: Option<String>,

    /// JSON file with workload parameters, using camelCase keys (e.g. "totalUsers").
    #[arg(long)]
    input: Option<PathBuf>,

    /// Total number of registered users.
    #[arg(long)]
    total_users: Option<f64>,

    /// Daily active users, as a count or a percentage (see --dau-type).
    #[arg(long)]
    dau: Option<f64>,

    /// How --dau is expressed: absolute or percentage.
    #[arg(long)]
    dau_type: Option<DauType>,

    /// Storage allocated per user, in GB.
    #[arg(long)]
    storage_per_user: Option<f64>,

    /// Files uploaded per active user per day. Requires --avg-file-size.
    #[arg(long)]
    files_per_day: Option<f64>,

    /// Average uploaded file size, in KB. Requires --files-per-day.
    #[arg(long)]
    avg_file_size: Option<f64>,

    /// Requests per active user per --request-period. Takes precedence over file metrics;
    /// 0 clears a preset's value.
    #[arg(long)]
    request_count: Option<f64>,

    /// Period of --request-count: second, hour or day.
    #[arg(long)]
    request_period: Option<RequestPeriod>,

    /// Average request/response payload, in KB.
    #[arg(long)]
    avg_request_size: Option<f64>,

    /// Read:write ratio, e.g. 80:20 or 4:1.
    #[arg(long)]
    read_write_ratio: Option<String>,

    /// Growth rate in percent per --growth-period.
    #[arg(long, allow_negative_numbers = true)]
    growth_rate: Option<f64>,

    /// Period of --growth-rate: yearly or monthly.
    #[arg(long)]
    growth_period: Option<GrowthPeriod>,

    /// Output format.
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Append the detailed calculation steps to the text report.
    #[arg(long)]
    steps: bool,

    /// Write the report to a file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(long, short)]
    verbose: bool,

    /// List the available presets and exit.
    #[arg(long)]
    list_presets: bool,
}

impl Args {
    fn flags(&self) -> RawInput {
        RawInput {
            total_users: self.total_users,
            dau: self.dau,
            dau_type: self.dau_type,
            storage_per_user: self.storage_per_user,
            files_per_day: self.files_per_day,
            avg_file_size: self.avg_file_size,
            request_count: self.request_count,
            request_period: self.request_period,
            avg_request_size: self.avg_request_size,
            read_write_ratio: self.read_write_ratio.clone(),
            growth_rate: self.growth_rate,
            growth_period: self.growth_period,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "capacity_planner=debug"
    } else {
        "capacity_planner=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn collect_input(args: &Args) -> Result<RawInput> {
    let mut raw = RawInput::default();

    if let Some(name) = &args.preset {
        let preset = presets::preset(name).with_context(|| {
            format!(
                "unknown preset '{name}' (expected one of: {})",
                PRESET_NAMES.join(", ")
            )
        })?;
        debug!(preset = preset.name, "preset loaded");
        raw = raw.overlay(preset.input);
    }

    if let Some(path) = &args.input {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display()))?;
        let file: RawInput = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse input file {}", path.display()))?;
        debug!(path = %path.display(), "input file loaded");
        raw = raw.overlay(file);
    }

    Ok(raw.overlay(args.flags()))
}

fn run(args: &Args) -> Result<()> {
    if args.list_presets {
        for p in presets::all() {
            println!("{:<10} {}", p.name, p.description);
        }
        return Ok(());
    }

    let raw = collect_input(args)?;
    let report = estimate(&raw)?;

    let rendered = match args.format {
        OutputFormat::Text => {
            let mut text = report.to_string();
            if args.steps {
                text.push_str("\nCalculation steps\n");
                for step in calculation_steps(&report) {
                    text.push_str(&step.to_string());
                    text.push('\n');
                }
            }
            text
        }
        OutputFormat::Json => {
            let mut json = export_json(&report).context("failed to serialize report")?;
            json.push('\n');
            json
        }
    };

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if e.downcast_ref::<ValidationError>().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
