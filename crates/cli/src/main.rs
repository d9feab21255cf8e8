use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use common::{Config, logging, pretty::TableStyleKind};
use invoker::{NormalizingInvoker, ProcedureInvoker, ReplayInvoker, StaticMetadata};
use runner::{CaseSelector, RunReport, render};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "sp-harness",
    about = "Run the fixture test cases of a stored procedure"
)]
struct Args {
    /// Stored procedure whose cases should run
    procedure: String,
    /// Fixture set name; `.json` is appended when missing
    #[arg(short, long)]
    fixtures: String,
    /// Only run cases of this category
    #[arg(long, value_enum)]
    case_type: Option<CliCaseType>,
    /// Directory containing fixture files (overrides SP_HARNESS_FIXTURE_DIR)
    #[arg(long)]
    fixture_dir: Option<PathBuf>,
    /// JSON file with canned responses per procedure
    #[arg(long)]
    responses: Option<PathBuf>,
    /// JSON file with declared parameter types per procedure
    #[arg(long)]
    metadata: Option<PathBuf>,
    /// Table rendering style for the report
    #[arg(long, value_enum)]
    style: Option<CliTableStyle>,
    /// Fail calls whose first result row reports a zero status
    #[arg(long)]
    status_row: bool,
    /// Chain steps start from the first step's parameters
    #[arg(long)]
    inherit: bool,
    /// Default log filter; RUST_LOG takes precedence
    #[arg(long)]
    log: Option<String>,
    /// Print the report as JSON instead of tables
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Flags layered over the environment-derived configuration.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.fixture_dir {
            config.fixture_dir = dir.clone();
        }
        if let Some(level) = &self.log {
            config.log_level = level.clone();
        }
        if let Some(style) = self.style {
            config.table_style = style.into();
        }
        config.status_row |= self.status_row;
        config.inherit_base_parameters |= self.inherit;
        config
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliCaseType {
    Positive,
    Negative,
    Edge,
}

impl CliCaseType {
    fn as_str(self) -> &'static str {
        match self {
            CliCaseType::Positive => "positive",
            CliCaseType::Negative => "negative",
            CliCaseType::Edge => "edge",
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliTableStyle {
    Modern,
    Ascii,
    Plain,
}

impl From<CliTableStyle> for TableStyleKind {
    fn from(value: CliTableStyle) -> Self {
        match value {
            CliTableStyle::Modern => TableStyleKind::Modern,
            CliTableStyle::Ascii => TableStyleKind::Ascii,
            CliTableStyle::Plain => TableStyleKind::Plain,
        }
    }
}

fn main() {
    match run(Args::parse()) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let base = Config::from_env().context("invalid SP_HARNESS_* environment")?;
    execute(&args, base)
}

/// Runs the selected cases and prints the report. `Ok(false)` means at least
/// one case failed.
fn execute(args: &Args, base: Config) -> Result<bool> {
    let config = args.apply(base);
    logging::init(&config.log_level);
    debug!(?config, "effective configuration");

    let invoker = build_invoker(args.responses.as_deref(), args.metadata.as_deref())?;
    let mut selector = CaseSelector::from_config(&config, invoker);
    let report = selector
        .run(
            &args.procedure,
            args.case_type.map(CliCaseType::as_str),
            &args.fixtures,
        )
        .with_context(|| format!("failed to run test cases for {}", args.procedure))?;

    println!("{}", format_report(&report, args.json, config.table_style)?);

    info!(
        passed = report.passed_count(),
        failed = report.failed_count(),
        "run finished"
    );
    Ok(report.passed())
}

/// Console tables, or the serialized report for `--json`.
fn format_report(report: &RunReport, json: bool, style: TableStyleKind) -> Result<String> {
    if json {
        serde_json::to_string_pretty(report).context("failed to serialize report")
    } else {
        Ok(render(report, style))
    }
}

fn build_invoker(
    responses: Option<&Path>,
    metadata: Option<&Path>,
) -> Result<Box<dyn ProcedureInvoker>> {
    let replay = match responses {
        Some(path) => ReplayInvoker::from_path(path)
            .with_context(|| format!("failed to load responses from {}", path.display()))?,
        None => {
            warn!("no --responses file given; every call will fail");
            ReplayInvoker::new()
        }
    };

    let Some(path) = metadata else {
        return Ok(Box::new(replay));
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read parameter metadata {}", path.display()))?;
    let metadata = StaticMetadata::from_json_str(&json)
        .with_context(|| format!("failed to parse parameter metadata {}", path.display()))?;
    Ok(Box::new(NormalizingInvoker::new(replay, metadata)))
}
