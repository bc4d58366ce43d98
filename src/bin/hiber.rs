//! Hiber CLI - Command-line interface for Hiber Flux
//!
//! Commands:
//! - analyze: Segment temperature series into hibernation events
//! - params: Normalize a parameter sheet and print it as JSON

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hiber_flux::adapters::{CsvSeriesAdapter, ParameterSheet, SeriesAdapter};
use hiber_flux::normalizer::ParameterNormalizer;
use hiber_flux::pipeline::{analyze_batch, SubjectInput};
use hiber_flux::report::{write_process_csv, write_summary_csv, ReportEncoder};
use hiber_flux::{AnalysisError, HibernationResult, HIBER_VERSION};

/// Hiber - Body temperature phase segmentation for hibernation studies
#[derive(Parser)]
#[command(name = "hiber")]
#[command(version = HIBER_VERSION)]
#[command(about = "Segment hibernation body temperature series into events", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze series files against a parameter sheet
    Analyze {
        /// Parameter sheet (CSV, one row per subject)
        #[arg(short, long)]
        params: PathBuf,

        /// Directory for the per-subject artifacts
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Also write a JSON report per subject
        #[arg(long)]
        json: bool,

        /// Series files (CSV with Date/Time and Value columns)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Normalize a parameter sheet and print the typed parameters
    Params {
        /// Parameter sheet (CSV, one row per subject)
        #[arg(short, long)]
        params: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), HiberCliError> {
    match cli.command {
        Commands::Analyze {
            params,
            output_dir,
            json,
            inputs,
        } => cmd_analyze(&params, &output_dir, json, &inputs),
        Commands::Params { params } => cmd_params(&params),
    }
}

fn cmd_analyze(
    params: &Path,
    output_dir: &Path,
    json: bool,
    inputs: &[PathBuf],
) -> Result<(), HiberCliError> {
    let sheet = ParameterSheet::from_csv(&fs::read_to_string(params)?)?;
    fs::create_dir_all(output_dir)?;

    let adapter = CsvSeriesAdapter::new();
    let mut failed: Vec<FailedSubject> = Vec::new();
    let mut subjects = Vec::new();
    for path in inputs {
        match load_subject(&adapter, &sheet, path) {
            Ok(input) => subjects.push(input),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "subject skipped");
                failed.push(FailedSubject {
                    label: path.display().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
    info!(subjects = subjects.len(), "analyzing");

    let encoder = ReportEncoder::new();
    let mut analyzed = Vec::new();
    for outcome in analyze_batch(&subjects) {
        let result = match outcome.result {
            Ok(result) => result,
            Err(e) => {
                failed.push(FailedSubject {
                    label: outcome.label,
                    error: e.to_string(),
                });
                continue;
            }
        };

        write_artifacts(&result, output_dir, json.then_some(&encoder))?;
        analyzed.push(SubjectOverview {
            label: outcome.label,
            id: result.id.clone(),
            status: result.status_str().to_string(),
            counts: result
                .events
                .counts()
                .into_iter()
                .map(|(category, count)| (category.as_str().to_string(), count))
                .collect(),
        });
    }

    let overview = Overview {
        instance_id: encoder.instance_id().to_string(),
        analyzed,
        failed,
    };
    println!("{}", serde_json::to_string_pretty(&overview)?);

    if overview.failed.is_empty() {
        Ok(())
    } else {
        Err(HiberCliError::SubjectsFailed(overview.failed.len()))
    }
}

fn load_subject(
    adapter: &CsvSeriesAdapter,
    sheet: &ParameterSheet,
    path: &Path,
) -> Result<SubjectInput, AnalysisError> {
    let params = sheet.for_file(path)?.clone();
    let series = adapter.parse(&fs::read_to_string(path)?)?;
    Ok(SubjectInput {
        label: path.display().to_string(),
        params,
        series,
    })
}

fn write_artifacts(
    result: &HibernationResult,
    output_dir: &Path,
    encoder: Option<&ReportEncoder>,
) -> Result<(), HiberCliError> {
    let summary = output_dir.join(format!("hib_analysis_{}.csv", result.id));
    write_summary_csv(result, BufWriter::new(File::create(&summary)?))?;

    let process = output_dir.join(format!("hib_process_data_{}.csv", result.id));
    write_process_csv(result, BufWriter::new(File::create(&process)?))?;

    if let Some(encoder) = encoder {
        let path = output_dir.join(format!("hib_report_{}.json", result.id));
        let mut file = BufWriter::new(File::create(&path)?);
        file.write_all(encoder.encode_to_json(result.clone())?.as_bytes())?;
        file.flush()?;
    }

    info!(id = %result.id, dir = %output_dir.display(), "artifacts written");
    Ok(())
}

fn cmd_params(params: &Path) -> Result<(), HiberCliError> {
    let sheet = ParameterSheet::from_csv(&fs::read_to_string(params)?)?;
    let normalized = sheet
        .rows()
        .iter()
        .map(ParameterNormalizer::normalize)
        .collect::<Result<Vec<_>, _>>()?;
    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}

// Output types

#[derive(serde::Serialize)]
struct Overview {
    instance_id: String,
    analyzed: Vec<SubjectOverview>,
    failed: Vec<FailedSubject>,
}

#[derive(serde::Serialize)]
struct SubjectOverview {
    label: String,
    id: String,
    status: String,
    counts: BTreeMap<String, usize>,
}

#[derive(serde::Serialize)]
struct FailedSubject {
    label: String,
    error: String,
}

// Error types

#[derive(Debug)]
enum HiberCliError {
    Io(io::Error),
    Analysis(AnalysisError),
    Json(serde_json::Error),
    SubjectsFailed(usize),
}

impl From<io::Error> for HiberCliError {
    fn from(e: io::Error) -> Self {
        HiberCliError::Io(e)
    }
}

impl From<AnalysisError> for HiberCliError {
    fn from(e: AnalysisError) -> Self {
        HiberCliError::Analysis(e)
    }
}

impl From<serde_json::Error> for HiberCliError {
    fn from(e: serde_json::Error) -> Self {
        HiberCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HiberCliError> for CliError {
    fn from(e: HiberCliError) -> Self {
        match e {
            HiberCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HiberCliError::Analysis(AnalysisError::Configuration(msg)) => CliError {
                code: "CONFIGURATION_ERROR".to_string(),
                message: msg,
                hint: Some("Check thresholds and discrimination windows".to_string()),
            },
            HiberCliError::Analysis(e) => CliError {
                code: "ANALYSIS_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the parameter sheet columns and instants".to_string()),
            },
            HiberCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            HiberCliError::SubjectsFailed(count) => CliError {
                code: "SUBJECTS_FAILED".to_string(),
                message: format!("{} subjects could not be analyzed", count),
                hint: Some("See the overview for per-subject errors".to_string()),
            },
        }
    }
}
