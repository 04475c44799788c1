//! CLI command definitions, routing, and tracing setup.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use clauseguard_core::{ClauseAnalyzer, Pipeline, ProgressReporter};
use clauseguard_extract::{DefaultExtractor, DocumentFormat, TextExtractor};
use clauseguard_services::ServiceSet;
use clauseguard_shared::{
    AnalysisReport, AnalyzerOptions, AppConfig, ClauseGuardError, ErrorBody, init_config,
    load_config, load_config_from, validate_service_urls,
};
use clauseguard_storage::ArtifactStore;

/// Exit status for rejected input (bad file, no text, unknown artifact).
const CLIENT_ERROR_EXIT: i32 = 2;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ClauseGuard: contract clause risk and compliance analysis.
#[derive(Parser)]
#[command(
    name = "clauseguard",
    version,
    about = "Segment contracts into clauses, assess their risk, and add missing compliance clauses.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.clauseguard/clauseguard.toml.
    #[arg(long, global = true, env = "CLAUSEGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Report output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Json,
    Text,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Analyze a PDF or DOCX contract.
    Analyze {
        /// Contract file (.pdf or .docx).
        file: PathBuf,

        /// Report format.
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// Maximum clauses analyzed concurrently (overrides config).
        #[arg(long)]
        concurrency: Option<u32>,

        /// Classification service URL (overrides config).
        #[arg(long)]
        classifier_url: Option<String>,

        /// Risk service URL (overrides config).
        #[arg(long)]
        risk_url: Option<String>,

        /// Directory for generated documents (overrides config).
        #[arg(long)]
        artifacts_dir: Option<String>,
    },

    /// Retrieve a generated document by name.
    Artifact {
        /// Artifact name, as reported in `augmented_document.name`.
        name: String,

        /// Write to this path instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Directory holding generated documents (overrides config).
        #[arg(long)]
        artifacts_dir: Option<String>,
    },

    /// Print the clauses a contract segments into.
    Segment {
        /// Contract file (.pdf, .docx, or plain text).
        file: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries results.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "clauseguard=info",
        1 => "clauseguard=debug",
        _ => "clauseguard=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Analyze {
            file,
            format,
            concurrency,
            classifier_url,
            risk_url,
            artifacts_dir,
        } => {
            let mut config = resolve_config(config_path.as_deref())?;
            if let Some(concurrency) = concurrency {
                config.analysis.concurrency = concurrency;
            }
            if classifier_url.is_some() {
                config.services.classifier_url = classifier_url;
            }
            if risk_url.is_some() {
                config.services.risk_url = risk_url;
            }
            if let Some(dir) = artifacts_dir {
                config.artifacts.dir = dir;
            }
            cmd_analyze(&config, &file, format).await
        }
        Command::Artifact {
            name,
            out,
            artifacts_dir,
        } => {
            let mut config = resolve_config(config_path.as_deref())?;
            if let Some(dir) = artifacts_dir {
                config.artifacts.dir = dir;
            }
            cmd_artifact(&config, &name, out.as_deref()).await
        }
        Command::Segment { file } => cmd_segment(&file).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path.as_deref()).await,
        },
    }
}

/// Load the config file (explicit path or default location) and validate it.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    validate_service_urls(&config)?;
    Ok(config)
}

/// Report client errors as a JSON body and exit; pass internal errors up.
fn or_client_exit<T>(result: clauseguard_shared::Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_client_error() => {
            info!(reason = err.reason(), "request rejected: {err}");
            let body = ErrorBody::from(&err);
            let json = serde_json::to_string(&body)
                .unwrap_or_else(|_| format!("{{\"reason\":\"{}\"}}", body.reason));
            println!("{json}");
            std::process::exit(CLIENT_ERROR_EXIT);
        }
        Err(err) => {
            error!(reason = err.reason(), error = %err, "request failed");
            Err(err.into())
        }
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_analyze(config: &AppConfig, file: &Path, format: OutputFormat) -> Result<()> {
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| eyre!("'{}' is not a file path", file.display()))?;

    // Reject unsupported types before touching the file.
    or_client_exit(DocumentFormat::from_filename(&filename))?;

    let bytes = std::fs::read(file).wrap_err_with(|| format!("failed to read {}", file.display()))?;

    let options = AnalyzerOptions::from(config);
    let services = ServiceSet::from_config(&config.services, options.service_timeout)?;
    let store = ArtifactStore::open(&config.artifacts.dir)?;
    let pipeline = Pipeline::new(ClauseAnalyzer::new(services, options), store);

    info!(file = %file.display(), size = bytes.len(), "analyzing contract");

    let reporter = CliProgress::new();
    let result = pipeline
        .analyze_upload(&filename, &bytes, Arc::new(DefaultExtractor), &reporter)
        .await;
    reporter.spinner.finish_and_clear();
    let report = or_client_exit(result)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }

    Ok(())
}

async fn cmd_artifact(config: &AppConfig, name: &str, out: Option<&Path>) -> Result<()> {
    let store = ArtifactStore::open(&config.artifacts.dir)?;
    let bytes = or_client_exit(store.get(name))?;

    match out {
        Some(path) => {
            std::fs::write(path, &bytes)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            info!(name, path = %path.display(), size = bytes.len(), "artifact saved");
            println!("Saved {name} to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

async fn cmd_segment(file: &Path) -> Result<()> {
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let text = match DocumentFormat::from_filename(&filename) {
        Ok(format) => DefaultExtractor.extract(file, format),
        Err(_) => std::fs::read_to_string(file)
            .wrap_err_with(|| format!("failed to read {}", file.display()))?,
    };

    if text.trim().is_empty() {
        return or_client_exit(Err(ClauseGuardError::EmptyInput));
    }

    let segmentation = clauseguard_segment::segment_with_strategy(&text);
    let Some(strategy) = segmentation.strategy else {
        return or_client_exit(Err(ClauseGuardError::NoClausesDetected));
    };

    println!("Strategy: {strategy}");
    println!("Clauses:  {}", segmentation.clauses.len());
    for clause in &segmentation.clauses {
        println!();
        println!("{clause}");
    }

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Text report
// ---------------------------------------------------------------------------

fn print_report(report: &AnalysisReport) {
    println!();
    println!("  Clauses analyzed: {}", report.total_clauses);

    for (i, record) in report.analysis.iter().enumerate() {
        println!();
        println!("  [{}] {}", i + 1, preview(&record.clause, 72));
        println!(
            "      Type: {} ({:.3})",
            record.classification.predicted_clause_type, record.classification.confidence
        );
        println!(
            "      Risk: {} ({:.3})",
            record.risk.risk_level, record.risk.confidence
        );
        println!("      Why:  {}", record.risk.justification);
    }

    println!();
    println!("  Risk levels:");
    for (level, count) in &report.summary.risk_levels {
        println!("    {level:<12} {count}");
    }

    println!();
    if report.missing_clauses.is_empty() {
        println!("  No mandatory clauses missing.");
    } else {
        println!("  Missing mandatory clauses:");
        for missing in &report.missing_clauses {
            println!("    - {} ({})", missing.requirement, missing.regime);
        }
    }

    if let Some(artifact) = &report.augmented_document {
        println!();
        println!("  Augmented contract: {}", artifact.name);
        println!("  Retrieve with:      clauseguard artifact {}", artifact.name);
    }
    println!();
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{cut}…")
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn clause_analyzed(&self, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Analyzing clauses [{current}/{total}]"));
    }

    fn done(&self, _report: &AnalysisReport) {
        self.spinner.finish_and_clear();
    }
}
