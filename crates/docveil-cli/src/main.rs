//! Docveil CLI
//!
//! Detects PII in documents and redacts the categories you choose.
//!
//! Usage:
//! ```bash
//! # Which categories can be redacted from this document?
//! docveil scan statement.txt
//!
//! # Redact emails and PANs into uploads/redacted_statement.txt
//! docveil redact uploads/statement.txt -c Email -c PAN
//!
//! # With a config file and batched commits
//! docveil --config docveil.yaml redact statement.txt -c PhoneNumber --commit-policy per-page
//! ```

mod config;
mod report;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use config::{DocveilConfig, LogFormat, LoggingConfig};
use docveil_pii::{
    CommitPolicy, DocumentRedactor, PIIDetector, RedactionRequest, RegexPIIDetector, scan_path,
};
use docveil_textdoc::TextDocumentBackend;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "docveil")]
#[command(about = "Docveil - detect and redact PII in documents", long_about = None)]
struct Cli {
    /// Path to a YAML or TOML config file
    #[arg(long, global = true, env = "DOCVEIL_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CommitPolicyArg {
    PerValue,
    PerPage,
}

impl From<CommitPolicyArg> for CommitPolicy {
    fn from(arg: CommitPolicyArg) -> Self {
        match arg {
            CommitPolicyArg::PerValue => CommitPolicy::PerValue,
            CommitPolicyArg::PerPage => CommitPolicy::PerPage,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the PII categories that can be detected
    Categories,
    /// Detect PII across a whole document and list what can be redacted
    Scan {
        /// Document to scan
        input: PathBuf,

        /// Include matched values in the output
        #[arg(long, default_value = "false")]
        show_values: bool,

        /// Print a JSON report
        #[arg(long, default_value = "false")]
        json: bool,
    },
    /// Redact the selected PII categories page by page
    Redact {
        /// Document to redact
        input: PathBuf,

        /// Category to redact (repeatable or comma separated)
        #[arg(short = 'c', long = "category", required = true, value_delimiter = ',')]
        categories: Vec<String>,

        /// Output path (defaults to <prefix><name> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// When marked regions are applied within a page
        #[arg(long, value_enum)]
        commit_policy: Option<CommitPolicyArg>,

        /// Include matched values in the JSON output
        #[arg(long, default_value = "false")]
        show_values: bool,

        /// Print the redaction outcome as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

fn expand(path: &std::path::Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string())
}

fn load_config(cli: &Cli) -> anyhow::Result<(DocveilConfig, Option<PathBuf>)> {
    let path = match &cli.config {
        Some(path) => Some(expand(path)),
        None => DocveilConfig::default_path().filter(|path| path.exists()),
    };

    let mut config = match &path {
        Some(path) => DocveilConfig::from_file(path)?,
        None => DocveilConfig::default(),
    };

    // Environment overrides the file, CLI flags override both
    config.merge_env();
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Commands::Redact {
        commit_policy: Some(policy),
        ..
    } = &cli.command
    {
        config.redaction.commit_policy = (*policy).into();
    }

    config.validate()?;
    Ok((config, path))
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let log_level = match logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let filter = EnvFilter::new(format!("{}", log_level));

    // Logs go to stderr so reports on stdout stay parseable
    match logging.format {
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_path) = load_config(&cli)?;
    init_tracing(&config.logging)?;

    match &config_path {
        Some(path) => debug!("Loaded configuration from {}", path.display()),
        None => debug!("Using default configuration"),
    }

    let detector = RegexPIIDetector::new(Arc::new(config.registry()?));
    let backend = TextDocumentBackend::new();

    match cli.command {
        Commands::Categories => {
            for category in detector.supported_categories() {
                println!("{}", category);
            }
        }
        Commands::Scan {
            input,
            show_values,
            json,
        } => {
            let input = expand(&input);
            let result = scan_path(&detector, &backend, &input)
                .with_context(|| format!("Failed to scan {}", input.display()))?;

            let report = report::ScanReport::new(&input, &result, show_values);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
        }
        Commands::Redact {
            input,
            categories,
            output,
            show_values,
            json,
            ..
        } => {
            let input = expand(&input);
            let output = output
                .map(|path| expand(&path))
                .unwrap_or_else(|| config.default_output_for(&input));

            let request = RedactionRequest::new(input, output, categories);
            let redactor = DocumentRedactor::new(&detector, config.redactor_config());
            let outcome = redactor
                .redact(&backend, &request)
                .with_context(|| format!("Failed to redact {}", request.input.display()))?;

            info!("Wrote {}", request.output.display());
            if json {
                let report = report::RedactReport::new(&request, &outcome, show_values);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report::render_outcome(&request, &outcome));
            }
        }
    }

    Ok(())
}
