// namematch CLI - reconcile ЗУП and портал employee lists by full name

mod exit_codes;
mod run;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use namematch_recon::{MatchConfig, MatchStatus, ReconError, Source};

use exit_codes::{
    recon_exit_code, EXIT_MATCH_READ, EXIT_MATCH_WRITE, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "namematch")]
#[command(about = "Reconcile ЗУП and портал employee lists by full name")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match primary rows against secondary rows and write the result table
    #[command(after_help = "\
Examples:
  namematch run сотрудники.xlsx
  namematch run сотрудники.xlsx --threshold 90 --sheet Лист1
  namematch run export.csv --format csv --output result.csv
  namematch run сотрудники.xlsx --config namematch.toml --report report.json
  namematch run сотрудники.xlsx --json --quiet > report.json")]
    Run {
        /// Input table (xlsx, xls, xlsb, ods, csv, tsv)
        input: PathBuf,

        /// TOML config file (defaults apply when omitted)
        #[arg(long, short, env = "NAMEMATCH_CONFIG")]
        config: Option<PathBuf>,

        /// Minimum fuzzy score (0-100) for a partial match. Overrides the config.
        #[arg(long, short, value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: Option<u8>,

        /// Worksheet to read (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Result file (default: <input stem><suffix>.xlsx next to the input)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Result format (default: from --output extension, else xlsx)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Print the JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Only log warnings and skip the summary
        #[arg(long, short)]
        quiet: bool,
    },

    /// Parse and validate a config file without running
    #[command(after_help = "\
Examples:
  namematch validate --config namematch.toml
  namematch validate            # checks built-in defaults")]
    Validate {
        #[arg(long, short, env = "NAMEMATCH_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print the status legend: status, label and row colour
    Labels {
        #[arg(long, short, env = "NAMEMATCH_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  namematch-recon ", env!("CARGO_PKG_VERSION"),
        "\nbuild:   ", env!("BUILD_PROFILE"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = matches!(cli.command, Commands::Run { quiet: true, .. });
    init_logging(quiet);

    let result = match cli.command {
        Commands::Run { input, config, threshold, sheet, output, format, json, report, quiet } => {
            run::cmd_run(run::RunArgs {
                input,
                config,
                threshold,
                sheet,
                output,
                format,
                json,
                report,
                quiet,
            })
        }
        Commands::Validate { config } => cmd_validate(config),
        Commands::Labels { config } => cmd_labels(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn read(msg: impl Into<String>) -> Self {
        Self { code: EXIT_MATCH_READ, message: msg.into(), hint: None }
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self { code: EXIT_MATCH_WRITE, message: msg.into(), hint: None }
    }

    /// Engine error with its registry code and a pointer at the config key to fix.
    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingSourceColumn { .. } => {
                Some("set [source] column in the config to the header holding ЗУП/портал tags")
            }
            ReconError::MissingNameColumns { .. } => {
                Some("set [names] parts or full_name_keywords in the config")
            }
            ReconError::EmptyPartition { .. } => {
                Some("check the source column values or [source] primary_keyword / secondary_keyword")
            }
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint: hint.map(String::from) }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Config from `path`, or the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<MatchConfig, CliError> {
    match path {
        Some(path) => {
            let config = MatchConfig::from_file(path).map_err(CliError::recon)?;
            log::debug!("loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(MatchConfig::default()),
    }
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let origin = config_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());
    eprintln!("config OK ({origin})");
    eprintln!("  threshold:     {} ({})", config.threshold, config.scorer);
    eprintln!(
        "  source column: '{}' ({} = '{}', {} = '{}')",
        config.source.column,
        config.source.primary_label,
        config.source.primary_keyword,
        config.source.secondary_label,
        config.source.secondary_keyword,
    );
    eprintln!(
        "  name columns:  {} or a header containing {}",
        config.names.parts.join(" + "),
        config.names.full_name_keywords.join(" / "),
    );
    Ok(())
}

// ============================================================================
// labels
// ============================================================================

fn cmd_labels(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    for line in legend_lines(&config) {
        println!("{line}");
    }
    Ok(())
}

fn legend_lines(config: &MatchConfig) -> Vec<String> {
    MatchStatus::ALL
        .iter()
        .map(|&status| {
            let source = match status {
                MatchStatus::UnmatchedSecondary => Source::Secondary,
                _ => Source::Primary,
            };
            let colour = namematch_io::xlsx::status_fill(status, source)
                .map(|rgb| format!("#{rgb:06X}"))
                .unwrap_or_else(|| "-".to_string());
            format!("{:<20} {:<8} {}", status.as_str(), colour, config.labels.label(status))
        })
        .collect()
}
