//! `namematch run`: load, reconcile, write the result table and report.

use std::path::{Path, PathBuf};

use serde::Serialize;

use namematch_io::output::{default_output_path, save_with_fallback, FALLBACK_ATTEMPTS};
use namematch_recon::{MatchConfig, MatchStatus, ReconResult};

use crate::exit_codes::EXIT_ERROR;
use crate::{load_config, CliError, OutputFormat};

pub struct RunArgs {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub threshold: Option<u8>,
    pub sheet: Option<String>,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub json: bool,
    pub report: Option<PathBuf>,
    pub quiet: bool,
}

/// JSON report: where the data came from and went, plus the full result.
#[derive(Serialize)]
struct RunReport<'a> {
    input: String,
    output: String,
    #[serde(flatten)]
    result: &'a ReconResult,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(threshold) = args.threshold {
        config = config.with_threshold(threshold).map_err(CliError::recon)?;
    }
    let format = resolve_format(args.format, args.output.as_deref())?;

    let table = namematch_io::load_table(&args.input, args.sheet.as_deref())
        .map_err(CliError::read)?;
    log::info!(
        "loaded {} rows, {} columns from {}",
        table.rows.len(),
        table.headers.len(),
        args.input.display()
    );

    let result = namematch_recon::run(&config, &table).map_err(CliError::recon)?;

    let target = args.output.clone().unwrap_or_else(|| {
        default_output_path(&args.input, &config.output.file_suffix, format.extension())
    });
    let written = save_with_fallback(&target, FALLBACK_ATTEMPTS, |path| match format {
        OutputFormat::Xlsx => namematch_io::xlsx::export(&result.table, path)
            .map(|stats| log::debug!("xlsx export: {}", stats.summary())),
        OutputFormat::Csv => namematch_io::csv::export(&result.table, path),
    })
    .map_err(|e| {
        CliError::write(e).with_hint("close the file if it is open in a spreadsheet application")
    })?;

    if args.json || args.report.is_some() {
        let report = RunReport {
            input: args.input.display().to_string(),
            output: written.display().to_string(),
            result: &result,
        };
        let json_str = serde_json::to_string_pretty(&report).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;

        if let Some(ref path) = args.report {
            std::fs::write(path, &json_str).map_err(|e| {
                CliError::write(format!("cannot write report {}: {e}", path.display()))
            })?;
            log::info!("wrote report {}", path.display());
        }
        if args.json {
            println!("{json_str}");
        }
    }

    if !args.quiet {
        for line in summary_lines(&config, &result) {
            eprintln!("{line}");
        }
        eprintln!("wrote {}", written.display());
    }

    Ok(())
}

/// Explicit `--format` wins; otherwise the `--output` extension decides.
fn resolve_format(
    format: Option<OutputFormat>,
    output: Option<&Path>,
) -> Result<OutputFormat, CliError> {
    if let Some(format) = format {
        return Ok(format);
    }
    let Some(output) = output else {
        return Ok(OutputFormat::Xlsx);
    };
    let ext = output
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" => Ok(OutputFormat::Xlsx),
        "csv" => Ok(OutputFormat::Csv),
        _ => Err(CliError::usage(format!(
            "cannot infer output format from {}",
            output.display()
        ))
        .with_hint("use --format xlsx or --format csv")),
    }
}

fn summary_lines(config: &MatchConfig, result: &ReconResult) -> Vec<String> {
    let s = &result.summary;
    let mut extras = Vec::new();
    if s.unclassified_rows > 0 {
        extras.push(format!("{} unclassified", s.unclassified_rows));
    }
    if s.shadowed_secondary > 0 {
        extras.push(format!("{} duplicate {} names replaced", s.shadowed_secondary, config.source.secondary_label));
    }
    let extras = if extras.is_empty() { String::new() } else { format!(" ({})", extras.join(", ")) };

    let mut lines = vec![format!(
        "{}: {} rows, {}: {} rows{} | threshold {} ({})",
        config.source.primary_label,
        s.primary_rows,
        config.source.secondary_label,
        s.secondary_rows,
        extras,
        result.meta.threshold,
        result.meta.scorer,
    )];
    for status in MatchStatus::ALL {
        lines.push(format!("  {:<24} {}", config.labels.label(status), s.count(status)));
    }
    lines
}
